//! Write-only secrets such as account passwords.
//!
//! A [`SensitiveValue`] keeps its plaintext sealed with XChaCha20-Poly1305
//! under a key generated once per process. If sealing fails the value is
//! XOR-ed with a per-process random pad instead.
//!
//! This is obfuscation, not confidentiality: anyone able to read process
//! memory can recover the key. It keeps passwords out of log lines, debug
//! output, serialized settings and casual memory dumps.

use std::sync::OnceLock;

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::{Error, Result};

/// Marker printed instead of a secret.
pub const REDACTED: &str = "[redacted]";

const PAD_LEN: usize = 64;

fn process_key() -> &'static Key {
    static KEY: OnceLock<Key> = OnceLock::new();
    KEY.get_or_init(|| XChaCha20Poly1305::generate_key(&mut OsRng))
}

fn process_pad() -> &'static [u8; PAD_LEN] {
    static PAD: OnceLock<[u8; PAD_LEN]> = OnceLock::new();
    PAD.get_or_init(|| {
        let mut pad = [0u8; PAD_LEN];
        OsRng.fill_bytes(&mut pad);
        pad
    })
}

fn xor_pad(data: &[u8]) -> Vec<u8> {
    let pad = process_pad();
    data.iter()
        .enumerate()
        .map(|(i, byte)| byte ^ pad[i % PAD_LEN])
        .collect()
}

#[derive(Clone)]
enum Sealed {
    Aead { nonce: XNonce, ciphertext: Vec<u8> },
    Xor(Vec<u8>),
}

/// A secret that only leaves its sealed form through [`SensitiveValue::reveal`].
#[derive(Clone)]
pub struct SensitiveValue {
    sealed: Sealed,
    empty: bool,
}

impl SensitiveValue {
    /// Seals `plaintext`.
    #[must_use]
    pub fn new(plaintext: impl AsRef<str>) -> Self {
        let bytes = plaintext.as_ref().as_bytes();
        let cipher = XChaCha20Poly1305::new(process_key());
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = match cipher.encrypt(&nonce, bytes) {
            Ok(ciphertext) => Sealed::Aead { nonce, ciphertext },
            Err(_) => {
                warn!("Sealing failed, falling back to XOR obfuscation");
                Sealed::Xor(xor_pad(bytes))
            }
        };
        Self {
            sealed,
            empty: bytes.is_empty(),
        }
    }

    #[cfg(test)]
    fn xor_only(plaintext: &str) -> Self {
        Self {
            sealed: Sealed::Xor(xor_pad(plaintext.as_bytes())),
            empty: plaintext.is_empty(),
        }
    }

    /// Returns true if the secret is the empty string.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Returns the plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Sensitive`] if the sealed bytes fail authentication
    /// or are not UTF-8.
    pub fn reveal(&self) -> Result<String> {
        let bytes = match &self.sealed {
            Sealed::Aead { nonce, ciphertext } => XChaCha20Poly1305::new(process_key())
                .decrypt(nonce, ciphertext.as_slice())
                .map_err(|_| Error::Sensitive("authentication failed".to_string()))?,
            Sealed::Xor(data) => xor_pad(data),
        };
        String::from_utf8(bytes).map_err(|e| Error::Sensitive(e.to_string()))
    }
}

impl std::fmt::Debug for SensitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SensitiveValue").field(&REDACTED).finish()
    }
}

impl std::fmt::Display for SensitiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SensitiveValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "correct horse battery staple";

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn reveal_returns_plaintext() {
        let value = SensitiveValue::new(SECRET);
        assert_eq!(value.reveal().unwrap(), SECRET);
    }

    #[test]
    fn empty_secret() {
        let value = SensitiveValue::new("");
        assert!(value.is_empty());
        assert_eq!(value.reveal().unwrap(), "");
        assert!(!SensitiveValue::new(SECRET).is_empty());
    }

    #[test]
    fn unicode_secret() {
        let value = SensitiveValue::new("pässwörd-🔑");
        assert_eq!(value.reveal().unwrap(), "pässwörd-🔑");
    }

    #[test]
    fn sealed_bytes_hide_plaintext() {
        let value = SensitiveValue::new(SECRET);
        match &value.sealed {
            Sealed::Aead { ciphertext, .. } => {
                assert!(!contains(ciphertext, SECRET.as_bytes()));
            }
            Sealed::Xor(_) => panic!("expected AEAD sealing"),
        }
    }

    #[test]
    fn each_seal_uses_fresh_nonce() {
        let a = SensitiveValue::new(SECRET);
        let b = SensitiveValue::new(SECRET);
        match (&a.sealed, &b.sealed) {
            (Sealed::Aead { nonce: na, .. }, Sealed::Aead { nonce: nb, .. }) => {
                assert_ne!(na, nb);
            }
            _ => panic!("expected AEAD sealing"),
        }
    }

    #[test]
    fn xor_fallback_round_trips() {
        let value = SensitiveValue::xor_only(SECRET);
        assert_eq!(value.reveal().unwrap(), SECRET);
    }

    #[test]
    fn formatting_redacts() {
        let value = SensitiveValue::new(SECRET);
        assert_eq!(format!("{value}"), REDACTED);
        let debug = format!("{value:?}");
        assert!(!debug.contains(SECRET));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn serialization_redacts() {
        let value = SensitiveValue::new(SECRET);
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, format!("\"{REDACTED}\""));
    }

    #[test]
    fn clone_reveals_same_secret() {
        let value = SensitiveValue::new(SECRET);
        let copy = value.clone();
        assert_eq!(copy.reveal().unwrap(), SECRET);
    }
}
