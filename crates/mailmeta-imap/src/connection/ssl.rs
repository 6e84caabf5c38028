//! TLS options and the rustls client configuration built from them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{
    CertificateError, ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Peer verification and client certificate options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SslContext {
    /// Verify the server certificate chain.
    pub verify_peer: bool,
    /// Verify that the certificate matches the host name.
    pub verify_peer_name: bool,
    /// Accept certificates that chain to no known root.
    pub allow_self_signed: bool,
    /// Send the host name in the TLS handshake.
    #[serde(rename = "SNI_enabled")]
    pub sni_enabled: bool,
    /// OpenSSL security level. Recorded only; rustls enforces its own floor.
    pub security_level: u8,
    /// Extra trusted roots, one PEM file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cafile: Option<PathBuf>,
    /// Extra trusted roots, a directory of PEM files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capath: Option<PathBuf>,
    /// Client certificate chain (PEM).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_cert: Option<PathBuf>,
    /// Client private key (PEM).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_pk: Option<PathBuf>,
}

impl Default for SslContext {
    fn default() -> Self {
        Self {
            verify_peer: true,
            verify_peer_name: true,
            allow_self_signed: false,
            sni_enabled: true,
            security_level: 1,
            cafile: None,
            capath: None,
            local_cert: None,
            local_pk: None,
        }
    }
}

impl SslContext {
    /// Reads the `ssl` settings map. Missing or null means defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] for a non-object value or a key with
    /// the wrong type.
    pub fn from_mapping(value: Option<&Value>) -> Result<Self> {
        let map = match value {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(Error::invalid_field("ssl", "expected an object")),
        };
        let defaults = Self::default();
        Ok(Self {
            verify_peer: bool_key(map, "verify_peer", defaults.verify_peer)?,
            verify_peer_name: bool_key(map, "verify_peer_name", defaults.verify_peer_name)?,
            allow_self_signed: bool_key(map, "allow_self_signed", defaults.allow_self_signed)?,
            sni_enabled: bool_key(map, "SNI_enabled", defaults.sni_enabled)?,
            security_level: level_key(map, defaults.security_level)?,
            cafile: path_key(map, "cafile")?,
            capath: path_key(map, "capath")?,
            local_cert: path_key(map, "local_cert")?,
            local_pk: path_key(map, "local_pk")?,
        })
    }

    /// Returns true if certificates are checked the way rustls does by
    /// default.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.verify_peer && self.verify_peer_name && !self.allow_self_signed
    }

    /// Builds a rustls client configuration.
    ///
    /// # Errors
    ///
    /// Fails if a configured certificate or key file cannot be loaded, or
    /// if rustls rejects the resulting configuration.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let provider = crypto_provider();
        let roots = Arc::new(self.root_store()?);
        let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()?;

        let builder = if self.is_strict() {
            builder.with_root_certificates(roots)
        } else {
            warn!(
                verify_peer = self.verify_peer,
                verify_peer_name = self.verify_peer_name,
                allow_self_signed = self.allow_self_signed,
                "Relaxed certificate verification"
            );
            let webpki = WebPkiServerVerifier::builder_with_provider(roots, Arc::clone(&provider))
                .build()?;
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(PolicyVerifier {
                    webpki,
                    provider,
                    verify_peer: self.verify_peer,
                    verify_peer_name: self.verify_peer_name,
                    allow_self_signed: self.allow_self_signed,
                }))
        };

        let mut config = match (&self.local_cert, &self.local_pk) {
            (Some(cert), Some(key)) => {
                let chain = load_certs(cert)?;
                let key = PrivateKeyDer::from_pem_file(key)?;
                builder.with_client_auth_cert(chain, key)?
            }
            (None, None) => builder.with_no_client_auth(),
            _ => {
                return Err(Error::invalid_field(
                    "ssl",
                    "local_cert and local_pk must be set together",
                ));
            }
        };
        config.enable_sni = self.sni_enabled;
        Ok(config)
    }

    fn root_store(&self) -> Result<RootCertStore> {
        let mut store = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        if let Some(cafile) = &self.cafile {
            for cert in load_certs(cafile)? {
                store.add(cert)?;
            }
        }
        if let Some(capath) = &self.capath {
            for entry in std::fs::read_dir(capath)? {
                let path = entry?.path();
                if !path.extension().is_some_and(|ext| ext == "pem" || ext == "crt") {
                    continue;
                }
                let certs = load_certs(&path)?;
                let (added, ignored) = store.add_parsable_certificates(certs);
                debug!(path = %path.display(), added, ignored, "Loaded CA certificates");
            }
        }
        Ok(store)
    }
}

fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let certs = CertificateDer::pem_file_iter(path)?.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(certs)
}

fn bool_key(map: &Map<String, Value>, key: &'static str, default: bool) -> Result<bool> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|n| n.abs() > f64::EPSILON)),
        Some(_) => Err(Error::invalid_field(key, "expected a boolean")),
    }
}

fn level_key(map: &Map<String, Value>, default: u8) -> Result<u8> {
    match map.get("security_level") {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .filter(|n| *n <= 5)
            .ok_or_else(|| Error::invalid_field("security_level", "expected 0 to 5")),
        Some(_) => Err(Error::invalid_field("security_level", "expected a number")),
    }
}

fn path_key(map: &Map<String, Value>, key: &'static str) -> Result<Option<PathBuf>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(PathBuf::from(s))),
        Some(_) => Err(Error::invalid_field(key, "expected a path")),
    }
}

/// Wraps the WebPKI verifier and forgives the failures the options allow.
#[derive(Debug)]
struct PolicyVerifier {
    webpki: Arc<WebPkiServerVerifier>,
    provider: Arc<CryptoProvider>,
    verify_peer: bool,
    verify_peer_name: bool,
    allow_self_signed: bool,
}

impl ServerCertVerifier for PolicyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        if !self.verify_peer {
            return Ok(ServerCertVerified::assertion());
        }
        match self.webpki.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        ) {
            Err(rustls::Error::InvalidCertificate(CertificateError::UnknownIssuer))
                if self.allow_self_signed =>
            {
                debug!(?server_name, "Accepting certificate from unknown issuer");
                Ok(ServerCertVerified::assertion())
            }
            Err(rustls::Error::InvalidCertificate(
                CertificateError::NotValidForName | CertificateError::NotValidForNameContext { .. },
            )) if !self.verify_peer_name => {
                debug!(?server_name, "Accepting certificate for another name");
                Ok(ServerCertVerified::assertion())
            }
            other => other,
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
