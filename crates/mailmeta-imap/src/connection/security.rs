//! Transport security requested in settings, and what it resolves to.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::types::Capability;
use crate::{Error, Result};

/// Requested transport security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecurityType {
    /// Plaintext only.
    None,
    /// TLS from the first byte.
    Tls,
    /// Plaintext, then upgrade with STARTTLS.
    StartTls,
    /// Implicit TLS on well-known TLS ports, otherwise STARTTLS if offered.
    #[default]
    AutoDetect,
}

impl SecurityType {
    /// Numeric code used in stored settings.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Tls => 1,
            Self::StartTls => 2,
            Self::AutoDetect => 9,
        }
    }

    /// Inverse of [`Self::code`].
    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Tls),
            2 => Some(Self::StartTls),
            9 => Some(Self::AutoDetect),
            _ => None,
        }
    }

    /// Parses a name such as `"ssl"`, `"starttls"` or `"auto"`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "plain" | "" => Some(Self::None),
            "tls" | "ssl" | "implicit" => Some(Self::Tls),
            "starttls" => Some(Self::StartTls),
            "auto" | "autodetect" | "auto_detect" => Some(Self::AutoDetect),
            other => other.parse().ok().and_then(Self::from_code),
        }
    }

    /// Reads a settings value: a code, a name, or the legacy boolean.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Self::Tls),
            Value::Bool(false) => Some(Self::None),
            Value::Number(n) => n.as_u64().and_then(Self::from_code),
            Value::String(s) => Self::from_name(s),
            _ => None,
        }
    }

    /// Port used when settings give none.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Tls | Self::AutoDetect => 993,
            Self::None | Self::StartTls => 143,
        }
    }
}

impl std::fmt::Display for SecurityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Tls => "tls",
            Self::StartTls => "starttls",
            Self::AutoDetect => "auto",
        })
    }
}

impl Serialize for SecurityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Security actually in effect on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionSecurity {
    /// No encryption.
    Plain,
    /// TLS negotiated before the greeting.
    ImplicitTls,
    /// TLS negotiated with STARTTLS after the greeting.
    StartTls,
}

impl ConnectionSecurity {
    /// Ports that speak TLS from the first byte.
    pub const IMPLICIT_TLS_PORTS: [u16; 3] = [993, 995, 465];

    /// Decides whether to start TLS before reading the greeting.
    #[must_use]
    pub fn initial(security: SecurityType, port: u16) -> Self {
        match security {
            SecurityType::Tls => Self::ImplicitTls,
            SecurityType::AutoDetect if Self::IMPLICIT_TLS_PORTS.contains(&port) => {
                Self::ImplicitTls
            }
            _ => Self::Plain,
        }
    }

    /// Decides, from the capabilities in or after the greeting, whether to
    /// upgrade a plaintext connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StartTlsUnavailable`] if STARTTLS was requested and
    /// the server does not advertise it.
    pub fn after_greeting(
        self,
        security: SecurityType,
        host: &str,
        capabilities: &[Capability],
    ) -> Result<Self> {
        if self != Self::Plain {
            return Ok(self);
        }
        let advertised = capabilities.contains(&Capability::StartTls);
        match security {
            SecurityType::StartTls if advertised => Ok(Self::StartTls),
            SecurityType::StartTls => Err(Error::StartTlsUnavailable(host.to_string())),
            SecurityType::AutoDetect if advertised => Ok(Self::StartTls),
            _ => Ok(Self::Plain),
        }
    }

    /// Returns true unless the connection is plaintext.
    #[must_use]
    pub const fn is_encrypted(self) -> bool {
        !matches!(self, Self::Plain)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    mod security_type_tests {
        use super::*;

        #[test]
        fn codes() {
            for security in [
                SecurityType::None,
                SecurityType::Tls,
                SecurityType::StartTls,
                SecurityType::AutoDetect,
            ] {
                assert_eq!(
                    SecurityType::from_code(u64::from(security.code())),
                    Some(security)
                );
            }
            assert_eq!(SecurityType::from_code(3), None);
        }

        #[test]
        fn from_value_forms() {
            assert_eq!(SecurityType::from_value(&json!(1)), Some(SecurityType::Tls));
            assert_eq!(SecurityType::from_value(&json!("STARTTLS")), Some(SecurityType::StartTls));
            assert_eq!(SecurityType::from_value(&json!("9")), Some(SecurityType::AutoDetect));
            assert_eq!(SecurityType::from_value(&json!(true)), Some(SecurityType::Tls));
            assert_eq!(SecurityType::from_value(&json!(false)), Some(SecurityType::None));
            assert_eq!(SecurityType::from_value(&json!("bogus")), None);
            assert_eq!(SecurityType::from_value(&json!([1])), None);
        }

        #[test]
        fn serializes_as_code() {
            assert_eq!(serde_json::to_string(&SecurityType::AutoDetect).unwrap(), "9");
            assert_eq!(serde_json::to_string(&SecurityType::StartTls).unwrap(), "2");
        }

        #[test]
        fn default_ports() {
            assert_eq!(SecurityType::Tls.default_port(), 993);
            assert_eq!(SecurityType::StartTls.default_port(), 143);
            assert_eq!(SecurityType::default(), SecurityType::AutoDetect);
        }
    }

    mod resolution_tests {
        use super::*;

        fn caps(line: &str) -> Vec<Capability> {
            Capability::parse_list(line)
        }

        #[test]
        fn implicit_tls() {
            assert_eq!(
                ConnectionSecurity::initial(SecurityType::Tls, 143),
                ConnectionSecurity::ImplicitTls
            );
            assert_eq!(
                ConnectionSecurity::initial(SecurityType::AutoDetect, 993),
                ConnectionSecurity::ImplicitTls
            );
            assert_eq!(
                ConnectionSecurity::initial(SecurityType::AutoDetect, 143),
                ConnectionSecurity::Plain
            );
            assert_eq!(
                ConnectionSecurity::initial(SecurityType::None, 993),
                ConnectionSecurity::Plain
            );
        }

        #[test]
        fn auto_detect_upgrades_when_offered() {
            let initial = ConnectionSecurity::initial(SecurityType::AutoDetect, 143);
            let resolved = initial
                .after_greeting(SecurityType::AutoDetect, "mail", &caps("IMAP4rev1 STARTTLS"))
                .unwrap();
            assert_eq!(resolved, ConnectionSecurity::StartTls);
            assert!(resolved.is_encrypted());
        }

        #[test]
        fn auto_detect_stays_plain_without_starttls() {
            let resolved = ConnectionSecurity::Plain
                .after_greeting(SecurityType::AutoDetect, "mail", &caps("IMAP4rev1"))
                .unwrap();
            assert_eq!(resolved, ConnectionSecurity::Plain);
            assert!(!resolved.is_encrypted());
        }

        #[test]
        fn starttls_required_but_missing() {
            let err = ConnectionSecurity::Plain
                .after_greeting(SecurityType::StartTls, "mail.example.com", &caps("IMAP4rev1"))
                .unwrap_err();
            assert!(matches!(err, Error::StartTlsUnavailable(host) if host == "mail.example.com"));
        }

        #[test]
        fn none_ignores_starttls() {
            let resolved = ConnectionSecurity::Plain
                .after_greeting(SecurityType::None, "mail", &caps("IMAP4rev1 STARTTLS"))
                .unwrap();
            assert_eq!(resolved, ConnectionSecurity::Plain);
        }

        #[test]
        fn implicit_tls_unchanged() {
            let resolved = ConnectionSecurity::ImplicitTls
                .after_greeting(SecurityType::Tls, "mail", &[])
                .unwrap();
            assert_eq!(resolved, ConnectionSecurity::ImplicitTls);
        }
    }
}
