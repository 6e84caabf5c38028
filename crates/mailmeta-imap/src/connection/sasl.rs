//! SASL mechanism names and preference-order selection.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{Capability, auth_mechanisms};

/// Default preference order, most preferred first.
pub const DEFAULT_SASL_MECHANISMS: [SaslMechanism; 6] = [
    SaslMechanism::ScramSha3_512,
    SaslMechanism::ScramSha512,
    SaslMechanism::ScramSha256,
    SaslMechanism::ScramSha1,
    SaslMechanism::Plain,
    SaslMechanism::Login,
];

/// SASL mechanism name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SaslMechanism {
    /// SCRAM-SHA3-512.
    ScramSha3_512,
    /// SCRAM-SHA-512.
    ScramSha512,
    /// SCRAM-SHA-256 (RFC 7677).
    ScramSha256,
    /// SCRAM-SHA-1 (RFC 5802).
    ScramSha1,
    /// CRAM-MD5 (RFC 2195).
    CramMd5,
    /// PLAIN (RFC 4616): password sent in the clear.
    Plain,
    /// Legacy LOGIN: password sent in the clear.
    Login,
    /// XOAUTH2 (Google / Microsoft).
    XOAuth2,
    /// OAUTHBEARER (RFC 7628).
    OAuthBearer,
    /// Any other mechanism, uppercased.
    Other(String),
}

impl SaslMechanism {
    /// Parses a mechanism name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        match upper.as_str() {
            "SCRAM-SHA3-512" => Self::ScramSha3_512,
            "SCRAM-SHA-512" => Self::ScramSha512,
            "SCRAM-SHA-256" => Self::ScramSha256,
            "SCRAM-SHA-1" => Self::ScramSha1,
            "CRAM-MD5" => Self::CramMd5,
            "PLAIN" => Self::Plain,
            "LOGIN" => Self::Login,
            "XOAUTH2" => Self::XOAuth2,
            "OAUTHBEARER" => Self::OAuthBearer,
            _ => Self::Other(upper),
        }
    }

    /// Returns the mechanism name as sent in AUTHENTICATE.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ScramSha3_512 => "SCRAM-SHA3-512",
            Self::ScramSha512 => "SCRAM-SHA-512",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::ScramSha1 => "SCRAM-SHA-1",
            Self::CramMd5 => "CRAM-MD5",
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::XOAuth2 => "XOAUTH2",
            Self::OAuthBearer => "OAUTHBEARER",
            Self::Other(name) => name,
        }
    }

    /// Returns true for the SCRAM family.
    #[must_use]
    pub const fn is_scram(&self) -> bool {
        matches!(
            self,
            Self::ScramSha3_512 | Self::ScramSha512 | Self::ScramSha256 | Self::ScramSha1
        )
    }

    /// Returns true if the password travels in the clear and TLS is needed.
    #[must_use]
    pub const fn requires_tls(&self) -> bool {
        matches!(self, Self::Plain | Self::Login | Self::XOAuth2 | Self::OAuthBearer)
    }
}

impl std::fmt::Display for SaslMechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SaslMechanism {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SaslMechanism {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// How to authenticate once the connection is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// AUTHENTICATE with this mechanism.
    Sasl(SaslMechanism),
    /// Plain IMAP LOGIN command.
    Login,
}

/// Picks the first mechanism from `preference` the server advertises.
#[must_use]
pub fn choose_mechanism<'a, I, S>(preference: &'a [SaslMechanism], advertised: I) -> Option<&'a SaslMechanism>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let advertised: Vec<SaslMechanism> = advertised
        .into_iter()
        .map(|name| SaslMechanism::parse(name.as_ref()))
        .collect();
    preference.iter().find(|mech| advertised.contains(mech))
}

/// Picks an authentication method from the server capabilities.
///
/// Falls back to the LOGIN command when no preferred mechanism is
/// advertised, unless the server sent LOGINDISABLED.
#[must_use]
pub fn choose_auth_method(preference: &[SaslMechanism], capabilities: &[Capability]) -> Option<AuthMethod> {
    if let Some(mech) = choose_mechanism(preference, auth_mechanisms(capabilities)) {
        return Some(AuthMethod::Sasl(mech.clone()));
    }
    if capabilities.contains(&Capability::LoginDisabled) {
        None
    } else {
        Some(AuthMethod::Login)
    }
}
