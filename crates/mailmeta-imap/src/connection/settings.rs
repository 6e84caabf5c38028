//! Connection profile for one IMAP account.

use std::net::IpAddr;
use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::sasl::{AuthMethod, DEFAULT_SASL_MECHANISMS, SaslMechanism, choose_auth_method, choose_mechanism};
use super::security::{ConnectionSecurity, SecurityType};
use super::ssl::SslContext;
use crate::sensitive::SensitiveValue;
use crate::types::Capability;
use crate::{Error, Result};

/// Connect timeout used when settings give none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How to reach and authenticate against an IMAP server.
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    /// Server host name, possibly internationalized.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Bound on TCP connect and TLS handshake.
    pub timeout: Duration,
    /// Requested transport security.
    pub security: SecurityType,
    /// TLS options.
    pub ssl: SslContext,
    /// Authenticate after connecting.
    pub use_auth: bool,
    /// Log in with the local part of the address only.
    pub short_login: bool,
    /// SASL mechanisms in preference order.
    pub sasl_mechanisms: Vec<SaslMechanism>,
    /// Login name.
    pub login: String,
    password: Option<SensitiveValue>,
}

impl ConnectSettings {
    /// Creates settings for `host` with defaults everywhere else.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        ConnectSettingsBuilder::new(host).build()
    }

    /// Creates a settings builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConnectSettingsBuilder {
        ConnectSettingsBuilder::new(host)
    }

    /// Reads settings from a stored JSON mapping.
    ///
    /// `type` wins over the legacy `secure` key. `sasl` replaces the default
    /// order only when it is a non-empty array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] when `host` or `port` is absent and
    /// [`Error::InvalidField`] when a key holds an unusable value.
    pub fn from_mapping(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::invalid_field("settings", "expected an object"))?;

        let host = match present(map, "host") {
            None => return Err(Error::MissingField("host")),
            Some(Value::String(host)) if !host.trim().is_empty() => host.trim().to_string(),
            Some(_) => return Err(Error::invalid_field("host", "expected a non-empty string")),
        };
        let port = match present(map, "port") {
            None => return Err(Error::MissingField("port")),
            Some(value) => parse_port(value)?,
        };

        let security = if let Some(value) = present(map, "type") {
            SecurityType::from_value(value)
                .ok_or_else(|| Error::invalid_field("type", format!("unknown security type {value}")))?
        } else if let Some(value) = present(map, "secure") {
            debug!(host = %host, "Reading legacy `secure` key");
            SecurityType::from_value(value)
                .ok_or_else(|| Error::invalid_field("secure", format!("unknown security type {value}")))?
        } else {
            SecurityType::default()
        };

        let timeout = match present(map, "timeout") {
            None => DEFAULT_TIMEOUT,
            Some(value) => Duration::from_secs(
                as_u64(value)
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| Error::invalid_field("timeout", "expected positive seconds"))?,
            ),
        };

        let sasl_mechanisms = match present(map, "sasl") {
            Some(Value::Array(names)) if !names.is_empty() => names
                .iter()
                .map(|name| {
                    name.as_str()
                        .map(SaslMechanism::parse)
                        .ok_or_else(|| Error::invalid_field("sasl", "expected mechanism names"))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(Value::Array(_)) | None => DEFAULT_SASL_MECHANISMS.to_vec(),
            Some(other) => {
                warn!(host = %host, sasl = %other, "Ignoring non-list `sasl` setting");
                DEFAULT_SASL_MECHANISMS.to_vec()
            }
        };

        let mut settings = Self::builder(host)
            .port(port)
            .security(security)
            .timeout(timeout)
            .ssl(SslContext::from_mapping(map.get("ssl"))?)
            .short_login(present(map, "shortLogin").is_some_and(truthy))
            .sasl_mechanisms(sasl_mechanisms)
            .build();

        if let Some(use_auth) = present(map, "useAuth") {
            settings.use_auth = truthy(use_auth);
        }
        match present(map, "login") {
            None => {}
            Some(Value::String(login)) => settings.login.clone_from(login),
            Some(_) => return Err(Error::invalid_field("login", "expected a string")),
        }
        match present(map, "password") {
            None => {}
            Some(Value::String(password)) => settings.set_password(password),
            Some(_) => return Err(Error::invalid_field("password", "expected a string")),
        }
        Ok(settings)
    }

    /// Stores the password sealed.
    pub fn set_password(&mut self, password: impl AsRef<str>) {
        self.password = Some(SensitiveValue::new(password));
    }

    /// The sealed password, if one was set.
    #[must_use]
    pub const fn password(&self) -> Option<&SensitiveValue> {
        self.password.as_ref()
    }

    /// Host name in ASCII (punycode) form, suitable for DNS and SNI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] if the host is not a valid domain
    /// name or IP address.
    pub fn ascii_host(&self) -> Result<String> {
        let host = self.host.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip.to_string());
        }
        match url::Host::parse(host) {
            Ok(url::Host::Domain(domain)) => Ok(domain),
            Ok(url::Host::Ipv4(ip)) => Ok(ip.to_string()),
            Ok(url::Host::Ipv6(ip)) => Ok(ip.to_string()),
            Err(e) => Err(Error::invalid_field("host", e.to_string())),
        }
    }

    /// Security to use before the greeting.
    #[must_use]
    pub fn initial_security(&self) -> ConnectionSecurity {
        ConnectionSecurity::initial(self.security, self.port)
    }

    /// First preferred SASL mechanism the server also offers.
    #[must_use]
    pub fn choose_sasl_mechanism<I, S>(&self, server_mechanisms: I) -> Option<&SaslMechanism>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        choose_mechanism(&self.sasl_mechanisms, server_mechanisms)
    }

    /// Authentication method for a server with `capabilities`.
    ///
    /// `None` if authentication is disabled in the settings or impossible
    /// on the server.
    #[must_use]
    pub fn auth_method(&self, capabilities: &[Capability]) -> Option<AuthMethod> {
        if self.use_auth {
            choose_auth_method(&self.sasl_mechanisms, capabilities)
        } else {
            None
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectSettingsRecord<'a> {
    host: &'a str,
    port: u16,
    #[serde(rename = "type")]
    security: SecurityType,
    timeout: u64,
    short_login: bool,
    sasl: &'a [SaslMechanism],
    ssl: &'a SslContext,
}

impl Serialize for ConnectSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ConnectSettingsRecord {
            host: &self.host,
            port: self.port,
            security: self.security,
            timeout: self.timeout.as_secs(),
            short_login: self.short_login,
            sasl: &self.sasl_mechanisms,
            ssl: &self.ssl,
        }
        .serialize(serializer)
    }
}

/// Builder for [`ConnectSettings`].
#[derive(Debug, Clone)]
pub struct ConnectSettingsBuilder {
    host: String,
    port: Option<u16>,
    timeout: Duration,
    security: SecurityType,
    ssl: SslContext,
    use_auth: bool,
    short_login: bool,
    sasl_mechanisms: Vec<SaslMechanism>,
    login: String,
    password: Option<SensitiveValue>,
}

impl ConnectSettingsBuilder {
    /// Creates a builder for `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            timeout: DEFAULT_TIMEOUT,
            security: SecurityType::default(),
            ssl: SslContext::default(),
            use_auth: true,
            short_login: false,
            sasl_mechanisms: DEFAULT_SASL_MECHANISMS.to_vec(),
            login: String::new(),
            password: None,
        }
    }

    /// Sets the port. Defaults to the security type's port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the requested security.
    #[must_use]
    pub const fn security(mut self, security: SecurityType) -> Self {
        self.security = security;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the TLS options.
    #[must_use]
    pub fn ssl(mut self, ssl: SslContext) -> Self {
        self.ssl = ssl;
        self
    }

    /// Enables or disables authentication.
    #[must_use]
    pub const fn use_auth(mut self, use_auth: bool) -> Self {
        self.use_auth = use_auth;
        self
    }

    /// Enables short (local part) logins.
    #[must_use]
    pub const fn short_login(mut self, short_login: bool) -> Self {
        self.short_login = short_login;
        self
    }

    /// Replaces the SASL preference order.
    #[must_use]
    pub fn sasl_mechanisms(mut self, mechanisms: Vec<SaslMechanism>) -> Self {
        self.sasl_mechanisms = mechanisms;
        self
    }

    /// Sets login name and password.
    #[must_use]
    pub fn credentials(mut self, login: impl Into<String>, password: impl AsRef<str>) -> Self {
        self.login = login.into();
        self.password = Some(SensitiveValue::new(password));
        self
    }

    /// Builds the settings.
    #[must_use]
    pub fn build(self) -> ConnectSettings {
        ConnectSettings {
            host: self.host,
            port: self.port.unwrap_or_else(|| self.security.default_port()),
            timeout: self.timeout,
            security: self.security,
            ssl: self.ssl,
            use_auth: self.use_auth,
            short_login: self.short_login,
            sasl_mechanisms: self.sasl_mechanisms,
            login: self.login,
            password: self.password,
        }
    }
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_port(value: &Value) -> Result<u16> {
    as_u64(value)
        .and_then(|port| u16::try_from(port).ok())
        .filter(|port| *port != 0)
        .ok_or_else(|| Error::invalid_field("port", format!("expected 1 to 65535, got {value}")))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > f64::EPSILON),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
