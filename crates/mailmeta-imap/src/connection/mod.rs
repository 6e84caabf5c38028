//! Connection settings and transport.
//!
//! This module covers everything needed before the first IMAP command:
//! - Account connection profile (host, port, security, SASL order)
//! - TLS options and the rustls configuration built from them
//! - Implicit TLS / STARTTLS resolution
//! - TLS/plaintext stream abstraction

mod sasl;
mod security;
mod settings;
mod ssl;
mod stream;

pub use sasl::{AuthMethod, DEFAULT_SASL_MECHANISMS, SaslMechanism, choose_auth_method, choose_mechanism};
pub use security::{ConnectionSecurity, SecurityType};
pub use settings::{ConnectSettings, ConnectSettingsBuilder, DEFAULT_TIMEOUT};
pub use ssl::SslContext;
pub use stream::{ImapStream, connect, tls_connector};
