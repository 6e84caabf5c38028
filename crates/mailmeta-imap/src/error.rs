//! Error types for the mailbox model.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while building or using the mailbox model.
#[derive(Debug, Error)]
pub enum Error {
    /// A constructor argument was rejected (e.g. an empty folder name).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required settings key was not present.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A settings key was present but had an unusable value.
    #[error("Invalid value for {field}: {message}")]
    InvalidField {
        /// Name of the offending key.
        field: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A sealed secret could not be opened.
    #[error("Sensitive value could not be revealed: {0}")]
    Sensitive(String),

    /// STARTTLS was required but the server does not advertise it.
    #[error("STARTTLS required but not advertised by {0}")]
    StartTlsUnavailable(String),

    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or configuration error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// A certificate or key file could not be read.
    #[error("PEM error: {0}")]
    Pem(#[from] rustls::pki_types::pem::Error),

    /// Certificate verifier could not be built.
    #[error("Certificate verifier error: {0}")]
    Verifier(#[from] rustls::client::VerifierBuilderError),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid state for the requested operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    pub(crate) fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
