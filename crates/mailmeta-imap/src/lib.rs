//! # mailmeta-imap
//!
//! Typed model of what an IMAP server says about its mailboxes, and of how
//! to reach that server, for webmail backends that hand both to a JSON API.
//!
//! ## Features
//!
//! - **Folder listing entries**: LIST attributes, subscription, RFC 5464
//!   metadata, special-use role (RFC 6154) and a legacy folder type
//!   including the Kolab `folder-type` annotation
//! - **Selected-state snapshots**: FLAGS / PERMANENTFLAGS with keyword
//!   creation checks
//! - **Status facts** shared by both: UIDNEXT, UIDVALIDITY, MESSAGES,
//!   UNSEEN, HIGHESTMODSEQ, SIZE, APPENDLIMIT, MAILBOXID
//! - **Connection settings**: implicit TLS / STARTTLS / auto-detect, SASL
//!   preference order, TLS verification options via rustls
//! - **Write-only secrets**: passwords are sealed in memory and never
//!   printed or serialized
//!
//! ## Quick Start
//!
//! ```
//! use mailmeta_imap::{Folder, FolderRole, FolderType};
//!
//! # fn main() -> mailmeta_imap::Result<()> {
//! let mut sent = Folder::new("INBOX.Sent", Some("."), ["\\HasNoChildren", "\\Sent"])?;
//! sent.status.set("MESSAGES", "42");
//!
//! assert_eq!(sent.name(), "Sent");
//! assert_eq!(sent.role(), Some(FolderRole::Sent));
//! assert_eq!(sent.folder_type(), FolderType::Sent);
//!
//! let record = serde_json::to_value(&sent).unwrap();
//! assert_eq!(record["totalEmails"], 42);
//! # Ok(())
//! # }
//! ```
//!
//! ## Connecting
//!
//! ```ignore
//! use mailmeta_imap::connection::{connect, ConnectSettings};
//!
//! let settings = ConnectSettings::from_mapping(&serde_json::json!({
//!     "host": "imap.example.com",
//!     "port": 143,
//!     "type": "starttls",
//! }))?;
//! let (stream, security) = connect(&settings).await?;
//! // read the greeting and CAPABILITY, then:
//! let security = security.after_greeting(settings.security, &settings.host, &capabilities)?;
//! ```
//!
//! ## Modules
//!
//! - [`types`]: Folders, selected-state snapshots, flags and status facts
//! - [`connection`]: Connection settings, TLS options and streams
//! - [`sensitive`]: Sealed secrets

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod connection;
mod error;
pub mod sensitive;
pub mod types;

pub use connection::{
    AuthMethod, ConnectSettings, ConnectSettingsBuilder, ConnectionSecurity, ImapStream,
    SaslMechanism, SecurityType, SslContext,
};
pub use error::{Error, Result};
pub use sensitive::SensitiveValue;
pub use types::{
    Capability, Flag, Flags, Folder, FolderInformation, FolderList, FolderRecord, FolderRole,
    FolderType, MailboxFlag, StatusFacts,
};
