#![allow(clippy::doc_markdown)]
//! Example: build a folder listing and print the JSON records
//!
//! Feeds a canned LIST / LSUB / STATUS / GETMETADATA exchange into a
//! `FolderList`, then prints each folder record, a selected-state snapshot
//! and the connection settings record (without the password).
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=mailmeta_imap=debug cargo run --package mailmeta-imap --example inspect_folders
//! ```

use mailmeta_imap::types::metadata::{KOLAB_FOLDER_TYPE, SPECIAL_USE};
use mailmeta_imap::{ConnectSettings, Flags, Folder, FolderInformation, FolderList, StatusFacts};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LISTING: &[(&str, &[&str])] = &[
    ("INBOX", &["\\HasChildren"]),
    ("INBOX/Sent Items", &["\\HasNoChildren", "\\Sent"]),
    ("INBOX/Drafts", &["\\HasNoChildren"]),
    ("INBOX/Spam", &["\\HasNoChildren", "\\Junk"]),
    ("Archive", &["\\NoSelect", "\\HasChildren"]),
    ("Archive/2023", &["\\HasNoChildren"]),
    ("Calendar", &["\\HasNoChildren"]),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut list = FolderList::new();
    for (name, flags) in LISTING {
        list.insert(Folder::new(*name, Some("/"), flags.iter().copied())?);
    }
    for name in ["INBOX", "INBOX/Sent Items", "INBOX/Spam", "Archive/2023"] {
        list.mark_subscribed(name);
    }

    let mut facts = StatusFacts::new();
    for (item, value) in [
        ("MESSAGES", "231"),
        ("UNSEEN", "5"),
        ("UIDNEXT", "44292"),
        ("MAILBOXID", "(F2212ea87-6097-4256-9d51-71338625)"),
    ] {
        facts.set(item, value);
    }
    list.apply_status("INBOX", &facts);
    list.apply_metadata("INBOX/Drafts", SPECIAL_USE, "\\Drafts");
    list.apply_metadata("Calendar", KOLAB_FOLDER_TYPE, "event.default");

    for folder in list.iter() {
        tracing::info!(
            folder = folder.full_name(),
            role = ?folder.role(),
            kind = ?folder.folder_type(),
            "Classified"
        );
        println!("{}", serde_json::to_string(folder)?);
    }

    let mut selected = FolderInformation::selected("INBOX")
        .with_flags(Flags::parse_all(["\\Answered", "\\Flagged", "\\Deleted", "\\Seen", "\\Draft"]))
        .with_permanent_flags(Flags::parse_all(["\\Answered", "\\Flagged", "\\Deleted", "\\Seen", "\\Draft", "\\*"]));
    selected.status.merge(&facts);
    selected.status.set("UIDVALIDITY", "3857529045");
    println!("{}", serde_json::to_string_pretty(&selected)?);
    println!("can create keywords: {}", selected.can_create_keywords());

    let settings = ConnectSettings::from_mapping(&serde_json::json!({
        "host": "imap.example.com",
        "port": 993,
        "type": 1,
        "shortLogin": false,
        "login": "user@example.com",
        "password": "app-password",
    }))?;
    println!("{}", serde_json::to_string_pretty(&settings)?);

    Ok(())
}
