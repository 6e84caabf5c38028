//! Mailbox model types.
//!
//! This module defines what the server says about its mailboxes: listing
//! entries with their special-use classification, selected-state snapshots,
//! and the status facts both of them carry.

#![allow(clippy::missing_const_for_fn)]

mod capability;
mod flags;
mod folder;
mod folder_info;
mod folder_list;
pub mod metadata;
mod status;

pub use capability::{Capability, auth_mechanisms};
pub use flags::{Flag, Flags, MailboxFlag};
pub use folder::{Folder, FolderRecord, FolderRole, FolderType};
pub use folder_info::FolderInformation;
pub use folder_list::FolderList;
pub use status::StatusFacts;
