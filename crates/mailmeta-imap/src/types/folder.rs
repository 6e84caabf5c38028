//! Mailbox listing entries and their classification.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use tracing::trace;

use super::metadata::{KOLAB_FOLDER_TYPE, KOLAB_FOLDER_TYPE_SHARED, SPECIAL_USE};
use super::{MailboxFlag, StatusFacts};
use crate::{Error, Result};

/// Mailbox role as exposed to JMAP-style clients (RFC 8621).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderRole {
    /// Primary incoming mailbox.
    Inbox,
    /// Virtual mailbox holding every message.
    All,
    /// Archive.
    Archive,
    /// Drafts.
    Drafts,
    /// Virtual mailbox of flagged messages.
    Flagged,
    /// Important messages.
    Important,
    /// Junk / spam.
    Junk,
    /// Sent messages.
    Sent,
    /// Trash.
    Trash,
}

impl FolderRole {
    /// Roles in tie-break order: the first one a folder carries wins.
    pub const PRIORITY: [Self; 9] = [
        Self::Inbox,
        Self::All,
        Self::Archive,
        Self::Drafts,
        Self::Flagged,
        Self::Important,
        Self::Junk,
        Self::Sent,
        Self::Trash,
    ];

    /// The mailbox flag announcing this role.
    #[must_use]
    pub const fn flag(self) -> MailboxFlag {
        match self {
            Self::Inbox => MailboxFlag::Inbox,
            Self::All => MailboxFlag::All,
            Self::Archive => MailboxFlag::Archive,
            Self::Drafts => MailboxFlag::Drafts,
            Self::Flagged => MailboxFlag::Flagged,
            Self::Important => MailboxFlag::Important,
            Self::Junk => MailboxFlag::Junk,
            Self::Sent => MailboxFlag::Sent,
            Self::Trash => MailboxFlag::Trash,
        }
    }

    /// Returns the role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::All => "all",
            Self::Archive => "archive",
            Self::Drafts => "drafts",
            Self::Flagged => "flagged",
            Self::Important => "important",
            Self::Junk => "junk",
            Self::Sent => "sent",
            Self::Trash => "trash",
        }
    }
}

impl std::fmt::Display for FolderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folder type used by the webmail UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FolderType {
    /// Ordinary user folder.
    #[default]
    User,
    /// Inbox.
    Inbox,
    /// Sent messages.
    Sent,
    /// Drafts.
    Drafts,
    /// Junk / spam.
    Junk,
    /// Trash.
    Trash,
    /// Archive.
    Archive,
    /// Important messages.
    Important,
    /// Flagged / starred messages.
    Flagged,
    /// All messages.
    All,
}

impl FolderType {
    /// Numeric code understood by the UI.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::User => 0,
            Self::Inbox => 1,
            Self::Sent => 2,
            Self::Drafts => 3,
            Self::Junk => 4,
            Self::Trash => 5,
            Self::Archive => 6,
            Self::Important => 10,
            Self::Flagged => 11,
            Self::All => 13,
        }
    }

    /// Maps a Kolab `mail.*` folder-type annotation.
    fn from_kolab(value: &str) -> Option<Self> {
        match value {
            "mail.inbox" => Some(Self::Inbox),
            "mail.sentitems" => Some(Self::Sent),
            "mail.drafts" => Some(Self::Drafts),
            "mail.junkemail" => Some(Self::Junk),
            "mail.wastebasket" => Some(Self::Trash),
            _ => None,
        }
    }
}

/// One mailbox as listed by the server.
///
/// Two folders with the same full name are the same mailbox: equality and
/// hashing only look at [`Folder::full_name`].
#[derive(Debug, Clone)]
pub struct Folder {
    full_name: String,
    delimiter: Option<String>,
    flags: Vec<MailboxFlag>,
    metadata: BTreeMap<String, String>,
    /// Status facts from LIST-EXTENDED or a later STATUS.
    pub status: StatusFacts,
}

impl Folder {
    /// Creates a folder from one listing line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `full_name` is empty.
    pub fn new<I, S>(full_name: impl Into<String>, delimiter: Option<&str>, flags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let full_name = full_name.into();
        if full_name.is_empty() {
            return Err(Error::InvalidArgument(
                "folder name must not be empty".to_string(),
            ));
        }
        let mut folder = Self {
            full_name,
            delimiter: None,
            flags: Vec::new(),
            metadata: BTreeMap::new(),
            status: StatusFacts::default(),
        };
        folder.set_delimiter(delimiter);
        folder.set_flags(flags);
        Ok(folder)
    }

    /// Replaces the flags, case-folding and dropping duplicates.
    pub fn set_flags<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.flags.clear();
        for flag in flags {
            self.push_flag(MailboxFlag::parse(flag.as_ref()));
        }
        trace!(folder = %self.full_name, flags = ?self.flags, "Folder flags set");
    }

    fn push_flag(&mut self, flag: MailboxFlag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Marks the folder as subscribed (from an LSUB line).
    pub fn set_subscribed(&mut self) {
        self.push_flag(MailboxFlag::Subscribed);
    }

    /// Sets the hierarchy delimiter. An empty string means none.
    pub fn set_delimiter(&mut self, delimiter: Option<&str>) {
        self.delimiter = delimiter.filter(|d| !d.is_empty()).map(str::to_string);
    }

    /// Stores one metadata entry.
    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(name.into(), value.into());
    }

    /// Replaces all metadata.
    pub fn set_all_metadata(&mut self, metadata: BTreeMap<String, String>) {
        self.metadata = metadata;
    }

    /// Returns one metadata entry.
    #[must_use]
    pub fn metadata(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }

    /// Returns all metadata.
    #[must_use]
    pub const fn all_metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Full hierarchical name, as used for SELECT.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last path segment of the full name.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.delimiter {
            Some(delimiter) => self
                .full_name
                .rsplit(delimiter.as_str())
                .next()
                .unwrap_or(&self.full_name),
            None => &self.full_name,
        }
    }

    /// Full name of the parent folder, if there is one.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        let delimiter = self.delimiter.as_deref()?;
        self.full_name
            .rsplit_once(delimiter)
            .map(|(parent, _)| parent)
            .filter(|parent| !parent.is_empty())
    }

    /// Hierarchy delimiter, `None` for flat namespaces.
    #[must_use]
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    /// Lowercased flags in the order they were first seen.
    #[must_use]
    pub fn flags(&self) -> &[MailboxFlag] {
        &self.flags
    }

    /// Returns true if the folder carries `flag`.
    #[must_use]
    pub fn has_flag(&self, flag: &MailboxFlag) -> bool {
        self.flags.contains(flag)
    }

    fn has_any(&self, flags: &[MailboxFlag]) -> bool {
        flags.iter().any(|flag| self.has_flag(flag))
    }

    /// False for `\NonExistent` placeholders.
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.has_flag(&MailboxFlag::NonExistent)
    }

    /// True if the folder exists and is not `\NoSelect`.
    #[must_use]
    pub fn selectable(&self) -> bool {
        self.exists() && !self.has_flag(&MailboxFlag::NoSelect)
    }

    /// True if the folder is subscribed.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.has_flag(&MailboxFlag::Subscribed)
    }

    /// True if the server reports child folders.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.has_flag(&MailboxFlag::HasChildren)
    }

    /// True for INBOX by name or by `\Inbox` flag.
    #[must_use]
    pub fn is_inbox(&self) -> bool {
        self.full_name.eq_ignore_ascii_case("INBOX") || self.has_flag(&MailboxFlag::Inbox)
    }

    /// Role from special-use flags or the SPECIAL-USE annotation.
    ///
    /// A folder carrying several special-use flags gets the first one in
    /// [`FolderRole::PRIORITY`].
    #[must_use]
    pub fn role(&self) -> Option<FolderRole> {
        let annotated = self.metadata(SPECIAL_USE).map(MailboxFlag::parse);
        FolderRole::PRIORITY
            .into_iter()
            .find(|role| {
                let flag = role.flag();
                self.has_flag(&flag) || annotated.as_ref() == Some(&flag)
            })
            .or_else(|| {
                self.full_name
                    .eq_ignore_ascii_case("INBOX")
                    .then_some(FolderRole::Inbox)
            })
    }

    /// Folder type for the UI. First match wins, falling back to Kolab
    /// annotations and then [`FolderType::User`].
    #[must_use]
    pub fn folder_type(&self) -> FolderType {
        use MailboxFlag as F;

        let kind = if self.is_inbox() {
            FolderType::Inbox
        } else if self.has_any(&[F::Sent, F::SentMail]) {
            FolderType::Sent
        } else if self.has_flag(&F::Drafts) {
            FolderType::Drafts
        } else if self.has_any(&[F::Junk, F::Spam]) {
            FolderType::Junk
        } else if self.has_any(&[F::Trash, F::Bin]) {
            FolderType::Trash
        } else if self.has_flag(&F::Important) {
            FolderType::Important
        } else if self.has_any(&[F::Flagged, F::Starred]) {
            FolderType::Flagged
        } else if self.has_flag(&F::Archive) {
            FolderType::Archive
        } else if self.has_any(&[F::All, F::AllMail]) {
            FolderType::All
        } else {
            FolderType::User
        };
        if kind != FolderType::User {
            return kind;
        }

        self.metadata(KOLAB_FOLDER_TYPE)
            .filter(|value| !value.is_empty())
            .or_else(|| self.metadata(KOLAB_FOLDER_TYPE_SHARED))
            .and_then(FolderType::from_kolab)
            .unwrap_or_default()
    }
}

impl PartialEq for Folder {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

impl Eq for Folder {}

impl std::hash::Hash for Folder {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.full_name.hash(state);
    }
}

/// JSON record of a [`Folder`] handed to the webmail client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    /// Last path segment.
    pub name: String,
    /// Full hierarchical name.
    #[serde(rename = "FullName")]
    pub full_name: String,
    /// Delimiter, empty when the namespace is flat.
    #[serde(rename = "Delimiter")]
    pub delimiter: String,
    /// Subscription state.
    #[serde(rename = "isSubscribed")]
    pub is_subscribed: bool,
    /// See [`Folder::exists`].
    #[serde(rename = "Exists")]
    pub exists: bool,
    /// See [`Folder::selectable`].
    #[serde(rename = "Selectable")]
    pub selectable: bool,
    /// Lowercased flags.
    #[serde(rename = "Flags")]
    pub flags: Vec<MailboxFlag>,
    /// RFC 5464 annotations.
    #[serde(rename = "Metadata")]
    pub metadata: BTreeMap<String, String>,
    /// UIDNEXT.
    #[serde(rename = "UidNext")]
    pub uid_next: Option<u32>,
    /// MESSAGES.
    #[serde(rename = "totalEmails")]
    pub total_emails: Option<u32>,
    /// UNSEEN.
    #[serde(rename = "unreadEmails")]
    pub unread_emails: Option<u32>,
    /// MAILBOXID.
    pub id: Option<String>,
    /// See [`Folder::role`].
    pub role: Option<FolderRole>,
}

impl From<&Folder> for FolderRecord {
    fn from(folder: &Folder) -> Self {
        Self {
            name: folder.name().to_string(),
            full_name: folder.full_name.clone(),
            delimiter: folder.delimiter.clone().unwrap_or_default(),
            is_subscribed: folder.is_subscribed(),
            exists: folder.exists(),
            selectable: folder.selectable(),
            flags: folder.flags.clone(),
            metadata: folder.metadata.clone(),
            uid_next: folder.status.uid_next,
            total_emails: folder.status.messages,
            unread_emails: folder.status.unseen,
            id: folder.status.mailbox_id.clone(),
            role: folder.role(),
        }
    }
}

impl TryFrom<FolderRecord> for Folder {
    type Error = Error;

    fn try_from(record: FolderRecord) -> Result<Self> {
        let mut folder = Self::new(
            record.full_name,
            Some(record.delimiter.as_str()),
            std::iter::empty::<&str>(),
        )?;
        for flag in record.flags {
            folder.push_flag(flag);
        }
        folder.metadata = record.metadata;
        folder.status.uid_next = record.uid_next;
        folder.status.messages = record.total_emails;
        folder.status.unseen = record.unread_emails;
        folder.status.mailbox_id = record.id;
        Ok(folder)
    }
}

impl Serialize for Folder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FolderRecord::from(self).serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn folder(name: &str, flags: &[&str]) -> Folder {
        Folder::new(name, Some("/"), flags.iter().copied()).unwrap()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn empty_name_rejected() {
            let err = Folder::new("", Some("/"), ["\\Sent"]).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }

        #[test]
        fn flags_case_folded_and_deduplicated() {
            let f = folder("Sent", &["\\Sent", "\\SENT", "\\HasNoChildren"]);
            assert_eq!(f.flags(), &[MailboxFlag::Sent, MailboxFlag::HasNoChildren]);
        }

        #[test]
        fn set_subscribed_is_idempotent() {
            let mut f = folder("Work", &[]);
            assert!(!f.is_subscribed());
            f.set_subscribed();
            f.set_subscribed();
            assert!(f.is_subscribed());
            assert_eq!(f.flags().len(), 1);
        }

        #[test]
        fn set_flags_replaces() {
            let mut f = folder("Work", &["\\NoSelect"]);
            f.set_flags(["\\HasChildren"]);
            assert!(f.selectable());
            assert!(f.has_children());
        }

        #[test]
        fn empty_delimiter_is_none() {
            let f = Folder::new("a.b", Some(""), std::iter::empty::<&str>()).unwrap();
            assert!(f.delimiter().is_none());
            assert_eq!(f.name(), "a.b");
        }
    }

    mod naming_tests {
        use super::*;

        #[test]
        fn name_is_last_segment() {
            let f = folder("Archive/2024/Receipts", &[]);
            assert_eq!(f.name(), "Receipts");
            assert_eq!(f.parent_name(), Some("Archive/2024"));
        }

        #[test]
        fn name_without_delimiter() {
            let f = Folder::new("INBOX.Sent", None, std::iter::empty::<&str>()).unwrap();
            assert_eq!(f.name(), "INBOX.Sent");
            assert!(f.parent_name().is_none());
        }

        #[test]
        fn multi_char_delimiter() {
            let f = Folder::new("a::b::c", Some("::"), std::iter::empty::<&str>()).unwrap();
            assert_eq!(f.name(), "c");
            assert_eq!(f.parent_name(), Some("a::b"));
        }

        #[test]
        fn top_level_has_no_parent() {
            assert!(folder("Drafts", &[]).parent_name().is_none());
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn plain_folder_exists_and_selectable() {
            let f = folder("Projects", &[]);
            assert!(f.exists());
            assert!(f.selectable());
        }

        #[test]
        fn noselect_not_selectable() {
            let f = folder("Projects", &["\\Noselect", "\\HasChildren"]);
            assert!(f.exists());
            assert!(!f.selectable());
        }

        #[test]
        fn nonexistent_neither_exists_nor_selectable() {
            let f = folder("Gone", &["\\NonExistent"]);
            assert!(!f.exists());
            assert!(!f.selectable());
        }

        #[test]
        fn inbox_by_name_or_flag() {
            assert!(folder("INBOX", &[]).is_inbox());
            assert!(folder("inbox", &[]).is_inbox());
            assert!(folder("Inbox", &["\\Inbox"]).is_inbox());
            assert!(!folder("Other", &[]).is_inbox());
        }

        #[test]
        fn equality_by_full_name() {
            let a = folder("Work", &["\\Marked"]);
            let b = folder("Work", &["\\NoSelect"]);
            assert_eq!(a, b);
            assert_ne!(a, folder("work", &[]));
        }
    }

    mod role_tests {
        use super::*;

        #[test]
        fn inbox_beats_sent() {
            let f = Folder::new("X", None, ["\\sent", "\\inbox"]).unwrap();
            assert_eq!(f.role(), Some(FolderRole::Inbox));
        }

        #[test]
        fn all_beats_trash() {
            let f = folder("Mixed", &["\\Trash", "\\All"]);
            assert_eq!(f.role(), Some(FolderRole::All));
        }

        #[test]
        fn special_use_annotation() {
            let mut f = folder("Papierkorb", &[]);
            f.set_metadata(SPECIAL_USE, "\\Trash");
            assert_eq!(f.role(), Some(FolderRole::Trash));
        }

        #[test]
        fn inbox_name_fallback() {
            assert_eq!(folder("Inbox", &[]).role(), Some(FolderRole::Inbox));
        }

        #[test]
        fn aliases_have_no_role() {
            assert_eq!(folder("Bin", &["\\Bin"]).role(), None);
            assert_eq!(folder("Spam", &["\\Spam"]).role(), None);
        }

        #[test]
        fn no_role_for_user_folder() {
            assert_eq!(folder("Receipts", &["\\HasNoChildren"]).role(), None);
        }
    }

    mod type_tests {
        use super::*;

        #[test]
        fn junk_and_spam() {
            assert_eq!(folder("J", &["\\junk"]).folder_type(), FolderType::Junk);
            assert_eq!(folder("S", &["\\spam"]).folder_type(), FolderType::Junk);
        }

        #[test]
        fn aliases() {
            assert_eq!(folder("S", &["\\SentMail"]).folder_type(), FolderType::Sent);
            assert_eq!(folder("B", &["\\Bin"]).folder_type(), FolderType::Trash);
            assert_eq!(folder("F", &["\\Starred"]).folder_type(), FolderType::Flagged);
            assert_eq!(folder("A", &["\\AllMail"]).folder_type(), FolderType::All);
        }

        #[test]
        fn cascade_order() {
            assert_eq!(
                folder("X", &["\\All", "\\Sent"]).folder_type(),
                FolderType::Sent
            );
            assert_eq!(
                folder("X", &["\\Archive", "\\Important"]).folder_type(),
                FolderType::Important
            );
            assert_eq!(
                folder("INBOX", &["\\Trash"]).folder_type(),
                FolderType::Inbox
            );
        }

        #[test]
        fn special_use_annotation_ignored() {
            let mut f = folder("Papierkorb", &[]);
            f.set_metadata(SPECIAL_USE, "\\Trash");
            assert_eq!(f.folder_type(), FolderType::User);
        }

        #[test]
        fn kolab_private_annotation() {
            let mut f = folder("Gesendet", &[]);
            f.set_metadata(KOLAB_FOLDER_TYPE, "mail.sentitems");
            assert_eq!(f.folder_type(), FolderType::Sent);
        }

        #[test]
        fn kolab_shared_fallback() {
            let mut f = folder("Shared Junk", &[]);
            f.set_metadata(KOLAB_FOLDER_TYPE, "");
            f.set_metadata(KOLAB_FOLDER_TYPE_SHARED, "mail.junkemail");
            assert_eq!(f.folder_type(), FolderType::Junk);
        }

        #[test]
        fn kolab_non_mail_is_user() {
            let mut f = folder("Calendar", &[]);
            f.set_metadata(KOLAB_FOLDER_TYPE, "event.default");
            assert_eq!(f.folder_type(), FolderType::User);
        }

        #[test]
        fn codes() {
            assert_eq!(FolderType::User.code(), 0);
            assert_eq!(FolderType::Inbox.code(), 1);
            assert_eq!(FolderType::Archive.code(), 6);
            assert_eq!(FolderType::All.code(), 13);
        }
    }

    mod record_tests {
        use super::*;

        #[test]
        fn serializes_expected_keys() {
            let mut f = folder("Lists/Rust", &["\\HasNoChildren", "\\Subscribed"]);
            f.status.uid_next = Some(88);
            f.status.messages = Some(12);
            f.status.unseen = Some(0);
            let json = serde_json::to_value(&f).unwrap();
            assert_eq!(json["name"], "Rust");
            assert_eq!(json["FullName"], "Lists/Rust");
            assert_eq!(json["Delimiter"], "/");
            assert_eq!(json["isSubscribed"], true);
            assert_eq!(json["Flags"], serde_json::json!(["\\hasnochildren", "\\subscribed"]));
            assert_eq!(json["UidNext"], 88);
            assert_eq!(json["unreadEmails"], 0);
            assert!(json["id"].is_null());
            assert!(json["role"].is_null());
        }

        #[test]
        fn role_serialized_lowercase() {
            let json = serde_json::to_value(folder("Sent", &["\\Sent"])).unwrap();
            assert_eq!(json["role"], "sent");
        }

        #[test]
        fn record_round_trip_keeps_classification() {
            let mut f = folder("Old/Stuff", &["\\NoSelect", "\\X-Vendor", "\\Archive"]);
            f.set_metadata(SPECIAL_USE, "\\Archive");
            let json = serde_json::to_string(&f).unwrap();
            let record: FolderRecord = serde_json::from_str(&json).unwrap();
            let back = Folder::try_from(record).unwrap();
            assert_eq!(back.flags(), f.flags());
            assert_eq!(back.role(), f.role());
            assert_eq!(back.selectable(), f.selectable());
            assert_eq!(back.exists(), f.exists());
            assert_eq!(back.name(), "Stuff");
        }
    }
}
