//! Selected-state snapshot of a mailbox (SELECT / EXAMINE / STATUS).

use serde::{Serialize, Serializer};
use tracing::debug;

use super::{Flag, Flags, StatusFacts};

/// Outcome of selecting, examining or querying the status of a mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderInformation {
    full_name: String,
    is_writable: bool,
    flags: Flags,
    permanent_flags: Flags,
    /// Status facts reported alongside the selection.
    pub status: StatusFacts,
}

impl FolderInformation {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new(full_name: impl Into<String>, is_writable: bool) -> Self {
        Self {
            full_name: full_name.into(),
            is_writable,
            flags: Flags::new(),
            permanent_flags: Flags::new(),
            status: StatusFacts::default(),
        }
    }

    /// Snapshot of a read-write SELECT.
    #[must_use]
    pub fn selected(full_name: impl Into<String>) -> Self {
        Self::new(full_name, true)
    }

    /// Snapshot of a read-only EXAMINE.
    #[must_use]
    pub fn examined(full_name: impl Into<String>) -> Self {
        Self::new(full_name, false)
    }

    /// Sets the session flags (`FLAGS` response).
    #[must_use]
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the flags the client may store permanently. Ignored for
    /// read-only snapshots, which keep none.
    #[must_use]
    pub fn with_permanent_flags(mut self, flags: Flags) -> Self {
        if self.is_writable {
            self.permanent_flags = flags;
        } else if !flags.is_empty() {
            debug!(folder = %self.full_name, "Ignoring PERMANENTFLAGS on read-only snapshot");
        }
        self
    }

    /// Flags visible in this session.
    #[must_use]
    pub const fn flags(&self) -> &Flags {
        &self.flags
    }

    /// Flags the client may store permanently.
    #[must_use]
    pub const fn permanent_flags(&self) -> &Flags {
        &self.permanent_flags
    }

    /// Full mailbox name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// True for SELECT, false for EXAMINE.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.is_writable
    }

    /// Returns true if `flag` can be stored on messages of this mailbox.
    #[must_use]
    pub fn is_flag_supported(&self, flag: &Flag) -> bool {
        self.permanent_flags.contains(&Flag::Wildcard)
            || self.permanent_flags.contains(flag)
            || self.flags.contains(flag)
    }

    /// Like [`Self::is_flag_supported`], parsing `flag` first.
    #[must_use]
    pub fn is_flag_supported_str(&self, flag: &str) -> bool {
        self.is_flag_supported(&Flag::parse(flag))
    }

    /// Returns true if new keywords may be created (`\*` in PERMANENTFLAGS).
    #[must_use]
    pub fn can_create_keywords(&self) -> bool {
        self.permanent_flags.contains(&Flag::Wildcard)
    }
}

/// JSON record of a [`FolderInformation`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderInformationRecord<'a> {
    id: Option<&'a str>,
    name: &'a str,
    uid_next: Option<u32>,
    uid_validity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_emails: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unread_emails: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    highest_mod_seq: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    append_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    flags: Option<&'a Flags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    permanent_flags: Option<&'a Flags>,
}

impl<'a> From<&'a FolderInformation> for FolderInformationRecord<'a> {
    fn from(info: &'a FolderInformation) -> Self {
        let status = &info.status;
        // unreadEmails travels with totalEmails, even when UNSEEN is unknown.
        let counts = status.messages.map(|total| (total, status.unseen));
        Self {
            id: status.mailbox_id.as_deref(),
            name: &info.full_name,
            uid_next: status.uid_next,
            uid_validity: status.uid_validity,
            total_emails: counts.map(|(total, _)| total),
            unread_emails: counts.map(|(_, unseen)| unseen),
            highest_mod_seq: status.highest_mod_seq,
            append_limit: status.append_limit,
            size: status.size,
            etag: status.etag.as_deref().filter(|etag| !etag.is_empty()),
            flags: (!info.flags.is_empty()).then_some(&info.flags),
            permanent_flags: (!info.permanent_flags.is_empty()).then_some(&info.permanent_flags),
        }
    }
}

impl Serialize for FolderInformation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FolderInformationRecord::from(self).serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod flag_support_tests {
        use super::*;

        #[test]
        fn wildcard_supports_anything() {
            let info =
                FolderInformation::selected("INBOX").with_permanent_flags(Flags::parse_all(["\\*"]));
            assert!(info.is_flag_supported_str("\\Seen"));
            assert!(info.is_flag_supported_str("$Label7"));
            assert!(info.can_create_keywords());
        }

        #[test]
        fn literal_permanent_flag() {
            let info = FolderInformation::selected("INBOX")
                .with_permanent_flags(Flags::parse_all(["\\Seen", "\\Deleted"]));
            assert!(info.is_flag_supported(&Flag::Seen));
            assert!(!info.is_flag_supported(&Flag::Flagged));
            assert!(!info.can_create_keywords());
        }

        #[test]
        fn session_flags_count() {
            let info = FolderInformation::examined("Archive")
                .with_flags(Flags::parse_all(["\\Answered", "$Forwarded"]));
            assert!(info.is_flag_supported(&Flag::Answered));
            assert!(info.is_flag_supported_str("$Forwarded"));
            assert!(!info.is_flag_supported_str("$forwarded"));
        }

        #[test]
        fn examined_keeps_no_permanent_flags() {
            let info = FolderInformation::examined("Archive")
                .with_permanent_flags(Flags::parse_all(["\\Seen", "\\*"]));
            assert!(info.permanent_flags().is_empty());
            assert!(!info.can_create_keywords());
            assert!(!info.is_flag_supported(&Flag::Seen));
            let json = serde_json::to_value(&info).unwrap();
            assert!(json.get("permanentFlags").is_none());
        }

        #[test]
        fn nothing_supported_when_empty() {
            let info = FolderInformation::examined("Archive");
            assert!(!info.is_writable());
            assert!(!info.is_flag_supported(&Flag::Seen));
        }
    }

    mod record_tests {
        use super::*;

        #[test]
        fn minimal_record() {
            let info = FolderInformation::examined("Sent");
            let json = serde_json::to_value(&info).unwrap();
            assert_eq!(
                json,
                serde_json::json!({
                    "id": null,
                    "name": "Sent",
                    "uidNext": null,
                    "uidValidity": null,
                })
            );
        }

        #[test]
        fn counts_travel_together() {
            let mut info = FolderInformation::selected("INBOX");
            info.status.messages = Some(3);
            let json = serde_json::to_value(&info).unwrap();
            assert_eq!(json["totalEmails"], 3);
            assert!(json.as_object().unwrap().contains_key("unreadEmails"));
            assert!(json["unreadEmails"].is_null());
        }

        #[test]
        fn optional_facts_and_flags() {
            let mut info = FolderInformation::selected("INBOX")
                .with_flags(Flags::parse_all(["\\Seen"]))
                .with_permanent_flags(Flags::parse_all(["\\Seen", "\\*"]));
            info.status.uid_next = Some(4392);
            info.status.uid_validity = Some(1);
            info.status.highest_mod_seq = Some(715_194_045_007);
            info.status.size = Some(0);
            info.status.etag = Some(String::new());
            let json = serde_json::to_value(&info).unwrap();
            let obj = json.as_object().unwrap();
            assert_eq!(json["uidNext"], 4392);
            assert_eq!(json["highestModSeq"], 715_194_045_007_u64);
            assert_eq!(json["size"], 0);
            assert!(!obj.contains_key("etag"));
            assert!(!obj.contains_key("appendLimit"));
            assert!(!obj.contains_key("totalEmails"));
            assert_eq!(json["permanentFlags"], serde_json::json!(["\\Seen", "\\*"]));
        }
    }
}
