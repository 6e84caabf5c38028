//! Mailbox status facts shared by listing and selection results.
//!
//! These come from STATUS, SELECT/EXAMINE response codes and LIST-EXTENDED
//! `STATUS` return data. Every fact is optional: a server that did not
//! report a value leaves it `None`, which is different from reporting zero.

use tracing::debug;

/// Status facts for one mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFacts {
    /// MAILBOXID (RFC 8474).
    pub mailbox_id: Option<String>,
    /// Predicted UID of the next appended message.
    pub uid_next: Option<u32>,
    /// UIDVALIDITY epoch. A change invalidates every cached UID.
    pub uid_validity: Option<u32>,
    /// Number of messages.
    pub messages: Option<u32>,
    /// Number of messages without `\Seen`.
    pub unseen: Option<u32>,
    /// HIGHESTMODSEQ (RFC 7162).
    pub highest_mod_seq: Option<u64>,
    /// Mailbox size in octets (RFC 8438).
    pub size: Option<u64>,
    /// Largest accepted APPEND in octets (RFC 7889).
    pub append_limit: Option<u64>,
    /// Client-side change tag.
    pub etag: Option<String>,
}

impl StatusFacts {
    /// Creates facts with nothing known.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one STATUS attribute pair such as `("UIDNEXT", "42")`.
    ///
    /// Returns false, leaving the facts untouched, for unknown attribute
    /// names and values that do not parse.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let applied = match name.to_ascii_uppercase().as_str() {
            "MESSAGES" => parse_into(&mut self.messages, value),
            "UNSEEN" => parse_into(&mut self.unseen, value),
            "UIDNEXT" => parse_into(&mut self.uid_next, value),
            "UIDVALIDITY" => parse_into(&mut self.uid_validity, value),
            "HIGHESTMODSEQ" => parse_into(&mut self.highest_mod_seq, value),
            "SIZE" => parse_into(&mut self.size, value),
            "APPENDLIMIT" if value.eq_ignore_ascii_case("NIL") => {
                self.append_limit = None;
                true
            }
            "APPENDLIMIT" => parse_into(&mut self.append_limit, value),
            "MAILBOXID" => {
                let id = value.trim_start_matches('(').trim_end_matches(')');
                if id.is_empty() {
                    false
                } else {
                    self.mailbox_id = Some(id.to_string());
                    true
                }
            }
            _ => false,
        };
        if !applied {
            debug!(name, value, "Ignoring STATUS attribute");
        }
        applied
    }

    /// Takes every fact that `other` knows.
    pub fn merge(&mut self, other: &Self) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        take(&mut self.mailbox_id, &other.mailbox_id);
        take(&mut self.uid_next, &other.uid_next);
        take(&mut self.uid_validity, &other.uid_validity);
        take(&mut self.messages, &other.messages);
        take(&mut self.unseen, &other.unseen);
        take(&mut self.highest_mod_seq, &other.highest_mod_seq);
        take(&mut self.size, &other.size);
        take(&mut self.append_limit, &other.append_limit);
        take(&mut self.etag, &other.etag);
    }

    /// Returns true if the message count is known.
    #[must_use]
    pub const fn has_counts(&self) -> bool {
        self.messages.is_some()
    }
}

fn parse_into<T: std::str::FromStr>(slot: &mut Option<T>, value: &str) -> bool {
    match value.trim().parse() {
        Ok(v) => {
            *slot = Some(v);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_knows_nothing() {
        let facts = StatusFacts::new();
        assert!(facts.uid_next.is_none());
        assert!(facts.messages.is_none());
        assert!(facts.mailbox_id.is_none());
        assert!(!facts.has_counts());
    }

    #[test]
    fn zero_is_not_absent() {
        let mut facts = StatusFacts::new();
        assert!(facts.set("UNSEEN", "0"));
        assert_eq!(facts.unseen, Some(0));
        assert!(facts.messages.is_none());
    }

    #[test]
    fn set_is_case_insensitive() {
        let mut facts = StatusFacts::new();
        assert!(facts.set("uidnext", "4392"));
        assert!(facts.set("UidValidity", "1650000000"));
        assert!(facts.set("HIGHESTMODSEQ", "90060115205545359"));
        assert_eq!(facts.uid_next, Some(4392));
        assert_eq!(facts.uid_validity, Some(1_650_000_000));
        assert_eq!(facts.highest_mod_seq, Some(90_060_115_205_545_359));
    }

    #[test]
    fn mailbox_id_strips_parens() {
        let mut facts = StatusFacts::new();
        assert!(facts.set("MAILBOXID", "(F2212ea87-6097-4256-9d51-71338625)"));
        assert_eq!(
            facts.mailbox_id.as_deref(),
            Some("F2212ea87-6097-4256-9d51-71338625")
        );
    }

    #[test]
    fn append_limit_nil_clears() {
        let mut facts = StatusFacts::new();
        assert!(facts.set("APPENDLIMIT", "1024"));
        assert_eq!(facts.append_limit, Some(1024));
        assert!(facts.set("APPENDLIMIT", "NIL"));
        assert!(facts.append_limit.is_none());
    }

    #[test]
    fn rejects_unknown_and_garbage() {
        let mut facts = StatusFacts::new();
        assert!(!facts.set("RECENT", "3"));
        assert!(!facts.set("MESSAGES", "many"));
        assert!(!facts.set("UIDNEXT", "-1"));
        assert_eq!(facts, StatusFacts::new());
    }

    #[test]
    fn merge_keeps_unknowns() {
        let mut base = StatusFacts {
            messages: Some(10),
            unseen: Some(2),
            ..StatusFacts::default()
        };
        let update = StatusFacts {
            unseen: Some(0),
            uid_next: Some(11),
            ..StatusFacts::default()
        };
        base.merge(&update);
        assert_eq!(base.messages, Some(10));
        assert_eq!(base.unseen, Some(0));
        assert_eq!(base.uid_next, Some(11));
    }
}
