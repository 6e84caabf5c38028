//! Mailbox and message flags.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Mailbox flag reported by LIST / LSUB / LIST-EXTENDED.
///
/// Well-known flags get their own variant; anything else is kept lowercased
/// in [`MailboxFlag::Other`] so it survives a serialize/parse cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MailboxFlag {
    /// `\NoSelect`: the name exists only as a hierarchy node.
    NoSelect,
    /// `\NonExistent` (RFC 5258).
    NonExistent,
    /// `\NoInferiors`: no child mailboxes can be created.
    NoInferiors,
    /// `\HasChildren` (RFC 5258).
    HasChildren,
    /// `\HasNoChildren` (RFC 5258).
    HasNoChildren,
    /// `\Marked`.
    Marked,
    /// `\Unmarked`.
    Unmarked,
    /// `\Subscribed` (RFC 5258).
    Subscribed,
    /// `\Remote` (RFC 5258).
    Remote,
    /// `\Inbox` (XLIST).
    Inbox,
    /// `\All` (RFC 6154).
    All,
    /// `\AllMail` (XLIST).
    AllMail,
    /// `\Archive` (RFC 6154).
    Archive,
    /// `\Drafts` (RFC 6154).
    Drafts,
    /// `\Flagged` (RFC 6154).
    Flagged,
    /// `\Starred` (XLIST).
    Starred,
    /// `\Important` (RFC 8457).
    Important,
    /// `\Junk` (RFC 6154).
    Junk,
    /// `\Spam` (XLIST).
    Spam,
    /// `\Sent` (RFC 6154).
    Sent,
    /// `\SentMail` (XLIST).
    SentMail,
    /// `\Trash` (RFC 6154).
    Trash,
    /// `\Bin`.
    Bin,
    /// Any other flag, lowercased.
    Other(String),
}

impl MailboxFlag {
    /// Parses a flag, ignoring case.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "\\noselect" => Self::NoSelect,
            "\\nonexistent" => Self::NonExistent,
            "\\noinferiors" => Self::NoInferiors,
            "\\haschildren" => Self::HasChildren,
            "\\hasnochildren" => Self::HasNoChildren,
            "\\marked" => Self::Marked,
            "\\unmarked" => Self::Unmarked,
            "\\subscribed" => Self::Subscribed,
            "\\remote" => Self::Remote,
            "\\inbox" => Self::Inbox,
            "\\all" => Self::All,
            "\\allmail" => Self::AllMail,
            "\\archive" => Self::Archive,
            "\\drafts" => Self::Drafts,
            "\\flagged" => Self::Flagged,
            "\\starred" => Self::Starred,
            "\\important" => Self::Important,
            "\\junk" => Self::Junk,
            "\\spam" => Self::Spam,
            "\\sent" => Self::Sent,
            "\\sentmail" => Self::SentMail,
            "\\trash" => Self::Trash,
            "\\bin" => Self::Bin,
            _ => Self::Other(lower),
        }
    }

    /// Returns the lowercase wire form of the flag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSelect => "\\noselect",
            Self::NonExistent => "\\nonexistent",
            Self::NoInferiors => "\\noinferiors",
            Self::HasChildren => "\\haschildren",
            Self::HasNoChildren => "\\hasnochildren",
            Self::Marked => "\\marked",
            Self::Unmarked => "\\unmarked",
            Self::Subscribed => "\\subscribed",
            Self::Remote => "\\remote",
            Self::Inbox => "\\inbox",
            Self::All => "\\all",
            Self::AllMail => "\\allmail",
            Self::Archive => "\\archive",
            Self::Drafts => "\\drafts",
            Self::Flagged => "\\flagged",
            Self::Starred => "\\starred",
            Self::Important => "\\important",
            Self::Junk => "\\junk",
            Self::Spam => "\\spam",
            Self::Sent => "\\sent",
            Self::SentMail => "\\sentmail",
            Self::Trash => "\\trash",
            Self::Bin => "\\bin",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for MailboxFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for MailboxFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MailboxFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Message flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been read.
    Seen,
    /// Message has been answered.
    Answered,
    /// Message is flagged for special attention.
    Flagged,
    /// Message is marked for deletion.
    Deleted,
    /// Message is a draft.
    Draft,
    /// Message is recent (first session to see it).
    Recent,
    /// `\*` in PERMANENTFLAGS: new keywords may be created.
    Wildcard,
    /// Custom keyword flag.
    Keyword(String),
}

impl Flag {
    /// Parses a flag string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "\\SEEN" => Self::Seen,
            "\\ANSWERED" => Self::Answered,
            "\\FLAGGED" => Self::Flagged,
            "\\DELETED" => Self::Deleted,
            "\\DRAFT" => Self::Draft,
            "\\RECENT" => Self::Recent,
            "\\*" => Self::Wildcard,
            _ => Self::Keyword(s.to_string()),
        }
    }

    /// Returns the flag as an IMAP string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seen => "\\Seen",
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Draft => "\\Draft",
            Self::Recent => "\\Recent",
            Self::Wildcard => "\\*",
            Self::Keyword(s) => s,
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Flag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Collection of message flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Flags {
    flags: Vec<Flag>,
}

impl Flags {
    /// Creates an empty flags collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates flags from a vector, dropping duplicates.
    #[must_use]
    pub fn from_vec(flags: Vec<Flag>) -> Self {
        flags.into_iter().collect()
    }

    /// Parses each string with [`Flag::parse`].
    #[must_use]
    pub fn parse_all<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        flags.into_iter().map(|s| Flag::parse(s.as_ref())).collect()
    }

    /// Adds a flag.
    pub fn insert(&mut self, flag: Flag) {
        if !self.flags.contains(&flag) {
            self.flags.push(flag);
        }
    }

    /// Removes a flag.
    pub fn remove(&mut self, flag: &Flag) {
        self.flags.retain(|f| f != flag);
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn contains(&self, flag: &Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Returns an iterator over the flags.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Returns the number of flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Returns true if there are no flags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<Flag> for Flags {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut flags = Self::new();
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

impl IntoIterator for Flags {
    type Item = Flag;
    type IntoIter = std::vec::IntoIter<Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.into_iter()
    }
}
