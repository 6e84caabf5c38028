//! Server capabilities relevant to mailbox metadata and connection setup.

/// Server capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501)
    Imap4Rev1,
    /// `IMAP4rev2` (RFC 9051)
    Imap4Rev2,
    /// STARTTLS support
    StartTls,
    /// LOGIN disabled
    LoginDisabled,
    /// AUTH mechanism
    Auth(String),
    /// SPECIAL-USE mailboxes (RFC 6154)
    SpecialUse,
    /// LIST-EXTENDED (RFC 5258)
    ListExtended,
    /// LIST-STATUS (RFC 5819)
    ListStatus,
    /// METADATA (RFC 5464)
    Metadata,
    /// METADATA-SERVER (RFC 5464)
    MetadataServer,
    /// CONDSTORE (RFC 7162)
    CondStore,
    /// QRESYNC (RFC 7162)
    QResync,
    /// OBJECTID (RFC 8474)
    ObjectId,
    /// APPENDLIMIT (RFC 7889)
    AppendLimit,
    /// STATUS=SIZE (RFC 8438)
    StatusSize,
    /// Unknown capability
    Unknown(String),
}

impl Capability {
    /// Parses a capability string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.to_uppercase();
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "IMAP4REV2" => Self::Imap4Rev2,
            "STARTTLS" => Self::StartTls,
            "LOGINDISABLED" => Self::LoginDisabled,
            "SPECIAL-USE" => Self::SpecialUse,
            "LIST-EXTENDED" => Self::ListExtended,
            "LIST-STATUS" => Self::ListStatus,
            "METADATA" => Self::Metadata,
            "METADATA-SERVER" => Self::MetadataServer,
            "CONDSTORE" => Self::CondStore,
            "QRESYNC" => Self::QResync,
            "OBJECTID" => Self::ObjectId,
            "STATUS=SIZE" => Self::StatusSize,
            _ if upper.starts_with("APPENDLIMIT") => Self::AppendLimit,
            _ if upper.starts_with("AUTH=") => Self::Auth(s[5..].to_string()),
            _ => Self::Unknown(s.to_string()),
        }
    }

    /// Parses a space-separated CAPABILITY line body.
    #[must_use]
    pub fn parse_list(line: &str) -> Vec<Self> {
        line.split_ascii_whitespace().map(Self::parse).collect()
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imap4Rev1 => write!(f, "IMAP4rev1"),
            Self::Imap4Rev2 => write!(f, "IMAP4rev2"),
            Self::StartTls => write!(f, "STARTTLS"),
            Self::LoginDisabled => write!(f, "LOGINDISABLED"),
            Self::Auth(mech) => write!(f, "AUTH={mech}"),
            Self::SpecialUse => write!(f, "SPECIAL-USE"),
            Self::ListExtended => write!(f, "LIST-EXTENDED"),
            Self::ListStatus => write!(f, "LIST-STATUS"),
            Self::Metadata => write!(f, "METADATA"),
            Self::MetadataServer => write!(f, "METADATA-SERVER"),
            Self::CondStore => write!(f, "CONDSTORE"),
            Self::QResync => write!(f, "QRESYNC"),
            Self::ObjectId => write!(f, "OBJECTID"),
            Self::AppendLimit => write!(f, "APPENDLIMIT"),
            Self::StatusSize => write!(f, "STATUS=SIZE"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}

/// Returns the SASL mechanism names advertised through `AUTH=` capabilities.
pub fn auth_mechanisms(capabilities: &[Capability]) -> impl Iterator<Item = &str> {
    capabilities.iter().filter_map(|cap| match cap {
        Capability::Auth(mech) => Some(mech.as_str()),
        _ => None,
    })
}
