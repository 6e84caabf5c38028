//! Well-known mailbox annotation keys (RFC 5464 METADATA).

/// SPECIAL-USE value stored as private metadata.
pub const SPECIAL_USE: &str = "/private/specialuse";

/// Kolab folder content type, private entry.
pub const KOLAB_FOLDER_TYPE: &str = "/vendor/kolab/folder-type";

/// Kolab folder content type, shared entry.
pub const KOLAB_FOLDER_TYPE_SHARED: &str = "/shared/vendor/kolab/folder-type";
