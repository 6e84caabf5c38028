//! Folder listing assembled from several responses.
//!
//! A listing pass usually issues LIST, then LSUB (or LIST with the
//! SUBSCRIBED selection option), then STATUS and GETMETADATA per folder.
//! Every response refers to folders by full name, so they are merged here
//! into one entry per mailbox.

use std::collections::HashMap;

use tracing::debug;

use super::{Folder, FolderRole, FolderType, StatusFacts};

/// Folders of one account, in listing order.
#[derive(Debug, Clone, Default)]
pub struct FolderList {
    folders: Vec<Folder>,
    index: HashMap<String, usize>,
}

impl FolderList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a folder from a LIST line.
    ///
    /// A folder that is already present keeps its position, metadata and
    /// status; its flags and delimiter are taken from `folder`.
    pub fn insert(&mut self, folder: Folder) {
        if let Some(&pos) = self.index.get(folder.full_name()) {
            let existing = &mut self.folders[pos];
            let subscribed = existing.is_subscribed();
            existing.set_flags(folder.flags().iter().map(|flag| flag.as_str()));
            if subscribed {
                existing.set_subscribed();
            }
            existing.set_delimiter(folder.delimiter());
            existing.status.merge(&folder.status);
            debug!(folder = folder.full_name(), "Refreshed listed folder");
        } else {
            self.index
                .insert(folder.full_name().to_string(), self.folders.len());
            self.folders.push(folder);
        }
    }

    /// Marks a folder subscribed. Returns false if it was never listed.
    pub fn mark_subscribed(&mut self, full_name: &str) -> bool {
        self.get_mut(full_name)
            .map(Folder::set_subscribed)
            .is_some()
    }

    /// Merges STATUS facts into a folder. Returns false if it was never listed.
    pub fn apply_status(&mut self, full_name: &str, facts: &StatusFacts) -> bool {
        self.get_mut(full_name)
            .map(|folder| folder.status.merge(facts))
            .is_some()
    }

    /// Stores one METADATA entry. Returns false if the folder was never listed.
    pub fn apply_metadata(&mut self, full_name: &str, key: &str, value: &str) -> bool {
        self.get_mut(full_name)
            .map(|folder| folder.set_metadata(key, value))
            .is_some()
    }

    /// Looks up a folder by full name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&Folder> {
        self.index.get(full_name).map(|&pos| &self.folders[pos])
    }

    /// Looks up a folder by full name for modification.
    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut Folder> {
        let pos = *self.index.get(full_name)?;
        self.folders.get_mut(pos)
    }

    /// First folder carrying `role`.
    #[must_use]
    pub fn find_by_role(&self, role: FolderRole) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.role() == Some(role))
    }

    /// First folder of type `kind`.
    #[must_use]
    pub fn find_by_type(&self, kind: FolderType) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.folder_type() == kind)
    }

    /// Iterates in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Folder> {
        self.folders.iter()
    }

    /// Number of folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Returns true if nothing was listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Consumes the list.
    #[must_use]
    pub fn into_vec(self) -> Vec<Folder> {
        self.folders
    }
}

impl FromIterator<Folder> for FolderList {
    fn from_iter<I: IntoIterator<Item = Folder>>(iter: I) -> Self {
        let mut list = Self::new();
        for folder in iter {
            list.insert(folder);
        }
        list
    }
}
