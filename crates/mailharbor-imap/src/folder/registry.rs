//! The folder namespace registry.
//!
//! Folders are owned by the registry, keyed by full name. Parent/child
//! relations are resolved by name lookup, so there are no ownership
//! cycles: a folder never owns its parent or its children.

use std::collections::BTreeMap;

use super::MailFolder;
use crate::types::ListEntry;

/// Registry of every folder known to one session.
#[derive(Debug, Default)]
pub struct FolderRegistry {
    folders: BTreeMap<String, MailFolder>,
}

impl FolderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the folder with the given full name.
    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<&MailFolder> {
        self.folders.get(full_name)
    }

    /// Returns the folder mutably.
    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut MailFolder> {
        self.folders.get_mut(full_name)
    }

    /// Returns the folder, creating an empty record if unknown.
    pub fn get_or_create(&mut self, full_name: &str, delimiter: Option<char>) -> &mut MailFolder {
        self.folders
            .entry(full_name.to_string())
            .or_insert_with(|| MailFolder::new(full_name, delimiter))
    }

    /// Creates or refreshes a folder from a LIST entry.
    pub fn upsert_list_entry(&mut self, entry: &ListEntry) -> &mut MailFolder {
        let key = entry.name.as_str().to_string();
        self.folders
            .entry(key)
            .and_modify(|folder| folder.merge_list_entry(entry))
            .or_insert_with(|| MailFolder::from_list_entry(entry))
    }

    /// Removes a folder, returning it if present.
    pub fn remove(&mut self, full_name: &str) -> Option<MailFolder> {
        self.folders.remove(full_name)
    }

    /// Resolves the parent of a folder through the registry.
    #[must_use]
    pub fn parent_of(&self, full_name: &str) -> Option<&MailFolder> {
        let folder = self.get(full_name)?;
        let parent = folder.parent_name()?;
        self.get(&parent)
    }

    /// Returns the direct children of a folder.
    #[must_use]
    pub fn children_of(&self, full_name: &str) -> Vec<&MailFolder> {
        let Some(folder) = self.get(full_name) else {
            return Vec::new();
        };
        let Some(delimiter) = folder.directory_separator() else {
            return Vec::new();
        };
        let prefix = format!("{full_name}{delimiter}");

        self.folders
            .range(prefix.clone()..)
            .take_while(|(name, _)| name.starts_with(&prefix))
            .filter(|(name, _)| !name[prefix.len()..].contains(delimiter))
            .map(|(_, folder)| folder)
            .collect()
    }

    /// Re-keys a folder (and its descendants) after a rename, emitting
    /// `Renamed` on each affected folder.
    pub fn rename(&mut self, old_full_name: &str, new_full_name: &str) {
        let delimiter = self
            .get(old_full_name)
            .and_then(MailFolder::directory_separator);

        let mut affected: Vec<String> = vec![old_full_name.to_string()];
        if let Some(d) = delimiter {
            let prefix = format!("{old_full_name}{d}");
            affected.extend(
                self.folders
                    .range(prefix.clone()..)
                    .take_while(|(name, _)| name.starts_with(&prefix))
                    .map(|(name, _)| name.clone()),
            );
        }

        for old_key in affected {
            if let Some(mut folder) = self.folders.remove(&old_key) {
                let new_key = format!("{new_full_name}{}", &old_key[old_full_name.len()..]);
                folder.mark_renamed(new_key.clone());
                self.folders.insert(new_key, folder);
            }
        }
    }

    /// Iterates over all folders in name order.
    pub fn iter(&self) -> impl Iterator<Item = &MailFolder> {
        self.folders.values()
    }

    /// Returns the number of known folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Returns true when no folders are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MailboxAttribute, MailboxName};

    fn entry(name: &str) -> ListEntry {
        ListEntry {
            attributes: Vec::new(),
            delimiter: Some('/'),
            name: MailboxName::new(name),
        }
    }

    fn registry_with(names: &[&str]) -> FolderRegistry {
        let mut registry = FolderRegistry::new();
        for name in names {
            registry.upsert_list_entry(&entry(name));
        }
        registry
    }

    #[test]
    fn upsert_merges_attributes() {
        let mut registry = FolderRegistry::new();
        registry.upsert_list_entry(&entry("INBOX"));

        let mut marked = entry("INBOX");
        marked.attributes.push(MailboxAttribute::Marked);
        registry.upsert_list_entry(&marked);

        assert_eq!(registry.len(), 1);
        assert!(
            registry
                .get("INBOX")
                .unwrap()
                .attributes()
                .contains(&MailboxAttribute::Marked)
        );
    }

    #[test]
    fn parent_resolution_goes_through_registry() {
        let registry = registry_with(&["work", "work/projects", "work/projects/rust"]);
        let parent = registry.parent_of("work/projects/rust").unwrap();
        assert_eq!(parent.full_name(), "work/projects");
        assert!(registry.parent_of("work").is_none());
    }

    #[test]
    fn children_are_direct_only() {
        let registry = registry_with(&["work", "work/a", "work/b", "work/a/deep"]);
        let children = registry.children_of("work");
        let names: Vec<&str> = children.iter().map(|f| f.full_name()).collect();
        assert_eq!(names, vec!["work/a", "work/b"]);
    }

    #[test]
    fn rename_rekeys_descendants() {
        let mut registry = registry_with(&["work", "work/a", "work/a/deep"]);
        registry.rename("work", "archive");

        assert!(registry.get("work").is_none());
        assert!(registry.get("archive").is_some());
        assert!(registry.get("archive/a").is_some());
        assert!(registry.get("archive/a/deep").is_some());
        assert_eq!(registry.get("archive/a").unwrap().name(), "a");
    }

    #[test]
    fn remove() {
        let mut registry = registry_with(&["INBOX"]);
        assert!(registry.remove("INBOX").is_some());
        assert!(registry.is_empty());
    }
}
