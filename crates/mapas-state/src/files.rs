//! Files attached to a registration, one per named group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mapas_core::FileId;

/// Reference to an uploaded file. The bytes live in external file storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub id: FileId,
    pub name: String,
    /// Public download URL.
    pub url: String,
}

/// Mapping from group name (e.g. `rules`, `attachment-1`) to the file
/// currently attached in that group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileGroups {
    groups: BTreeMap<String, FileRef>,
}

impl FileGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `file` to `group`, returning the file it replaces.
    pub fn attach(&mut self, group: impl Into<String>, file: FileRef) -> Option<FileRef> {
        self.groups.insert(group.into(), file)
    }

    pub fn detach(&mut self, group: &str) -> Option<FileRef> {
        self.groups.remove(group)
    }

    pub fn get(&self, group: &str) -> Option<&FileRef> {
        self.groups.get(group)
    }

    /// Groups in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileRef)> {
        self.groups.iter().map(|(g, f)| (g.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: u64, name: &str) -> FileRef {
        FileRef {
            id: FileId(id),
            name: name.to_string(),
            url: format!("https://files.example.org/{name}"),
        }
    }

    #[test]
    fn attach_replaces_previous_file_in_group() {
        let mut files = FileGroups::new();
        assert!(files.attach("rules", file(1, "a.pdf")).is_none());
        let replaced = files.attach("rules", file(2, "b.pdf"));
        assert_eq!(replaced.map(|f| f.id), Some(FileId(1)));
        assert_eq!(files.get("rules").map(|f| f.id), Some(FileId(2)));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn detach_removes_group() {
        let mut files = FileGroups::new();
        files.attach("rules", file(1, "a.pdf"));
        assert!(files.detach("rules").is_some());
        assert!(files.is_empty());
        assert!(files.detach("rules").is_none());
    }
}
