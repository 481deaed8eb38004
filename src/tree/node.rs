//! Tree node types: file entries and directory nodes

use crate::tree::path::{extension_of, PathInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::FileType;
use std::path::Path;

/// Kind of filesystem object an entry describes. Symlinks are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl From<FileType> for EntryKind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// Read-only descriptor of one child (file or directory) of a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    path: PathInfo,
    extension: String,
    kind: EntryKind,
    size: u64,
}

impl Entry {
    pub fn new(path: PathInfo, kind: EntryKind, size: u64) -> Self {
        let extension = extension_of(path.name());
        Self {
            path,
            extension,
            kind,
            size,
        }
    }

    pub fn path(&self) -> &PathInfo {
        &self.path
    }

    /// Lowercased extension including the leading dot, or empty
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Size in bytes as reported by the directory listing (0 if unavailable)
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn absolute(&self) -> &Path {
        self.path.absolute()
    }

    pub fn relative(&self) -> &str {
        self.path.relative()
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Base name of the directory containing this entry
    pub fn dir_name(&self) -> String {
        self.path
            .absolute()
            .parent()
            .and_then(|parent| parent.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// In-memory directory record
///
/// Every name in `children` is also a key in `entries`: directories are kept
/// in both maps so that files can be iterated uniformly while the directory
/// structure stays navigable by name. A directory entry without a matching
/// `children` key means its subtree could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirNode {
    path: PathInfo,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) children: BTreeMap<String, DirNode>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) entries: BTreeMap<String, Entry>,
}

impl DirNode {
    pub fn new(path: PathInfo) -> Self {
        Self {
            path,
            children: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &PathInfo {
        &self.path
    }

    pub fn children(&self) -> &BTreeMap<String, DirNode> {
        &self.children
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    pub fn child(&self, name: &str) -> Option<&DirNode> {
        self.children.get(name)
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Entries that are not directories
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values().filter(|entry| !entry.is_dir())
    }

    /// Descend by name, one segment per level. No segments returns `self`.
    pub fn find<S: AsRef<str>>(&self, segments: &[S]) -> Option<&DirNode> {
        match segments.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get(head.as_ref())?.find(rest),
        }
    }

    /// Pre-order depth-first visit of this node and all descendants
    pub fn traverse<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a DirNode),
    {
        f(self);
        for child in self.children.values() {
            child.traverse(f);
        }
    }
}
