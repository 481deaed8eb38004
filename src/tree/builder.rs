//! Tree builder for mirroring a directory subtree in memory

use crate::error::TreeError;
use crate::tree::node::{DirNode, Entry, EntryKind};
use crate::tree::path::{self, PathInfo};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, trace, warn};

/// Build configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Leaf names to leave out of the tree entirely (e.g. ".git")
    #[serde(default)]
    pub ignore_names: Vec<String>,
    /// Maximum directory depth to descend into (None = unlimited).
    /// Directories past the limit are recorded as entries only.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl BuildConfig {
    fn ignores(&self, name: &str) -> bool {
        self.ignore_names.iter().any(|ignored| ignored == name)
    }
}

/// In-memory mirror of a directory subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    root: DirNode,
}

impl Tree {
    /// Build a tree rooted at `root` with the default configuration
    pub fn build(root: impl AsRef<Path>) -> Result<Tree, TreeError> {
        TreeBuilder::new(root.as_ref().to_path_buf()).build()
    }

    pub fn root(&self) -> &DirNode {
        &self.root
    }

    /// Find a directory by its path relative to the root.
    ///
    /// Leading separators are ignored and an empty path (or ".") is the root.
    pub fn find(&self, path: &str) -> Option<&DirNode> {
        let segments = path::normalize_segments(path);
        self.root.find(segments.as_slice())
    }

    /// Find a file (or directory entry) by its path relative to the root
    pub fn find_file(&self, path: &str) -> Option<&Entry> {
        let mut segments = path::normalize_segments(path);
        let name = segments.pop()?;
        self.root.find(segments.as_slice())?.entry(&name)
    }

    /// Pre-order depth-first visit of every directory in the tree
    pub fn traverse<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&'a DirNode),
    {
        self.root.traverse(&mut f);
    }

    /// Serialize the tree to a JSON snapshot
    pub fn to_json(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a tree from a JSON snapshot produced by [`Tree::to_json`]
    pub fn from_json(json: &str) -> Result<Tree, TreeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Tree builder for mirroring a filesystem subtree
pub struct TreeBuilder {
    root: PathBuf,
    config: BuildConfig,
}

impl TreeBuilder {
    /// Create a new tree builder for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: BuildConfig::default(),
        }
    }

    /// Set the build configuration (ignore names, depth limit)
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the tree from the filesystem
    ///
    /// Fails only if the root cannot be resolved or listed. Subdirectories that
    /// cannot be listed are left out of their parent's children but still
    /// appear in its entries.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn build(&self) -> Result<Tree, TreeError> {
        let start = Instant::now();
        info!("Starting tree build");

        let absolute = dunce::canonicalize(&self.root).map_err(|e| {
            error!("Failed to resolve root: {}", e);
            TreeError::RootUnresolved {
                path: self.root.clone(),
                source: e,
            }
        })?;
        if !absolute.is_dir() {
            error!("Root is not a directory");
            return Err(TreeError::NotADirectory(absolute));
        }

        let mut stats = BuildStats::default();
        let root = self.build_dir(PathInfo::root(absolute), 0, &mut stats)?;

        info!(
            directories = stats.directories,
            entries = stats.entries,
            skipped = stats.skipped,
            duration_ms = start.elapsed().as_millis(),
            "Tree build completed"
        );

        Ok(Tree { root })
    }

    /// Build one directory node, recursing into subdirectories
    fn build_dir(
        &self,
        path: PathInfo,
        depth: usize,
        stats: &mut BuildStats,
    ) -> Result<DirNode, TreeError> {
        let read_dir_err = |e: std::io::Error| TreeError::ReadDir {
            path: path.absolute().to_path_buf(),
            source: e,
        };
        let listing = std::fs::read_dir(path.absolute()).map_err(read_dir_err)?;

        let mut node = DirNode::new(path.clone());
        stats.directories += 1;

        for dir_entry in listing {
            let dir_entry = dir_entry.map_err(read_dir_err)?;
            // Names are keyed and looked up as UTF-8; a lossy conversion would
            // point at a path that does not exist and could collide with a sibling.
            let name = match dir_entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(
                        parent = %path.relative(),
                        name = ?raw,
                        "Skipping entry whose name is not valid UTF-8"
                    );
                    stats.skipped += 1;
                    continue;
                }
            };

            if self.config.ignores(&name) {
                trace!(name = %name, "Ignoring entry");
                continue;
            }

            let kind = match dir_entry.file_type() {
                Ok(file_type) => EntryKind::from(file_type),
                Err(e) => {
                    warn!(name = %name, "Failed to read file type, recording as other: {}", e);
                    EntryKind::Other
                }
            };
            let size = dir_entry.metadata().map(|m| m.len()).unwrap_or(0);
            let child_path = path.child(&name);

            if kind == EntryKind::Directory {
                let within_depth = self.config.max_depth.map_or(true, |max| depth < max);
                if within_depth {
                    match self.build_dir(child_path.clone(), depth + 1, stats) {
                        Ok(child) => {
                            node.children.insert(name.clone(), child);
                        }
                        Err(e) => {
                            warn!(
                                relative = %child_path.relative(),
                                "Skipping subtree that failed to build: {}", e
                            );
                            stats.skipped += 1;
                        }
                    }
                } else {
                    debug!(relative = %child_path.relative(), "Depth limit reached");
                }
            }

            node.entries.insert(name, Entry::new(child_path, kind, size));
            stats.entries += 1;
        }

        Ok(node)
    }
}

#[derive(Debug, Default)]
struct BuildStats {
    directories: usize,
    entries: usize,
    skipped: usize,
}
