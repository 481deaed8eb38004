//! Path bookkeeping for tree nodes: absolute, root-relative and leaf name

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Relative path of the scan root itself
pub const ROOT_RELATIVE: &str = ".";

/// Immutable path triple for a node in the tree
///
/// `relative` always uses forward slashes and is rooted at the scan root,
/// which itself is `"."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
    absolute: PathBuf,
    relative: String,
    name: String,
}

impl PathInfo {
    /// Path info for a scan root that has already been resolved
    pub fn root(absolute: PathBuf) -> Self {
        let name = leaf_name(&absolute);
        Self {
            absolute,
            relative: ROOT_RELATIVE.to_string(),
            name,
        }
    }

    /// Path info for a direct child of this node
    pub fn child(&self, name: &str) -> Self {
        Self {
            absolute: self.absolute.join(name),
            relative: join_relative(&self.relative, name),
            name: name.to_string(),
        }
    }

    /// Build path info for an arbitrary path without touching the filesystem.
    ///
    /// `absolute` is the lexically cleaned absolute form, `relative` is the cleaned
    /// input in forward-slash form and `name` is its last component.
    pub fn from_path(path: &Path) -> Result<Self, TreeError> {
        let absolute = std::path::absolute(path).map_err(|e| TreeError::RootUnresolved {
            path: path.to_path_buf(),
            source: e,
        })?;
        let cleaned = clean(path);
        Ok(Self {
            absolute: clean(&absolute),
            name: leaf_name(&cleaned),
            relative: to_slash(&cleaned),
        })
    }

    /// Absolute, cleaned filesystem path
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Forward-slash path relative to the scan root
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Leaf name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Join a root-relative path and a child name
pub fn join_relative(parent: &str, name: &str) -> String {
    if parent == ROOT_RELATIVE || parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Split a lookup path into cleaned segments.
///
/// Platform separators become `/`, empty and `.` segments are dropped and `..`
/// pops the previous segment. A `..` that would climb above the root is kept so
/// that it can never match a child name.
pub fn normalize_segments(path: &str) -> Vec<String> {
    let slashed = if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    };

    let mut segments: Vec<String> = Vec::new();
    for segment in slashed.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push("..".to_string()),
            },
            other => segments.push(other.to_string()),
        }
    }
    segments
}

/// Lowercased extension of a file name, including the leading dot.
///
/// Everything from the last `.` onwards counts, so `.gitignore` has the
/// extension `.gitignore` and `Makefile` has none.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// Render a path with forward slashes
pub fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(MAIN_SEPARATOR, "/")
    }
}

/// Lexically clean a path: drop `.` components and resolve `..` where possible
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    out.pop();
                    depth -= 1;
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => {
                out.push(name);
                depth += 1;
            }
            Component::RootDir | Component::Prefix(_) => out.push(component.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(ROOT_RELATIVE);
    }
    out
}

fn leaf_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => to_slash(path),
    }
}
