//! Ftree: In-Memory Filesystem Trees
//!
//! Mirrors a directory subtree in memory and walks it with visitors that select
//! files by extension. Each wanted file is read from storage at most once per
//! walk, no matter how many visitors want it.

pub mod config;
pub mod error;
pub mod logging;
pub mod tree;

pub use error::{ConfigError, TreeError};
pub use tree::builder::{BuildConfig, Tree, TreeBuilder};
pub use tree::node::{DirNode, Entry, EntryKind};
pub use tree::path::PathInfo;
pub use tree::walker::{Visitor, WalkReport, Walker};
