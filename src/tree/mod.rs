//! Filesystem Tree
//!
//! Mirrors a directory subtree in memory. Each directory node keeps its child
//! directories and all of its entries (files and directories) keyed by name,
//! and a walker dispatches file contents to visitors by extension.

pub mod builder;
pub mod node;
pub mod path;
pub mod walker;
