//! Walker for dispatching file contents to visitors
//!
//! A [`Walker`] runs one pass over a [`Tree`] and hands every wanted file's
//! bytes to each interested [`Visitor`]. The file is read from storage at most
//! once per pass; every visitor gets its own cursor over the same buffer.

use crate::error::TreeError;
use crate::tree::builder::Tree;
use crate::tree::node::Entry;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Consumer of file contents, selected by extension
pub trait Visitor {
    /// Given a lowercased extension (with leading dot, or empty), returns true
    /// if the visitor wants to read the file
    fn wants(&self, extension: &str) -> bool;

    /// Consume one file. `content` starts at the first byte of the file.
    fn visit(&mut self, entry: &Entry, content: &mut dyn Read) -> anyhow::Result<()>;
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn wants(&self, extension: &str) -> bool {
        (**self).wants(extension)
    }

    fn visit(&mut self, entry: &Entry, content: &mut dyn Read) -> anyhow::Result<()> {
        (**self).visit(entry, content)
    }
}

impl<V: Visitor + ?Sized> Visitor for Box<V> {
    fn wants(&self, extension: &str) -> bool {
        (**self).wants(extension)
    }

    fn visit(&mut self, entry: &Entry, content: &mut dyn Read) -> anyhow::Result<()> {
        (**self).visit(entry, content)
    }
}

/// A file that could not be read during a walk
#[derive(Debug)]
pub struct ReadFailure {
    pub relative: String,
    pub error: std::io::Error,
}

/// An error returned by a visitor
#[derive(Debug)]
pub struct VisitorFailure {
    pub relative: String,
    /// Registration index of the visitor
    pub visitor: usize,
    pub error: anyhow::Error,
}

/// Outcome of one walk pass. A walk always completes; per-file problems are
/// collected here instead of aborting the pass.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Files read from storage
    pub files_read: usize,
    /// Visitor invocations
    pub deliveries: usize,
    pub read_failures: Vec<ReadFailure>,
    pub visitor_failures: Vec<VisitorFailure>,
}

impl WalkReport {
    pub fn is_clean(&self) -> bool {
        self.read_failures.is_empty() && self.visitor_failures.is_empty()
    }
}

/// Runs visitors over a tree, reading each wanted file once per pass
pub struct Walker<'v> {
    tree: Arc<Tree>,
    visitors: Vec<Box<dyn Visitor + 'v>>,
    buffer: Vec<u8>,
}

impl<'v> Walker<'v> {
    /// Create a walker over the given tree with no visitors
    pub fn new(tree: Arc<Tree>) -> Self {
        Self {
            tree,
            visitors: Vec::new(),
            buffer: Vec::new(),
        }
    }

    /// Build a tree rooted at `root` and register the given visitors in order
    pub fn build<I, V>(root: impl AsRef<Path>, visitors: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = V>,
        V: Visitor + 'v,
    {
        let tree = Tree::build(root)?;
        let mut walker = Walker::new(Arc::new(tree));
        for visitor in visitors {
            walker.add_visitor(visitor);
        }
        Ok(walker)
    }

    /// Register a visitor. Visitors run in registration order.
    pub fn add_visitor(&mut self, visitor: impl Visitor + 'v) {
        self.visitors.push(Box::new(visitor));
    }

    pub fn tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    pub fn visitor_count(&self) -> usize {
        self.visitors.len()
    }

    /// Walk the tree and run the visitors on every wanted entry.
    ///
    /// Directories are visited pre-order. Only entries at least one visitor
    /// wants are ever read, and each is read once into a shared buffer that
    /// is replayed from the start for every interested visitor.
    #[instrument(skip(self), fields(visitors = self.visitors.len()))]
    pub fn walk(&mut self) -> WalkReport {
        let start = Instant::now();
        let mut report = WalkReport::default();
        let Walker {
            tree,
            visitors,
            buffer,
        } = self;

        tree.traverse(|dir| {
            for entry in dir.entries().values() {
                dispatch(entry, visitors, buffer, &mut report);
            }
        });

        info!(
            files_read = report.files_read,
            deliveries = report.deliveries,
            read_failures = report.read_failures.len(),
            visitor_failures = report.visitor_failures.len(),
            duration_ms = start.elapsed().as_millis(),
            "Walk completed"
        );
        report
    }
}

/// Deliver one entry to every interested visitor
fn dispatch(
    entry: &Entry,
    visitors: &mut [Box<dyn Visitor + '_>],
    buffer: &mut Vec<u8>,
    report: &mut WalkReport,
) {
    let mut opened = false;

    for (index, visitor) in visitors.iter_mut().enumerate() {
        if !visitor.wants(entry.extension()) {
            continue;
        }

        if !opened {
            if let Err(e) = read_into(entry.absolute(), buffer) {
                warn!(relative = %entry.relative(), "Skipping unreadable file: {}", e);
                report.read_failures.push(ReadFailure {
                    relative: entry.relative().to_string(),
                    error: e,
                });
                return;
            }
            trace!(relative = %entry.relative(), bytes = buffer.len(), "Read file");
            report.files_read += 1;
            opened = true;
        }

        let mut content = Cursor::new(buffer.as_slice());
        report.deliveries += 1;
        if let Err(e) = visitor.visit(entry, &mut content) {
            debug!(relative = %entry.relative(), visitor = index, "Visitor failed: {:#}", e);
            report.visitor_failures.push(VisitorFailure {
                relative: entry.relative().to_string(),
                visitor: index,
                error: e,
            });
        }
    }
}

/// Read a whole file into `buffer`, replacing its contents. The file handle is
/// closed before returning.
fn read_into(path: &Path, buffer: &mut Vec<u8>) -> std::io::Result<()> {
    buffer.clear();
    let mut file = File::open(path)?;
    file.read_to_end(buffer)?;
    Ok(())
}
