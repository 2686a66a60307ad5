//! Document - an immutable parsed tree

use crate::{DomTree, NodeId};

/// Parsed HTML document
///
/// A document is built once and never mutated afterwards, which is what lets
/// selections hold plain `NodeId`s for as long as the document lives.
#[derive(Debug)]
pub struct Document {
    tree: DomTree,
}

impl Document {
    /// Wrap a fully built tree, assigning document-order positions
    pub fn from_tree(mut tree: DomTree) -> Self {
        tree.finalize();
        Self { tree }
    }

    /// A document with no content besides the document node
    pub fn empty() -> Self {
        Self::from_tree(DomTree::new())
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Number of element nodes
    pub fn element_count(&self) -> usize {
        self.tree
            .descendants(self.root())
            .filter(|&id| self.tree.element(id).is_some())
            .count()
    }

    /// Memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.tree.memory_usage()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
