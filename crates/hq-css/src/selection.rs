//! Selections
//!
//! An ordered set of nodes drawn from one document. A selection never owns
//! its document: it keeps a `Weak` reference and fails cleanly once the
//! owner has released the tree.

use std::rc::{Rc, Weak};

use hq_dom::{Document, NodeId};

use crate::{SelectionError, SelectorList};

/// Ordered node set over a document
#[derive(Debug, Clone)]
pub struct Selection {
    document: Weak<Document>,
    nodes: Vec<NodeId>,
}

impl Selection {
    /// Selection holding only the document node; `find` on it searches the whole tree
    pub fn root(document: &Rc<Document>) -> Self {
        Self {
            document: Rc::downgrade(document),
            nodes: vec![document.root()],
        }
    }

    /// Selection over the given nodes, kept in the given order
    pub fn from_nodes(document: &Rc<Document>, nodes: Vec<NodeId>) -> Self {
        Self {
            document: Rc::downgrade(document),
            nodes,
        }
    }

    /// Empty selection over the same document
    pub fn empty(&self) -> Self {
        Self {
            document: self.document.clone(),
            nodes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Whether the originating document is still alive
    pub fn is_live(&self) -> bool {
        self.document.strong_count() > 0
    }

    /// The originating document
    pub fn document(&self) -> Result<Rc<Document>, SelectionError> {
        self.document.upgrade().ok_or(SelectionError::DocumentReleased)
    }

    /// Singleton selection of the node at `index`, empty when out of range
    pub fn eq(&self, index: usize) -> Self {
        Self {
            document: self.document.clone(),
            nodes: self.nodes.get(index).copied().into_iter().collect(),
        }
    }

    /// Query the descendants of every node in the selection.
    ///
    /// Invalid selector text yields an empty selection, exactly like a
    /// selector that matches nothing. Use [`SelectorList::parse`] and
    /// [`Selection::select`] to observe the syntax error.
    pub fn find(&self, selector: &str) -> Result<Self, SelectionError> {
        match SelectorList::parse(selector) {
            Ok(list) => self.select(&list),
            Err(err) => {
                tracing::trace!(selector, %err, "selector rejected, returning empty selection");
                let _ = self.document()?;
                Ok(self.empty())
            }
        }
    }

    /// Query with a parsed selector list.
    ///
    /// The result is the union of each node's matching descendants, without
    /// duplicates, in document order. Matching may look at ancestors above
    /// the selection, only the returned nodes are restricted to descendants.
    pub fn select(&self, selectors: &SelectorList) -> Result<Self, SelectionError> {
        let document = self.document()?;
        let tree = document.tree();

        let mut found: Vec<NodeId> = Vec::new();
        if !selectors.is_empty() {
            for &scope in &self.nodes {
                found.extend(tree.descendants(scope).filter(|&id| selectors.matches(tree, id)));
            }
        }

        // Each scope yields pre-order results already; only overlapping or
        // out-of-order scopes need the merge.
        if self.nodes.len() > 1 {
            found.sort_unstable_by_key(|&id| tree.position(id));
            found.dedup();
        }

        tracing::trace!(scopes = self.nodes.len(), matched = found.len(), "selection query");
        Ok(Self {
            document: self.document.clone(),
            nodes: found,
        })
    }

    /// Attribute of the first node. `None` when the selection is empty or
    /// the first node lacks the attribute.
    pub fn attr(&self, name: &str) -> Result<Option<String>, SelectionError> {
        let document = self.document()?;
        Ok(self
            .nodes
            .first()
            .and_then(|&id| document.tree().attr(id, name))
            .map(str::to_string))
    }

    /// Combined text content of all nodes, in selection order
    pub fn text(&self) -> Result<String, SelectionError> {
        let document = self.document()?;
        let mut out = String::new();
        for &id in &self.nodes {
            document.tree().push_text(id, &mut out);
        }
        Ok(out)
    }
}
