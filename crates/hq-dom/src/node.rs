//! DOM Node
//!
//! Nodes link to each other through `NodeId`s instead of pointers, so the
//! whole tree lives in one `Vec` and can be dropped in one go.

use smallvec::SmallVec;

use crate::{InternedString, NodeId};

/// DOM Node
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE for the document node)
    pub parent: NodeId,
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Element(ElementData),
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Local tag name, lowercase for HTML elements
    pub name: InternedString,
    pub attrs: SmallVec<[Attribute; 4]>,
    /// Cached `id` attribute
    pub id: Option<InternedString>,
    /// Cached class list
    pub classes: SmallVec<[InternedString; 4]>,
}

impl ElementData {
    pub fn new(name: InternedString) -> Self {
        Self {
            name,
            attrs: SmallVec::new(),
            id: None,
            classes: SmallVec::new(),
        }
    }

    /// Get an attribute value by interned name
    pub fn get_attr(&self, name: InternedString) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute. The first occurrence of a name wins, as in HTML.
    pub fn push_attr(&mut self, name: InternedString, value: String) {
        if self.attrs.iter().any(|a| a.name == name) {
            return;
        }
        self.attrs.push(Attribute { name, value });
    }

    #[inline]
    pub fn has_class(&self, class: InternedString) -> bool {
        self.classes.contains(&class)
    }
}

/// Attribute
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: InternedString,
    pub value: String,
}
