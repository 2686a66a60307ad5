//! HTML5 Parser implementation
//!
//! Parses into html5ever's RcDom and converts the result into the arena tree.

use std::io::Read;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use hq_dom::{Document, DomTree, NodeId};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::ParseError;

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML string. Never fails: html5ever recovers from any markup.
    pub fn parse(&self, html: &str) -> Document {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let document = self.convert(&dom);
        tracing::debug!(
            bytes = html.len(),
            nodes = document.tree().len(),
            "parsed HTML document"
        );
        document
    }

    /// Parse raw bytes, which must be UTF-8
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Document, ParseError> {
        let html = std::str::from_utf8(bytes)?;
        Ok(self.parse(html))
    }

    /// Parse from a reader. Invalid UTF-8 sequences are replaced, read
    /// failures are reported.
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Document, ParseError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut reader)?;
        Ok(self.convert(&dom))
    }

    /// Convert an RcDom into the arena tree.
    ///
    /// Walks with an explicit stack so deeply nested input cannot exhaust the
    /// native stack. Nodes are created in pre-order.
    fn convert(&self, dom: &RcDom) -> Document {
        let mut tree = DomTree::new();
        let mut stack: Vec<(Handle, NodeId)> = Vec::new();
        push_children(&mut stack, &dom.document, NodeId::ROOT);

        while let Some((handle, parent)) = stack.pop() {
            let id = match &handle.data {
                RcNodeData::Document => continue,
                RcNodeData::Doctype {
                    name,
                    public_id,
                    system_id,
                } => tree.create_doctype(name, public_id, system_id),
                RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
                RcNodeData::Comment { contents } => tree.create_comment(contents),
                RcNodeData::ProcessingInstruction { target, contents } => {
                    tree.create_processing_instruction(target, contents)
                }
                RcNodeData::Element {
                    name,
                    attrs,
                    template_contents,
                    ..
                } => {
                    let id = tree.create_element(&name.local);
                    for attr in attrs.borrow().iter() {
                        tree.set_attr(id, &attr.name.local, &attr.value);
                    }
                    tree.append_child(parent, id);

                    // Template contents live in a separate fragment; expose them as children
                    if let Some(contents) = template_contents.borrow().as_ref() {
                        push_children(&mut stack, contents, id);
                    }
                    push_children(&mut stack, &handle, id);
                    continue;
                }
            };
            tree.append_child(parent, id);
        }

        Document::from_tree(tree)
    }
}

/// Push children in reverse so they pop in document order
fn push_children(stack: &mut Vec<(Handle, NodeId)>, handle: &Handle, parent: NodeId) {
    for child in handle.children.borrow().iter().rev() {
        stack.push((child.clone(), parent));
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}
