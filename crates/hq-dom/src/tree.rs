//! DOM Tree (arena-based allocation)

use std::collections::HashMap;

use crate::{ElementData, InternedString, Node, NodeData, NodeId, StringInterner};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    /// Pre-order position of every node, filled by `finalize`
    positions: Vec<u32>,
    /// Element sibling indexes, filled by `finalize`
    siblings: Vec<SiblingIndex>,
    interner: StringInterner,
}

/// 1-based place of an element among its parent's element children.
/// All zero for non-elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiblingIndex {
    pub index: u32,
    pub count: u32,
    /// Same as `index`/`count`, restricted to siblings with the same tag
    pub type_index: u32,
    pub type_count: u32,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            positions: Vec::new(),
            siblings: Vec::new(),
            interner: StringInterner::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.interner.resolve(id)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        let name = self.interner.intern(local_name);
        self.push(Node::new(NodeData::Element(ElementData::new(name))))
    }

    /// Add an attribute to an element, keeping the id/class caches current
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let name_id = self.interner.intern(name);
        let id_cache = (name == "id").then(|| self.interner.intern(value));
        let class_cache: Vec<InternedString> = if name == "class" {
            value
                .split_ascii_whitespace()
                .map(|class| self.interner.intern(class))
                .collect()
        } else {
            Vec::new()
        };

        let Some(NodeData::Element(elem)) = self.nodes.get_mut(id.index()).map(|n| &mut n.data) else {
            return;
        };
        if elem.get_attr(name_id).is_some() {
            return;
        }
        if id_cache.is_some() {
            elem.id = id_cache;
        }
        for class in class_cache {
            if !elem.has_class(class) {
                elem.classes.push(class);
            }
        }
        elem.push_attr(name_id, value.to_string());
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::new(NodeData::Text(content.to_string())))
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::new(NodeData::Comment(content.to_string())))
    }

    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.push(Node::new(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }))
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.push(Node::new(NodeData::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        }))
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.index() >= self.nodes.len() || child.index() >= self.nodes.len() || parent == child {
            return;
        }

        let prev_last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = prev_last;
            node.next_sibling = NodeId::NONE;
        }
        if prev_last.is_valid() {
            self.nodes[prev_last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    /// Assign document-order positions. Call once construction is done.
    pub fn finalize(&mut self) {
        let mut positions = vec![u32::MAX; self.nodes.len()];
        positions[NodeId::ROOT.index()] = 0;
        for (order, id) in self.descendants(NodeId::ROOT).enumerate() {
            positions[id.index()] = order as u32 + 1;
        }
        self.positions = positions;
        self.siblings = self.compute_siblings();
        tracing::trace!(nodes = self.nodes.len(), "tree finalized");
    }

    fn compute_siblings(&self) -> Vec<SiblingIndex> {
        let mut siblings = vec![SiblingIndex::default(); self.nodes.len()];
        let mut per_type: HashMap<InternedString, u32> = HashMap::new();

        for parent in 0..self.nodes.len() {
            let parent = NodeId(parent as u32);
            per_type.clear();
            let mut count = 0;
            for (child, node) in self.children(parent) {
                if let Some(elem) = node.as_element() {
                    count += 1;
                    let of_type = per_type.entry(elem.name).or_default();
                    *of_type += 1;
                    siblings[child.index()].index = count;
                    siblings[child.index()].type_index = *of_type;
                }
            }
            if count == 0 {
                continue;
            }
            for (child, node) in self.children(parent) {
                if let Some(elem) = node.as_element() {
                    let entry = &mut siblings[child.index()];
                    entry.count = count;
                    entry.type_count = per_type.get(&elem.name).copied().unwrap_or(0);
                }
            }
        }
        siblings
    }

    /// Sibling index of an element in a finalized tree
    #[inline]
    pub fn sibling_index(&self, id: NodeId) -> Option<SiblingIndex> {
        self.siblings.get(id.index()).copied().filter(|s| s.index > 0)
    }

    /// Pre-order position of a node; `u32::MAX` for detached nodes
    #[inline]
    pub fn position(&self, id: NodeId) -> u32 {
        self.positions.get(id.index()).copied().unwrap_or(u32::MAX)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Iterate over all descendants of a node in document order, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants { tree: self, root: id, next }
    }

    /// Next node in pre-order after `id`'s subtree, staying inside `root`
    fn following(&self, mut id: NodeId, root: NodeId) -> NodeId {
        while id != root {
            let Some(node) = self.get(id) else {
                return NodeId::NONE;
            };
            if node.next_sibling.is_valid() {
                return node.next_sibling;
            }
            id = node.parent;
        }
        NodeId::NONE
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| self.resolve(e.name))
    }

    /// Attribute value by name, matched ASCII case-insensitively
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        let elem = self.element(id)?;
        elem.attrs
            .iter()
            .find(|a| self.resolve(a.name).eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.push_text(id, &mut out);
        out
    }

    pub fn push_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            out.push_str(text);
            return;
        }
        for node in self.descendants(id) {
            if let Some(text) = self.get(node).and_then(Node::as_text) {
                out.push_str(text);
            }
        }
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        let payload: usize = self
            .nodes
            .iter()
            .map(|n| match &n.data {
                NodeData::Text(t) | NodeData::Comment(t) => t.capacity(),
                NodeData::Element(e) => e.attrs.iter().map(|a| a.value.capacity()).sum(),
                _ => 0,
            })
            .sum();
        self.nodes.capacity() * std::mem::size_of::<Node>()
            + self.positions.capacity() * std::mem::size_of::<u32>()
            + self.siblings.capacity() * std::mem::size_of::<SiblingIndex>()
            + self.interner.memory_usage()
            + payload
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;
        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            self.tree.following(current, self.root)
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// <div id="a"><p>x</p><p>y</p></div><span/>
    fn sample() -> (DomTree, [NodeId; 6]) {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.set_attr(div, "id", "a");
        let p1 = tree.create_element("p");
        let x = tree.create_text("x");
        let p2 = tree.create_element("p");
        let y = tree.create_text("y");
        let span = tree.create_element("span");
        tree.append_child(NodeId::ROOT, div);
        tree.append_child(div, p1);
        tree.append_child(p1, x);
        tree.append_child(div, p2);
        tree.append_child(p2, y);
        tree.append_child(NodeId::ROOT, span);
        tree.finalize();
        (tree, [div, p1, x, p2, y, span])
    }

    #[test]
    fn test_descendants_preorder() {
        let (tree, ids) = sample();
        let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
        assert_eq!(order, ids.to_vec());
    }

    #[test]
    fn test_descendants_stay_in_subtree() {
        let (tree, [div, p1, x, p2, y, _]) = sample();
        let order: Vec<NodeId> = tree.descendants(div).collect();
        assert_eq!(order, vec![p1, x, p2, y]);
        assert_eq!(tree.descendants(x).count(), 0);
    }

    #[test]
    fn test_positions_follow_preorder() {
        let (tree, ids) = sample();
        for pair in ids.windows(2) {
            assert!(tree.position(pair[0]) < tree.position(pair[1]));
        }
        assert_eq!(tree.position(NodeId::ROOT), 0);
    }

    #[test]
    fn test_sibling_index() {
        let (tree, [div, p1, x, p2, _, span]) = sample();
        let first = tree.sibling_index(p1).unwrap();
        assert_eq!((first.index, first.count, first.type_index, first.type_count), (1, 2, 1, 2));
        let second = tree.sibling_index(p2).unwrap();
        assert_eq!((second.index, second.type_index), (2, 2));

        // div and span are both children of the document node
        let top = tree.sibling_index(span).unwrap();
        assert_eq!((top.index, top.count, top.type_index, top.type_count), (2, 2, 1, 1));
        assert_eq!(tree.sibling_index(div).unwrap().index, 1);

        assert_eq!(tree.sibling_index(x), None);
    }

    #[test]
    fn test_sibling_index_needs_finalize() {
        let mut tree = DomTree::new();
        let p = tree.create_element("p");
        tree.append_child(NodeId::ROOT, p);
        assert_eq!(tree.sibling_index(p), None);
        tree.finalize();
        assert!(tree.sibling_index(p).is_some());
    }

    #[test]
    fn test_children_and_parent() {
        let (tree, [div, p1, _, p2, _, _]) = sample();
        let kids: Vec<NodeId> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(kids, vec![p1, p2]);
        assert_eq!(tree.parent(p1), Some(div));
        assert_eq!(tree.parent(NodeId::ROOT), None);
    }

    #[test]
    fn test_attr_and_text() {
        let (tree, [div, ..]) = sample();
        assert_eq!(tree.attr(div, "id"), Some("a"));
        assert_eq!(tree.attr(div, "ID"), Some("a"));
        assert_eq!(tree.attr(div, "class"), None);
        assert_eq!(tree.text_content(div), "xy");
        assert_eq!(tree.tag_name(div), Some("div"));
    }

    #[test]
    fn test_class_cache() {
        let mut tree = DomTree::new();
        let table = tree.create_element("table");
        tree.set_attr(table, "class", "comment-tree  wide");
        let elem = tree.element(table).unwrap();
        assert_eq!(elem.classes.len(), 2);
        let class = tree.interner().lookup("comment-tree").unwrap();
        assert!(elem.has_class(class));
    }
}
