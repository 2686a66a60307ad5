//! Selector matching against the arena tree
//!
//! Complex selectors are matched right to left: the subject compound is
//! checked against the candidate element, then each combinator walks to
//! ancestors or previous siblings.

use std::collections::HashSet;

use hq_dom::{DomTree, NodeId};

use crate::selectors::{
    Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorComponent, SelectorList,
};

impl SelectorList {
    /// True if any selector in the list matches the element
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.element(id).is_some() && self.0.iter().any(|sel| sel.matches(tree, id))
    }
}

impl ComplexSelector {
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        if !self.subject.matches(tree, id) {
            return false;
        }
        let mut failed = HashSet::new();
        match_ancestors(tree, id, &self.ancestors, &mut failed)
    }
}

/// Match the remaining compounds leftward from `id`.
///
/// `failed` records `(remaining compounds, node)` pairs already known not to
/// match. Whether the rest of the chain matches from a node does not depend
/// on how the walk reached it, so each pair is tried at most once and the
/// descendant and sibling walks stay polynomial in tree depth.
fn match_ancestors(
    tree: &DomTree,
    id: NodeId,
    chain: &[(Combinator, CompoundSelector)],
    failed: &mut HashSet<(usize, NodeId)>,
) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };

    let hit = |candidate: NodeId, failed: &mut HashSet<(usize, NodeId)>| {
        let key = (rest.len(), candidate);
        if failed.contains(&key) {
            return false;
        }
        let matched = compound.matches(tree, candidate) && match_ancestors(tree, candidate, rest, failed);
        if !matched {
            failed.insert(key);
        }
        matched
    };

    match combinator {
        Combinator::Child => parent_element(tree, id).is_some_and(|p| hit(p, failed)),
        Combinator::Descendant => {
            let mut current = parent_element(tree, id);
            while let Some(ancestor) = current {
                if hit(ancestor, failed) {
                    return true;
                }
                current = parent_element(tree, ancestor);
            }
            false
        }
        Combinator::NextSibling => prev_element_sibling(tree, id).is_some_and(|s| hit(s, failed)),
        Combinator::SubsequentSibling => {
            let mut current = prev_element_sibling(tree, id);
            while let Some(sibling) = current {
                if hit(sibling, failed) {
                    return true;
                }
                current = prev_element_sibling(tree, sibling);
            }
            false
        }
    }
}

impl CompoundSelector {
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.element(id).is_some() && self.0.iter().all(|c| c.matches(tree, id))
    }
}

impl SelectorComponent {
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.element(id) else {
            return false;
        };

        match self {
            SelectorComponent::Universal => true,
            SelectorComponent::Type(tag) => tree.resolve(elem.name).eq_ignore_ascii_case(tag),
            SelectorComponent::Id(expected) => elem.id.is_some_and(|v| tree.resolve(v) == expected),
            SelectorComponent::Class(class) => elem.classes.iter().any(|&c| tree.resolve(c) == class),
            SelectorComponent::Attribute(attr) => attr.matches(tree.attr(id, &attr.name)),
            SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, tree, id),
        }
    }
}

fn match_pseudo_class(pseudo: &PseudoClass, tree: &DomTree, id: NodeId) -> bool {
    match pseudo {
        PseudoClass::Root => tree.parent(id) == Some(NodeId::ROOT),
        PseudoClass::Empty => !tree
            .children(id)
            .any(|(_, child)| child.is_element() || child.as_text().is_some_and(|t| !t.is_empty())),
        PseudoClass::FirstChild => sibling_position(tree, id, false).0 == 1,
        PseudoClass::LastChild => {
            let (index, count) = sibling_position(tree, id, false);
            index == count
        }
        PseudoClass::OnlyChild => sibling_position(tree, id, false).1 == 1,
        PseudoClass::FirstOfType => sibling_position(tree, id, true).0 == 1,
        PseudoClass::LastOfType => {
            let (index, count) = sibling_position(tree, id, true);
            index == count
        }
        PseudoClass::OnlyOfType => sibling_position(tree, id, true).1 == 1,
        PseudoClass::NthChild(expr) => expr.matches(sibling_position(tree, id, false).0 as i32),
        PseudoClass::NthLastChild(expr) => {
            let (index, count) = sibling_position(tree, id, false);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::NthOfType(expr) => expr.matches(sibling_position(tree, id, true).0 as i32),
        PseudoClass::NthLastOfType(expr) => {
            let (index, count) = sibling_position(tree, id, true);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::Not(inner) => !inner.iter().any(|c| c.matches(tree, id)),
    }
}

/// 1-based index among element siblings and the sibling count, optionally
/// restricted to siblings with the same tag
fn sibling_position(tree: &DomTree, id: NodeId, same_type: bool) -> (usize, usize) {
    if let Some(s) = tree.sibling_index(id) {
        let (index, count) = if same_type {
            (s.type_index, s.type_count)
        } else {
            (s.index, s.count)
        };
        return (index as usize, count as usize);
    }

    // Trees that were never finalized: scan the siblings
    let Some(parent) = tree.parent(id) else {
        return (1, 1);
    };
    let tag = tree.element(id).map(|e| e.name);

    let mut index = 0;
    let mut count = 0;
    for (sibling, node) in tree.children(parent) {
        let Some(elem) = node.as_element() else {
            continue;
        };
        if same_type && Some(elem.name) != tag {
            continue;
        }
        count += 1;
        if sibling == id {
            index = count;
        }
    }
    (index, count)
}

fn parent_element(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.parent(id).filter(|&p| tree.element(p).is_some())
}

fn prev_element_sibling(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    let mut current = tree.get(id)?.prev_sibling;
    while let Some(node) = tree.get(current) {
        if node.is_element() {
            return Some(current);
        }
        current = node.prev_sibling;
    }
    None
}
