//! Selection query tests for hq-css
//!
//! Document order, union semantics and first-node attribute reads.

use std::rc::Rc;

use hq_css::{Selection, SelectorList};
use hq_dom::{Document, NodeId};

fn document(html: &str) -> Rc<Document> {
    Rc::new(hq_html::parse(html))
}

/// Reference pre-order walk using child links only
fn preorder_elements(doc: &Document) -> Vec<NodeId> {
    fn walk(doc: &Document, id: NodeId, out: &mut Vec<NodeId>) {
        for (child, node) in doc.tree().children(id) {
            if node.is_element() {
                out.push(child);
            }
            walk(doc, child, out);
        }
    }
    let mut out = Vec::new();
    walk(doc, doc.root(), &mut out);
    out
}

fn ids(selection: &Selection, doc: &Document) -> Vec<String> {
    selection
        .nodes()
        .iter()
        .map(|&id| doc.tree().attr(id, "id").unwrap_or("?").to_string())
        .collect()
}

// ============================================================================
// DOCUMENT ORDER
// ============================================================================

#[test]
fn test_universal_matches_preorder() {
    let doc = document(
        r#"<div><p>a<b>b</b></p><ul><li>1</li><li>2<i>x</i></li></ul></div><table><tr><td>c</td></tr></table>"#,
    );
    let all = Selection::root(&doc).find("*").unwrap();
    assert_eq!(all.nodes(), preorder_elements(&doc).as_slice());
}

#[test]
fn test_selector_list_results_in_document_order() {
    let doc = document(r#"<span id="s1"></span><div id="d1"><span id="s2"></span></div>"#);
    let found = Selection::root(&doc).find("div, span").unwrap();
    assert_eq!(ids(&found, &doc), vec!["s1", "d1", "s2"]);
}

// ============================================================================
// UNION / DE-DUPLICATION
// ============================================================================

#[test]
fn test_nested_scopes_return_descendant_once() {
    let doc = document(r#"<div id="outer"><div id="inner"><span id="d"></span></div></div>"#);
    let divs = Selection::root(&doc).find("div").unwrap();
    assert_eq!(divs.len(), 2);

    let spans = divs.find("span").unwrap();
    assert_eq!(ids(&spans, &doc), vec!["d"]);
}

#[test]
fn test_sibling_scopes_union_sorted() {
    let doc = document(
        r#"<section id="a"><em id="a1"></em><em id="a2"></em></section>
           <section id="b"><em id="b1"></em></section>"#,
    );
    let sections = Selection::root(&doc).find("section").unwrap();
    let ems = sections.find("em").unwrap();
    assert_eq!(ids(&ems, &doc), vec!["a1", "a2", "b1"]);
}

#[test]
fn test_out_of_order_scopes_are_sorted() {
    let doc = document(r#"<p id="p1"><b id="b1"></b></p><p id="p2"><b id="b2"></b></p>"#);
    let ps = Selection::root(&doc).find("p").unwrap();
    let reversed = Selection::from_nodes(&doc, vec![ps.nodes()[1], ps.nodes()[0], ps.nodes()[1]]);
    let bs = reversed.find("b").unwrap();
    assert_eq!(ids(&bs, &doc), vec!["b1", "b2"]);
}

#[test]
fn test_scope_itself_is_not_matched() {
    let doc = document(r#"<div id="x"><div id="y"></div></div>"#);
    let outer = Selection::root(&doc).find("#x").unwrap();
    let found = outer.find("div").unwrap();
    assert_eq!(ids(&found, &doc), vec!["y"]);
}

#[test]
fn test_combinator_may_reach_above_scope() {
    let doc = document(r#"<table id="t"><tr id="r"><td id="c"></td></tr></table>"#);
    let rows = Selection::root(&doc).find("tr").unwrap();
    let cells = rows.find("table td").unwrap();
    assert_eq!(ids(&cells, &doc), vec!["c"]);
}

#[test]
fn test_select_with_parsed_list() {
    let doc = document(r#"<a id="x" href="/"></a><a id="y"></a>"#);
    let list = SelectorList::parse("a[href]").unwrap();
    let links = Selection::root(&doc).select(&list).unwrap();
    assert_eq!(ids(&links, &doc), vec!["x"]);
}

// ============================================================================
// ATTR
// ============================================================================

#[test]
fn test_attr_reads_first_node_only() {
    let doc = document(r#"<table border="1"></table><table border="2"></table>"#);
    let tables = Selection::root(&doc).find("table").unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables.attr("border").unwrap().as_deref(), Some("1"));
}

#[test]
fn test_attr_absent_and_empty_are_both_none() {
    let doc = document(r#"<table></table><table border="2"></table>"#);
    let tables = Selection::root(&doc).find("table").unwrap();
    assert_eq!(tables.attr("border").unwrap(), None);

    let none = Selection::root(&doc).find("article").unwrap();
    assert_eq!(none.attr("border").unwrap(), None);
}

#[test]
fn test_comment_tree_border() {
    let doc = document(
        r#"<html><body><table class="comment-tree" border="1"><tr><td>hi</td></tr></table></body></html>"#,
    );
    let tree = Selection::root(&doc).find("table.comment-tree").unwrap();
    assert_eq!(tree.attr("border").unwrap().as_deref(), Some("1"));
}
