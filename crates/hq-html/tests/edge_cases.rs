//! Edge case and stress tests for hq-html
//!
//! Malformed markup must always produce a tree.

use hq_html::{Document, HtmlParser, ParseError};

fn tags(doc: &Document) -> Vec<String> {
    let tree = doc.tree();
    tree.descendants(doc.root())
        .filter_map(|id| tree.tag_name(id).map(str::to_string))
        .collect()
}

// ============================================================================
// EMPTY AND MINIMAL INPUT
// ============================================================================

#[test]
fn test_parse_empty_string() {
    let doc = HtmlParser::new().parse("");
    assert_eq!(tags(&doc), vec!["html", "head", "body"]);
}

#[test]
fn test_parse_null_bytes() {
    let doc = HtmlParser::new().parse("Hello\0World");
    assert!(doc.tree().len() > 1);
}

#[test]
fn test_parse_only_whitespace() {
    let doc = HtmlParser::new().parse("   \t\n\r\n   ");
    assert!(doc.tree().len() >= 1);
}

#[test]
fn test_parse_only_doctype() {
    let doc = HtmlParser::new().parse("<!DOCTYPE html>");
    assert!(doc.tree().len() > 1);
}

// ============================================================================
// MALFORMED HTML
// ============================================================================

#[test]
fn test_parse_unclosed_tags() {
    let doc = HtmlParser::new().parse("<div><p><span>text");
    assert_eq!(tags(&doc), vec!["html", "head", "body", "div", "p", "span"]);
    assert_eq!(doc.tree().text_content(doc.root()), "text");
}

#[test]
fn test_parse_mismatched_tags() {
    let doc = HtmlParser::new().parse("<div><p></div></p>");
    assert!(tags(&doc).contains(&"div".to_string()));
}

#[test]
fn test_parse_orphan_closing_tag() {
    let doc = HtmlParser::new().parse("</div>");
    assert_eq!(tags(&doc), vec!["html", "head", "body"]);
}

#[test]
fn test_parse_table_without_tbody() {
    // Browsers insert tbody; selectors like "table > tr" then match nothing
    let doc = HtmlParser::new().parse("<table><tr><td>1</td></tr></table>");
    assert_eq!(
        tags(&doc),
        vec!["html", "head", "body", "table", "tbody", "tr", "td"]
    );
}

#[test]
fn test_parse_stray_table_content() {
    let doc = HtmlParser::new().parse("<td>cell</td>");
    assert_eq!(doc.tree().text_content(doc.root()), "cell");
}

// ============================================================================
// ATTRIBUTES
// ============================================================================

#[test]
fn test_parse_attribute_variants() {
    let doc = HtmlParser::new().parse(r#"<input disabled value='' type=text data-x="a&amp;b">"#);
    let tree = doc.tree();
    let input = tree
        .descendants(doc.root())
        .find(|&id| tree.tag_name(id) == Some("input"))
        .unwrap();
    assert_eq!(tree.attr(input, "disabled"), Some(""));
    assert_eq!(tree.attr(input, "value"), Some(""));
    assert_eq!(tree.attr(input, "type"), Some("text"));
    assert_eq!(tree.attr(input, "data-x"), Some("a&b"));
}

#[test]
fn test_parse_duplicate_attribute_first_wins() {
    let doc = HtmlParser::new().parse(r#"<td border="1" border="2"></td>"#);
    let tree = doc.tree();
    let found: Vec<&str> = tree
        .descendants(doc.root())
        .filter_map(|id| tree.attr(id, "border"))
        .collect();
    assert!(found.iter().all(|&v| v == "1"));
}

#[test]
fn test_parse_uppercase_names_lowercased() {
    let doc = HtmlParser::new().parse(r#"<TABLE BORDER="1"></TABLE>"#);
    let tree = doc.tree();
    let table = tree
        .descendants(doc.root())
        .find(|&id| tree.tag_name(id) == Some("table"));
    assert!(table.is_some());
    assert_eq!(tree.attr(table.unwrap(), "border"), Some("1"));
}

// ============================================================================
// TEXT AND ENTITIES
// ============================================================================

#[test]
fn test_parse_named_entities() {
    let doc = HtmlParser::new().parse("<p>&lt;tag&gt; &amp; &quot;</p>");
    assert_eq!(doc.tree().text_content(doc.root()), "<tag> & \"");
}

#[test]
fn test_parse_utf8_content() {
    let doc = HtmlParser::new().parse("<p>日本語 ✓</p>");
    assert_eq!(doc.tree().text_content(doc.root()), "日本語 ✓");
}

#[test]
fn test_parse_whitespace_text_kept() {
    let doc = HtmlParser::new().parse("<p><b>a</b> <i>b</i></p>");
    assert_eq!(doc.tree().text_content(doc.root()), "a b");
}

#[test]
fn test_parse_script_content_is_text() {
    let doc = HtmlParser::new().parse("<script>if (a < b) { x = '</div>'; }</script>");
    let text = doc.tree().text_content(doc.root());
    assert!(text.starts_with("if (a < b)"));
}

// ============================================================================
// NON-TEXT INPUT
// ============================================================================

#[test]
fn test_parse_bytes_valid() {
    let doc = HtmlParser::new().parse_bytes(b"<p>ok</p>").unwrap();
    assert_eq!(doc.tree().text_content(doc.root()), "ok");
}

#[test]
fn test_parse_bytes_invalid_utf8() {
    let err = HtmlParser::new().parse_bytes(&[0xc3, 0x28]).unwrap_err();
    assert!(matches!(err, ParseError::InvalidUtf8(_)));
    assert!(err.to_string().contains("UTF-8"));
}

// ============================================================================
// STRESS TESTS
// ============================================================================

#[test]
fn test_parse_deeply_nested() {
    let depth = 5000;
    let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let doc = HtmlParser::new().parse(&html);
    assert_eq!(doc.tree().text_content(doc.root()), "x");
}

#[test]
fn test_parse_many_siblings() {
    let html: String = (0..2000).map(|i| format!("<li>{}</li>", i)).collect();
    let doc = HtmlParser::new().parse(&format!("<ul>{}</ul>", html));
    let count = tags(&doc).iter().filter(|t| *t == "li").count();
    assert_eq!(count, 2000);
}

#[test]
fn test_document_order_matches_creation() {
    let doc = HtmlParser::new().parse("<div><p>a</p><p>b</p></div><span></span>");
    let tree = doc.tree();
    let ids: Vec<_> = tree.descendants(doc.root()).collect();
    for pair in ids.windows(2) {
        assert!(tree.position(pair[0]) < tree.position(pair[1]));
    }
}
