//! Integration tests for the HTML fragment reader.

use bracken_dom::reader::parse_fragment;
use bracken_dom::{ElementTree, NodeId, NodeType};

/// Helper to get the first element with the given tag name, depth-first.
fn find_element(tree: &ElementTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if tree.as_element(from).is_some_and(|e| e.tag_name == tag) {
        return Some(from);
    }
    for &child in tree.children(from) {
        if let Some(found) = find_element(tree, child, tag) {
            return Some(found);
        }
    }
    None
}

#[test]
fn test_simple_fragment() {
    let tree = parse_fragment("<div><strong>hi</strong></div>");
    let div = find_element(&tree, tree.root(), "div").unwrap();
    let strong = find_element(&tree, div, "strong").unwrap();
    assert_eq!(tree.text_content(strong), "hi");
}

#[test]
fn test_attributes() {
    let tree = parse_fragment(r#"<a href="http://a.com/x" target=_blank data-x>link</a>"#);
    let a = find_element(&tree, tree.root(), "a").unwrap();
    let element = tree.as_element(a).unwrap();
    assert_eq!(element.attr("href"), Some("http://a.com/x"));
    assert_eq!(element.attr("target"), Some("_blank"));
    assert_eq!(element.attr("data-x"), Some(""));
}

#[test]
fn test_void_and_self_closing_elements() {
    let tree = parse_fragment("<div>a<br>b<img src=\"x.png\" /></div>");
    let div = find_element(&tree, tree.root(), "div").unwrap();
    // br and img must not swallow following content as children.
    assert_eq!(tree.children(div).len(), 4);
    let br = find_element(&tree, div, "br").unwrap();
    assert!(tree.children(br).is_empty());
}

#[test]
fn test_entities_unescaped() {
    let tree = parse_fragment("<div>a &lt;b&gt; &amp; &#65;</div>");
    let div = find_element(&tree, tree.root(), "div").unwrap();
    assert_eq!(tree.text_content(div), "a <b> & A");
}

#[test]
fn test_comments_and_declarations_skipped() {
    let tree = parse_fragment("<!-- note --><!DOCTYPE html><div>x</div>");
    let root_children = tree.children(tree.root());
    assert_eq!(root_children.len(), 1);
    assert_eq!(tree.text_content(tree.root()), "x");
}

#[test]
fn test_mismatched_close_recovers() {
    // </em> matches nothing and is dropped; </div> closes through <span>.
    let tree = parse_fragment("<div><span>a</em>b</div>c");
    let div = find_element(&tree, tree.root(), "div").unwrap();
    let span = find_element(&tree, div, "span").unwrap();
    assert_eq!(tree.text_content(span), "ab");
    assert_eq!(tree.text_content(tree.root()), "abc");
}

#[test]
fn test_stray_angle_bracket_is_text() {
    let tree = parse_fragment("a < b");
    assert_eq!(tree.text_content(tree.root()), "a < b");
}

#[test]
fn test_unclosed_tags_never_fail() {
    let tree = parse_fragment("<div><em>x");
    let em = find_element(&tree, tree.root(), "em").unwrap();
    assert_eq!(tree.text_content(em), "x");
}
