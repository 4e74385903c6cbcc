//! Integration tests for the element tree.

use bracken_dom::{AttributeList, ElementTree, NodeId, NodeType};

#[test]
fn test_fragment_root() {
    let tree = ElementTree::new();
    assert!(matches!(
        tree.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Fragment)
    ));
    assert_eq!(tree.len(), 1);
    assert!(!tree.is_empty());
}

#[test]
fn test_build_and_traverse() {
    let mut tree = ElementTree::new();
    let div = tree.element(tree.root(), "DIV", AttributeList::new());
    let strong = tree.element(div, "strong", AttributeList::new());
    let text = tree.text(strong, "hi");

    // Tag names normalize to lowercase.
    assert_eq!(tree.as_element(div).map(|e| e.tag_name.as_str()), Some("div"));
    assert_eq!(tree.children(tree.root()), &[div]);
    assert_eq!(tree.children(div), &[strong]);
    assert_eq!(tree.parent(strong), Some(div));
    assert_eq!(tree.as_text(text), Some("hi"));
    assert_eq!(tree.text_content(tree.root()), "hi");
}

#[test]
fn test_attribute_order_preserved() {
    let mut attrs = AttributeList::new();
    attrs.set("href", "http://example.com");
    attrs.set("target", "_blank");
    attrs.set("href", "http://example.org");

    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["href", "target"]);
    assert_eq!(attrs.get("href"), Some("http://example.org"));
    assert_eq!(attrs.get("HREF"), Some("http://example.org"));
    assert_eq!(attrs.len(), 2);
}

#[test]
fn test_style_lookup() {
    let mut tree = ElementTree::new();
    let span = tree.element(
        tree.root(),
        "span",
        AttributeList::from_pairs([("style", "font-weight: bold; Color: #ff0000")]),
    );
    let element = tree.as_element(span).unwrap();
    assert_eq!(element.style("font-weight").as_deref(), Some("bold"));
    assert_eq!(element.style("color").as_deref(), Some("#ff0000"));
    assert_eq!(element.style("font-size"), None);
}

#[test]
fn test_text_content_concatenates_depth_first() {
    let mut tree = ElementTree::new();
    let div = tree.element(tree.root(), "div", AttributeList::new());
    let _ = tree.text(div, "a");
    let em = tree.element(div, "em", AttributeList::new());
    let _ = tree.text(em, "b");
    let _ = tree.text(div, "c");
    assert_eq!(tree.text_content(div), "abc");
}
