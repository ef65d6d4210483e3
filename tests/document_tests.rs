use xmlquill::document::node::{XmlElement, XmlName, XmlNode};
use xmlquill::document::parser::{parse_document, ParseOptions};
use xmlquill::document::tree::ParsedDocument;

fn parse(xml: &str) -> ParsedDocument {
    parse_document("doc.xml", xml.as_bytes(), &ParseOptions::default()).unwrap()
}

#[test]
fn test_document_keeps_its_path() {
    let doc = parse("<root/>");
    assert_eq!(doc.path(), "doc.xml");
    assert_eq!(doc.revision(), 0);
}

#[test]
fn test_leaf_value_and_mixed_content() {
    let doc = parse("<root><leaf>text</leaf><mixed>a<b>b</b>c</mixed></root>");
    let leaf = doc.get_element(&[0]).unwrap();
    assert!(!leaf.has_elements());
    assert_eq!(leaf.value(), "text");

    let mixed = doc.get_element(&[1]).unwrap();
    assert!(mixed.has_elements());
    assert_eq!(mixed.child_count(), 1);
    assert_eq!(mixed.value(), "abc");
}

#[test]
fn test_cdata_counts_as_value() {
    let doc = parse("<root><code><![CDATA[a < b]]></code></root>");
    let code = doc.get_element(&[0]).unwrap();
    assert_eq!(code.value(), "a < b");
    assert_eq!(code.content(), &[XmlNode::CData("a < b".to_string())]);
}

#[test]
fn test_comments_are_not_children() {
    let doc = parse("<root><!-- one --><a/><!-- two --><b/></root>");
    assert_eq!(doc.root().child_count(), 2);
    assert_eq!(doc.root().content().len(), 4);
    assert_eq!(doc.get_element(&[1]).unwrap().local_name(), "b");
}

#[test]
fn test_attributes_keep_order() {
    let doc = parse(r#"<root z="1" a="2" m="3"/>"#);
    let names: Vec<&str> = doc.root().attributes().iter().map(|a| a.local_name()).collect();
    assert_eq!(names, vec!["z", "a", "m"]);
}

#[test]
fn test_doctype_goes_to_prolog() {
    let doc = parse("<!DOCTYPE root><root/>");
    assert!(matches!(doc.prolog()[0], XmlNode::DocType(_)));
}

#[test]
fn test_append_then_detach_round_trip() {
    let mut doc = parse("<root><list/></root>");
    let path = doc
        .append_child(&[0], XmlElement::with_text(XmlName::new("item"), "1"))
        .unwrap();
    assert_eq!(doc.get_element(&path).unwrap().value(), "1");

    let removed = doc.detach(&path).unwrap();
    assert_eq!(removed.local_name(), "item");
    assert_eq!(doc.get_element(&[0]).unwrap().child_count(), 0);
    assert_eq!(doc.revision(), 2);
}

#[test]
fn test_set_value_on_leaf_keeps_structure() {
    let mut doc = parse("<root><item>1</item></root>");
    let dropped = doc.get_element_mut(&[0]).unwrap().set_value("2");
    assert!(!dropped);
    assert_eq!(doc.get_element(&[0]).unwrap().value(), "2");
}
