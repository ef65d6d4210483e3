use xmlquill::document::matcher::{
    find_attributes_by_name, find_elements_by_name, find_first_element_by_name,
};
use xmlquill::document::parser::{parse_document, ParseOptions};
use xmlquill::document::tree::ParsedDocument;

fn parse(xml: &str) -> ParsedDocument {
    parse_document("m.xml", xml.as_bytes(), &ParseOptions::default()).unwrap()
}

#[test]
fn test_root_is_included() {
    let doc = parse("<item><item/></item>");
    assert_eq!(find_elements_by_name(&doc, "item"), vec![vec![], vec![0]]);
    assert_eq!(find_first_element_by_name(&doc, "item"), Some(vec![]));
}

#[test]
fn test_depth_is_unbounded() {
    let doc = parse("<a><b><c><d><e><target/></e></d></c></b></a>");
    assert_eq!(
        find_elements_by_name(&doc, "target"),
        vec![vec![0, 0, 0, 0, 0]]
    );
}

#[test]
fn test_namespaces_are_ignored() {
    let doc = parse(r#"<root xmlns:a="urn:a" xmlns="urn:d"><a:id/><id/></root>"#);
    assert_eq!(find_elements_by_name(&doc, "id").len(), 2);
    assert!(find_elements_by_name(&doc, "a:id").is_empty());
}

#[test]
fn test_namespace_declarations_are_not_attributes() {
    let doc = parse(r#"<root xmlns:x="urn:x" x:lang="en"/>"#);
    assert!(find_attributes_by_name(&doc, "x").is_empty());
    assert!(find_attributes_by_name(&doc, "xmlns").is_empty());
    assert_eq!(find_attributes_by_name(&doc, "lang").len(), 1);
}

#[test]
fn test_element_and_attribute_results_are_independent() {
    let doc = parse(r#"<root><id id="1">x</id></root>"#);
    assert_eq!(find_elements_by_name(&doc, "id"), vec![vec![0]]);

    let attrs = find_attributes_by_name(&doc, "id");
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs[0].element, vec![0]);
    assert_eq!(attrs[0].index, 0);
}

#[test]
fn test_first_match_is_pre_order_not_shallowest() {
    let doc = parse("<root><group><note>deep</note></group><note>shallow</note></root>");
    let first = find_first_element_by_name(&doc, "note").unwrap();
    assert_eq!(doc.get_element(&first).unwrap().value(), "deep");
}
