use super::*;

const BASIC: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect id="a"/><g id="g"><circle id="c"/></g></svg>"#;

fn first_child(doc: &Document) -> NodeId {
    doc.child_elements(doc.root())[0]
}

// =============================================================
// Parse / serialize
// =============================================================

#[test]
fn untouched_document_serializes_verbatim() {
    let input = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- made by hand -->\n<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" viewBox=\"0 0 10 10\">\n  <!-- inner -->\n  <image xlink:href=\"a.png\" width=\"5\"/>\n  <text x=\"1\">a &amp; b</text>\n</svg>\n";
    let doc = Document::parse(input).unwrap();
    assert_eq!(doc.to_string(), input);
}

#[test]
fn doctype_is_accepted_and_kept() {
    let input = "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
    let doc = Document::parse(input).unwrap();
    assert_eq!(doc.to_string(), input);
}

#[test]
fn non_svg_root_is_rejected() {
    let err = Document::parse("<html/>").unwrap_err();
    assert!(matches!(err, SvgError::NotSvg(ref tag) if tag == "html"));
}

#[test]
fn malformed_xml_is_rejected() {
    assert!(matches!(Document::parse("<svg><rect></svg>"), Err(SvgError::Parse(_))));
    assert!(matches!(Document::parse(""), Err(SvgError::Parse(_))));
}

#[test]
fn attribute_values_are_escaped() {
    let mut doc = Document::parse(BASIC).unwrap();
    let rect = first_child(&doc);
    doc.set_attribute(rect, "data-note", "say \"hi\" & <bye>");
    assert!(
        doc.to_string()
            .contains(r#"data-note="say &quot;hi&quot; &amp; &lt;bye&gt;""#)
    );
}

#[test]
fn prefixed_tag_names_survive() {
    let input = r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"><svg:rect id="a"/></svg:svg>"#;
    let doc = Document::parse(input).unwrap();
    assert_eq!(doc.tag(first_child(&doc)), Some("rect"));
    assert_eq!(doc.to_string(), input);
}

// =============================================================
// Attributes
// =============================================================

#[test]
fn set_attribute_keeps_position() {
    let mut doc = Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect a="1" b="2" c="3"/></svg>"#).unwrap();
    let rect = first_child(&doc);
    doc.set_attribute(rect, "b", "9");
    doc.set_attribute(rect, "d", "4");
    assert!(doc.to_string().contains(r#"<rect a="1" b="9" c="3" d="4"/>"#));
}

#[test]
fn namespaced_attribute_declares_prefix_on_root() {
    let mut doc = Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><image/></svg>"#).unwrap();
    let image = first_child(&doc);
    doc.set_attribute_ns(image, Some(XLINK_NS), "xlink:href", "x.png");
    let out = doc.to_string();
    assert_eq!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><image xlink:href="x.png"/></svg>"#
    );
    assert!(Document::parse(&out).is_ok());
}

#[test]
fn existing_prefix_is_not_redeclared() {
    let input = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><image/></svg>"#;
    let mut doc = Document::parse(input).unwrap();
    let image = first_child(&doc);
    doc.set_attribute_ns(image, Some(XLINK_NS), "xlink:href", "y.png");
    assert_eq!(doc.to_string().matches("xmlns:xlink").count(), 1);
}

#[test]
fn remove_and_clear_attributes() {
    let mut doc = Document::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect a="1" b="2"/></svg>"#).unwrap();
    let rect = first_child(&doc);
    doc.remove_attribute(rect, "a");
    assert_eq!(doc.attribute(rect, "a"), None);
    assert_eq!(doc.attribute(rect, "b"), Some("2"));
    doc.clear_attributes(rect);
    assert!(doc.to_string().contains("<rect/>"));
}

// =============================================================
// Structure
// =============================================================

#[test]
fn descendants_are_pre_order() {
    let doc = Document::parse(BASIC).unwrap();
    let ids: Vec<_> = doc
        .descendant_elements(doc.root())
        .into_iter()
        .filter_map(|n| doc.attribute(n, "id"))
        .collect();
    assert_eq!(ids, ["a", "g", "c"]);
}

#[test]
fn clone_insert_and_detach() {
    let mut doc = Document::parse(BASIC).unwrap();
    let rect = first_child(&doc);
    let copy = doc.deep_clone(rect);
    doc.set_attribute(copy, "id", "b");
    doc.insert_after(rect, copy);
    assert!(doc.to_string().contains(r#"<rect id="a"/><rect id="b"/><g id="g">"#));

    doc.detach(rect);
    assert!(doc.to_string().contains(r#"<svg xmlns="http://www.w3.org/2000/svg"><rect id="b"/>"#));
    assert_eq!(doc.parent(rect), None);
}

#[test]
fn deep_clone_copies_children() {
    let mut doc = Document::parse(BASIC).unwrap();
    let group = doc.child_elements(doc.root())[1];
    let copy = doc.deep_clone(group);
    doc.insert_after(group, copy);
    assert_eq!(doc.to_string().matches(r#"<circle id="c"/>"#).count(), 2);
}

#[test]
fn reorder_children_changes_output_order() {
    let mut doc = Document::parse(BASIC).unwrap();
    let root = doc.root();
    let mut children = doc.children(root).to_vec();
    children.reverse();
    doc.reorder_children(root, children);
    assert!(doc.to_string().contains(r#"<g id="g"><circle id="c"/></g><rect id="a"/>"#));
}

#[test]
fn set_text_replaces_children() {
    let mut doc = Document::parse(
        r#"<svg xmlns="http://www.w3.org/2000/svg"><text><tspan x="0">one</tspan><tspan x="0">two</tspan></text></svg>"#,
    )
    .unwrap();
    let text = first_child(&doc);
    assert_eq!(doc.text_content(text), "onetwo");
    doc.set_text(text, "a < b");
    assert!(doc.to_string().contains("<text>a &lt; b</text>"));
    assert_eq!(doc.own_text(text), "a < b");
}

#[test]
fn find_by_attribute_searches_whole_tree() {
    let doc = Document::parse(BASIC).unwrap();
    let circle = doc.find_by_attribute("id", "c").unwrap();
    assert_eq!(doc.tag(circle), Some("circle"));
    assert_eq!(doc.find_by_attribute("id", "zzz"), None);
}

#[test]
fn hoisting_moves_children_into_the_slot() {
    let mut doc = Document::parse(r#"<svg><a/><g id="grp"><b/><c/></g><d/></svg>"#).unwrap();
    let group = doc.find_by_attribute("id", "grp").unwrap();
    doc.hoist_children(group);
    assert_eq!(doc.to_string(), "<svg><a/><b/><c/><d/></svg>");
    assert_eq!(doc.parent(group), None);
}
