use super::*;

const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
  <defs><linearGradient id="grad"><stop offset="0"/></linearGradient></defs>
  <style>.a { fill: red; }</style>
  <rect width="10" height="10" fill="url(#grad)"/>
  <g id="group">
    <text id="Name.text.max_20" x="5" y="10">Ada</text>
    <rect/>
  </g>
  <text id="Address.textarea"><tspan x="0" y="0">Line one</tspan><tspan x="0" dy="1.2em">Line two</tspan></text>
  <image id="Logo.upload" xlink:href="data:image/png;base64,AAAA"/>
  <filter id="f"><feGaussianBlur stdDeviation="2"/></filter>
</svg>"##;

fn tags(elements: &[SvgElement]) -> Vec<&str> {
    elements.iter().map(|e| e.tag.as_str()).collect()
}

#[test]
fn enumeration_skips_resources_and_tspans() {
    let elements = parse_elements(TEMPLATE).unwrap();
    assert_eq!(tags(&elements), ["rect", "g", "text", "rect", "text", "image"]);
}

#[test]
fn origins_follow_document_order() {
    let elements = parse_elements(TEMPLATE).unwrap();
    for (i, element) in elements.iter().enumerate() {
        assert_eq!(element.origin, Origin::Source(i));
    }
}

#[test]
fn internal_ids_fall_back_to_tag_and_index() {
    let elements = parse_elements(TEMPLATE).unwrap();
    let ids: Vec<_> = elements.iter().map(|e| e.internal_id.as_str()).collect();
    assert_eq!(
        ids,
        ["rect_0", "group", "Name.text.max_20", "rect_3", "Address.textarea", "Logo.upload"]
    );
}

#[test]
fn duplicate_native_ids_are_disambiguated() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect id="a"/><rect id="a"/><rect id="a_2"/></svg>"#;
    let elements = parse_elements(svg).unwrap();
    let ids: Vec<_> = elements.iter().map(|e| e.internal_id.as_str()).collect();
    assert_eq!(ids, ["a", "a_2", "a_2_2"]);
    assert_eq!(elements[1].id.as_deref(), Some("a"));
}

#[test]
fn text_content_and_positioned_lines() {
    let elements = parse_elements(TEMPLATE).unwrap();
    assert_eq!(elements[2].inner_text.as_deref(), Some("Ada"));
    assert_eq!(elements[4].inner_text.as_deref(), Some("Line one\nLine two"));
    assert_eq!(elements[0].inner_text, None);
}

#[test]
fn inline_tspans_are_not_lines() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><text>Hello <tspan font-weight="bold">World</tspan></text></svg>"#;
    let elements = parse_elements(svg).unwrap();
    assert_eq!(elements[0].inner_text.as_deref(), Some("Hello World"));
}

#[test]
fn attributes_keep_qualified_names_and_order() {
    let elements = parse_elements(TEMPLATE).unwrap();
    let image = &elements[5];
    let names: Vec<_> = image.attributes.keys().map(String::as_str).collect();
    assert_eq!(names, ["id", "xlink:href"]);
    assert_eq!(image.href(), Some("data:image/png;base64,AAAA"));
}

#[test]
fn set_id_keeps_attribute_in_sync() {
    let mut element = parse_elements(TEMPLATE).unwrap().remove(0);
    element.set_id(Some("Box.checkbox".into()));
    assert_eq!(element.attributes.get("id").map(String::as_str), Some("Box.checkbox"));
    element.set_attribute("id", Some("Other".into()));
    assert_eq!(element.id.as_deref(), Some("Other"));
    element.set_id(None);
    assert!(!element.attributes.contains_key("id"));
    assert_eq!(element.original_id, None);
}

#[test]
fn set_href_prefers_existing_attribute() {
    let mut image = parse_elements(TEMPLATE).unwrap().remove(5);
    image.set_href("data:image/png;base64,BBBB");
    assert_eq!(image.attributes.get("xlink:href").map(String::as_str), Some("data:image/png;base64,BBBB"));
    assert!(!image.attributes.contains_key("href"));
}

#[test]
fn unique_name_appends_counter() {
    let taken: HashSet<String> = ["x".to_owned(), "x_2".to_owned()].into();
    assert_eq!(unique_name("y", &taken), "y");
    assert_eq!(unique_name("x", &taken), "x_3");
}

#[test]
fn malformed_svg_is_an_error() {
    assert!(parse_elements("<svg><g></svg>").is_err());
}

#[test]
fn descriptive_and_symbol_elements_are_enumerated() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><title>Card</title><metadata><x/></metadata><symbol id="s"><rect/></symbol></svg>"#;
    let elements = parse_elements(svg).unwrap();
    assert_eq!(tags(&elements), ["title", "symbol", "rect"]);
}
