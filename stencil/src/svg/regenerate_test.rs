use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::*;
use crate::svg::element::parse_elements;

const TEMPLATE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
  <defs><clipPath id="clip"><rect width="1" height="1"/></clipPath></defs>
  <rect id="bg" width="100" height="100"/>
  <text id="Name.text" x="10" y="20" font-size="10">Ada</text>
  <circle id="dot" cx="5" cy="5" r="2"/>
</svg>"#;

fn ids(svg: &str) -> Vec<String> {
    parse_elements(svg)
        .unwrap()
        .into_iter()
        .map(|e| e.internal_id)
        .collect()
}

#[test]
fn no_edits_reproduces_document() {
    let elements = parse_elements(TEMPLATE).unwrap();
    assert_eq!(regenerate(TEMPLATE, &elements), TEMPLATE);
}

#[test]
fn text_edit_is_written() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements[1].inner_text = Some("Grace & co".into());
    let out = regenerate(TEMPLATE, &elements);
    assert!(out.contains(r#"<text id="Name.text" x="10" y="20" font-size="10">Grace &amp; co</text>"#), "{out}");
}

#[test]
fn attribute_edits_replace_the_attribute_set() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements[2].attributes.insert("fill".into(), "red".into());
    elements[2].attributes.shift_remove("r");
    elements[2].attributes.insert("cx".into(), String::new());
    let out = regenerate(TEMPLATE, &elements);
    assert!(out.contains(r#"<circle id="dot" cy="5" fill="red"/>"#), "{out}");
}

#[test]
fn deleted_elements_are_removed() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements.remove(0);
    let out = regenerate(TEMPLATE, &elements);
    assert_eq!(ids(&out), ["Name.text", "dot"]);
    assert!(out.contains("<clipPath"), "resources survive");
}

#[test]
fn removed_container_keeps_listed_descendants() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="grp"><text id="Name.text">Ada</text></g><rect id="r"/></svg>"#;
    let mut elements = parse_elements(svg).unwrap();
    elements.retain(|e| e.internal_id != "grp");
    elements[0].inner_text = Some("Grace".into());
    let out = regenerate(svg, &elements);
    assert_eq!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg"><text id="Name.text">Grace</text><rect id="r"/></svg>"#
    );
    assert_eq!(ids(&out).len(), elements.len());
}

#[test]
fn removed_container_with_removed_descendants_goes_entirely() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="grp"><rect id="a"/></g><rect id="r"/></svg>"#;
    let mut elements = parse_elements(svg).unwrap();
    elements.retain(|e| e.internal_id == "r");
    assert_eq!(regenerate(svg, &elements), r#"<svg xmlns="http://www.w3.org/2000/svg"><rect id="r"/></svg>"#);
}

#[test]
fn clones_follow_their_source() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    let mut copy = elements[0].clone();
    copy.origin = Origin::Clone(0);
    copy.internal_id = "bg_2".into();
    copy.set_id(Some("bg_2".into()));
    elements.insert(1, copy);
    let out = regenerate(TEMPLATE, &elements);
    assert_eq!(ids(&out), ["bg", "bg_2", "Name.text", "dot"]);
}

#[test]
fn sibling_order_follows_the_list() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements.reverse();
    let out = regenerate(TEMPLATE, &elements);
    assert_eq!(ids(&out), ["dot", "Name.text", "bg"]);
}

#[test]
fn multiline_text_becomes_tspans() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements[1].inner_text = Some("Ada\nLovelace".into());
    let out = regenerate(TEMPLATE, &elements);
    assert!(
        out.contains(r#"<tspan x="10" y="20">Ada</tspan><tspan x="10" y="32">Lovelace</tspan>"#),
        "{out}"
    );
    let reparsed = parse_elements(&out).unwrap();
    assert_eq!(reparsed[1].inner_text.as_deref(), Some("Ada\nLovelace"));
}

#[test]
fn wrapped_output_is_stable() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements[1]
        .attributes
        .insert(MAX_WIDTH_ATTRIBUTE.into(), "30".into());
    elements[1].inner_text = Some("one two three four".into());
    let once = regenerate(TEMPLATE, &elements);
    assert!(once.matches("<tspan").count() > 1, "{once}");

    let again = regenerate(&once, &parse_elements(&once).unwrap());
    assert_eq!(again, once);
}

#[test]
fn image_href_goes_through_xlink() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><image id="Logo.upload" href="a.png"/></svg>"#;
    let mut elements = parse_elements(svg).unwrap();
    elements[0].set_href("data:image/png;base64,QQ==");
    let out = regenerate(svg, &elements);
    assert_eq!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><image id="Logo.upload" xlink:href="data:image/png;base64,QQ=="/></svg>"#
    );
}

#[test]
fn css_transform_is_consolidated() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements[0]
        .attributes
        .insert("style".into(), "transform: rotate(90deg); transform-origin: center".into());
    let out = regenerate(TEMPLATE, &elements);
    assert!(out.contains(r#"<rect id="bg" width="100" height="100" transform="rotate(90, 50, 50)"/>"#), "{out}");
}

#[test]
fn malformed_original_is_returned_unchanged() {
    let broken = "<svg><g></svg>";
    let elements = parse_elements(TEMPLATE).unwrap();
    assert_eq!(regenerate(broken, &elements), broken);
    assert!(try_regenerate(broken, &elements, &HeuristicMeasure::default()).is_err());
}

#[test]
fn out_of_range_origin_is_dropped() {
    let mut elements = parse_elements(TEMPLATE).unwrap();
    elements[2].origin = Origin::Source(99);
    let out = regenerate(TEMPLATE, &elements);
    assert_eq!(ids(&out), ["bg", "Name.text"]);
}

#[test]
fn random_structural_edits_keep_count_and_tags() {
    let source = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect id="r"/><circle id="c"/><line id="l"/><path id="p"/><ellipse id="e"/></svg>"#;
    let base = parse_elements(source).unwrap();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..200 {
        let mut elements = base.clone();
        for step in 0..rng.random_range(0..6) {
            match rng.random_range(0..3) {
                0 if !elements.is_empty() => {
                    let i = rng.random_range(0..elements.len());
                    elements.remove(i);
                }
                1 if !elements.is_empty() => {
                    let i = rng.random_range(0..elements.len());
                    let mut copy = elements[i].clone();
                    copy.origin = Origin::Clone(copy.origin.index());
                    copy.internal_id = format!("copy_{round}_{step}");
                    copy.set_id(Some(copy.internal_id.clone()));
                    elements.insert(i + 1, copy);
                }
                _ => elements.shuffle(&mut rng),
            }
        }

        let out = regenerate(source, &elements);
        let reparsed = parse_elements(&out).unwrap();
        let want: Vec<_> = elements.iter().map(|e| e.tag.as_str()).collect();
        let got: Vec<_> = reparsed.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(got, want, "round {round}");
        let want_ids: Vec<_> = elements.iter().map(|e| e.id.clone()).collect();
        let got_ids: Vec<_> = reparsed.iter().map(|e| e.id.clone()).collect();
        assert_eq!(got_ids, want_ids, "round {round}");
    }
}
