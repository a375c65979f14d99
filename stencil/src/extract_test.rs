use super::*;

fn values(pairs: &[(&str, &str)]) -> FieldValues {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), FieldValue::Text((*v).to_owned())))
        .collect()
}

#[test]
fn word_extraction_is_one_indexed() {
    let v = values(&[("City", "New York City")]);
    assert_eq!(extract_from_dependency("City[w1]", &v), "New");
    assert_eq!(extract_from_dependency("City[w3]", &v), "City");
}

#[test]
fn word_extraction_splits_on_whitespace_runs() {
    let v = values(&[("Name", "  Ada \t  Lovelace ")]);
    assert_eq!(extract_from_dependency("Name[w2]", &v), "Lovelace");
}

#[test]
fn word_out_of_range_is_empty() {
    let v = values(&[("City", "Paris")]);
    assert_eq!(extract_from_dependency("City[w2]", &v), "");
    assert_eq!(extract_from_dependency("City[w0]", &v), "");
}

#[test]
fn char_range_is_inclusive() {
    let v = values(&[("Code", "AB12CD34")]);
    assert_eq!(extract_from_dependency("Code[ch1-4]", &v), "AB12");
    assert_eq!(extract_from_dependency("Code[ch7-20]", &v), "34");
    assert_eq!(extract_from_dependency("Code[ch5-2]", &v), "");
}

#[test]
fn char_index_and_list() {
    let v = values(&[("Code", "AB12CD34")]);
    assert_eq!(extract_from_dependency("Code[ch3]", &v), "1");
    assert_eq!(extract_from_dependency("Code[ch1,3,8]", &v), "A14");
    assert_eq!(extract_from_dependency("Code[ch1,99,2]", &v), "AB");
    assert_eq!(extract_from_dependency("Code[ch99]", &v), "");
}

#[test]
fn chars_count_unicode_scalars() {
    let v = values(&[("Name", "Zoë Ünal")]);
    assert_eq!(extract_from_dependency("Name[ch3]", &v), "ë");
    assert_eq!(extract_from_dependency("Name[ch5-6]", &v), "Ün");
}

#[test]
fn binary_values_bypass_extraction() {
    let url = "data:image/png;base64,AAA";
    let v = values(&[("Photo", url), ("Sig", "blob:https://x/1")]);
    assert_eq!(extract_from_dependency("Photo", &v), url);
    assert_eq!(extract_from_dependency("Photo[w1]", &v), url);
    assert_eq!(extract_from_dependency("Photo[ch1-3]", &v), url);
    assert_eq!(extract_from_dependency("Sig[ch1]", &v), "blob:https://x/1");
}

#[test]
fn missing_field_is_empty() {
    assert_eq!(extract_from_dependency("Nope[w1]", &FieldValues::new()), "");
}

#[test]
fn flags_render_as_text() {
    let mut v = FieldValues::new();
    v.insert("Agree".into(), FieldValue::Flag(true));
    assert_eq!(extract_from_dependency("Agree", &v), "true");
}

#[test]
fn unparseable_suffix_keeps_field_name() {
    let r = parse_reference("City[x9]");
    assert_eq!(r.field, "City");
    assert!(r.extraction.is_none());

    let r = parse_reference("City[w1");
    assert_eq!(r.field, "City");
    assert!(r.extraction.is_none());
}

#[test]
fn reference_display_matches_source_syntax() {
    for raw in ["City", "City[w2]", "Code[ch3]", "Code[ch1,3,5]", "Code[ch1-4]"] {
        assert_eq!(parse_reference(raw).to_string(), raw);
    }
}
