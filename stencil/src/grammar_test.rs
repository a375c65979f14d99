use super::*;

#[test]
fn token_base_splits_at_first_underscore() {
    assert_eq!(token_base("max_20"), "max");
    assert_eq!(token_base("depends_First_Name"), "depends");
    assert_eq!(token_base("text"), "text");
    assert_eq!(token_base(""), "");
}

#[test]
fn token_value_keeps_everything_after_first_underscore() {
    assert_eq!(token_value("depends_First_Name"), Some("First_Name"));
    assert_eq!(token_value("select_"), Some(""));
    assert_eq!(token_value("text"), None);
}

#[test]
fn lookup_is_case_insensitive() {
    assert_eq!(lookup("TEXT").map(|d| d.key), Some("text"));
    assert_eq!(lookup("Track").map(|d| d.kind), Some(TokenKind::Extension));
    assert!(lookup("nope").is_none());
}

#[test]
fn field_types_never_declare_predecessors() {
    for def in field_types() {
        assert_eq!(def.kind, TokenKind::FieldType);
        assert!(def.allowed_after.is_empty(), "{} has predecessors", def.key);
    }
}

#[test]
fn only_select_requires_a_value_among_field_types() {
    let with_value: Vec<_> = field_types()
        .iter()
        .filter(|d| d.requires_value)
        .map(|d| d.key)
        .collect();
    assert_eq!(with_value, vec!["select"]);
}

#[test]
fn track_is_the_only_terminal_token() {
    let terminal: Vec<_> = extensions()
        .iter()
        .filter(|d| d.must_be_last)
        .map(|d| d.key)
        .collect();
    assert_eq!(terminal, vec!["track"]);
}

#[test]
fn track_may_follow_every_other_token() {
    let track = lookup("track").unwrap();
    for def in field_types().iter().chain(extensions()) {
        if def.key == "track" {
            continue;
        }
        assert!(track.accepts_after(def.key), "track should follow {}", def.key);
    }
    assert!(!track.accepts_after("track"));
}

#[test]
fn allowed_after_only_names_known_tokens() {
    for def in extensions() {
        for prev in def.allowed_after {
            assert!(lookup(prev).is_some(), "{} names unknown predecessor {prev}", def.key);
        }
    }
}

#[test]
fn matches_prefix_ignores_case() {
    let textarea = lookup("textarea").unwrap();
    assert!(textarea.matches_prefix(""));
    assert!(textarea.matches_prefix("TeX"));
    assert!(!textarea.matches_prefix("textareas"));
}

#[test]
fn text_like_excludes_binary_and_choice_types() {
    assert!(is_text_like("email"));
    assert!(!is_text_like("upload"));
    assert!(!is_text_like("select"));
    assert!(is_field_type("gen"));
    assert!(!is_field_type("max"));
}
