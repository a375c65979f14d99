#![allow(clippy::float_cmp)]

use super::*;

/// One unit per character, font size ignored.
struct Fixed;

impl TextMeasure for Fixed {
    #[allow(clippy::cast_precision_loss)]
    fn width(&self, text: &str, _font_size: f64) -> f64 {
        text.chars().count() as f64
    }
}

#[test]
fn newlines_always_break() {
    assert_eq!(wrap_lines("a\nb\r\n\nc", None, 16.0, &Fixed), ["a", "b", "", "c"]);
}

#[test]
fn lines_within_limit_are_untouched() {
    assert_eq!(wrap_lines("two  spaces", Some(20.0), 16.0, &Fixed), ["two  spaces"]);
}

#[test]
fn long_lines_wrap_at_words() {
    assert_eq!(
        wrap_lines("the quick brown fox jumps", Some(10.0), 16.0, &Fixed),
        ["the quick", "brown fox", "jumps"]
    );
}

#[test]
fn long_words_break_by_character() {
    assert_eq!(wrap_lines("abcdefghij xy", Some(4.0), 16.0, &Fixed), ["abcd", "efgh", "ij", "xy"]);
}

#[test]
fn wrapping_is_idempotent() {
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit\nsed do eiusmod";
    let once = wrap_lines(text, Some(12.0), 16.0, &Fixed).join("\n");
    let twice = wrap_lines(&once, Some(12.0), 16.0, &Fixed).join("\n");
    assert_eq!(once, twice);
}

#[test]
fn blank_line_over_limit_is_kept() {
    assert_eq!(wrap_lines("      ", Some(2.0), 16.0, &Fixed), [""]);
}

#[test]
fn heuristic_counts_display_columns() {
    let m = HeuristicMeasure::default();
    assert_eq!(m.width("ab", 10.0), 2.0 * 10.0 * WIDTH_FACTOR);
    // Wide CJK glyphs take two columns.
    assert_eq!(m.width("日本", 10.0), 4.0 * 10.0 * WIDTH_FACTOR);
}

#[test]
fn layout_steps_by_line_height() {
    let lines = layout(vec!["a".into(), "b".into(), "c".into()], 10.0, 20.0);
    let ys: Vec<f64> = lines.iter().map(|l| l.y).collect();
    assert_eq!(ys, [10.0, 34.0, 58.0]);
}

#[test]
fn font_size_from_style_attribute_or_default() {
    let mut attrs = IndexMap::new();
    assert_eq!(font_size(&attrs), DEFAULT_FONT_SIZE);
    attrs.insert("font-size".to_owned(), "12px".to_owned());
    assert_eq!(font_size(&attrs), 12.0);
    attrs.insert("style".to_owned(), "font-size: 30px".to_owned());
    assert_eq!(font_size(&attrs), 30.0);
}

#[test]
fn max_width_requires_positive_number() {
    let mut attrs = IndexMap::new();
    attrs.insert(MAX_WIDTH_ATTRIBUTE.to_owned(), "0".to_owned());
    assert_eq!(max_width(&attrs), None);
    attrs.insert(MAX_WIDTH_ATTRIBUTE.to_owned(), "120.5".to_owned());
    assert_eq!(max_width(&attrs), Some(120.5));
    assert!(needs_lines("single", &attrs));
}

#[test]
fn leading_number_reads_prefix() {
    assert_eq!(leading_number(" -3.5px"), Some(-3.5));
    assert_eq!(leading_number("10 20"), Some(10.0));
    assert_eq!(leading_number("px"), None);
}
