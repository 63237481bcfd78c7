use unlodash_common::{LineMap, Position, Span};

#[test]
fn offset_to_position_handles_mixed_line_endings() {
    let source = "a\r\nbc\rd\nef";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 4);
    assert_eq!(map.offset_to_position(0, source), Position::new(0, 0));
    assert_eq!(map.offset_to_position(4, source), Position::new(1, 1));
    assert_eq!(map.offset_to_position(6, source), Position::new(2, 0));
    assert_eq!(map.offset_to_position(9, source), Position::new(3, 1));
}

#[test]
fn line_text_strips_terminators() {
    let source = "first\r\nsecond\nthird";
    let map = LineMap::build(source);
    assert_eq!(map.line_text(0, source), Some("first"));
    assert_eq!(map.line_text(1, source), Some("second"));
    assert_eq!(map.line_text(2, source), Some("third"));
    assert_eq!(map.line_text(3, source), None);
}

#[test]
fn columns_count_characters_not_bytes() {
    let source = "const é = 1;";
    let map = LineMap::build(source);
    let offset = source.find('=').unwrap() as u32;
    assert_eq!(map.offset_to_position(offset, source), Position::new(0, 8));
}

#[test]
fn span_cover_and_contains() {
    let a = Span::new(3, 7);
    let b = Span::new(5, 12);
    assert_eq!(a.cover(b), Span::new(3, 12));
    assert!(a.cover(b).contains(a));
    assert!(!a.contains(b));
}
