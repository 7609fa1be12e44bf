use esdown_common::position::LineMap;

#[test]
fn test_single_line() {
    let map = LineMap::build("var x = 1;");
    assert_eq!(map.line_count(), 1);
    let pos = map.line_and_column(4);
    assert_eq!(pos.line, 1);
    assert_eq!(pos.column, 5);
}

#[test]
fn test_multi_line() {
    let source = "var a;\nvar b;\nvar c;";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 3);

    let pos = map.line_and_column(7);
    assert_eq!(pos.line, 2);
    assert_eq!(pos.column, 1);

    let pos = map.line_and_column(18);
    assert_eq!(pos.line, 3);
    assert_eq!(pos.column, 5);
}

#[test]
fn test_crlf_lines() {
    let source = "a;\r\nb;";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 2);
    let pos = map.line_and_column(4);
    assert_eq!(pos.line, 2);
    assert_eq!(pos.column, 1);
}

#[test]
fn test_lone_cr_counts_as_line_ending() {
    let source = "a;\rb;";
    let map = LineMap::build(source);
    assert_eq!(map.line_count(), 2);
    assert_eq!(map.line_start(1), Some(3));
}

#[test]
fn test_offset_on_line_start() {
    let map = LineMap::build("aa\nbb\n");
    let pos = map.line_and_column(3);
    assert_eq!(pos.line, 2);
    assert_eq!(pos.column, 1);
}
