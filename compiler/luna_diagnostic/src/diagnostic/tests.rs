use super::*;
use luna_ir::Position;
use pretty_assertions::assert_eq;

#[test]
fn display_is_one_based() {
    let diag = Diagnostic::error(
        ErrorCode::E1002,
        "non-complete statement",
        Range::new(Position::new(2, 4), Position::new(2, 7)),
    );
    assert_eq!(diag.to_string(), "3:5: error[E1002]: non-complete statement");
    assert!(diag.is_error());
}

#[test]
fn at_span_uses_line_index() {
    let text = "local a\nfoo.bar\n";
    let lines = LineIndex::new(text);
    let diag = Diagnostic::at_span(
        ErrorCode::E1002,
        Severity::Warning,
        "x",
        text,
        &lines,
        Span::new(8, 15),
    );
    assert_eq!(
        diag.range,
        Range::new(Position::new(1, 0), Position::new(1, 7))
    );
    assert!(!diag.is_error());
}

#[test]
fn severity_display() {
    assert_eq!(Severity::Error.to_string(), "error");
    assert_eq!(Severity::Warning.to_string(), "warning");
}
