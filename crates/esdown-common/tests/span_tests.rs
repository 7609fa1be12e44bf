use esdown_common::span::{Span, Spanned};

#[test]
fn test_span_basics() {
    let span = Span::new(3, 10);
    assert_eq!(span.len(), 7);
    assert!(!span.is_empty());
    assert!(span.contains(3));
    assert!(span.contains(9));
    assert!(!span.contains(10));
}

#[test]
fn test_empty_span() {
    let span = Span::at(5);
    assert!(span.is_empty());
    assert_eq!(span.len(), 0);
    assert!(!span.contains(5));
}

#[test]
fn test_dummy_span() {
    let span = Span::dummy();
    assert!(span.is_dummy());
    assert!(!Span::new(0, 1).is_dummy());
    assert_eq!(span.slice("hello"), "");
}

#[test]
fn test_merge() {
    let a = Span::new(2, 5);
    let b = Span::new(4, 9);
    assert_eq!(a.merge(b), Span::new(2, 9));
    assert_eq!(b.merge(a), Span::new(2, 9));
}

#[test]
fn test_slice() {
    let text = "var x = 1;";
    assert_eq!(Span::new(4, 5).slice(text), "x");
    // Out-of-range spans clamp instead of panicking
    assert_eq!(Span::new(4, 100).slice(text), "x = 1;");
}

#[test]
fn test_spanned_trait() {
    let span = Span::new(1, 4);
    assert_eq!(span.start(), 1);
    assert_eq!(span.end(), 4);
}
