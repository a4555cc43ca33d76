use super::*;

fn bytes() -> Vec<u8> {
    vec![0u8; 16]
}

#[test]
fn css_string_drops_trailing_zero_fraction() {
    assert_eq!(FontSpec::new("Inter", 400, 12.0).css(), "400 12px \"Inter\"");
    assert_eq!(
        FontSpec::new("Playfair Display", 700, 36.5).css(),
        "700 36.5px \"Playfair Display\""
    );
}

#[test]
fn unknown_family_is_not_ready() {
    let book = FontBook::new();
    let err = book
        .resolve(&FontSpec::new("Great Vibes", 400, 48.0))
        .unwrap_err();
    assert!(matches!(err, OverlayError::FontNotReady(_)));
    assert!(!err.is_user_visible());
}

#[test]
fn resolves_exact_then_nearest_weight() {
    let mut book = FontBook::new();
    book.register("Playfair Display", 400, bytes()).unwrap();
    book.register("Playfair Display", 700, bytes()).unwrap();

    let exact = book
        .resolve(&FontSpec::new("playfair display", 700, 48.0))
        .unwrap();
    assert_eq!(exact.weight, 700);

    let near = book
        .resolve(&FontSpec::new("Playfair Display", 600, 48.0))
        .unwrap();
    assert_eq!(near.weight, 700);

    let tie = book
        .resolve(&FontSpec::new("Playfair Display", 550, 48.0))
        .unwrap();
    assert_eq!(tie.weight, 400);
}

#[test]
fn re_registering_replaces_and_bumps_generation() {
    let mut book = FontBook::new();
    book.register("Inter", 400, bytes()).unwrap();
    let g = book.generation();
    book.register("INTER", 400, vec![1, 2, 3]).unwrap();
    assert_eq!(book.len(), 1);
    assert!(book.generation() > g);
    assert_eq!(book.faces()[0].data.as_slice(), &[1, 2, 3]);
    assert_eq!(book.families(), vec!["INTER"]);
}

#[test]
fn rejects_empty_registrations() {
    let mut book = FontBook::new();
    assert!(book.register("  ", 400, bytes()).is_err());
    assert!(book.register("Inter", 400, Vec::new()).is_err());
    assert!(book.is_empty());
}

#[test]
fn detects_family_of_vendored_font() {
    let data = read_font_file(Path::new("tests/data/fonts/DejaVuSans.ttf")).unwrap();
    assert_eq!(detect_family_name(&data).unwrap(), "DejaVu Sans");
}

#[test]
fn garbage_bytes_have_no_family() {
    assert!(detect_family_name(b"not a font").is_err());
}
