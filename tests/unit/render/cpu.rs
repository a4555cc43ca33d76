use super::*;
use crate::model::template::Template;
use crate::render::compositor::Compositor;

fn surface(width: u32, height: u32) -> CpuSurface {
    let data = std::fs::read("tests/data/fonts/DejaVuSans.ttf").unwrap();
    let mut s = CpuSurface::new(width, height).unwrap();
    s.register_font("Playfair Display", 400, data).unwrap();
    s
}

fn font() -> FontSpec {
    FontSpec::new("Playfair Display", 400, 40.0)
}

#[test]
fn filled_text_lands_where_it_was_drawn() {
    let mut s = surface(200, 100);
    s.clear();
    s.fill_text("Hello", Point::new(10.0, 30.0), &font(), 0.0, Color::WHITE)
        .unwrap();
    let frame = s.finish();

    assert_eq!((frame.width, frame.height), (200, 100));
    assert!(frame.premultiplied);
    assert!(frame.any_opaque_in(10, 10, 130, 50));
    assert!(!frame.any_opaque_in(0, 60, 200, 100));
}

#[test]
fn transform_moves_text() {
    let mut s = surface(200, 100);
    s.save();
    s.translate(crate::foundation::core::Vec2::new(0.0, 50.0));
    s.fill_text("Hello", Point::new(10.0, 20.0), &font(), 0.0, Color::WHITE)
        .unwrap();
    s.restore();
    let frame = s.finish();
    assert!(frame.any_opaque_in(10, 50, 130, 90));
    assert!(!frame.any_opaque_in(0, 0, 200, 40));
}

#[test]
fn global_alpha_lowers_coverage() {
    let mut s = surface(100, 100);
    s.fill_rect(Rect::new(0.0, 0.0, 50.0, 50.0), Color::WHITE);
    s.set_global_alpha(0.5);
    s.fill_rect(Rect::new(50.0, 50.0, 100.0, 100.0), Color::WHITE);
    let frame = s.finish();

    assert_eq!(frame.pixel(10, 10).unwrap()[3], 255);
    let half = frame.pixel(75, 75).unwrap()[3];
    assert!((120..=136).contains(&half), "alpha {half}");
}

#[test]
fn dashed_outline_leaves_gaps() {
    let mut s = surface(100, 100);
    s.stroke_rect(Rect::new(10.5, 10.5, 90.5, 90.5), Color::WHITE, 1.0, &[4.0, 4.0]);
    let frame = s.finish();
    let row: Vec<u8> = (12..88).map(|x| frame.pixel(x, 10).unwrap()[3]).collect();
    assert!(row.iter().any(|&a| a > 128));
    assert!(row.iter().any(|&a| a < 64));
    assert!(!frame.any_opaque_in(20, 20, 80, 80));
}

#[test]
fn unregistered_font_draws_nothing() {
    let mut s = surface(100, 100);
    let err = s
        .fill_text(
            "Hi",
            Point::new(10.0, 50.0),
            &FontSpec::new("Great Vibes", 400, 40.0),
            0.0,
            Color::WHITE,
        )
        .unwrap_err();
    assert!(matches!(err, OverlayError::FontNotReady(_)));
    assert_eq!(s.finish().opaque_pixel_count(), 0);
}

#[test]
fn finish_starts_a_fresh_frame() {
    let mut s = surface(50, 50);
    s.fill_rect(Rect::new(0.0, 0.0, 50.0, 50.0), Color::WHITE);
    assert!(s.finish().opaque_pixel_count() > 0);
    assert_eq!(s.finish().opaque_pixel_count(), 0);
}

#[test]
fn oversized_surface_is_rejected() {
    assert!(CpuSurface::new(70_000, 10).is_err());
    assert!(CpuSurface::new(0, 10).is_err());
}

#[test]
fn template_renders_visible_text() {
    let raw = std::fs::read_to_string("tests/data/wedding_template.json").unwrap();
    let template = Template::from_json(&raw).unwrap();
    let mut s = surface(480, 270);
    let mut compositor = Compositor::default();

    let report = compositor.render_template(&mut s, &template, 5.0).unwrap();
    assert_eq!(report.drawn.len(), 2);
    assert!(report.skipped.is_empty());
    let frame = s.finish();
    // Names are centred at 50%/40%, the date below them.
    assert!(frame.any_opaque_in(120, 90, 360, 125));
    assert!(frame.any_opaque_in(160, 165, 320, 190));
    assert!(!frame.any_opaque_in(0, 0, 480, 60));
}
