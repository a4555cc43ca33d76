use super::*;

fn surface() -> RecordingSurface {
    RecordingSurface::new(Size::new(1920.0, 1080.0), MonospaceMeasurer::new(10.0))
}

#[test]
fn save_restore_round_trips_state() {
    let mut s = surface();
    s.save();
    s.translate(Vec2::new(10.0, 20.0));
    s.set_global_alpha(0.5);
    s.restore();
    assert_eq!(s.current_transform(), Affine::IDENTITY);
    assert_eq!(s.global_alpha(), 1.0);
    assert!(s.is_balanced());
    assert_eq!(s.max_depth(), 1);
}

#[test]
fn unmatched_restore_is_ignored_but_unbalanced() {
    let mut s = surface();
    s.restore();
    assert_eq!(s.depth(), 0);
    assert!(!s.is_balanced());
}

#[test]
fn transforms_compose_in_call_order() {
    let mut s = surface();
    s.translate(Vec2::new(100.0, 0.0));
    s.scale(2.0, 2.0);
    assert_eq!(
        s.current_transform() * Point::new(1.0, 1.0),
        Point::new(102.0, 2.0)
    );
}

#[test]
fn text_records_state_at_draw_time() {
    let mut s = surface();
    let font = FontSpec::new("Inter", 400, 12.0);
    s.set_global_alpha(0.25);
    s.set_shadow(Some(ShadowStyle {
        color: Color::BLACK,
        offset: Vec2::new(2.0, 2.0),
        blur: 4.0,
    }));
    s.fill_text("Hi", Point::new(1.0, 2.0), &font, 0.0, Color::WHITE)
        .unwrap();
    match &s.commands()[0] {
        DrawCommand::Text {
            alpha,
            shadow,
            font,
            stroke_width,
            ..
        } => {
            assert_eq!(*alpha, 0.25);
            assert!(shadow.is_some());
            assert_eq!(font, "400 12px \"Inter\"");
            assert_eq!(*stroke_width, None);
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert_eq!(s.filled_texts(), vec!["Hi"]);
}

#[test]
fn drawing_with_unloaded_font_fails() {
    let mut s = RecordingSurface::new(
        Size::new(100.0, 100.0),
        MonospaceMeasurer::new(10.0).with_loaded_families(["Inter"]),
    );
    let font = FontSpec::new("Great Vibes", 400, 12.0);
    assert!(s.fill_text("x", Point::ORIGIN, &font, 0.0, Color::WHITE).is_err());
    assert!(s.commands().is_empty());
}
