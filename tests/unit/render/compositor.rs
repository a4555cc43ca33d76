use super::*;
use crate::animation::ease::Easing;
use crate::animation::kind::AnimationKind;
use crate::foundation::core::Size;
use crate::layout::text::MonospaceMeasurer;
use crate::model::color::Color;
use crate::model::overlay::{AnimationSpec, Stroke, Timing};
use crate::render::surface::{DrawCommand, RecordingSurface};

fn overlay(text: &str, layer: i64) -> Overlay {
    let mut o = Overlay::with_defaults(layer, Some(10.0));
    o.placeholder_text = text.to_string();
    o
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(Size::new(1920.0, 1080.0), MonospaceMeasurer::new(10.0))
}

fn input<'a>(store: &'a OverlayStore, fields: &'a FieldValues, time: f64) -> FrameInput<'a> {
    let mapper = CoordinateMapper::default();
    FrameInput {
        store,
        fields,
        time,
        mapper,
        viewport: Viewport::identity(mapper.reference()),
        selected: None,
        hovered: None,
        locked: None,
        decorate: true,
    }
}

#[test]
fn paints_bottom_to_top_by_layer_index() {
    let store = OverlayStore::from_overlays(
        [overlay("top", 2), overlay("bottom", 0), overlay("middle", 1)],
        Some(10.0),
    )
    .unwrap();
    let fields = FieldValues::new();
    let mut s = surface();
    let report = Compositor::default().compose(&mut s, &input(&store, &fields, 2.0));
    assert_eq!(s.filled_texts(), vec!["bottom", "middle", "top"]);
    assert_eq!(report.drawn.len(), 3);
    assert_eq!(report.hit_boxes[2].layer_index, 2);
}

#[test]
fn every_overlay_is_isolated_in_save_restore() {
    let store =
        OverlayStore::from_overlays([overlay("a", 0), overlay("b", 1)], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut s = surface();
    Compositor::default().compose(&mut s, &input(&store, &fields, 0.5));
    assert!(s.is_balanced());
    let saves = s
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Save))
        .count();
    assert_eq!(saves, 3);
    assert_eq!(s.max_depth(), 2);
    assert_eq!(s.depth(), 0);
}

#[test]
fn only_overlays_inside_their_window_are_drawn() {
    let mut late = overlay("late", 0);
    late.timing = Timing::new(2.0, 5.0).unwrap();
    let store = OverlayStore::from_overlays([late], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut c = Compositor::default();
    for (t, expected) in [(1.99, false), (2.0, true), (5.0, true), (5.02, false)] {
        let mut s = surface();
        let report = c.compose(&mut s, &input(&store, &fields, t));
        assert_eq!(!report.drawn.is_empty(), expected, "t = {t}");
    }
}

#[test]
fn field_values_replace_placeholders() {
    let mut names = overlay("Your names", 0);
    names.endpoint_key = "coupleNames".to_string();
    let store = OverlayStore::from_overlays([names], Some(10.0)).unwrap();
    let mut fields = FieldValues::new();
    fields.insert("coupleNames".to_string(), "Sarah & Michael".to_string());
    let mut s = surface();
    Compositor::default().compose(&mut s, &input(&store, &fields, 2.0));
    assert_eq!(s.filled_texts(), vec!["Sarah & Michael"]);
}

#[test]
fn unloaded_font_skips_only_that_overlay() {
    let mut script = overlay("script", 1);
    script.styling.font_family = "Great Vibes".to_string();
    let store =
        OverlayStore::from_overlays([overlay("serif", 0), script], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut s = RecordingSurface::new(
        Size::new(1920.0, 1080.0),
        MonospaceMeasurer::new(10.0).with_loaded_families(["Playfair Display"]),
    );
    let mut c = Compositor::default();
    let report = c.compose(&mut s, &input(&store, &fields, 2.0));
    assert_eq!(s.filled_texts(), vec!["serif"]);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].font_pending);
    assert!(s.is_balanced());

    s.measurer_mut().load_family("Great Vibes");
    s.take_commands();
    let report = c.compose(&mut s, &input(&store, &fields, 2.0));
    assert!(report.skipped.is_empty());
    assert_eq!(s.filled_texts(), vec!["serif", "script"]);
}

#[test]
fn hit_box_follows_anchor_and_padding() {
    let store = OverlayStore::from_overlays([overlay("Hi", 0)], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut s = surface();
    let report = Compositor::default().compose(&mut s, &input(&store, &fields, 2.0));
    let hit = report.hit_boxes[0];
    let h = 48.0 * 1.2;
    let expected = Rect::new(950.0, 540.0 - h / 2.0, 970.0, 540.0 + h / 2.0);
    for (a, b) in [
        (hit.text_box.x0, expected.x0),
        (hit.text_box.y0, expected.y0),
        (hit.text_box.x1, expected.x1),
        (hit.text_box.y1, expected.y1),
    ] {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }
    assert_eq!(hit.padded, hit.text_box.inflate(10.0, 10.0));
}

#[test]
fn fixed_height_box_centres_its_lines() {
    let mut o = overlay("Hi", 0);
    o.dimensions.height = Some(200.0 / 1080.0 * 100.0);
    let store = OverlayStore::from_overlays([o], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut s = surface();
    let report = Compositor::default().compose(&mut s, &input(&store, &fields, 2.0));
    let tb = report.hit_boxes[0].text_box;
    assert!((tb.height() - 200.0).abs() < 1e-6);

    let line_y = s
        .commands()
        .iter()
        .find_map(|c| match c {
            DrawCommand::Text {
                origin, transform, ..
            } => Some((*transform * *origin).y),
            _ => None,
        })
        .unwrap();
    assert!((line_y - tb.center().y).abs() < 1e-6, "{line_y} vs {}", tb.center().y);
}

#[test]
fn entrance_opacity_reaches_the_surface() {
    let mut o = overlay("fade", 0);
    o.animation.entrance = AnimationSpec::new(AnimationKind::FadeIn, 2.0, Easing::Linear);
    let store = OverlayStore::from_overlays([o], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut s = surface();
    Compositor::default().compose(&mut s, &input(&store, &fields, 0.5));
    let alpha = s.commands().iter().find_map(|c| match c {
        DrawCommand::Text { alpha, .. } => Some(*alpha),
        _ => None,
    });
    assert_eq!(alpha, Some(0.25));
}

#[test]
fn typewriter_reveals_characters_across_lines() {
    let mut o = overlay("Sarah and Michael", 0);
    o.dimensions.width = Some(90.0 / 1920.0 * 100.0);
    o.animation.entrance = AnimationSpec::new(AnimationKind::Typewriter, 2.0, Easing::Linear);
    let store = OverlayStore::from_overlays([o], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut s = surface();
    // 16 visible characters in total, half revealed.
    Compositor::default().compose(&mut s, &input(&store, &fields, 1.0));
    assert_eq!(s.filled_texts(), vec!["Sarah an"]);
}

#[test]
fn stroke_is_drawn_before_fill_and_shadow_only_once() {
    let mut o = overlay("Hi", 0);
    o.styling.stroke = Some(Stroke {
        enabled: true,
        color: Color::BLACK,
        width: 3.0,
    });
    let store = OverlayStore::from_overlays([o], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut s = surface();
    Compositor::default().compose(&mut s, &input(&store, &fields, 2.0));
    let texts: Vec<(Option<f64>, bool)> = s
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Text {
                stroke_width,
                shadow,
                ..
            } => Some((*stroke_width, shadow.is_some())),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec![(Some(3.0), true), (None, false)]);
}

#[test]
fn selection_draws_outline_label_and_handles() {
    let store = OverlayStore::from_overlays([overlay("Hi", 0)], Some(10.0)).unwrap();
    let key = store.keys()[0];
    let fields = FieldValues::new();
    let mut s = surface();
    let mut frame = input(&store, &fields, 2.0);
    frame.selected = Some(key);
    Compositor::default().compose(&mut s, &frame);
    let handles = s
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
        .count();
    assert_eq!(handles, 8);
    assert!(s.filled_texts().contains(&"x: 50% y: 50% w: 20px"));
}

#[test]
fn locked_selection_has_no_handles() {
    let store = OverlayStore::from_overlays([overlay("Hi", 0)], Some(10.0)).unwrap();
    let key = store.keys()[0];
    let locked = BTreeSet::from([key]);
    let fields = FieldValues::new();
    let mut s = surface();
    let mut frame = input(&store, &fields, 2.0);
    frame.selected = Some(key);
    frame.locked = Some(&locked);
    let config = EditorConfig::default();
    Compositor::new(config.clone()).compose(&mut s, &frame);
    assert!(
        !s.commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::FillRect { .. }))
    );
    assert!(s.commands().iter().any(|c| matches!(
        c,
        DrawCommand::StrokeRect { color, .. } if *color == config.locked_color
    )));
}

#[test]
fn hover_hint_is_dashed_and_skipped_for_the_selection() {
    let store =
        OverlayStore::from_overlays([overlay("a", 0), overlay("b", 1)], Some(10.0)).unwrap();
    let keys = store.keys();
    let fields = FieldValues::new();
    let mut frame = input(&store, &fields, 2.0);
    frame.hovered = Some(keys[0]);
    let mut s = surface();
    Compositor::default().compose(&mut s, &frame);
    assert!(s.commands().iter().any(|c| matches!(
        c,
        DrawCommand::StrokeRect { dash, .. } if !dash.is_empty()
    )));

    frame.selected = Some(keys[0]);
    let mut s = surface();
    Compositor::default().compose(&mut s, &frame);
    assert!(!s.commands().iter().any(|c| matches!(
        c,
        DrawCommand::StrokeRect { dash, .. } if !dash.is_empty()
    )));
}

#[test]
fn base_view_scale_is_applied_once() {
    let store = OverlayStore::from_overlays([overlay("Hi", 0)], Some(10.0)).unwrap();
    let fields = FieldValues::new();
    let mut frame = input(&store, &fields, 2.0);
    frame.viewport = Viewport::new(Size::new(960.0, 540.0), Size::new(1920.0, 1080.0));
    frame.decorate = false;
    let mut s = RecordingSurface::new(Size::new(960.0, 540.0), MonospaceMeasurer::new(10.0));
    Compositor::default().compose(&mut s, &frame);
    let transform = s.commands().iter().find_map(|c| match c {
        DrawCommand::Text { transform, .. } => Some(*transform),
        _ => None,
    });
    // Box centre (960, 540) in reference space lands at the canvas centre.
    assert_eq!(
        transform.map(|t| t * Point::ORIGIN),
        Some(Point::new(480.0, 270.0))
    );
}
