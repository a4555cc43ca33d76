use super::*;
use serde_json::json;

fn sample_json() -> serde_json::Value {
    json!({
        "id": "ov_1",
        "endpointKey": "coupleNames",
        "label": "Couple",
        "placeholderText": "Sarah & Michael",
        "position": {"x": 50, "y": 80, "alignment": "center", "anchorPoint": "bottom", "unit": "percent"},
        "dimensions": {"width": 40},
        "timing": {"startTime": 2, "endTime": 8},
        "styling": {
            "fontFamily": "Great Vibes",
            "fontSize": 72,
            "fontWeight": 700,
            "color": "#F5E6C8",
            "textAlign": "center",
            "letterSpacing": 1.5,
            "lineHeight": 1.1,
            "stroke": {"enabled": true, "color": "#000000", "width": 3}
        },
        "animation": {
            "entrance": {"type": "fade-slide-up", "duration": 1.5, "easing": "ease-out"},
            "exit": {"type": "fadeOut", "duration": 1, "easing": "easeInOut"}
        },
        "responsive": {"fontSize": 36},
        "layerIndex": 3
    })
}

#[test]
fn deserializes_persisted_shape() {
    let o: Overlay = serde_json::from_value(sample_json()).unwrap();
    assert_eq!(o.id.as_deref(), Some("ov_1"));
    assert_eq!(o.position.anchor_point, VerticalAnchor::Bottom);
    assert_eq!(o.dimensions.width, Some(40.0));
    assert_eq!(o.dimensions.height, None);
    assert_eq!(o.styling.font_weight, 700);
    assert_eq!(o.animation.entrance.kind, AnimationKind::FadeSlideUp);
    assert_eq!(o.animation.exit.easing, Easing::EaseInOut);
    assert!(o.styling.active_stroke().is_some());
    assert_eq!(o.responsive.and_then(|r| r.font_size), Some(36.0));
    o.validate(Some(10.0)).unwrap();
}

#[test]
fn serialization_is_stable_across_a_reload() {
    let o: Overlay = serde_json::from_value(sample_json()).unwrap();
    let v = serde_json::to_value(&o).unwrap();
    assert_eq!(v["animation"]["exit"]["type"], json!("fade-out"));
    assert_eq!(v["position"]["unit"], json!("percent"));
    assert!(v["dimensions"].get("height").is_none());
    let again: Overlay = serde_json::from_value(v).unwrap();
    assert_eq!(again, o);
}

#[test]
fn non_percent_units_are_rejected() {
    let mut v = sample_json();
    v["position"]["unit"] = json!("px");
    assert!(serde_json::from_value::<Overlay>(v).is_err());
}

#[test]
fn timing_invariants() {
    assert!(Timing::new(2.0, 5.0).is_ok());
    assert!(Timing::new(5.0, 5.0).is_err());
    assert!(Timing::new(6.0, 5.0).is_err());
    assert!(Timing::new(-1.0, 5.0).is_err());
    assert!(Timing::new(0.0, f64::NAN).is_err());
    let t = Timing::new(0.0, 12.0).unwrap();
    assert!(t.validate(Some(10.0)).is_err());
    assert_eq!(t.duration(), 12.0);
}

#[test]
fn defaults_are_valid_and_clamp_to_short_templates() {
    let o = Overlay::with_defaults(4, Some(3.0));
    assert_eq!(o.layer_index, 4);
    assert_eq!(o.timing.end_time, 3.0);
    assert!(o.id.is_none());
    assert!(o.styling.shadow.is_some());
    o.validate(Some(3.0)).unwrap();
    assert_eq!(o.preview_text(), "Your text here");
}

#[test]
fn validation_rejects_out_of_range_fields() {
    let mut o = Overlay::with_defaults(0, None);
    o.position.x = 120.0;
    assert!(o.validate(None).is_err());

    let mut o = Overlay::with_defaults(0, None);
    o.dimensions.width = Some(0.0);
    assert!(o.validate(None).is_err());

    let mut o = Overlay::with_defaults(0, None);
    o.styling.font_size = 0.0;
    assert!(o.validate(None).is_err());

    let mut o = Overlay::with_defaults(0, None);
    o.animation.exit.duration = -1.0;
    assert!(o.validate(None).is_err());
}

#[test]
fn font_spec_uses_styling_fields() {
    let o: Overlay = serde_json::from_value(sample_json()).unwrap();
    assert_eq!(o.styling.font_spec().css(), "700 72px \"Great Vibes\"");
    assert!((o.styling.line_height_px() - 79.2).abs() < 1e-9);
}
