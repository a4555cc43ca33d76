use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Easing::ALL {
        assert!(ease.apply(0.0).abs() < 1e-9, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?}");
    }
}

#[test]
fn monotonic_for_non_overshooting_curves() {
    for ease in [Easing::Linear, Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut] {
        let mut prev = ease.apply(0.0);
        for i in 1..=200 {
            let v = ease.apply(f64::from(i) / 200.0);
            assert!(v >= prev, "{ease:?} decreased at step {i}");
            prev = v;
        }
    }
}

#[test]
fn formulas_match_reference_points() {
    assert_eq!(Easing::EaseIn.apply(0.5), 0.25);
    assert_eq!(Easing::EaseOut.apply(0.5), 0.75);
    assert_eq!(Easing::EaseInOut.apply(0.25), 0.125);
    assert_eq!(Easing::EaseInOut.apply(0.5), 0.5);
    assert_eq!(Easing::EaseInOut.apply(0.75), 0.875);
}

#[test]
fn bounce_overshoots_then_settles() {
    let early = Easing::Bounce.apply(0.1);
    let late = Easing::Bounce.apply(0.9);
    assert!(early < 0.0, "expected anticipation dip, got {early}");
    assert!(late > 1.0, "expected overshoot, got {late}");
}

#[test]
fn inputs_outside_unit_range_are_clamped() {
    assert_eq!(Easing::Linear.apply(-3.0), 0.0);
    assert_eq!(Easing::EaseIn.apply(7.0), 1.0);
}

#[test]
fn parse_accepts_aliases_and_round_trips_through_serde() {
    assert_eq!(Easing::parse("easeInOut").unwrap(), Easing::EaseInOut);
    assert_eq!(Easing::parse("ease_out").unwrap(), Easing::EaseOut);
    assert_eq!(Easing::parse(" Ease-In ").unwrap(), Easing::EaseIn);
    assert!(Easing::parse("wobble").is_err());
    assert!(Easing::parse("").is_err());

    let v = serde_json::to_value(Easing::Bounce).unwrap();
    assert_eq!(v, serde_json::json!("bounce"));
    let back: Easing = serde_json::from_value(serde_json::json!("easeIn")).unwrap();
    assert_eq!(back, Easing::EaseIn);
}
