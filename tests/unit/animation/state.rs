use super::*;
use crate::animation::ease::Easing;
use crate::model::overlay::{OverlayAnimation, Timing};

fn overlay(start: f64, end: f64, entrance: AnimationSpec, exit: AnimationSpec) -> Overlay {
    let mut o = Overlay::with_defaults(0, None);
    o.timing = Timing::new(start, end).unwrap();
    o.animation = OverlayAnimation { entrance, exit };
    o
}

#[test]
fn add_then_animate_scenario() {
    let o = overlay(
        0.0,
        10.0,
        AnimationSpec::new(AnimationKind::FadeIn, 1.0, Easing::EaseInOut),
        AnimationSpec::new(AnimationKind::FadeOut, 1.0, Easing::EaseInOut),
    );
    assert_eq!(state_at(&o, 0.0).opacity, 0.0);
    assert!((state_at(&o, 0.5).opacity - Easing::EaseInOut.apply(0.5)).abs() < 1e-12);
    assert_eq!(state_at(&o, 1.0).opacity, 1.0);
    assert_eq!(state_at(&o, 5.0).opacity, 1.0);
}

#[test]
fn exit_phase_counts_down() {
    let o = overlay(
        0.0,
        10.0,
        AnimationSpec::none(),
        AnimationSpec::new(AnimationKind::FadeOut, 2.0, Easing::Linear),
    );
    assert_eq!(state_at(&o, 8.0).opacity, 1.0);
    assert!((state_at(&o, 9.0).opacity - 0.5).abs() < 1e-12);
    assert_eq!(state_at(&o, 10.0).opacity, 0.0);
    // Past the end but still inside the visibility tolerance: stays fully exited.
    assert_eq!(state_at(&o, 10.01).opacity, 0.0);
}

#[test]
fn zero_duration_or_none_phases_are_skipped() {
    let o = overlay(
        0.0,
        4.0,
        AnimationSpec::new(AnimationKind::FadeIn, 0.0, Easing::Linear),
        AnimationSpec::new(AnimationKind::None, 2.0, Easing::Linear),
    );
    assert!(state_at(&o, 0.0).is_identity());
    assert!(state_at(&o, 3.9).is_identity());
    assert_eq!(phase_at(&o, 3.9), Phase::Hold);
}

#[test]
fn entrance_wins_when_phases_overlap() {
    let o = overlay(
        0.0,
        1.0,
        AnimationSpec::new(AnimationKind::FadeIn, 1.0, Easing::Linear),
        AnimationSpec::new(AnimationKind::FadeOut, 1.0, Easing::Linear),
    );
    assert!(matches!(phase_at(&o, 0.6), Phase::Entrance { .. }));
    assert!((state_at(&o, 0.6).opacity - 0.6).abs() < 1e-12);
}

#[test]
fn visibility_epsilon_boundaries() {
    let t = Timing::new(2.0, 5.0).unwrap();
    let eps = VISIBILITY_EPSILON;
    assert!(!is_visible(&t, 1.99, eps));
    assert!(is_visible(&t, 2.0, eps));
    assert!(is_visible(&t, 5.0, eps));
    assert!(!is_visible(&t, 5.02, eps));
}

#[test]
fn state_is_a_pure_function_of_time() {
    let o = overlay(
        1.0,
        6.0,
        AnimationSpec::new(AnimationKind::Bounce, 1.0, Easing::Bounce),
        AnimationSpec::new(AnimationKind::Spin, 1.0, Easing::EaseIn),
    );
    for t in [1.2, 1.7, 3.0, 5.4, 5.9] {
        assert_eq!(state_at(&o, t), state_at(&o, t));
    }
}

#[test]
fn typewriter_reveal_counts_characters() {
    let o = overlay(
        0.0,
        10.0,
        AnimationSpec::new(AnimationKind::Typewriter, 2.0, Easing::Linear),
        AnimationSpec::new(AnimationKind::Typewriter, 2.0, Easing::Linear),
    );
    assert_eq!(typewriter_visible_chars(&o, 0.0, 10), Some(0));
    assert_eq!(typewriter_visible_chars(&o, 1.0, 10), Some(5));
    assert_eq!(typewriter_visible_chars(&o, 5.0, 10), None);
    assert_eq!(typewriter_visible_chars(&o, 9.0, 10), Some(5));
    assert!(state_at(&o, 1.0).is_identity());
}
