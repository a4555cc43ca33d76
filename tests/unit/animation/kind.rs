use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn every_kind_is_identity_when_fully_shown() {
    for kind in AnimationKind::ALL {
        let s = kind.transform(1.0, true);
        assert!(close(s.opacity, 1.0), "{kind:?} opacity {}", s.opacity);
        assert!(close(s.scale, 1.0), "{kind:?} scale {}", s.scale);
        assert!(close(s.translate_x, 0.0), "{kind:?}");
        assert!(close(s.translate_y, 0.0), "{kind:?}");
        assert!(close(s.rotation.rem_euclid(TAU), 0.0), "{kind:?}");

        let s = kind.transform(0.0, false);
        assert!(close(s.opacity, 1.0), "{kind:?} exit start opacity {}", s.opacity);
    }
}

#[test]
fn fade_counts_up_on_entrance_and_down_on_exit() {
    assert!(close(AnimationKind::FadeIn.transform(0.25, true).opacity, 0.25));
    assert!(close(AnimationKind::FadeIn.transform(0.25, false).opacity, 0.75));
    assert!(close(AnimationKind::FadeOut.transform(0.25, true).opacity, 0.25));
}

#[test]
fn slides_offset_by_inverse_progress() {
    let s = AnimationKind::SlideUp.transform(0.0, true);
    assert!(close(s.translate_y, SLIDE_DISTANCE));
    let s = AnimationKind::SlideLeft.transform(0.5, true);
    assert!(close(s.translate_x, SLIDE_DISTANCE * 0.5));
    let s = AnimationKind::SlideRight.transform(1.0, false);
    assert!(close(s.translate_x, -SLIDE_DISTANCE));
    assert!(close(s.opacity, 1.0));
}

#[test]
fn rotations_are_whole_turns_at_zero_progress() {
    let s = AnimationKind::RotateIn.transform(0.0, true);
    assert!(close(s.rotation, -TAU));
    let s = AnimationKind::Spin.transform(0.0, true);
    assert!(close(s.rotation, 2.0 * TAU));
}

#[test]
fn bounce_oscillates_and_never_goes_negative() {
    let mut saw_overshoot = false;
    for i in 0..=100 {
        let p = f64::from(i) / 100.0;
        let s = AnimationKind::Bounce.transform(p, true);
        assert!(s.scale >= 0.0);
        saw_overshoot |= s.scale > 1.0;
    }
    assert!(saw_overshoot);
    assert!(close(AnimationKind::Bounce.transform(0.0, true).scale, 0.0));
    assert!(close(AnimationKind::Bounce.transform(1.0, true).scale, 1.0));
    assert!(close(AnimationKind::Bounce.transform(0.0, false).scale, 1.0));
}

#[test]
fn typewriter_is_identity_at_the_transform_level() {
    assert_eq!(
        AnimationKind::Typewriter.transform(0.3, true),
        AnimationState::IDENTITY
    );
}

#[test]
fn parse_aliases() {
    assert_eq!(AnimationKind::parse("fade").unwrap(), AnimationKind::FadeIn);
    assert_eq!(AnimationKind::parse("fadeOut").unwrap(), AnimationKind::FadeOut);
    assert_eq!(AnimationKind::parse("slide_in_up").unwrap(), AnimationKind::SlideUp);
    assert_eq!(AnimationKind::parse("random").unwrap(), AnimationKind::KenBurns);
    assert_eq!(AnimationKind::parse("").unwrap(), AnimationKind::None);
    assert!(AnimationKind::parse("explode").is_err());
}

#[test]
fn canonical_names_parse_back() {
    for kind in AnimationKind::ALL {
        assert_eq!(AnimationKind::parse(kind.as_str()).unwrap(), kind);
    }
}
