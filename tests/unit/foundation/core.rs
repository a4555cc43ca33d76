use super::*;

#[test]
fn default_resolution_is_full_hd() {
    let r = Resolution::default();
    assert_eq!((r.width, r.height), (1920, 1080));
    assert!((r.aspect_ratio() - 16.0 / 9.0).abs() < 1e-12);
}

#[test]
fn zero_sized_resolution_is_rejected() {
    assert!(Resolution::new(0, 1080).is_err());
    assert!(Resolution::new(1080, 1920).is_ok());
}

#[test]
fn premultiply_rounds_to_nearest() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}

#[test]
fn overlay_key_display_is_readable() {
    assert_eq!(OverlayKey(7).to_string(), "overlay#7");
}
