use super::*;

#[test]
fn over_with_opaque_source_replaces() {
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
}

#[test]
fn over_with_zero_opacity_keeps_destination() {
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 0.0), [10, 20, 30, 255]);
}

#[test]
fn half_transparent_source_blends() {
    let out = over([0, 0, 0, 255], [128, 0, 0, 128], 1.0);
    assert_eq!(out, [128, 0, 0, 255]);
}

#[test]
fn alpha_mask_scales_every_channel() {
    let photo = [200, 100, 50, 255, 200, 100, 50, 255];
    let mask = [0, 0, 0, 255, 0, 0, 0, 0];
    let mut dst = [0u8; 8];
    mask_apply(&photo, &mask, &mut dst, MaskMode::Alpha, false).unwrap();
    assert_eq!(dst, [200, 100, 50, 255, 0, 0, 0, 0]);

    mask_apply(&photo, &mask, &mut dst, MaskMode::Alpha, true).unwrap();
    assert_eq!(dst, [0, 0, 0, 0, 200, 100, 50, 255]);
}

#[test]
fn luma_mask_uses_brightness() {
    let photo = [255, 255, 255, 255];
    let mut dst = [0u8; 4];
    mask_apply(&photo, &[255, 255, 255, 255], &mut dst, MaskMode::Luma, false).unwrap();
    assert_eq!(dst, [255, 255, 255, 255]);
    mask_apply(&photo, &[0, 0, 0, 255], &mut dst, MaskMode::Luma, false).unwrap();
    assert_eq!(dst, [0, 0, 0, 0]);
}

#[test]
fn masked_photo_composites_over_frame() {
    let mut frame = [0, 0, 255, 255, 0, 0, 255, 255];
    let photo = [255, 0, 0, 255, 255, 0, 0, 255];
    let mask = [0, 0, 0, 255, 0, 0, 0, 0];
    composite_masked(&mut frame, &photo, &mask, MaskMode::Alpha, 1.0).unwrap();
    assert_eq!(frame, [255, 0, 0, 255, 0, 0, 255, 255]);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let mut dst = [0u8; 4];
    assert!(mask_apply(&[0; 8], &[0; 4], &mut dst, MaskMode::Alpha, false).is_err());
    assert!(over_in_place(&mut dst, &[0; 3], 1.0).is_err());
}
