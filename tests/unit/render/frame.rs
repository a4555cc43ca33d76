use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

#[test]
fn pixel_reads_rows_in_order() {
    let mut f = FrameRGBA::transparent(2, 2);
    f.data[12..16].copy_from_slice(&[1, 2, 3, 4]);
    assert_eq!(f.pixel(1, 1), Some([1, 2, 3, 4]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(2, 0), None);
}

#[test]
fn straight_conversion_round_trips_half_alpha() {
    let f = FrameRGBA::from_straight_rgba(1, 1, vec![200, 100, 0, 128]).unwrap();
    assert_eq!(f.pixel(0, 0), Some([100, 50, 0, 128]));
    let back = f.to_straight_rgba();
    assert!((i32::from(back[0]) - 200).abs() <= 1);
    assert!((i32::from(back[1]) - 100).abs() <= 1);
    assert_eq!(back[3], 128);
}

#[test]
fn wrong_length_is_rejected() {
    assert!(FrameRGBA::from_straight_rgba(2, 2, vec![0; 4]).is_err());
}

#[test]
fn masked_photo_only_lands_inside_mask() {
    let mut frame = FrameRGBA::transparent(2, 1);
    let photo = solid(2, 1, [255, 0, 0, 255]);
    let mut mask = FrameRGBA::transparent(2, 1);
    mask.data[3] = 255;

    frame
        .composite_masked(&photo, &mask, MaskMode::Alpha, 1.0)
        .unwrap();
    assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(1, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.opaque_pixel_count(), 1);
    assert!(frame.any_opaque_in(0, 0, 1, 1));
    assert!(!frame.any_opaque_in(1, 0, 2, 1));
}

#[test]
fn size_mismatch_is_rejected() {
    let mut frame = FrameRGBA::transparent(2, 1);
    let photo = solid(1, 1, [255, 0, 0, 255]);
    assert!(
        frame
            .composite_masked(&photo, &photo, MaskMode::Alpha, 1.0)
            .is_err()
    );
    assert!(frame.composite_over(&photo, 1.0).is_err());
}

#[test]
fn png_is_written() {
    let dir = std::env::temp_dir().join(format!("overlay-studio-frame-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("solid.png");
    solid(3, 2, [0, 128, 0, 255]).save_png(&path).unwrap();
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(1, 1).0, [0, 128, 0, 255]);
    let _ = std::fs::remove_dir_all(&dir);
}
