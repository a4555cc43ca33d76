//! Offscreen alpha-mask compositing on premultiplied RGBA8 buffers.
//!
//! A photo slot in a layout is drawn by multiplying the photo with a mask's coverage and
//! then compositing the result over the frame.

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Which mask channel supplies coverage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaskMode {
    #[default]
    Alpha,
    /// Rec. 709 luma of the mask's (premultiplied) color.
    Luma,
}

/// Source-over with an extra `opacity` multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }
    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

fn coverage(m: &[u8], mode: MaskMode, inverted: bool) -> u16 {
    let w = match mode {
        MaskMode::Alpha => m[3],
        MaskMode::Luma => {
            let (r, g, b) = (u16::from(m[0]), u16::from(m[1]), u16::from(m[2]));
            ((r * 54 + g * 183 + b * 19 + 128) >> 8) as u8
        }
    };
    u16::from(if inverted { 255 - w } else { w })
}

fn check_len(what: &str, lens: &[usize]) -> OverlayResult<()> {
    let first = lens.first().copied().unwrap_or(0);
    if !first.is_multiple_of(4) || lens.iter().any(|&l| l != first) {
        return Err(OverlayError::validation(format!(
            "{what} expects equal-length rgba8 buffers"
        )));
    }
    Ok(())
}

/// `dst = src * coverage(mask)`, channel by channel.
pub fn mask_apply(
    src: &[u8],
    mask: &[u8],
    dst: &mut [u8],
    mode: MaskMode,
    inverted: bool,
) -> OverlayResult<()> {
    check_len("mask_apply", &[src.len(), mask.len(), dst.len()])?;
    for ((s, m), d) in src
        .chunks_exact(4)
        .zip(mask.chunks_exact(4))
        .zip(dst.chunks_exact_mut(4))
    {
        let w = coverage(m, mode, inverted);
        for i in 0..4 {
            d[i] = mul_div255_u8(u16::from(s[i]), w);
        }
    }
    Ok(())
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> OverlayResult<()> {
    check_len("over_in_place", &[dst.len(), src.len()])?;
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Mask `photo` and composite the result over `dst` in one pass.
pub fn composite_masked(
    dst: &mut [u8],
    photo: &[u8],
    mask: &[u8],
    mode: MaskMode,
    opacity: f32,
) -> OverlayResult<()> {
    check_len("composite_masked", &[dst.len(), photo.len(), mask.len()])?;
    for ((d, s), m) in dst
        .chunks_exact_mut(4)
        .zip(photo.chunks_exact(4))
        .zip(mask.chunks_exact(4))
    {
        let w = coverage(m, mode, false);
        let masked = [
            mul_div255_u8(u16::from(s[0]), w),
            mul_div255_u8(u16::from(s[1]), w),
            mul_div255_u8(u16::from(s[2]), w),
            mul_div255_u8(u16::from(s[3]), w),
        ];
        let out = over([d[0], d[1], d[2], d[3]], masked, opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/mask.rs"]
mod tests;
