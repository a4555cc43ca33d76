use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::render::mask::{self, MaskMode};

/// A rendered frame as tightly packed RGBA8 rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
            premultiplied: true,
        }
    }

    /// Wrap straight-alpha pixels, e.g. a decoded photo, converting them to premultiplied.
    pub fn from_straight_rgba(width: u32, height: u32, mut data: Vec<u8>) -> OverlayResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(OverlayError::validation("rgba8 byte length mismatch"));
        }
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * a + 127) / 255) as u8;
            }
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Number of pixels with non-zero alpha.
    pub fn opaque_pixel_count(&self) -> usize {
        self.data.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    /// Whether any pixel inside `[x0, x1) x [y0, y1)` has non-zero alpha.
    pub fn any_opaque_in(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        (y0..y1.min(self.height))
            .any(|y| (x0..x1.min(self.width)).any(|x| self.pixel(x, y).is_some_and(|p| p[3] != 0)))
    }

    /// Pixels with alpha divided back out, as PNG and most image tools expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 {
                px[..3].fill(0);
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }

    pub fn save_png(&self, path: &Path) -> OverlayResult<()> {
        let rgba = self.to_straight_rgba();
        image::save_buffer_with_format(
            path,
            &rgba,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    /// Draw `photo` through `mask` onto this frame, the way a layout's photo slot is cut.
    pub fn composite_masked(
        &mut self,
        photo: &FrameRGBA,
        mask_frame: &FrameRGBA,
        mode: MaskMode,
        opacity: f32,
    ) -> OverlayResult<()> {
        for other in [photo, mask_frame] {
            if (other.width, other.height) != (self.width, self.height) {
                return Err(OverlayError::validation(format!(
                    "masked composite expects {}x{} frames, got {}x{}",
                    self.width, self.height, other.width, other.height
                )));
            }
        }
        mask::composite_masked(&mut self.data, &photo.data, &mask_frame.data, mode, opacity)
    }

    /// Composite `top` over this frame.
    pub fn composite_over(&mut self, top: &FrameRGBA, opacity: f32) -> OverlayResult<()> {
        if (top.width, top.height) != (self.width, self.height) {
            return Err(OverlayError::validation("composite frame size mismatch"));
        }
        mask::over_in_place(&mut self.data, &top.data, opacity)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
