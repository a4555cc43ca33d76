//! Percent ⇄ pixel conversion and the on-screen viewport mapping.

use crate::foundation::core::{Affine, Point, Rect, Resolution, Size, Vec2};
use crate::foundation::math::round2;

/// Converts persisted percent coordinates to reference pixels and back.
///
/// The reference is always the template's authored resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    reference: Size,
}

impl CoordinateMapper {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            reference: resolution.size(),
        }
    }

    pub fn reference(&self) -> Size {
        self.reference
    }

    pub fn reference_rect(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.reference)
    }

    pub fn percent_to_pixel(&self, percent: Point) -> Point {
        Point::new(
            percent.x / 100.0 * self.reference.width,
            percent.y / 100.0 * self.reference.height,
        )
    }

    /// Inverse of [`Self::percent_to_pixel`], rounded to two decimals.
    pub fn pixel_to_percent(&self, pixel: Point) -> Point {
        Point::new(
            round2(pixel.x / self.reference.width * 100.0),
            round2(pixel.y / self.reference.height * 100.0),
        )
    }

    pub fn width_to_pixels(&self, percent: f64) -> f64 {
        percent / 100.0 * self.reference.width
    }

    pub fn height_to_pixels(&self, percent: f64) -> f64 {
        percent / 100.0 * self.reference.height
    }

    pub fn width_to_percent(&self, pixels: f64) -> f64 {
        round2(pixels / self.reference.width * 100.0)
    }

    pub fn height_to_percent(&self, pixels: f64) -> f64 {
        round2(pixels / self.reference.height * 100.0)
    }

    /// Clamp a reference-pixel point into `[0, W] x [0, H]`.
    pub fn clamp_pixel(&self, pixel: Point) -> Point {
        Point::new(
            pixel.x.clamp(0.0, self.reference.width),
            pixel.y.clamp(0.0, self.reference.height),
        )
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(Resolution::default())
    }
}

/// Maps on-screen canvas pixels to reference pixels.
///
/// Each axis scales independently, so a canvas with a different aspect ratio stretches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub canvas: Size,
    pub reference: Size,
}

impl Viewport {
    pub fn new(canvas: Size, reference: Size) -> Self {
        Self { canvas, reference }
    }

    /// A viewport whose canvas is exactly the reference size.
    pub fn identity(reference: Size) -> Self {
        Self::new(reference, reference)
    }

    /// Canvas pixels per reference pixel on each axis.
    pub fn scale(&self) -> Vec2 {
        Vec2::new(
            safe_ratio(self.canvas.width, self.reference.width),
            safe_ratio(self.canvas.height, self.reference.height),
        )
    }

    /// Transform from reference space into canvas space; applied once per frame.
    pub fn base_transform(&self) -> Affine {
        let s = self.scale();
        Affine::scale_non_uniform(s.x, s.y)
    }

    pub fn canvas_to_reference(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(p.x / s.x, p.y / s.y)
    }

    pub fn reference_to_canvas(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(p.x * s.x, p.y * s.y)
    }

    pub fn canvas_delta_to_reference(&self, d: Vec2) -> Vec2 {
        let s = self.scale();
        Vec2::new(d.x / s.x, d.y / s.y)
    }

    /// A canvas-pixel length (handle tolerance, nudge) in reference pixels.
    ///
    /// Uses the smaller scale so the tolerance never shrinks on screen.
    pub fn canvas_len_to_reference(&self, len: f64) -> f64 {
        let s = self.scale();
        len / s.x.min(s.y)
    }
}

fn safe_ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 && num > 0.0 { num / den } else { 1.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/coords.rs"]
mod tests;
