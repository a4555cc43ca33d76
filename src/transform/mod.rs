/// Percent, reference-pixel and canvas-pixel conversions.
pub mod coords;
