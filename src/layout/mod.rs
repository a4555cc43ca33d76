//! Text measurement, wrapping and font readiness.

/// Layout memoization.
pub mod cache;
/// Font strings and the registry of loaded faces.
pub mod fonts;
/// Parley shaping over registered faces.
pub mod shape;
/// Greedy word wrap and box placement.
pub mod text;
