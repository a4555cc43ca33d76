//! Time-driven overlay transforms.

/// Easing curves.
pub mod ease;
/// Entrance/exit transform catalogue.
pub mod kind;
/// Per-time evaluation of an overlay's animation.
pub mod state;
