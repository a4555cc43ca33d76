//! Serde model of templates and overlays.

pub mod color;
pub mod overlay;
pub mod patch;
pub mod store;
pub mod template;
