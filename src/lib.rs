//! Overlay Studio is the text-overlay timeline and canvas compositor behind a wedding
//! video-template editor.
//!
//! Operators place time-bound, animated text fields on a video frame. The crate covers:
//!
//! - the overlay data model and its percent-based coordinates ([`Template`], [`Overlay`])
//! - measurement-based text layout with greedy word wrap
//! - the entrance/exit animation state machine
//! - per-frame composition onto a [`DrawSurface`], with a CPU rasterizer ([`CpuSurface`])
//! - direct manipulation (drag, resize, keyboard, lock, duplicate, undo) via [`Editor`]
//! - debounced, optimistic persistence through an [`OverlayBackend`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod editor;
pub mod foundation;
pub mod layout;
pub mod model;
pub mod render;
pub mod sync;
pub mod transform;

pub use crate::editor::session::{Editor, EditorEvent};
pub use crate::foundation::config::EditorConfig;
pub use crate::foundation::core::{Affine, OverlayKey, Point, Rect, Resolution, Size, Vec2};
pub use crate::foundation::error::{OverlayError, OverlayResult};
pub use crate::layout::fonts::FontSpec;
pub use crate::model::overlay::Overlay;
pub use crate::model::patch::OverlayPatch;
pub use crate::model::template::Template;
pub use crate::render::compositor::{Compositor, FrameReport};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::surface::{DrawSurface, RecordingSurface};
pub use crate::sync::backend::{MemoryBackend, OverlayBackend};
