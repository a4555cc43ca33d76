use crate::animation::kind::AnimationKind;
use crate::model::overlay::{AnimationSpec, Overlay, Timing};

/// Default tolerance around a visibility window, one frame at 60 fps.
pub const VISIBILITY_EPSILON: f64 = 1.0 / 60.0;

/// Instantaneous transform applied to an overlay while drawing.
///
/// Translation is in layout units (reference pixels) and rotation in radians.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AnimationState {
    pub opacity: f64,
    pub scale: f64,
    pub rotation: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl AnimationState {
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        scale: 1.0,
        rotation: 0.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which part of its visibility window an overlay is in at a given time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Entrance {
        kind: AnimationKind,
        /// Eased progress in the phase.
        progress: f64,
    },
    Exit {
        kind: AnimationKind,
        progress: f64,
    },
    Hold,
}

/// Whether `t` falls inside `[start, end + epsilon]`.
///
/// The leading edge is exact so an overlay never shows a frame before its start; the
/// trailing tolerance keeps the last frame from flickering at the boundary.
pub fn is_visible(timing: &Timing, t: f64, epsilon: f64) -> bool {
    t >= timing.start_time && t <= timing.end_time + epsilon
}

fn phase_progress(spec: &AnimationSpec, t: f64, phase_start: f64) -> f64 {
    let raw = ((t - phase_start) / spec.duration).clamp(0.0, 1.0);
    spec.easing.apply(raw)
}

fn phase_is_active(spec: &AnimationSpec) -> bool {
    spec.kind != AnimationKind::None && spec.duration.is_finite() && spec.duration > 0.0
}

/// Classify `t` against the overlay's entrance and exit windows.
///
/// The entrance wins when both windows overlap.
pub fn phase_at(overlay: &Overlay, t: f64) -> Phase {
    let start = overlay.timing.start_time;
    let end = overlay.timing.end_time;
    let entrance = &overlay.animation.entrance;
    let exit = &overlay.animation.exit;

    if phase_is_active(entrance) && t < start + entrance.duration {
        return Phase::Entrance {
            kind: entrance.kind,
            progress: phase_progress(entrance, t, start),
        };
    }
    if phase_is_active(exit) && t > end - exit.duration {
        return Phase::Exit {
            kind: exit.kind,
            progress: phase_progress(exit, t, end - exit.duration),
        };
    }
    Phase::Hold
}

/// Pure transform of `overlay` at timeline position `t`.
pub fn state_at(overlay: &Overlay, t: f64) -> AnimationState {
    match phase_at(overlay, t) {
        Phase::Entrance { kind, progress } => kind.transform(progress, true),
        Phase::Exit { kind, progress } => kind.transform(progress, false),
        Phase::Hold => AnimationState::IDENTITY,
    }
}

/// Number of characters a typewriter reveal shows at `t`, or `None` when no reveal applies.
pub fn typewriter_visible_chars(overlay: &Overlay, t: f64, total_chars: usize) -> Option<usize> {
    let total = total_chars as f64;
    match phase_at(overlay, t) {
        Phase::Entrance {
            kind: AnimationKind::Typewriter,
            progress,
        } => Some((progress.clamp(0.0, 1.0) * total).ceil() as usize),
        Phase::Exit {
            kind: AnimationKind::Typewriter,
            progress,
        } => Some(((1.0 - progress.clamp(0.0, 1.0)) * total).ceil() as usize),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/state.rs"]
mod tests;
