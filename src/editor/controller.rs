//! Pointer and keyboard state machine for direct manipulation on the canvas.
//!
//! The controller never writes the overlay store itself. Each event returns a list of
//! [`Intent`]s that the editor session applies, records and persists. All geometry is done
//! in reference pixels and converted to percent once per emitted patch, always from the
//! snapshot taken when the gesture started.

use std::collections::BTreeSet;

use crate::editor::history::CommandKind;
use crate::editor::input::{Cursor, Handle, Key, Modifiers, ShortcutAction, handle_at, resolve_shortcut};
use crate::foundation::config::EditorConfig;
use crate::foundation::core::{OverlayKey, Point, Size, Vec2};
use crate::foundation::error::OverlayError;
use crate::foundation::math::ceil2;
use crate::model::overlay::{Dimensions, Overlay, Position};
use crate::model::patch::OverlayPatch;
use crate::model::store::OverlayStore;
use crate::render::compositor::HitBox;
use crate::transform::coords::{CoordinateMapper, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub enum ManipulationState {
    Idle,
    Dragging {
        key: OverlayKey,
        /// Pointer position at pointer-down, reference pixels.
        origin_px: Point,
        /// Overlay anchor at pointer-down, percent.
        overlay_origin_percent: Point,
        before: Overlay,
    },
    Resizing {
        key: OverlayKey,
        handle: Handle,
        origin_px: Point,
        /// Text box size at pointer-down, reference pixels.
        origin_dims_px: Size,
        before: Overlay,
    },
}

impl ManipulationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn key(&self) -> Option<OverlayKey> {
        match self {
            Self::Idle => None,
            Self::Dragging { key, .. } | Self::Resizing { key, .. } => Some(*key),
        }
    }
}

/// A change the session should carry out on behalf of the controller.
#[derive(Debug)]
pub enum Intent {
    /// Apply `patch` to the store. `record` is set for one-shot edits that go straight into
    /// history; gesture patches are recorded once by [`Intent::GestureEnded`].
    Patch {
        key: OverlayKey,
        patch: OverlayPatch,
        record: Option<CommandKind>,
    },
    GestureEnded {
        key: OverlayKey,
        kind: CommandKind,
        before: Overlay,
    },
    SelectionChanged(Option<OverlayKey>),
    HoverChanged(Option<OverlayKey>),
    Delete(OverlayKey),
    Duplicate(OverlayKey),
    LockChanged { key: OverlayKey, locked: bool },
    Undo,
    Redo,
    /// A refused action the operator should be told about.
    Notice(OverlayError),
}

#[derive(Debug, Clone)]
pub struct Controller {
    config: EditorConfig,
    mapper: CoordinateMapper,
    viewport: Viewport,
    state: ManipulationState,
    selected: Option<OverlayKey>,
    hovered: Option<OverlayKey>,
    locked: BTreeSet<OverlayKey>,
    shift: bool,
    cursor: Cursor,
    hit_boxes: Vec<HitBox>,
}

impl Controller {
    pub fn new(config: EditorConfig, mapper: CoordinateMapper) -> Self {
        Self {
            config,
            mapper,
            viewport: Viewport::identity(mapper.reference()),
            state: ManipulationState::Idle,
            selected: None,
            hovered: None,
            locked: BTreeSet::new(),
            shift: false,
            cursor: Cursor::Default,
            hit_boxes: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn set_mapper(&mut self, mapper: CoordinateMapper) {
        self.mapper = mapper;
        self.viewport.reference = mapper.reference();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.viewport = Viewport::new(canvas, self.mapper.reference());
    }

    pub fn state(&self) -> &ManipulationState {
        &self.state
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn selected(&self) -> Option<OverlayKey> {
        self.selected
    }

    pub fn hovered(&self) -> Option<OverlayKey> {
        self.hovered
    }

    pub fn shift_held(&self) -> bool {
        self.shift
    }

    pub fn is_locked(&self, key: OverlayKey) -> bool {
        self.locked.contains(&key)
    }

    pub fn locked(&self) -> &BTreeSet<OverlayKey> {
        &self.locked
    }

    /// Set the lock flag, returning whether it changed.
    pub fn set_locked(&mut self, key: OverlayKey, locked: bool) -> bool {
        let changed = if locked {
            self.locked.insert(key)
        } else {
            self.locked.remove(&key)
        };
        if changed && locked && self.state.key() == Some(key) {
            self.state = ManipulationState::Idle;
        }
        changed
    }

    /// Boxes drawn by the last frame, bottom-to-top; hit testing runs against these.
    pub fn set_hit_boxes(&mut self, hit_boxes: Vec<HitBox>) {
        self.hit_boxes = hit_boxes;
    }

    pub fn hit_boxes(&self) -> &[HitBox] {
        &self.hit_boxes
    }

    pub fn hit_box(&self, key: OverlayKey) -> Option<&HitBox> {
        self.hit_boxes.iter().find(|h| h.key == key)
    }

    /// Topmost overlay whose padded box contains `p` (reference pixels).
    pub fn topmost_at(&self, p: Point) -> Option<OverlayKey> {
        self.hit_boxes
            .iter()
            .rev()
            .find(|h| h.padded.contains(p))
            .map(|h| h.key)
    }

    pub fn select(&mut self, key: Option<OverlayKey>) -> Vec<Intent> {
        if self.selected == key {
            return Vec::new();
        }
        tracing::debug!(from = ?self.selected, to = ?key, "selection changed");
        self.selected = key;
        vec![Intent::SelectionChanged(key)]
    }

    /// Drop every reference to a removed overlay.
    pub fn forget(&mut self, key: OverlayKey) -> Vec<Intent> {
        let mut out = Vec::new();
        if self.state.key() == Some(key) {
            self.state = ManipulationState::Idle;
        }
        if self.hovered == Some(key) {
            self.hovered = None;
            out.push(Intent::HoverChanged(None));
        }
        self.locked.remove(&key);
        self.hit_boxes.retain(|h| h.key != key);
        if self.selected == Some(key) {
            out.extend(self.select(None));
        }
        out
    }

    pub fn pointer_down(
        &mut self,
        canvas: Point,
        modifiers: Modifiers,
        store: &OverlayStore,
    ) -> Vec<Intent> {
        self.shift = modifiers.shift;
        let mut out = self.end_gesture();
        let p = self.viewport.canvas_to_reference(canvas);

        if let Some((key, handle)) = self.handle_under(p)
            && let Some(hit) = self.hit_box(key).copied()
            && let Some(overlay) = store.get(key)
        {
            tracing::debug!(%key, ?handle, "resize started");
            self.state = ManipulationState::Resizing {
                key,
                handle,
                origin_px: p,
                origin_dims_px: hit.text_box.size(),
                before: overlay.clone(),
            };
            self.cursor = handle.cursor();
            return out;
        }

        match self.topmost_at(p) {
            Some(key) => {
                out.extend(self.select(Some(key)));
                if self.is_locked(key) {
                    self.cursor = Cursor::Pointer;
                    out.push(Intent::Notice(OverlayError::locked(key.to_string())));
                } else if let Some(overlay) = store.get(key) {
                    tracing::debug!(%key, "drag started");
                    self.state = ManipulationState::Dragging {
                        key,
                        origin_px: p,
                        overlay_origin_percent: Point::new(overlay.position.x, overlay.position.y),
                        before: overlay.clone(),
                    };
                    self.cursor = Cursor::Move;
                }
            }
            None => {
                out.extend(self.select(None));
                self.cursor = Cursor::Default;
            }
        }
        out
    }

    pub fn pointer_move(
        &mut self,
        canvas: Point,
        modifiers: Modifiers,
        store: &OverlayStore,
    ) -> Vec<Intent> {
        self.shift = modifiers.shift;
        let p = self.viewport.canvas_to_reference(canvas);
        match &self.state {
            ManipulationState::Idle => self.update_hover(p),
            ManipulationState::Dragging {
                key,
                origin_px,
                overlay_origin_percent,
                ..
            } => {
                let (key, origin_px, origin_pct) = (*key, *origin_px, *overlay_origin_percent);
                let Some(current) = store.get(key) else {
                    self.state = ManipulationState::Idle;
                    return Vec::new();
                };
                let start = self.mapper.percent_to_pixel(origin_pct);
                let next = self.mapper.clamp_pixel(start + (p - origin_px));
                let pct = self.mapper.pixel_to_percent(next);
                if pct.x == current.position.x && pct.y == current.position.y {
                    return Vec::new();
                }
                let position = Position {
                    x: pct.x,
                    y: pct.y,
                    ..current.position
                };
                vec![Intent::Patch {
                    key,
                    patch: OverlayPatch::position(position),
                    record: None,
                }]
            }
            ManipulationState::Resizing {
                key,
                handle,
                origin_px,
                origin_dims_px,
                before,
            } => {
                let dims = self.resized_dimensions(
                    before,
                    *handle,
                    *origin_dims_px,
                    p - *origin_px,
                    self.shift,
                );
                let key = *key;
                let Some(current) = store.get(key) else {
                    self.state = ManipulationState::Idle;
                    return Vec::new();
                };
                if dims == current.dimensions {
                    return Vec::new();
                }
                vec![Intent::Patch {
                    key,
                    patch: OverlayPatch::dimensions(dims),
                    record: None,
                }]
            }
        }
    }

    pub fn pointer_up(&mut self) -> Vec<Intent> {
        let out = self.end_gesture();
        self.cursor = if self.hovered.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        };
        out
    }

    /// Pointer left the canvas: any gesture ends where it is and hover clears.
    pub fn pointer_leave(&mut self) -> Vec<Intent> {
        let mut out = self.end_gesture();
        if self.hovered.take().is_some() {
            out.push(Intent::HoverChanged(None));
        }
        self.cursor = Cursor::Default;
        out
    }

    pub fn cancel(&mut self) -> Vec<Intent> {
        self.pointer_up()
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers, store: &OverlayStore) -> Vec<Intent> {
        self.shift = modifiers.shift;
        let Some(action) = resolve_shortcut(key, modifiers) else {
            return Vec::new();
        };
        match action {
            ShortcutAction::Undo => vec![Intent::Undo],
            ShortcutAction::Redo => vec![Intent::Redo],
            ShortcutAction::ClearSelection => self.select(None),
            ShortcutAction::ToggleLock => match self.selected {
                Some(sel) => {
                    let locked = !self.is_locked(sel);
                    self.set_locked(sel, locked);
                    vec![Intent::LockChanged { key: sel, locked }]
                }
                None => Vec::new(),
            },
            _ => {
                let Some(sel) = self.selected else {
                    return Vec::new();
                };
                if action.mutates_selection() && self.is_locked(sel) {
                    return vec![Intent::Notice(OverlayError::locked(sel.to_string()))];
                }
                match action {
                    ShortcutAction::Nudge { dx, dy, large } => self.nudge(sel, dx, dy, large, store),
                    ShortcutAction::Delete => vec![Intent::Delete(sel)],
                    ShortcutAction::Duplicate => vec![Intent::Duplicate(sel)],
                    _ => Vec::new(),
                }
            }
        }
    }

    /// Shift tracked outside key events, e.g. from a modifier-only key press.
    pub fn set_shift(&mut self, shift: bool) {
        self.shift = shift;
    }

    fn nudge(
        &self,
        key: OverlayKey,
        dx: i8,
        dy: i8,
        large: bool,
        store: &OverlayStore,
    ) -> Vec<Intent> {
        let Some(current) = store.get(key) else {
            return Vec::new();
        };
        let step = if large {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        let delta = self
            .viewport
            .canvas_delta_to_reference(Vec2::new(f64::from(dx) * step, f64::from(dy) * step));
        let start = self
            .mapper
            .percent_to_pixel(Point::new(current.position.x, current.position.y));
        let pct = self
            .mapper
            .pixel_to_percent(self.mapper.clamp_pixel(start + delta));
        if pct.x == current.position.x && pct.y == current.position.y {
            return Vec::new();
        }
        vec![Intent::Patch {
            key,
            patch: OverlayPatch::position(Position {
                x: pct.x,
                y: pct.y,
                ..current.position
            }),
            record: Some(CommandKind::Nudge),
        }]
    }

    /// Dimensions after dragging `handle` by `delta` from a box of `origin` size.
    ///
    /// The font size is never touched; only the box changes.
    pub(crate) fn resized_dimensions(
        &self,
        before: &Overlay,
        handle: Handle,
        origin: Size,
        delta: Vec2,
        shift: bool,
    ) -> Dimensions {
        let mut dw = delta.x * handle.width_sign();
        let mut dh = delta.y * handle.height_sign();
        if shift {
            let d = if dw.abs() >= dh.abs() { dw } else { dh };
            dw = d;
            dh = d;
        }
        let reference = self.mapper.reference();
        let touches_w = shift || handle.width_sign() != 0.0;
        let touches_h = shift || handle.height_sign() != 0.0;

        let width = if touches_w {
            let floor = ceil2(self.config.min_overlay_width / reference.width * 100.0);
            let w = (origin.width + dw).max(self.config.min_overlay_width);
            Some(self.mapper.width_to_percent(w).max(floor).min(100.0))
        } else {
            before.dimensions.width
        };
        let height = if touches_h {
            let floor = ceil2(self.config.min_overlay_height / reference.height * 100.0);
            let h = (origin.height + dh).max(self.config.min_overlay_height);
            Some(self.mapper.height_to_percent(h).max(floor).min(100.0))
        } else {
            before.dimensions.height
        };
        Dimensions { width, height }
    }

    fn handle_under(&self, p: Point) -> Option<(OverlayKey, Handle)> {
        let sel = self.selected?;
        if self.is_locked(sel) {
            return None;
        }
        let hit = self.hit_box(sel)?;
        let tolerance = self.viewport.canvas_len_to_reference(self.config.handle_size);
        handle_at(hit.padded, p, tolerance).map(|h| (sel, h))
    }

    fn update_hover(&mut self, p: Point) -> Vec<Intent> {
        let hovered = self.topmost_at(p);
        self.cursor = match self.handle_under(p) {
            Some((_, handle)) => handle.cursor(),
            None if hovered.is_some() => Cursor::Pointer,
            None => Cursor::Default,
        };
        if hovered == self.hovered {
            return Vec::new();
        }
        self.hovered = hovered;
        vec![Intent::HoverChanged(hovered)]
    }

    fn end_gesture(&mut self) -> Vec<Intent> {
        match std::mem::replace(&mut self.state, ManipulationState::Idle) {
            ManipulationState::Idle => Vec::new(),
            ManipulationState::Dragging { key, before, .. } => {
                tracing::debug!(%key, "drag ended");
                vec![Intent::GestureEnded {
                    key,
                    kind: CommandKind::Move,
                    before,
                }]
            }
            ManipulationState::Resizing { key, before, .. } => {
                tracing::debug!(%key, "resize ended");
                vec![Intent::GestureEnded {
                    key,
                    kind: CommandKind::Resize,
                    before,
                }]
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/controller.rs"]
mod tests;
