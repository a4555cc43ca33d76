//! The editing session a host UI drives.
//!
//! [`Editor`] owns the overlay store and wires the controller, undo log, compositor and
//! persistence queue together. Every mutation goes through here: it is validated, checked
//! against the lock set, applied to the store, recorded for undo, queued for sync and
//! announced as an [`EditorEvent`].

use std::collections::{BTreeSet, VecDeque};
use std::time::Instant;

use crate::editor::controller::{Controller, Intent, ManipulationState};
use crate::editor::history::{Command, CommandKind, History};
use crate::editor::input::{Cursor, Key, Modifiers};
use crate::foundation::config::EditorConfig;
use crate::foundation::core::{OverlayKey, Point, Resolution, Size};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::foundation::math::{ceil2, round2};
use crate::model::overlay::Overlay;
use crate::model::patch::OverlayPatch;
use crate::model::store::OverlayStore;
use crate::model::template::{FieldValues, Template};
use crate::render::compositor::{Compositor, FrameInput, FrameReport};
use crate::render::surface::DrawSurface;
use crate::sync::backend::OverlayBackend;
use crate::sync::queue::{SyncEvent, SyncOutcome, SyncQueue, SyncRequest, Ticket};
use crate::transform::coords::CoordinateMapper;

/// Something the host should react to.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// An overlay changed; `patch` names the fields that did.
    OverlayUpdated { key: OverlayKey, patch: OverlayPatch },
    SelectionChanged(Option<OverlayKey>),
    HoverChanged(Option<OverlayKey>),
    OverlayAdded(OverlayKey),
    OverlayDeleted(OverlayKey),
    LockChanged { key: OverlayKey, locked: bool },
    /// A refused or failed action, worded for the operator.
    Notice(String),
    /// The backend assigned an id to a new overlay.
    OverlaySaved { key: OverlayKey, id: String },
    /// The store adopted the backend's copy of a saved overlay.
    OverlayReconciled { key: OverlayKey },
    /// A failed save put the overlay back to its last saved state.
    OverlayReverted { key: OverlayKey },
}

pub struct Editor {
    config: EditorConfig,
    resolution: Resolution,
    store: OverlayStore,
    fields: FieldValues,
    controller: Controller,
    history: History,
    compositor: Compositor,
    sync: SyncQueue,
    time: f64,
    clock: Instant,
    events: VecDeque<EditorEvent>,
}

impl Editor {
    pub fn new(template: &Template, config: EditorConfig) -> OverlayResult<Self> {
        config.validate()?;
        template.validate()?;
        let store =
            OverlayStore::from_overlays(template.overlays.iter().cloned(), template.duration_seconds)?;
        let mut sync = SyncQueue::new(config.debounce());
        for (key, overlay) in store.iter() {
            sync.track_loaded(key, overlay);
        }
        let mapper = CoordinateMapper::new(template.resolution);
        tracing::debug!(overlays = store.len(), "editor session opened");
        Ok(Self {
            controller: Controller::new(config.clone(), mapper),
            history: History::new(config.history_limit),
            compositor: Compositor::new(config.clone()),
            config,
            resolution: template.resolution,
            store,
            fields: template.fields.clone(),
            sync,
            time: 0.0,
            clock: Instant::now(),
            events: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    pub fn overlay(&self, key: OverlayKey) -> Option<&Overlay> {
        self.store.get(key)
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn sync(&self) -> &SyncQueue {
        &self.sync
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        self.controller.mapper()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn selected(&self) -> Option<OverlayKey> {
        self.controller.selected()
    }

    pub fn hovered(&self) -> Option<OverlayKey> {
        self.controller.hovered()
    }

    pub fn cursor(&self) -> Cursor {
        self.controller.cursor()
    }

    pub fn state(&self) -> &ManipulationState {
        self.controller.state()
    }

    pub fn is_locked(&self, key: OverlayKey) -> bool {
        self.controller.is_locked(key)
    }

    /// Playback position, called on every seek and scrub.
    pub fn set_time(&mut self, t: f64) {
        if t.is_finite() {
            self.time = t.max(0.0);
        }
    }

    /// Timestamp used for debouncing edits made from now on.
    pub fn set_clock(&mut self, now: Instant) {
        self.clock = now;
    }

    pub fn fields(&self) -> &FieldValues {
        &self.fields
    }

    pub fn set_field(&mut self, endpoint_key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(endpoint_key.into(), value.into());
    }

    pub fn set_canvas_size(&mut self, canvas: Size) {
        self.controller.set_canvas_size(canvas);
    }

    /// Change the template's authored resolution. Stored percentages are left as they are.
    pub fn set_reference_resolution(&mut self, resolution: Resolution) -> OverlayResult<()> {
        let resolution = Resolution::new(resolution.width, resolution.height)?;
        self.resolution = resolution;
        self.controller
            .set_mapper(CoordinateMapper::new(resolution));
        Ok(())
    }

    pub fn select(&mut self, key: Option<OverlayKey>) -> OverlayResult<()> {
        if let Some(key) = key {
            self.store.require(key)?;
        }
        let intents = self.controller.select(key);
        self.apply_intents(intents);
        Ok(())
    }

    /// Append a default text overlay above the others and select it.
    pub fn add_overlay(&mut self) -> OverlayResult<OverlayKey> {
        let overlay =
            Overlay::with_defaults(self.store.next_layer_index(), self.store.template_duration());
        self.insert_new(overlay, CommandKind::Add)
    }

    /// Append `overlay` as a new, unsaved overlay above the others and select it.
    pub fn add_overlay_with(&mut self, overlay: Overlay) -> OverlayResult<OverlayKey> {
        let overlay = Overlay {
            id: None,
            layer_index: self.store.next_layer_index(),
            ..overlay
        };
        let result = self.insert_new(overlay, CommandKind::Add);
        self.reported(result)
    }

    /// Apply a form edit.
    pub fn update_overlay(&mut self, key: OverlayKey, patch: OverlayPatch) -> OverlayResult<()> {
        let result = self.apply_patch(key, patch, Some(CommandKind::Edit));
        self.reported(result)
    }

    pub fn delete_overlay(&mut self, key: OverlayKey) -> OverlayResult<()> {
        let result = self.delete_inner(key);
        self.reported(result)
    }

    /// Copy `key` with a fixed offset, a fresh identity and the next layer index.
    pub fn duplicate_overlay(&mut self, key: OverlayKey) -> OverlayResult<OverlayKey> {
        let result = self.duplicate_inner(key);
        self.reported(result)
    }

    pub fn set_locked(&mut self, key: OverlayKey, locked: bool) -> OverlayResult<()> {
        self.store.require(key)?;
        if self.controller.set_locked(key, locked) {
            self.events.push_back(EditorEvent::LockChanged { key, locked });
        }
        Ok(())
    }

    pub fn toggle_lock(&mut self, key: OverlayKey) -> OverlayResult<bool> {
        let locked = !self.is_locked(key);
        self.set_locked(key, locked)?;
        Ok(locked)
    }

    /// Restack overlays bottom-to-top in the order given; `keys` must name every overlay
    /// once.
    ///
    /// Reordering is not recorded for undo.
    pub fn reorder(&mut self, keys: &[OverlayKey]) -> OverlayResult<()> {
        let result = self.reorder_inner(keys);
        self.reported(result)
    }

    pub fn undo(&mut self) -> OverlayResult<()> {
        let Some(command) = self.history.peek_undo().cloned() else {
            return Ok(());
        };
        let result = self.apply_snapshot(command.key, command.before);
        if result.is_ok() {
            self.history.commit_undo();
        }
        self.reported(result)
    }

    pub fn redo(&mut self) -> OverlayResult<()> {
        let Some(command) = self.history.peek_redo().cloned() else {
            return Ok(());
        };
        let result = self.apply_snapshot(command.key, command.after);
        if result.is_ok() {
            self.history.commit_redo();
        }
        self.reported(result)
    }

    pub fn pointer_down(&mut self, canvas: Point, modifiers: Modifiers) {
        let intents = self.controller.pointer_down(canvas, modifiers, &self.store);
        self.apply_intents(intents);
    }

    pub fn pointer_move(&mut self, canvas: Point, modifiers: Modifiers) {
        let intents = self.controller.pointer_move(canvas, modifiers, &self.store);
        self.apply_intents(intents);
    }

    pub fn pointer_up(&mut self) {
        let intents = self.controller.pointer_up();
        self.apply_intents(intents);
    }

    pub fn pointer_leave(&mut self) {
        let intents = self.controller.pointer_leave();
        self.apply_intents(intents);
    }

    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) {
        let intents = self.controller.key_down(key, modifiers, &self.store);
        self.apply_intents(intents);
    }

    /// Draw the current frame with editor decoration and refresh hit testing from it.
    pub fn render_frame(&mut self, surface: &mut dyn DrawSurface) -> FrameReport {
        if surface.size() != self.controller.viewport().canvas {
            self.controller.set_canvas_size(surface.size());
        }
        let input = FrameInput {
            store: &self.store,
            fields: &self.fields,
            time: self.time,
            mapper: *self.controller.mapper(),
            viewport: *self.controller.viewport(),
            selected: self.controller.selected(),
            hovered: self.controller.hovered(),
            locked: Some(self.controller.locked()),
            decorate: true,
        };
        let report = self.compositor.compose(surface, &input);
        self.controller.set_hit_boxes(report.hit_boxes.clone());
        report
    }

    /// Requests due at `now`; hand each answer back through [`Editor::complete_sync`].
    pub fn poll_sync(&mut self, now: Instant) -> Vec<SyncRequest> {
        self.clock = now;
        self.sync.poll(now, &self.store)
    }

    pub fn complete_sync(&mut self, ticket: Ticket, result: OverlayResult<SyncOutcome>) {
        let events = self.sync.complete(ticket, result, &mut self.store);
        self.apply_sync_events(events);
    }

    /// Send every request due at `now` through `backend`.
    pub fn flush_sync(&mut self, backend: &mut dyn OverlayBackend, now: Instant) {
        self.clock = now;
        let events = self.sync.flush_due(backend, now, &mut self.store);
        self.apply_sync_events(events);
    }

    /// Send everything queued, ignoring the debounce.
    pub fn flush_all_sync(&mut self, backend: &mut dyn OverlayBackend) {
        let events = self.sync.flush_all(backend, &mut self.store);
        self.apply_sync_events(events);
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.events.drain(..).collect()
    }

    /// Current overlays as a template, for export and offline rendering.
    pub fn to_template(&self) -> Template {
        Template {
            resolution: self.resolution,
            duration_seconds: self.store.template_duration(),
            overlays: self.store.to_overlays(),
            fields: self.fields.clone(),
        }
    }

    fn insert_new(&mut self, overlay: Overlay, kind: CommandKind) -> OverlayResult<OverlayKey> {
        let key = self.store.insert(overlay.clone())?;
        self.history
            .push(Command::new(kind, key, None, Some(overlay)));
        self.sync.created(key, self.clock);
        self.events.push_back(EditorEvent::OverlayAdded(key));
        tracing::debug!(%key, ?kind, "overlay added");
        let intents = self.controller.select(Some(key));
        self.apply_intents(intents);
        Ok(key)
    }

    fn ensure_unlocked(&self, key: OverlayKey) -> OverlayResult<()> {
        if self.controller.is_locked(key) {
            return Err(OverlayError::locked(key.to_string()));
        }
        Ok(())
    }

    fn apply_patch(
        &mut self,
        key: OverlayKey,
        patch: OverlayPatch,
        record: Option<CommandKind>,
    ) -> OverlayResult<()> {
        self.ensure_unlocked(key)?;
        self.check_min_size(key, &patch)?;
        let (before, after) = self.store.apply_patch(key, &patch)?;
        if before == after {
            return Ok(());
        }
        if let Some(kind) = record {
            self.history
                .push(Command::new(kind, key, Some(before.clone()), Some(after.clone())));
        }
        let changed = OverlayPatch::diff(&before, &after);
        self.sync.updated(key, changed.clone(), self.clock);
        self.events.push_back(EditorEvent::OverlayUpdated {
            key,
            patch: changed,
        });
        Ok(())
    }

    /// Reject a patch that moves a box dimension below the configured pixel minimum.
    ///
    /// Values the patch leaves as they were are not checked, so an overlay authored below
    /// the floor can still be edited in other ways.
    fn check_min_size(&self, key: OverlayKey, patch: &OverlayPatch) -> OverlayResult<()> {
        let Some(dims) = &patch.dimensions else {
            return Ok(());
        };
        let current = self.store.require(key)?.dimensions;
        let reference = self.controller.mapper().reference();
        for (name, value, previous, min_px, extent) in [
            (
                "width",
                dims.width,
                current.width,
                self.config.min_overlay_width,
                reference.width,
            ),
            (
                "height",
                dims.height,
                current.height,
                self.config.min_overlay_height,
                reference.height,
            ),
        ] {
            if let Some(v) = value
                && value != previous
            {
                let floor = ceil2(min_px / extent * 100.0);
                if v < floor {
                    return Err(OverlayError::validation(format!(
                        "dimensions.{name} {v}% is below the {min_px}px minimum ({floor}%)"
                    )));
                }
            }
        }
        Ok(())
    }

    fn delete_inner(&mut self, key: OverlayKey) -> OverlayResult<()> {
        self.ensure_unlocked(key)?;
        let removed = self.store.remove(key)?;
        self.sync.deleted(key, removed.id.clone(), self.clock);
        self.history
            .push(Command::new(CommandKind::Delete, key, Some(removed), None));
        let intents = self.controller.forget(key);
        self.apply_intents(intents);
        self.events.push_back(EditorEvent::OverlayDeleted(key));
        tracing::debug!(%key, "overlay deleted");
        Ok(())
    }

    fn duplicate_inner(&mut self, key: OverlayKey) -> OverlayResult<OverlayKey> {
        self.ensure_unlocked(key)?;
        let source = self.store.require(key)?;
        let mapper = self.controller.mapper();
        let dx = mapper.width_to_percent(self.config.duplicate_offset);
        let dy = mapper.height_to_percent(self.config.duplicate_offset);

        let mut copy = source.clone();
        copy.id = None;
        copy.label = format!("{} (Copy)", source.label);
        copy.position.x = round2((source.position.x + dx).min(100.0));
        copy.position.y = round2((source.position.y + dy).min(100.0));
        copy.layer_index = self.store.next_layer_index();
        self.insert_new(copy, CommandKind::Duplicate)
    }

    fn reorder_inner(&mut self, keys: &[OverlayKey]) -> OverlayResult<()> {
        // A full permutation, so every overlay gets a distinct rank.
        let listed: BTreeSet<OverlayKey> = keys.iter().copied().collect();
        if listed.len() != keys.len() || keys.len() != self.store.len() {
            return Err(OverlayError::validation(format!(
                "reorder must list each of the {} overlays exactly once",
                self.store.len()
            )));
        }
        for &key in keys {
            self.store.require(key)?;
            self.ensure_unlocked(key)?;
        }
        for (i, &key) in keys.iter().enumerate() {
            self.apply_patch(key, OverlayPatch::layer_index(i as i64), None)?;
        }
        self.sync.reordered(keys.to_vec(), self.clock);
        Ok(())
    }

    /// Put `key` into the `target` snapshot, creating or deleting it as needed.
    fn apply_snapshot(&mut self, key: OverlayKey, target: Option<Overlay>) -> OverlayResult<()> {
        self.ensure_unlocked(key)?;
        match (target, self.store.contains(key)) {
            (Some(target), true) => {
                let before = self.store.replace(key, target.clone())?;
                let changed = OverlayPatch::diff(&before, &target);
                if !changed.is_empty() {
                    self.sync.updated(key, changed.clone(), self.clock);
                    self.events.push_back(EditorEvent::OverlayUpdated {
                        key,
                        patch: changed,
                    });
                }
            }
            (Some(target), false) => {
                self.store.insert_with_key(key, target.clone())?;
                self.sync.restored(key, &target, self.clock);
                self.events.push_back(EditorEvent::OverlayAdded(key));
            }
            (None, true) => {
                let removed = self.store.remove(key)?;
                self.sync.deleted(key, removed.id, self.clock);
                let intents = self.controller.forget(key);
                self.apply_intents(intents);
                self.events.push_back(EditorEvent::OverlayDeleted(key));
            }
            (None, false) => return Err(OverlayError::not_found(key.to_string())),
        }
        Ok(())
    }

    fn apply_intents(&mut self, intents: Vec<Intent>) {
        for intent in intents {
            match intent {
                Intent::Patch { key, patch, record } => {
                    let result = self.apply_patch(key, patch, record);
                    let _ = self.reported(result);
                }
                Intent::GestureEnded { key, kind, before } => {
                    let after = self.store.get(key).cloned();
                    self.history
                        .push(Command::new(kind, key, Some(before), after));
                }
                Intent::SelectionChanged(key) => {
                    self.events.push_back(EditorEvent::SelectionChanged(key));
                }
                Intent::HoverChanged(key) => {
                    self.events.push_back(EditorEvent::HoverChanged(key));
                }
                Intent::Delete(key) => {
                    let _ = self.delete_overlay(key);
                }
                Intent::Duplicate(key) => {
                    let _ = self.duplicate_overlay(key);
                }
                Intent::LockChanged { key, locked } => {
                    self.events
                        .push_back(EditorEvent::LockChanged { key, locked });
                }
                Intent::Undo => {
                    let _ = self.undo();
                }
                Intent::Redo => {
                    let _ = self.redo();
                }
                Intent::Notice(err) => self.notice(&err),
            }
        }
    }

    fn apply_sync_events(&mut self, events: Vec<SyncEvent>) {
        for event in events {
            match event {
                SyncEvent::Saved { key, id } => {
                    self.events.push_back(EditorEvent::OverlaySaved { key, id });
                }
                SyncEvent::Reconciled { key, .. } => {
                    self.events
                        .push_back(EditorEvent::OverlayReconciled { key });
                }
                SyncEvent::Reverted {
                    key,
                    restored: Some(_),
                } => {
                    self.events.push_back(EditorEvent::OverlayReverted { key });
                }
                SyncEvent::Reverted {
                    key,
                    restored: None,
                } => {
                    let intents = self.controller.forget(key);
                    self.apply_intents(intents);
                    self.events.push_back(EditorEvent::OverlayDeleted(key));
                }
                SyncEvent::Failed { message, .. } => {
                    self.events.push_back(EditorEvent::Notice(message));
                }
            }
        }
    }

    fn notice(&mut self, err: &OverlayError) {
        if err.is_user_visible() {
            tracing::debug!(error = %err, "notice");
            self.events.push_back(EditorEvent::Notice(err.to_string()));
        }
    }

    fn reported<T>(&mut self, result: OverlayResult<T>) -> OverlayResult<T> {
        if let Err(err) = &result {
            self.notice(err);
        }
        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
