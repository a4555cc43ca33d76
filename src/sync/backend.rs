use std::collections::BTreeMap;

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::model::overlay::Overlay;
use crate::model::patch::OverlayPatch;

/// The persistence collaborator the editor saves overlays through.
///
/// Implementations report every failure as [`OverlayError::Persistence`]. Sending the same
/// patch twice must be harmless.
pub trait OverlayBackend {
    /// Persist a new overlay; the returned copy carries the assigned id.
    fn create_overlay(&mut self, overlay: &Overlay) -> OverlayResult<Overlay>;
    fn update_overlay(&mut self, id: &str, patch: &OverlayPatch) -> OverlayResult<Overlay>;
    fn delete_overlay(&mut self, id: &str) -> OverlayResult<()>;
    /// Store a new bottom-to-top order.
    fn reorder_overlays(&mut self, ids: &[String]) -> OverlayResult<()>;
}

/// In-process backend used by the CLI and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    overlays: BTreeMap<String, Overlay>,
    order: Vec<String>,
    next_id: u64,
    fail_remaining: usize,
    calls: Vec<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with already-saved overlays; entries without an id are skipped.
    pub fn with_overlays(overlays: impl IntoIterator<Item = Overlay>) -> Self {
        let mut backend = Self::new();
        for overlay in overlays {
            if let Some(id) = overlay.id.clone() {
                backend.order.push(id.clone());
                backend.overlays.insert(id, overlay);
            }
        }
        backend
    }

    /// Make the next `n` calls fail.
    pub fn fail_next(&mut self, n: usize) {
        self.fail_remaining = n;
    }

    pub fn get(&self, id: &str) -> Option<&Overlay> {
        self.overlays.get(id)
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Calls received, e.g. `"update ov_1"`.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn enter(&mut self, call: String) -> OverlayResult<()> {
        self.calls.push(call.clone());
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            return Err(OverlayError::persistence(format!("{call} rejected")));
        }
        Ok(())
    }

    fn missing(id: &str) -> OverlayError {
        OverlayError::persistence(format!("overlay '{id}' does not exist"))
    }
}

impl OverlayBackend for MemoryBackend {
    fn create_overlay(&mut self, overlay: &Overlay) -> OverlayResult<Overlay> {
        self.enter(format!("create {}", overlay.label))?;
        self.next_id += 1;
        let id = format!("ov_{}", self.next_id);
        let mut saved = overlay.clone();
        saved.id = Some(id.clone());
        self.overlays.insert(id.clone(), saved.clone());
        self.order.push(id);
        Ok(saved)
    }

    fn update_overlay(&mut self, id: &str, patch: &OverlayPatch) -> OverlayResult<Overlay> {
        self.enter(format!("update {id}"))?;
        let current = self.overlays.get(id).ok_or_else(|| Self::missing(id))?;
        let next = patch
            .applied_to(current, None)
            .map_err(|e| OverlayError::persistence(e.to_string()))?;
        self.overlays.insert(id.to_string(), next.clone());
        Ok(next)
    }

    fn delete_overlay(&mut self, id: &str) -> OverlayResult<()> {
        self.enter(format!("delete {id}"))?;
        self.overlays.remove(id).ok_or_else(|| Self::missing(id))?;
        self.order.retain(|o| o != id);
        Ok(())
    }

    fn reorder_overlays(&mut self, ids: &[String]) -> OverlayResult<()> {
        self.enter(format!("reorder {}", ids.join(",")))?;
        if let Some(unknown) = ids.iter().find(|id| !self.overlays.contains_key(*id)) {
            return Err(Self::missing(unknown));
        }
        self.order = ids.to_vec();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/backend.rs"]
mod tests;
