use crate::animation::state::is_visible;
use crate::foundation::core::OverlayKey;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::model::overlay::Overlay;
use crate::model::patch::OverlayPatch;

#[derive(Clone, Debug)]
struct Entry {
    key: OverlayKey,
    overlay: Overlay,
}

/// The editor's in-memory overlay array; the single source of truth while editing.
///
/// Every write validates the resulting overlay first, so a rejected edit leaves the
/// stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct OverlayStore {
    entries: Vec<Entry>,
    next_key: u64,
    template_duration: Option<f64>,
}

impl OverlayStore {
    pub fn new(template_duration: Option<f64>) -> Self {
        Self {
            entries: Vec::new(),
            next_key: 1,
            template_duration,
        }
    }

    pub fn from_overlays(
        overlays: impl IntoIterator<Item = Overlay>,
        template_duration: Option<f64>,
    ) -> OverlayResult<Self> {
        let mut store = Self::new(template_duration);
        for overlay in overlays {
            store.insert(overlay)?;
        }
        Ok(store)
    }

    pub fn template_duration(&self) -> Option<f64> {
        self.template_duration
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layer index handed to the next appended overlay.
    pub fn next_layer_index(&self) -> i64 {
        self.entries.len() as i64
    }

    pub fn insert(&mut self, overlay: Overlay) -> OverlayResult<OverlayKey> {
        let key = OverlayKey(self.next_key.max(1));
        self.insert_with_key(key, overlay)?;
        Ok(key)
    }

    /// Insert under a known key, used when undo brings a deleted overlay back.
    pub fn insert_with_key(&mut self, key: OverlayKey, overlay: Overlay) -> OverlayResult<()> {
        if self.index_of(key).is_some() {
            return Err(OverlayError::validation(format!("{key} already exists")));
        }
        overlay.validate(self.template_duration)?;
        self.entries.push(Entry { key, overlay });
        self.next_key = self.next_key.max(key.0 + 1);
        Ok(())
    }

    pub fn get(&self, key: OverlayKey) -> Option<&Overlay> {
        self.index_of(key).map(|i| &self.entries[i].overlay)
    }

    pub fn require(&self, key: OverlayKey) -> OverlayResult<&Overlay> {
        self.get(key)
            .ok_or_else(|| OverlayError::not_found(key.to_string()))
    }

    pub fn contains(&self, key: OverlayKey) -> bool {
        self.index_of(key).is_some()
    }

    /// Replace an overlay wholesale, returning the previous value.
    pub fn replace(&mut self, key: OverlayKey, overlay: Overlay) -> OverlayResult<Overlay> {
        let idx = self
            .index_of(key)
            .ok_or_else(|| OverlayError::not_found(key.to_string()))?;
        overlay.validate(self.template_duration)?;
        Ok(std::mem::replace(&mut self.entries[idx].overlay, overlay))
    }

    /// Apply `patch`, returning `(before, after)` snapshots.
    pub fn apply_patch(
        &mut self,
        key: OverlayKey,
        patch: &OverlayPatch,
    ) -> OverlayResult<(Overlay, Overlay)> {
        let idx = self
            .index_of(key)
            .ok_or_else(|| OverlayError::not_found(key.to_string()))?;
        let before = self.entries[idx].overlay.clone();
        let after = patch.applied_to(&before, self.template_duration)?;
        self.entries[idx].overlay = after.clone();
        Ok((before, after))
    }

    pub fn remove(&mut self, key: OverlayKey) -> OverlayResult<Overlay> {
        let idx = self
            .index_of(key)
            .ok_or_else(|| OverlayError::not_found(key.to_string()))?;
        Ok(self.entries.remove(idx).overlay)
    }

    /// Record the backend id of a saved overlay.
    pub fn set_id(&mut self, key: OverlayKey, id: String) -> OverlayResult<()> {
        let idx = self
            .index_of(key)
            .ok_or_else(|| OverlayError::not_found(key.to_string()))?;
        self.entries[idx].overlay.id = Some(id);
        Ok(())
    }

    pub fn key_for_id(&self, id: &str) -> Option<OverlayKey> {
        self.entries
            .iter()
            .find(|e| e.overlay.id.as_deref() == Some(id))
            .map(|e| e.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverlayKey, &Overlay)> {
        self.entries.iter().map(|e| (e.key, &e.overlay))
    }

    pub fn keys(&self) -> Vec<OverlayKey> {
        self.entries.iter().map(|e| e.key).collect()
    }

    /// Keys sorted bottom-to-top by `layerIndex`, insertion order breaking ties.
    pub fn paint_order(&self) -> Vec<OverlayKey> {
        let mut order: Vec<(i64, usize, OverlayKey)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.overlay.layer_index, i, e.key))
            .collect();
        order.sort_by_key(|&(layer, i, _)| (layer, i));
        order.into_iter().map(|(_, _, key)| key).collect()
    }

    /// Paint-ordered keys whose visibility window contains `t`.
    pub fn visible_at(&self, t: f64, epsilon: f64) -> Vec<OverlayKey> {
        self.paint_order()
            .into_iter()
            .filter(|&k| {
                self.get(k)
                    .is_some_and(|o| is_visible(&o.timing, t, epsilon))
            })
            .collect()
    }

    /// Snapshot of every overlay in insertion order, for export.
    pub fn to_overlays(&self) -> Vec<Overlay> {
        self.entries.iter().map(|e| e.overlay.clone()).collect()
    }

    fn index_of(&self, key: OverlayKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/store.rs"]
mod tests;
