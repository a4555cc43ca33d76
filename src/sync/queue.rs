//! Debounced, optimistic persistence queue.
//!
//! Edits are applied to the [`OverlayStore`] immediately and recorded here per overlay.
//! After the configured quiet period [`SyncQueue::poll`] turns them into backend requests.
//! Every request carries a per-overlay sequence number; a completion older than the latest
//! request started for that overlay is ignored, so the last write wins. A failed request
//! puts the overlay back to its last confirmed server snapshot.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::foundation::core::OverlayKey;
use crate::foundation::error::OverlayResult;
use crate::model::overlay::Overlay;
use crate::model::patch::OverlayPatch;
use crate::model::store::OverlayStore;
use crate::sync::backend::OverlayBackend;

const MAX_FLUSH_ROUNDS: usize = 8;

/// What a request is about: one overlay, or the template's overlay order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyncTarget {
    Overlay(OverlayKey),
    Order,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub target: SyncTarget,
    pub seq: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SyncOp {
    Create(Overlay),
    Update { id: String, patch: OverlayPatch },
    Delete { id: String },
    Reorder(Vec<String>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncRequest {
    pub ticket: Ticket,
    pub op: SyncOp,
}

/// Successful backend answer to a [`SyncRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum SyncOutcome {
    Saved(Overlay),
    Deleted,
    Reordered,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
    /// The backend assigned `id` to a newly created overlay.
    Saved { key: OverlayKey, id: String },
    /// The store now holds the server's copy.
    Reconciled { key: OverlayKey, overlay: Overlay },
    /// A failed request was rolled back. `None` means the overlay was never saved and is gone.
    Reverted {
        key: OverlayKey,
        restored: Option<Overlay>,
    },
    Failed { target: SyncTarget, message: String },
}

#[derive(Clone, Debug, PartialEq)]
enum Pending {
    Create,
    Update(OverlayPatch),
    Delete { id: String },
}

#[derive(Clone, Debug, Default)]
struct Track {
    confirmed: Option<Overlay>,
    confirmed_seq: u64,
    pending: Option<Pending>,
    /// `None` while pending means "due now".
    last_edit: Option<Instant>,
    next_seq: u64,
    latest: u64,
    in_flight: usize,
    create_seq: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SyncQueue {
    debounce: Duration,
    tracks: BTreeMap<OverlayKey, Track>,
    order: Option<(Vec<OverlayKey>, Instant)>,
    order_seq: u64,
}

impl SyncQueue {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            tracks: BTreeMap::new(),
            order: None,
            order_seq: 0,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Remember a loaded overlay's server state so a later failure can roll back to it.
    pub fn track_loaded(&mut self, key: OverlayKey, overlay: &Overlay) {
        if overlay.id.is_some() {
            self.tracks.entry(key).or_default().confirmed = Some(overlay.clone());
        }
    }

    pub fn created(&mut self, key: OverlayKey, now: Instant) {
        let track = self.tracks.entry(key).or_default();
        track.pending = Some(Pending::Create);
        track.last_edit = Some(now);
    }

    /// Record an applied patch; patches for the same overlay merge until dispatched.
    pub fn updated(&mut self, key: OverlayKey, patch: OverlayPatch, now: Instant) {
        if patch.is_empty() {
            return;
        }
        let track = self.tracks.entry(key).or_default();
        match &mut track.pending {
            Some(Pending::Create) | Some(Pending::Delete { .. }) => {}
            Some(Pending::Update(existing)) => existing.merge(patch),
            None => track.pending = Some(Pending::Update(patch)),
        }
        track.last_edit = Some(now);
    }

    /// Record a local delete. An overlay that never reached the backend just stops syncing.
    pub fn deleted(&mut self, key: OverlayKey, id: Option<String>, now: Instant) {
        let track = self.tracks.entry(key).or_default();
        track.pending = id.map(|id| Pending::Delete { id });
        track.last_edit = Some(now);
    }

    /// Record that a deleted overlay came back, e.g. through undo.
    pub fn restored(&mut self, key: OverlayKey, overlay: &Overlay, now: Instant) {
        let track = self.tracks.entry(key).or_default();
        track.last_edit = Some(now);
        if overlay.id.is_none() {
            track.pending = Some(Pending::Create);
            return;
        }
        if matches!(track.pending, Some(Pending::Delete { .. })) {
            track.pending = None;
        }
        if track.confirmed.is_none() && track.in_flight == 0 {
            // The backend copy is already gone.
            track.pending = Some(Pending::Create);
            return;
        }
        if let Some(confirmed) = &track.confirmed {
            let patch = OverlayPatch::diff(confirmed, overlay);
            if !patch.is_empty() {
                track.pending = Some(Pending::Update(patch));
            }
        }
    }

    /// Record a new bottom-to-top order.
    pub fn reordered(&mut self, keys: Vec<OverlayKey>, now: Instant) {
        self.order = Some((keys, now));
    }

    pub fn has_pending(&self, key: OverlayKey) -> bool {
        self.tracks.get(&key).is_some_and(|t| t.pending.is_some())
    }

    pub fn in_flight(&self, key: OverlayKey) -> usize {
        self.tracks.get(&key).map_or(0, |t| t.in_flight)
    }

    /// Last snapshot the backend confirmed for `key`.
    pub fn confirmed(&self, key: OverlayKey) -> Option<&Overlay> {
        self.tracks.get(&key).and_then(|t| t.confirmed.as_ref())
    }

    /// Nothing queued and nothing awaiting completion.
    pub fn is_idle(&self) -> bool {
        self.order.is_none()
            && self
                .tracks
                .values()
                .all(|t| t.pending.is_none() && t.in_flight == 0)
    }

    /// Earliest instant at which [`SyncQueue::poll`] will have work.
    pub fn next_deadline(&self) -> Option<Instant> {
        let overlays = self
            .tracks
            .values()
            .filter(|t| t.pending.is_some())
            .filter_map(|t| t.last_edit.map(|at| at + self.debounce));
        let order = self.order.as_ref().map(|(_, at)| *at + self.debounce);
        overlays.chain(order).min()
    }

    /// Requests whose debounce window has elapsed at `now`.
    pub fn poll(&mut self, now: Instant, store: &OverlayStore) -> Vec<SyncRequest> {
        self.collect(Some(now), store)
    }

    /// Every queued request, ignoring the debounce.
    pub fn poll_all(&mut self, store: &OverlayStore) -> Vec<SyncRequest> {
        self.collect(None, store)
    }

    fn collect(&mut self, now: Option<Instant>, store: &OverlayStore) -> Vec<SyncRequest> {
        let debounce = self.debounce;
        let due = |at: Option<Instant>| match (now, at) {
            (Some(now), Some(at)) => now.saturating_duration_since(at) >= debounce,
            _ => true,
        };

        let keys: Vec<OverlayKey> = self
            .tracks
            .iter()
            .filter(|(_, t)| t.pending.is_some() && due(t.last_edit))
            .map(|(k, _)| *k)
            .collect();
        let mut out: Vec<SyncRequest> = keys
            .into_iter()
            .filter_map(|key| self.take_request(key, store))
            .collect();

        // The order is sent once every overlay it names has an id.
        if let Some((keys, at)) = &self.order
            && due(Some(*at))
            && !keys
                .iter()
                .any(|k| store.get(*k).is_some_and(|o| o.id.is_none()))
        {
            let ids: Vec<String> = keys
                .iter()
                .filter_map(|k| store.get(*k).and_then(|o| o.id.clone()))
                .collect();
            self.order = None;
            self.order_seq += 1;
            out.push(SyncRequest {
                ticket: Ticket {
                    target: SyncTarget::Order,
                    seq: self.order_seq,
                },
                op: SyncOp::Reorder(ids),
            });
        }
        out
    }

    fn take_request(&mut self, key: OverlayKey, store: &OverlayStore) -> Option<SyncRequest> {
        let track = self.tracks.get_mut(&key)?;
        let pending = track.pending.take()?;
        let current = store.get(key);
        let op = match pending {
            Pending::Delete { id } => SyncOp::Delete { id },
            // Updates to an overlay still being created wait for its id.
            pending if track.create_seq.is_some() => {
                track.pending = Some(pending);
                return None;
            }
            Pending::Update(patch) => match current {
                Some(Overlay { id: Some(id), .. }) => SyncOp::Update {
                    id: id.clone(),
                    patch,
                },
                Some(overlay) => SyncOp::Create(overlay.clone()),
                None => return None,
            },
            Pending::Create => SyncOp::Create(Overlay {
                id: None,
                ..current?.clone()
            }),
        };

        track.next_seq += 1;
        track.latest = track.next_seq;
        track.in_flight += 1;
        if matches!(op, SyncOp::Create(_)) {
            track.create_seq = Some(track.next_seq);
        }
        Some(SyncRequest {
            ticket: Ticket {
                target: SyncTarget::Overlay(key),
                seq: track.next_seq,
            },
            op,
        })
    }

    /// Apply a backend answer, reconciling or rolling back `store`.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: OverlayResult<SyncOutcome>,
        store: &mut OverlayStore,
    ) -> Vec<SyncEvent> {
        match ticket.target {
            SyncTarget::Order => match result {
                Err(err) if ticket.seq == self.order_seq => vec![SyncEvent::Failed {
                    target: SyncTarget::Order,
                    message: err.to_string(),
                }],
                _ => Vec::new(),
            },
            SyncTarget::Overlay(key) => self.complete_overlay(key, ticket.seq, result, store),
        }
    }

    fn complete_overlay(
        &mut self,
        key: OverlayKey,
        seq: u64,
        result: OverlayResult<SyncOutcome>,
        store: &mut OverlayStore,
    ) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        let Some(track) = self.tracks.get_mut(&key) else {
            return events;
        };
        track.in_flight = track.in_flight.saturating_sub(1);
        let was_create = track.create_seq == Some(seq);
        if was_create {
            track.create_seq = None;
        }
        let stale = seq < track.latest;

        match result {
            Ok(SyncOutcome::Saved(server)) => {
                if was_create && let Some(id) = server.id.clone() {
                    if store.contains(key) {
                        if store.set_id(key, id.clone()).is_ok() {
                            events.push(SyncEvent::Saved { key, id });
                        }
                    } else {
                        // Deleted locally while the create was in flight.
                        track.pending = Some(Pending::Delete { id });
                        track.last_edit = None;
                    }
                }
                if seq > track.confirmed_seq {
                    track.confirmed = Some(server.clone());
                    track.confirmed_seq = seq;
                }
                let settled = !stale && track.pending.is_none() && track.in_flight == 0;
                if settled && store.get(key).is_some_and(|local| *local != server) {
                    match store.replace(key, server.clone()) {
                        Ok(_) => events.push(SyncEvent::Reconciled {
                            key,
                            overlay: server,
                        }),
                        Err(err) => {
                            tracing::warn!(%key, error = %err, "server copy rejected locally")
                        }
                    }
                }
            }
            Ok(SyncOutcome::Deleted) => {
                if let Some(local) = store.get(key).cloned() {
                    // Brought back after the delete was sent: recreate it.
                    let recreated = Overlay { id: None, ..local };
                    if store.replace(key, recreated).is_ok() {
                        track.confirmed = None;
                        track.pending = Some(Pending::Create);
                        track.last_edit = None;
                    }
                } else if track.pending.is_none() && track.in_flight == 0 {
                    self.tracks.remove(&key);
                }
            }
            Ok(SyncOutcome::Reordered) => {}
            Err(err) if stale => {
                tracing::debug!(%key, seq, error = %err, "stale failure ignored");
            }
            Err(err) => {
                tracing::warn!(%key, seq, error = %err, "sync failed, rolling back");
                events.push(SyncEvent::Failed {
                    target: SyncTarget::Overlay(key),
                    message: err.to_string(),
                });
                track.pending = None;
                match track.confirmed.clone() {
                    Some(snapshot) => {
                        let restored = if store.contains(key) {
                            store.replace(key, snapshot.clone()).map(|_| ())
                        } else {
                            store.insert_with_key(key, snapshot.clone())
                        };
                        match restored {
                            Ok(()) => events.push(SyncEvent::Reverted {
                                key,
                                restored: Some(snapshot),
                            }),
                            Err(e) => tracing::warn!(%key, error = %e, "rollback rejected"),
                        }
                    }
                    None => {
                        let never_saved = store.get(key).is_some_and(|o| o.id.is_none());
                        if never_saved && store.remove(key).is_ok() {
                            events.push(SyncEvent::Reverted {
                                key,
                                restored: None,
                            });
                        }
                        if track.in_flight == 0 {
                            self.tracks.remove(&key);
                        }
                    }
                }
            }
        }
        events
    }

    /// Dispatch every due request to `backend` and apply the answers.
    pub fn flush_due(
        &mut self,
        backend: &mut dyn OverlayBackend,
        now: Instant,
        store: &mut OverlayStore,
    ) -> Vec<SyncEvent> {
        let requests = self.poll(now, store);
        self.run(backend, requests, store)
    }

    /// Dispatch everything queued, including requests unblocked by earlier answers.
    pub fn flush_all(
        &mut self,
        backend: &mut dyn OverlayBackend,
        store: &mut OverlayStore,
    ) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        for _ in 0..MAX_FLUSH_ROUNDS {
            let requests = self.poll_all(store);
            if requests.is_empty() {
                break;
            }
            events.extend(self.run(backend, requests, store));
        }
        events
    }

    fn run(
        &mut self,
        backend: &mut dyn OverlayBackend,
        requests: Vec<SyncRequest>,
        store: &mut OverlayStore,
    ) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        for request in requests {
            let result = dispatch(backend, &request);
            events.extend(self.complete(request.ticket, result, store));
        }
        events
    }
}

/// Send one request to the backend.
#[tracing::instrument(skip_all, fields(target = ?request.ticket.target, seq = request.ticket.seq))]
pub fn dispatch(
    backend: &mut dyn OverlayBackend,
    request: &SyncRequest,
) -> OverlayResult<SyncOutcome> {
    let outcome = match &request.op {
        SyncOp::Create(overlay) => SyncOutcome::Saved(backend.create_overlay(overlay)?),
        SyncOp::Update { id, patch } => SyncOutcome::Saved(backend.update_overlay(id, patch)?),
        SyncOp::Delete { id } => {
            backend.delete_overlay(id)?;
            SyncOutcome::Deleted
        }
        SyncOp::Reorder(ids) => {
            backend.reorder_overlays(ids)?;
            SyncOutcome::Reordered
        }
    };
    tracing::debug!("sync request completed");
    Ok(outcome)
}

#[cfg(test)]
#[path = "../../tests/unit/sync/queue.rs"]
mod tests;
