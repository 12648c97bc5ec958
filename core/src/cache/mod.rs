//! Authoritative set of participant records, reconciled against full datasets.
//!
//! The cache keeps a display order alongside the map so that sorting can be
//! stable with respect to the previous pass. Every detail-fetch claim gets a
//! token that is stored on the claiming record, so completions for a record
//! that was removed, re-added or replaced since the claim are dropped.

mod activity;
mod record;


pub use activity::ActivityTracker;
pub use record::{EntityRecord, Percentages};

use hashbrown::HashMap;
use std::time::{Duration, Instant};

use crate::dataset::{Dataset, DetailBlock, EntityId, UserData};

/// Differences below this are floating-point noise, not activity.
pub const CHANGE_EPSILON: f64 = 1e-6;

/// Delay between an entity first appearing and its first detail fetch.
pub const FIRST_DETAIL_DELAY: Duration = Duration::from_secs(2);
/// Interval between detail refreshes once a block has been loaded.
pub const DETAIL_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
/// Delay before retrying a failed detail fetch.
pub const DETAIL_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    pub added: Vec<EntityId>,
    pub removed: Vec<EntityId>,
    pub woke: Vec<EntityId>,
    pub any_data_changed: bool,
}

impl ReconcileResult {
    /// Membership or idle state changed, so the list must be re-sorted now
    /// rather than on the next scheduled refresh.
    pub fn needs_resort(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.woke.is_empty()
    }
}

/// Handle for one outstanding detail fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    pub id: EntityId,
    token: u64,
}

#[derive(Debug, Default)]
pub struct EntityCache {
    records: HashMap<EntityId, EntityRecord>,
    /// Ids in last display order; new ids are appended.
    order: Vec<EntityId>,
    /// Last issued detail-fetch token
    fetch_token: u64,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.records.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut EntityRecord> {
        self.records.values_mut()
    }

    /// Records in display order.
    pub fn ordered(&self) -> impl Iterator<Item = &EntityRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    /// Replace the display order. `order` must be a permutation of the cached ids.
    pub(crate) fn set_order(&mut self, order: Vec<EntityId>) {
        debug_assert_eq!(order.len(), self.records.len());
        self.order = order;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reconciliation
    // ─────────────────────────────────────────────────────────────────────────

    /// Diff a full live dataset against the cache and apply it.
    ///
    /// Afterwards the cached id set equals the dataset's id set. Metrics are
    /// overwritten, never summed.
    pub fn reconcile(&mut self, incoming: &Dataset, now: Instant) -> ReconcileResult {
        let mut result = ReconcileResult::default();

        let removed: Vec<EntityId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !incoming.user.contains_key(id))
            .collect();
        if !removed.is_empty() {
            for id in &removed {
                self.records.remove(id);
            }
            self.order.retain(|id| self.records.contains_key(id));
            tracing::debug!(count = removed.len(), "Entities left the dataset");
        }
        result.removed = removed;

        for (&id, data) in &incoming.user {
            match self.records.get_mut(&id) {
                None => {
                    let mut record = EntityRecord::new(id, data.clone(), now);
                    record.next_detail_fetch = Some(now + FIRST_DETAIL_DELAY);
                    self.records.insert(id, record);
                    self.order.push(id);
                    result.added.push(id);
                }
                Some(record) => {
                    if metrics_changed(&record.data, data) {
                        record.last_active_at = now;
                        result.any_data_changed = true;
                        if record.idle {
                            record.idle = false;
                            result.woke.push(id);
                        }
                    }
                    if record.data != *data {
                        record.data.clone_from(data);
                    }
                }
            }
        }

        if !result.added.is_empty() || !result.removed.is_empty() {
            result.any_data_changed = true;
        }
        result
    }

    /// Replace every record at once (snapshot load/unload).
    pub fn replace_with(&mut self, records: Vec<EntityRecord>) {
        self.records.clear();
        self.order.clear();
        for mut record in records {
            if self.records.contains_key(&record.id) {
                continue;
            }
            record.detail_fetch = None;
            self.order.push(record.id);
            self.records.insert(record.id, record);
        }
    }

    pub fn clear(&mut self) {
        self.replace_with(Vec::new());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Detail Fetching
    // ─────────────────────────────────────────────────────────────────────────

    /// Claim every record whose detail fetch is due. Claimed records are
    /// flagged in flight and are not returned again until completed.
    pub fn due_detail_fetches(&mut self, now: Instant) -> Vec<DetailTicket> {
        let due: Vec<EntityId> = self
            .records
            .values()
            .filter(|r| r.detail_fetch.is_none())
            .filter(|r| r.next_detail_fetch.is_some_and(|at| at <= now))
            .map(|r| r.id)
            .collect();
        due.into_iter()
            .filter_map(|id| self.claim_detail_fetch(id))
            .collect()
    }

    /// Claim a fetch for one record regardless of its schedule.
    pub fn claim_detail_fetch(&mut self, id: EntityId) -> Option<DetailTicket> {
        let record = self.records.get_mut(&id)?;
        if record.detail_fetch.is_some() {
            return None;
        }
        self.fetch_token += 1;
        record.detail_fetch = Some(self.fetch_token);
        Some(DetailTicket {
            id,
            token: self.fetch_token,
        })
    }

    /// Apply a finished fetch. `None` means the fetch failed.
    ///
    /// Returns true if the stored detail block was replaced. Completions for
    /// records that no longer hold the ticket's claim (removed, re-added or
    /// replaced since) are dropped without error. A block with no skills never overwrites one
    /// that has them.
    pub fn complete_detail(
        &mut self,
        ticket: DetailTicket,
        outcome: Option<DetailBlock>,
        now: Instant,
    ) -> bool {
        let Some(record) = self.records.get_mut(&ticket.id) else {
            return false;
        };
        if record.detail_fetch != Some(ticket.token) {
            return false;
        }
        record.detail_fetch = None;

        match outcome {
            Some(block) => {
                record.next_detail_fetch = Some(now + DETAIL_REFRESH_INTERVAL);
                if block.skills.is_empty() {
                    return false;
                }
                record.detail = Some(block);
                true
            }
            None => {
                record.next_detail_fetch = Some(now + DETAIL_RETRY_DELAY);
                false
            }
        }
    }

    /// Ids of records that have no detail block yet.
    pub fn missing_details(&self) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.records.get(id).is_some_and(|r| r.detail.is_none()))
            .collect()
    }

    /// Clear every idle flag. Returns true if any record was idle.
    pub fn clear_idle(&mut self) -> bool {
        let mut any = false;
        for record in self.records.values_mut() {
            any |= std::mem::take(&mut record.idle);
        }
        any
    }

    pub fn idle_count(&self) -> usize {
        self.records.values().filter(|r| r.idle).count()
    }
}

fn metrics_changed(old: &UserData, new: &UserData) -> bool {
    (old.damage() - new.damage()).abs() > CHANGE_EPSILON
        || (old.healing() - new.healing()).abs() > CHANGE_EPSILON
        || (old.taken_damage - new.taken_damage).abs() > CHANGE_EPSILON
}
