use std::time::{Duration, Instant};

use super::EntityCache;
use crate::dataset::EntityId;

/// Idle/active classification over a trailing inactivity window.
#[derive(Debug, Clone, Copy)]
pub struct ActivityTracker {
    threshold: Duration,
    enabled: bool,
}

impl ActivityTracker {
    pub fn new(threshold: Duration, enabled: bool) -> Self {
        Self { threshold, enabled }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Mark every active record whose last change is older than the threshold
    /// as idle. Returns the ids that became idle on this pass.
    ///
    /// Records only leave the idle state through reconciliation.
    pub fn sweep(&self, cache: &mut EntityCache, now: Instant) -> Vec<EntityId> {
        if !self.enabled {
            return Vec::new();
        }
        let mut newly_idle = Vec::new();
        for record in cache.records_mut() {
            if record.idle {
                continue;
            }
            if now.saturating_duration_since(record.last_active_at) > self.threshold {
                record.mark_idle();
                newly_idle.push(record.id);
            }
        }
        if !newly_idle.is_empty() {
            tracing::debug!(count = newly_idle.len(), "Entities went idle");
        }
        newly_idle
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), true)
    }
}
