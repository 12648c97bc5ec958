use std::time::{Duration, Instant};

use crate::format::format_duration;

/// How long after the last data change the clock keeps counting.
pub const ACTIVITY_GRACE: Duration = Duration::from_secs(2);

/// Activity-gated combat duration.
///
/// Advances by one second per tick while data keeps changing, freezes through
/// lulls longer than [`ACTIVITY_GRACE`] and never resets on its own.
#[derive(Debug, Clone, Default)]
pub struct CombatClock {
    elapsed: u64,
    started: bool,
    paused: bool,
    last_change: Option<Instant>,
    /// Live state saved while a snapshot's elapsed value is displayed
    frozen_from: Option<(u64, bool)>,
}

impl CombatClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from persisted settings.
    pub fn restore(elapsed: u64, started: bool) -> Self {
        Self {
            elapsed,
            started,
            ..Self::default()
        }
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Elapsed and started flags of the live clock, ignoring any frozen value.
    pub fn live_state(&self) -> (u64, bool) {
        self.frozen_from.unwrap_or((self.elapsed, self.started))
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_from.is_some()
    }

    pub fn duration_text(&self) -> String {
        format_duration(self.elapsed)
    }

    /// Record a reconciliation pass that changed data. The clock starts on the
    /// first change that carries damage or healing output.
    pub fn record_activity(&mut self, now: Instant, has_output: bool) {
        if self.is_frozen() {
            return;
        }
        if !self.started {
            if !has_output || self.paused {
                return;
            }
            self.started = true;
            tracing::debug!("Combat clock started");
        }
        self.last_change = Some(now);
    }

    /// One-second tick. Returns true if elapsed advanced.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.started || self.paused || self.is_frozen() {
            return false;
        }
        let recent = self
            .last_change
            .is_some_and(|at| now.saturating_duration_since(at) <= ACTIVITY_GRACE);
        if recent {
            self.elapsed += 1;
        }
        recent
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Zero elapsed and wait for the next output to start again.
    pub fn reset(&mut self) {
        self.elapsed = 0;
        self.started = false;
        self.last_change = None;
    }

    /// Display `elapsed` from a snapshot; live counting stops until [`thaw`](Self::thaw).
    pub fn freeze(&mut self, elapsed: u64) {
        if self.frozen_from.is_none() {
            self.frozen_from = Some((self.elapsed, self.started));
        }
        self.elapsed = elapsed;
        self.last_change = None;
    }

    /// Return to the pre-freeze value, or to zero if the backend was reset meanwhile.
    pub fn thaw(&mut self, backend_reset: bool) {
        if let Some((elapsed, started)) = self.frozen_from.take() {
            self.elapsed = elapsed;
            self.started = started;
        }
        if backend_reset {
            self.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    #[test]
    fn test_does_not_start_without_output() {
        let t0 = Instant::now();
        let mut clock = CombatClock::new();
        clock.record_activity(t0, false);
        assert!(!clock.tick(at(t0, 1)));
        assert!(!clock.is_started());

        clock.record_activity(at(t0, 1), true);
        assert!(clock.tick(at(t0, 2)));
        assert_eq!(clock.elapsed(), 1);
    }

    #[test]
    fn test_freezes_after_grace_and_resumes() {
        let t0 = Instant::now();
        let mut clock = CombatClock::new();
        clock.record_activity(t0, true);

        // Ticks 1..=5 without change: only the first two fall within the grace window
        for n in 1..=5 {
            clock.tick(at(t0, n));
        }
        assert_eq!(clock.elapsed(), 2);

        clock.record_activity(at(t0, 6), true);
        assert!(clock.tick(at(t0, 6)));
        assert_eq!(clock.elapsed(), 3);
    }

    #[test]
    fn test_pause_blocks_start_and_ticks() {
        let t0 = Instant::now();
        let mut clock = CombatClock::new();
        clock.set_paused(true);
        clock.record_activity(t0, true);
        assert!(!clock.is_started());

        clock.set_paused(false);
        clock.record_activity(t0, true);
        clock.set_paused(true);
        assert!(!clock.tick(at(t0, 1)));
    }

    #[test]
    fn test_reset() {
        let mut clock = CombatClock::restore(125, true);
        assert_eq!(clock.duration_text(), "2:05");
        clock.reset();
        assert_eq!(clock.elapsed(), 0);
        assert!(!clock.is_started());
    }

    #[test]
    fn test_freeze_and_thaw() {
        let t0 = Instant::now();
        let mut clock = CombatClock::restore(40, true);
        clock.freeze(300);
        assert_eq!(clock.elapsed(), 300);
        assert_eq!(clock.live_state(), (40, true));
        clock.record_activity(t0, true);
        assert!(!clock.tick(at(t0, 1)));

        clock.thaw(false);
        assert_eq!(clock.elapsed(), 40);
        assert!(clock.is_started());

        clock.freeze(300);
        clock.thaw(true);
        assert_eq!(clock.elapsed(), 0);
        assert!(!clock.is_started());
    }
}
