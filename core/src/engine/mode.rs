use resonance_types::ViewMode;

use crate::dataset::Dataset;
use crate::mailbox::IngestionMailbox;
use crate::snapshot::SnapshotRecord;

/// The snapshot currently pinned to the display.
#[derive(Debug, Clone)]
pub struct FrozenView {
    pub snapshot: SnapshotRecord,
    pub name: String,
    /// The backend was paused on entry and must be resumed on exit
    pub paused_backend: bool,
}

#[derive(Debug, Clone, Default)]
pub enum Mode {
    #[default]
    Live,
    Frozen(FrozenView),
}

/// What the caller must do to complete a Live -> Frozen transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePlan {
    pub pause_backend: bool,
}

/// How to repopulate the cache on Frozen -> Live.
#[derive(Debug, Clone, PartialEq)]
pub enum ThawPlan {
    /// Live data kept arriving while frozen; apply the latest of it
    ApplyBuffered {
        dataset: Dataset,
        resume_backend: bool,
    },
    Pull { resume_backend: bool },
}

impl ThawPlan {
    pub fn resume_backend(&self) -> bool {
        match self {
            ThawPlan::ApplyBuffered { resume_backend, .. } | ThawPlan::Pull { resume_backend } => {
                *resume_backend
            }
        }
    }
}

/// Live/Frozen state machine.
///
/// While frozen the consumer stops draining the mailbox, so the mailbox acts
/// as the side buffer for live data. With the pause policy on, the backend is
/// paused instead and whatever sits in the mailbox is stale on exit.
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    mode: Mode,
    pause_on_snapshot: bool,
}

impl ModeController {
    pub fn new(pause_on_snapshot: bool) -> Self {
        Self {
            mode: Mode::Live,
            pause_on_snapshot,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, Mode::Live)
    }

    pub fn view_mode(&self) -> ViewMode {
        match self.mode {
            Mode::Live => ViewMode::Live,
            Mode::Frozen(_) => ViewMode::Frozen,
        }
    }

    pub fn frozen(&self) -> Option<&FrozenView> {
        match &self.mode {
            Mode::Frozen(view) => Some(view),
            Mode::Live => None,
        }
    }

    /// Pin `snapshot`. Loading another snapshot while already frozen keeps
    /// the original pause bookkeeping.
    pub fn enter_frozen(
        &mut self,
        snapshot: SnapshotRecord,
        name: String,
        backend_paused: bool,
    ) -> FreezePlan {
        let (pause_backend, paused_backend) = match &self.mode {
            Mode::Frozen(current) => (false, current.paused_backend),
            Mode::Live => {
                let pause = self.pause_on_snapshot && !backend_paused;
                (pause, pause)
            }
        };
        self.mode = Mode::Frozen(FrozenView {
            snapshot,
            name,
            paused_backend,
        });
        FreezePlan { pause_backend }
    }

    /// Callers that fail to pause the backend must not resume it later.
    pub fn backend_pause_failed(&mut self) {
        if let Mode::Frozen(view) = &mut self.mode {
            view.paused_backend = false;
        }
    }

    /// Return to Live. `None` if already live.
    pub fn exit_frozen(&mut self, mailbox: &IngestionMailbox) -> Option<ThawPlan> {
        let Mode::Frozen(view) = std::mem::take(&mut self.mode) else {
            return None;
        };
        let resume_backend = view.paused_backend;
        if resume_backend {
            mailbox.clear();
            return Some(ThawPlan::Pull { resume_backend });
        }
        Some(match mailbox.take_and_clear() {
            Some(dataset) => ThawPlan::ApplyBuffered {
                dataset,
                resume_backend,
            },
            None => ThawPlan::Pull { resume_backend },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dataset;

    fn snapshot() -> SnapshotRecord {
        SnapshotRecord {
            elapsed_seconds: 10,
            players: Vec::new(),
        }
    }

    #[test]
    fn test_pause_policy_pulls_fresh_on_exit() {
        let mailbox = IngestionMailbox::new();
        let mut mode = ModeController::new(true);

        let plan = mode.enter_frozen(snapshot(), "a".into(), false);
        assert!(plan.pause_backend);
        assert_eq!(mode.view_mode(), ViewMode::Frozen);

        mailbox.post(dataset(&[(1, "stale", 1.0, 0.0)]));
        let thaw = mode.exit_frozen(&mailbox).unwrap();
        assert_eq!(thaw, ThawPlan::Pull { resume_backend: true });
        assert!(!mailbox.has_pending());
        assert!(mode.is_live());
        assert!(mode.exit_frozen(&mailbox).is_none());
    }

    #[test]
    fn test_buffered_data_applied_without_pause_policy() {
        let mailbox = IngestionMailbox::new();
        let mut mode = ModeController::new(false);

        assert!(!mode.enter_frozen(snapshot(), "a".into(), false).pause_backend);
        let buffered = dataset(&[(1, "A", 5.0, 0.0)]);
        mailbox.post(buffered.clone());

        let thaw = mode.exit_frozen(&mailbox).unwrap();
        assert_eq!(
            thaw,
            ThawPlan::ApplyBuffered {
                dataset: buffered,
                resume_backend: false
            }
        );
    }

    #[test]
    fn test_already_paused_backend_is_left_alone() {
        let mailbox = IngestionMailbox::new();
        let mut mode = ModeController::new(true);

        assert!(!mode.enter_frozen(snapshot(), "a".into(), true).pause_backend);
        assert_eq!(
            mode.exit_frozen(&mailbox),
            Some(ThawPlan::Pull {
                resume_backend: false
            })
        );
    }

    #[test]
    fn test_reloading_while_frozen_keeps_pause_bookkeeping() {
        let mut mode = ModeController::new(true);
        assert!(mode.enter_frozen(snapshot(), "a".into(), false).pause_backend);
        // The backend now reports paused because we paused it
        assert!(!mode.enter_frozen(snapshot(), "b".into(), true).pause_backend);
        assert!(mode.frozen().unwrap().paused_backend);
        assert_eq!(mode.frozen().unwrap().name, "b");
    }
}
