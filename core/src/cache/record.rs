use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::dataset::{DetailBlock, EntityId, UserData};

/// Share of the team total per metric, as a fraction in `0.0..=1.0`.
///
/// Field names match the snapshot document layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Percentages {
    #[serde(default, rename = "DamagePercent")]
    pub damage: f64,
    #[serde(default, rename = "HealingPercent")]
    pub healing: f64,
    #[serde(default, rename = "DpsPercent")]
    pub damage_rate: f64,
    #[serde(default, rename = "HpsPercent")]
    pub healing_rate: f64,
    #[serde(default, rename = "TakenDamagePercent")]
    pub damage_taken: f64,
}

/// One tracked participant.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub id: EntityId,
    pub data: UserData,
    pub last_active_at: Instant,
    pub idle: bool,
    /// 1-based position among active entities; 0 when idle or unranked
    pub rank: u32,
    pub percentages: Percentages,
    pub detail: Option<DetailBlock>,

    /// Token of the outstanding detail fetch, if any
    pub(crate) detail_fetch: Option<u64>,
    pub(crate) next_detail_fetch: Option<Instant>,
}

impl EntityRecord {
    pub fn new(id: EntityId, data: UserData, now: Instant) -> Self {
        Self {
            id,
            data,
            last_active_at: now,
            idle: false,
            rank: 0,
            percentages: Percentages::default(),
            detail: None,
            detail_fetch: None,
            next_detail_fetch: None,
        }
    }

    /// Rebuild a record from stored values. Snapshot records never fetch details.
    pub fn restored(
        id: EntityId,
        data: UserData,
        detail: Option<DetailBlock>,
        percentages: Percentages,
        now: Instant,
    ) -> Self {
        Self {
            detail,
            percentages,
            ..Self::new(id, data, now)
        }
    }

    pub fn damage_rate(&self) -> f64 {
        self.data.total_dps
    }

    pub fn healing_rate(&self) -> f64 {
        self.data.total_hps
    }

    pub fn damage_taken(&self) -> f64 {
        self.data.taken_damage
    }

    pub fn is_detail_in_flight(&self) -> bool {
        self.detail_fetch.is_some()
    }

    /// Mark idle: drops the displayed percentages and the rank.
    pub(crate) fn mark_idle(&mut self) {
        self.idle = true;
        self.rank = 0;
        self.percentages = Percentages::default();
    }
}
