use resonance_types::SortColumn;

use crate::cache::{EntityCache, EntityRecord, Percentages};
use crate::format::percent_label;

/// Sum of each tracked metric over the displayed subset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TeamTotals {
    pub damage: f64,
    pub healing: f64,
    pub damage_rate: f64,
    pub healing_rate: f64,
    pub damage_taken: f64,
    /// Number of records summed
    pub count: usize,
}

impl TeamTotals {
    pub fn over<'a>(records: impl IntoIterator<Item = &'a EntityRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut acc, r| {
            acc.damage += r.data.damage();
            acc.healing += r.data.healing();
            acc.damage_rate += r.damage_rate();
            acc.healing_rate += r.healing_rate();
            acc.damage_taken += r.damage_taken();
            acc.count += 1;
            acc
        })
    }

    pub fn shares_of(&self, record: &EntityRecord) -> Percentages {
        Percentages {
            damage: share(record.data.damage(), self.damage),
            healing: share(record.data.healing(), self.healing),
            damage_rate: share(record.damage_rate(), self.damage_rate),
            healing_rate: share(record.healing_rate(), self.healing_rate),
            damage_taken: share(record.damage_taken(), self.damage_taken),
        }
    }
}

/// `value / total`, or 0 when the total is not positive.
pub fn share(value: f64, total: f64) -> f64 {
    if total > 0.0 { value / total } else { 0.0 }
}

/// Totals over the non-idle records.
pub fn active_totals(cache: &EntityCache) -> TeamTotals {
    TeamTotals::over(cache.records().filter(|r| !r.idle))
}

/// Recompute every non-idle record's share of the team totals. Idle records
/// have their percentages cleared.
pub fn compute_percentages(cache: &mut EntityCache) -> TeamTotals {
    let totals = active_totals(cache);
    for record in cache.records_mut() {
        record.percentages = if record.idle {
            Percentages::default()
        } else {
            totals.shares_of(record)
        };
    }
    totals
}

/// Percentage labels a row exposes, after the display policy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PercentLabels {
    pub damage: Option<String>,
    pub healing: Option<String>,
    pub damage_rate: Option<String>,
    pub healing_rate: Option<String>,
    pub damage_taken: Option<String>,
}

/// Damage taken is always shown; the other metrics only for the active sort
/// column. Anything below 1 % is hidden, and idle records show nothing.
pub fn visible_percentages(record: &EntityRecord, sort_column: SortColumn) -> PercentLabels {
    if record.idle {
        return PercentLabels::default();
    }
    let p = &record.percentages;
    let only_if = |column: SortColumn, value: f64| {
        if sort_column == column {
            percent_label(value)
        } else {
            None
        }
    };
    PercentLabels {
        damage: only_if(SortColumn::Damage, p.damage),
        healing: only_if(SortColumn::Healing, p.healing),
        damage_rate: only_if(SortColumn::DamageRate, p.damage_rate),
        healing_rate: only_if(SortColumn::HealingRate, p.healing_rate),
        damage_taken: percent_label(p.damage_taken),
    }
}
