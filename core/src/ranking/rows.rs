use resonance_types::{ColumnTotal, ColumnTotals, DisplayEntry, SortColumn};

use super::filter::SearchFilter;
use super::metrics::{TeamTotals, visible_percentages};
use crate::cache::{EntityCache, EntityRecord};
use crate::format::{display_role, format_compact, format_grouped, format_grouped_2, format_metric};

/// Display rows in the cache's current order.
pub fn build_rows(
    cache: &EntityCache,
    sort_column: SortColumn,
    filter: &SearchFilter,
) -> Vec<DisplayEntry> {
    cache
        .ordered()
        .map(|record| display_entry(record, sort_column, filter.matches(record)))
        .collect()
}

pub fn display_entry(
    record: &EntityRecord,
    sort_column: SortColumn,
    visible: bool,
) -> DisplayEntry {
    let data = &record.data;
    let pct = visible_percentages(record, sort_column);
    DisplayEntry {
        rank: record.rank,
        id: record.id,
        name: data.name.clone(),
        role: display_role(&data.profession).to_string(),
        profession: data.profession.clone(),
        score: data.fight_point,
        damage: format_metric(data.damage()),
        healing: format_metric(data.healing()),
        damage_rate: format_metric(record.damage_rate()),
        healing_rate: format_metric(record.healing_rate()),
        damage_taken: format_metric(record.damage_taken()),
        damage_pct: pct.damage,
        healing_pct: pct.healing,
        damage_rate_pct: pct.damage_rate,
        healing_rate_pct: pct.healing_rate,
        damage_taken_pct: pct.damage_taken,
        crit_rate: data.total_count.crit_rate(),
        lucky_rate: data.total_count.lucky_rate(),
        idle: record.idle,
        visible,
    }
}

/// Header totals. Every column is absent when nothing was summed.
pub fn column_totals(totals: &TeamTotals) -> ColumnTotals {
    if totals.count == 0 {
        return ColumnTotals::default();
    }
    let amount = |value: f64| {
        Some(ColumnTotal {
            compact: format_compact(value),
            exact: format_grouped(value),
        })
    };
    let rate = |value: f64| {
        Some(ColumnTotal {
            compact: format_compact(value),
            exact: format_grouped_2(value),
        })
    };
    ColumnTotals {
        damage: amount(totals.damage),
        healing: amount(totals.healing),
        damage_rate: rate(totals.damage_rate),
        healing_rate: rate(totals.healing_rate),
        damage_taken: amount(totals.damage_taken),
    }
}
