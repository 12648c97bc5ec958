use resonance_types::{SortColumn, SortDirection};
use std::cmp::Ordering;

use crate::cache::{EntityCache, EntityRecord};
use crate::format::display_role;

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Selecting the active column flips direction; a new column starts descending.
    pub fn select(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Descending;
        }
    }
}

/// Order the cache and assign ranks.
///
/// The sort is stable over the previous display order. When `idle_first_key`
/// is set, active records always precede idle ones regardless of direction.
/// Active records get ranks `1..=K` in order; idle records get 0.
pub fn sort_and_rank(cache: &mut EntityCache, spec: SortSpec, idle_first_key: bool) {
    let mut rows: Vec<&EntityRecord> = cache.ordered().collect();
    rows.sort_by(|a, b| {
        let idle = if idle_first_key {
            a.idle.cmp(&b.idle)
        } else {
            Ordering::Equal
        };
        idle.then_with(|| {
            let by_column = compare_column(a, b, spec.column);
            match spec.direction {
                SortDirection::Ascending => by_column,
                SortDirection::Descending => by_column.reverse(),
            }
        })
    });
    let order: Vec<_> = rows.into_iter().map(|r| r.id).collect();

    let mut next_rank = 1;
    for id in &order {
        if let Some(record) = cache.get_mut(*id) {
            if record.idle {
                record.rank = 0;
            } else {
                record.rank = next_rank;
                next_rank += 1;
            }
        }
    }
    cache.set_order(order);
}

fn compare_column(a: &EntityRecord, b: &EntityRecord, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Name => a.data.name.cmp(&b.data.name),
        SortColumn::Score => a.data.fight_point.cmp(&b.data.fight_point),
        SortColumn::Role => display_role(&a.data.profession).cmp(display_role(&b.data.profession)),
        SortColumn::Damage => a.data.damage().total_cmp(&b.data.damage()),
        SortColumn::Healing => a.data.healing().total_cmp(&b.data.healing()),
        SortColumn::DamageRate => a.damage_rate().total_cmp(&b.damage_rate()),
        SortColumn::HealingRate => a.healing_rate().total_cmp(&b.healing_rate()),
        SortColumn::DamageTaken => a.damage_taken().total_cmp(&b.damage_taken()),
    }
}
