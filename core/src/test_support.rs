//! Dataset builders shared by unit tests.

use crate::dataset::{Dataset, EntityId, StatTotal, UserData};

pub(crate) fn user(name: &str, damage: f64, healing: f64, taken: f64) -> UserData {
    UserData {
        name: name.to_string(),
        profession: "Striker-Blade".to_string(),
        total_damage: StatTotal { total: damage },
        total_dps: damage / 10.0,
        total_healing: StatTotal { total: healing },
        total_hps: healing / 10.0,
        taken_damage: taken,
        ..Default::default()
    }
}

/// Dataset of `(id, name, damage, healing)` rows with no damage taken.
pub(crate) fn dataset(rows: &[(EntityId, &str, f64, f64)]) -> Dataset {
    let mut out = Dataset::default();
    for &(id, name, damage, healing) in rows {
        out.user.insert(id, user(name, damage, healing, 0.0));
    }
    out
}
