//! Wire model for backend payloads
//!
//! A [`Dataset`] is always a *full* snapshot of every participant's cumulative
//! metrics, never a delta. Detail blocks (per-skill breakdowns) are fetched
//! separately, one entity at a time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable numeric participant id (transported as a string map key).
pub type EntityId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitCounts {
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub lucky: u32,
    #[serde(default)]
    pub total: u32,
}

impl HitCounts {
    pub fn crit_rate(&self) -> f64 {
        ratio(self.critical as f64, self.total as f64)
    }

    pub fn lucky_rate(&self) -> f64 {
        ratio(self.lucky as f64, self.total as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatTotal {
    #[serde(default)]
    pub total: f64,
}

/// Raw cumulative metrics for one participant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub total_damage: StatTotal,
    #[serde(default)]
    pub total_dps: f64,
    #[serde(default)]
    pub total_healing: StatTotal,
    #[serde(default)]
    pub total_hps: f64,
    #[serde(default)]
    pub taken_damage: f64,
    /// Composite score
    #[serde(default, rename = "fightPoint")]
    pub fight_point: i64,
    #[serde(default)]
    pub total_count: HitCounts,
}

impl UserData {
    pub fn damage(&self) -> f64 {
        self.total_damage.total
    }

    pub fn healing(&self) -> f64 {
        self.total_healing.total
    }

    /// True if this participant has dealt damage or healing.
    pub fn has_output(&self) -> bool {
        self.damage() > 0.0 || self.healing() > 0.0
    }
}

/// Full dataset: participant id -> raw metrics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub user: BTreeMap<EntityId, UserData>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty()
    }

    /// True if any participant has nonzero damage or healing. A dataset without
    /// output is what the backend reports right after its accumulation is cleared.
    pub fn has_output(&self) -> bool {
        self.user.values().any(UserData::has_output)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Detail Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// Skill category as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkillKind {
    #[serde(rename = "伤害")]
    Damage,
    #[serde(rename = "治疗")]
    Healing,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageBreakdown {
    #[serde(default)]
    pub normal: f64,
    #[serde(default)]
    pub critical: f64,
    #[serde(default)]
    pub lucky: f64,
    #[serde(default)]
    pub crit_lucky: f64,
    #[serde(default, rename = "hpLessen")]
    pub hp_lessen: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountBreakdown {
    #[serde(default)]
    pub normal: u32,
    #[serde(default)]
    pub critical: u32,
    #[serde(default)]
    pub lucky: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillData {
    /// The backend sends either a string or a bare number here
    #[serde(default)]
    pub display_name: serde_json::Value,
    #[serde(default, rename = "type")]
    pub kind: SkillKind,
    #[serde(default, rename = "elementype")]
    pub element: String,
    #[serde(default, rename = "totalDamage")]
    pub total: f64,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub crit_count: u32,
    #[serde(default)]
    pub lucky_count: u32,
    #[serde(default)]
    pub crit_rate: f64,
    #[serde(default)]
    pub lucky_rate: f64,
    #[serde(default)]
    pub damage_breakdown: DamageBreakdown,
    #[serde(default)]
    pub count_breakdown: CountBreakdown,
}

impl SkillData {
    pub fn name(&self) -> String {
        match &self.display_name {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "Unknown skill".to_string(),
            other => other.to_string(),
        }
    }
}

/// Per-entity skill breakdown, fetched out-of-band.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetailBlock {
    #[serde(default)]
    pub uid: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub skills: BTreeMap<String, SkillData>,
}

/// Envelope returned by the detail endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub data: Option<DetailBlock>,
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_parses_string_keys() {
        let json = r#"{
            "user": {
                "1001": {
                    "name": "Alice",
                    "profession": "Healer-Lifebind",
                    "total_damage": { "total": 1200.5 },
                    "total_dps": 40.0,
                    "total_healing": { "total": 300 },
                    "total_hps": 10,
                    "taken_damage": 50,
                    "fightPoint": 9000,
                    "total_count": { "critical": 3, "lucky": 1, "total": 10 }
                },
                "7": {}
            }
        }"#;

        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.len(), 2);
        let alice = &dataset.user[&1001];
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.damage(), 1200.5);
        assert_eq!(alice.fight_point, 9000);
        assert!((alice.total_count.crit_rate() - 0.3).abs() < 1e-9);
        assert!(!dataset.user[&7].has_output());
        assert!(dataset.has_output());
    }

    #[test]
    fn test_rejects_non_numeric_key() {
        let json = r#"{ "user": { "abc": {} } }"#;
        assert!(serde_json::from_str::<Dataset>(json).is_err());
    }

    #[test]
    fn test_skill_kind_and_display_name() {
        let json = r#"{
            "displayName": 12,
            "type": "治疗",
            "elementype": "光",
            "totalDamage": 500,
            "countBreakdown": { "normal": 4, "critical": 2 }
        }"#;
        let skill: SkillData = serde_json::from_str(json).unwrap();
        assert_eq!(skill.kind, SkillKind::Healing);
        assert_eq!(skill.name(), "12");
        assert_eq!(skill.count_breakdown.critical, 2);

        let unknown: SkillData = serde_json::from_str(r#"{ "type": "???" }"#).unwrap();
        assert_eq!(unknown.kind, SkillKind::Other);
    }

    #[test]
    fn test_hit_rates_without_hits() {
        let counts = HitCounts::default();
        assert_eq!(counts.crit_rate(), 0.0);
        assert_eq!(counts.lucky_rate(), 0.0);
    }
}
