//! Analytics over a per-entity skill breakdown.

use crate::dataset::{DetailBlock, EntityId, SkillKind};

/// Number of skills listed in an entity summary.
pub const TOP_SKILL_COUNT: usize = 6;

/// Hits of each kind a skill needs before it counts toward the crit bonus.
const MIN_HITS_FOR_CRIT_BONUS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillShare {
    pub skill_id: String,
    pub name: String,
    pub kind: SkillKind,
    pub total: f64,
    /// Fraction of the entity's damage plus healing
    pub share: f64,
}

/// Tooltip-style summary for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSummary {
    pub id: EntityId,
    pub name: String,
    pub top_skills: Vec<SkillShare>,
    pub damage_crit_bonus: Option<f64>,
    pub healing_crit_bonus: Option<f64>,
}

impl DetailSummary {
    pub fn build(id: EntityId, name: &str, block: &DetailBlock, entity_total: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            top_skills: top_skills(block, entity_total, TOP_SKILL_COUNT),
            damage_crit_bonus: crit_bonus(block, SkillKind::Damage),
            healing_crit_bonus: crit_bonus(block, SkillKind::Healing),
        }
    }
}

/// The `limit` skills with the highest total, largest first.
pub fn top_skills(block: &DetailBlock, entity_total: f64, limit: usize) -> Vec<SkillShare> {
    let mut skills: Vec<SkillShare> = block
        .skills
        .iter()
        .map(|(skill_id, skill)| SkillShare {
            skill_id: skill_id.clone(),
            name: skill.name(),
            kind: skill.kind,
            total: skill.total,
            share: if entity_total > 0.0 { skill.total / entity_total } else { 0.0 },
        })
        .collect();
    skills.sort_by(|a, b| b.total.total_cmp(&a.total));
    skills.truncate(limit);
    skills
}

/// Average extra value of a critical hit over a normal one, weighted by each
/// skill's total. `None` when no skill of `kind` has enough hits of both kinds.
pub fn crit_bonus(block: &DetailBlock, kind: SkillKind) -> Option<f64> {
    let mut weighted = 0.0;
    let mut weight = 0.0;

    for skill in block.skills.values().filter(|s| s.kind == kind) {
        let counts = &skill.count_breakdown;
        if counts.normal < MIN_HITS_FOR_CRIT_BONUS || counts.critical < MIN_HITS_FOR_CRIT_BONUS {
            continue;
        }
        let avg_normal = skill.damage_breakdown.normal / counts.normal as f64;
        let avg_crit = skill.damage_breakdown.critical / counts.critical as f64;
        if avg_normal <= 0.0 || skill.total <= 0.0 {
            continue;
        }
        weighted += (avg_crit / avg_normal) * skill.total;
        weight += skill.total;
    }

    (weight > 0.0).then(|| weighted / weight - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{CountBreakdown, DamageBreakdown, SkillData};

    fn skill(kind: SkillKind, total: f64, normal: (u32, f64), critical: (u32, f64)) -> SkillData {
        SkillData {
            display_name: serde_json::Value::String(format!("skill {total}")),
            kind,
            total,
            damage_breakdown: DamageBreakdown {
                normal: normal.1,
                critical: critical.1,
                ..Default::default()
            },
            count_breakdown: CountBreakdown {
                normal: normal.0,
                critical: critical.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn block(skills: Vec<SkillData>) -> DetailBlock {
        DetailBlock {
            skills: skills
                .into_iter()
                .enumerate()
                .map(|(i, s)| (i.to_string(), s))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_top_skills_limit_and_share() {
        let skills = (1..=8)
            .map(|n| skill(SkillKind::Damage, n as f64 * 10.0, (0, 0.0), (0, 0.0)))
            .collect();
        let top = top_skills(&block(skills), 400.0, TOP_SKILL_COUNT);

        assert_eq!(top.len(), 6);
        assert_eq!(top[0].total, 80.0);
        assert_eq!(top[5].total, 30.0);
        assert!((top[0].share - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_crit_bonus_weighted_by_total() {
        // avg normal 100, avg crit 200 -> ratio 2.0, weight 300
        let a = skill(SkillKind::Damage, 300.0, (2, 200.0), (2, 400.0));
        // avg normal 100, avg crit 150 -> ratio 1.5, weight 100
        let b = skill(SkillKind::Damage, 100.0, (3, 300.0), (2, 300.0));
        // too few crits, ignored
        let c = skill(SkillKind::Damage, 1000.0, (5, 500.0), (1, 900.0));
        let bonus = crit_bonus(&block(vec![a, b, c]), SkillKind::Damage).unwrap();

        assert!((bonus - 0.875).abs() < 1e-9);
        assert_eq!(crit_bonus(&block(vec![]), SkillKind::Damage), None);
    }

    #[test]
    fn test_crit_bonus_only_counts_matching_kind() {
        let heal = skill(SkillKind::Healing, 100.0, (2, 100.0), (2, 300.0));
        let summary = DetailSummary::build(1, "A", &block(vec![heal]), 100.0);

        assert_eq!(summary.damage_crit_bonus, None);
        assert!((summary.healing_crit_bonus.unwrap() - 2.0).abs() < 1e-9);
    }
}
