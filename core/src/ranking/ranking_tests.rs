//! Tests for totals, display percentages, ordering and ranks

use std::time::{Duration, Instant};

use resonance_types::{SearchMode, SortColumn, SortDirection};

use crate::cache::{ActivityTracker, EntityCache};
use crate::test_support::dataset;

use super::*;

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn cache_of(rows: &[(i64, &str, f64, f64)]) -> EntityCache {
    let mut cache = EntityCache::new();
    cache.reconcile(&dataset(rows), Instant::now());
    cache
}

fn names(cache: &EntityCache) -> Vec<String> {
    cache.ordered().map(|r| r.data.name.clone()).collect()
}

fn refresh(cache: &mut EntityCache, spec: SortSpec) {
    compute_percentages(cache);
    sort_and_rank(cache, spec, true);
}

fn damage_desc() -> SortSpec {
    SortSpec::new(SortColumn::Damage, SortDirection::Descending)
}

fn assert_rank_invariant(cache: &EntityCache) {
    let mut active: Vec<u32> = cache.records().filter(|r| !r.idle).map(|r| r.rank).collect();
    active.sort_unstable();
    let expected: Vec<u32> = (1..=active.len() as u32).collect();
    assert_eq!(active, expected);
    assert!(cache.records().filter(|r| r.idle).all(|r| r.rank == 0));
}

// ═══════════════════════════════════════════════════════════════════════════
// Ranking
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_damage_descending_ranks_and_shares() {
    let mut cache = cache_of(&[(1, "A", 100.0, 0.0), (2, "B", 300.0, 0.0)]);
    refresh(&mut cache, damage_desc());

    assert_eq!(names(&cache), vec!["B", "A"]);
    assert_eq!(cache.get(2).unwrap().rank, 1);
    assert_eq!(cache.get(1).unwrap().rank, 2);

    let rows = build_rows(&cache, SortColumn::Damage, &SearchFilter::default());
    assert_eq!(rows[0].damage_pct.as_deref(), Some(" 75%"));
    assert_eq!(rows[1].damage_pct.as_deref(), Some(" 25%"));
    // Not the sort column
    assert_eq!(rows[0].damage_rate_pct, None);
}

#[test]
fn test_ascending_and_ties_keep_prior_order() {
    let mut cache = cache_of(&[(1, "A", 50.0, 0.0), (2, "B", 50.0, 0.0), (3, "C", 10.0, 0.0)]);
    sort_and_rank(&mut cache, SortSpec::new(SortColumn::Damage, SortDirection::Ascending), true);
    assert_eq!(names(&cache), vec!["C", "A", "B"]);

    sort_and_rank(&mut cache, damage_desc(), true);
    assert_eq!(names(&cache), vec!["A", "B", "C"]);
}

#[test]
fn test_sort_by_name_and_role() {
    let mut cache = cache_of(&[
        (1, "Carol", 1.0, 0.0),
        (2, "alice", 1.0, 0.0),
        (3, "Bob", 1.0, 0.0),
    ]);
    cache.get_mut(1).unwrap().data.profession = "Healer-Aria".into();
    cache.get_mut(3).unwrap().data.profession = "Tank-Zeal".into();
    cache.get_mut(2).unwrap().data.profession = "Mage-Frost".into();

    sort_and_rank(&mut cache, SortSpec::new(SortColumn::Name, SortDirection::Ascending), true);
    assert_eq!(names(&cache), vec!["Bob", "Carol", "alice"]);

    sort_and_rank(&mut cache, SortSpec::new(SortColumn::Role, SortDirection::Ascending), true);
    assert_eq!(names(&cache), vec!["Carol", "alice", "Bob"]);
}

#[test]
fn test_select_column_flips_or_resets() {
    let mut spec = SortSpec::new(SortColumn::Damage, SortDirection::Descending);
    spec.select(SortColumn::Damage);
    assert_eq!(spec.direction, SortDirection::Ascending);

    spec.select(SortColumn::Healing);
    assert_eq!(spec, SortSpec::new(SortColumn::Healing, SortDirection::Descending));
}

#[test]
fn test_idle_entities_sort_last_with_rank_zero() {
    let now = Instant::now();
    let mut cache = EntityCache::new();
    cache.reconcile(
        &dataset(&[(1, "A", 900.0, 0.0), (2, "B", 100.0, 0.0), (3, "C", 200.0, 0.0)]),
        now,
    );
    // A stops changing, the others keep going
    let later = now + Duration::from_secs(35);
    cache.reconcile(
        &dataset(&[(1, "A", 900.0, 0.0), (2, "B", 150.0, 0.0), (3, "C", 250.0, 0.0)]),
        later,
    );
    ActivityTracker::new(Duration::from_secs(30), true)
        .sweep(&mut cache, later + Duration::from_secs(1));

    refresh(&mut cache, damage_desc());
    assert_eq!(names(&cache), vec!["C", "B", "A"]);
    assert_eq!(cache.get(1).unwrap().rank, 0);
    assert_rank_invariant(&cache);

    // Ascending still keeps idle at the bottom
    sort_and_rank(&mut cache, SortSpec::new(SortColumn::Damage, SortDirection::Ascending), true);
    assert_eq!(names(&cache), vec!["B", "C", "A"]);
    assert_rank_invariant(&cache);

    // Totals exclude the idle record
    let totals = active_totals(&cache);
    assert_eq!(totals.damage, 400.0);
    assert_eq!(totals.count, 2);

    let rows = build_rows(&cache, SortColumn::Damage, &SearchFilter::default());
    let idle_row = rows.iter().find(|r| r.id == 1).unwrap();
    assert!(idle_row.idle);
    assert_eq!(idle_row.damage_pct, None);
    assert_eq!(idle_row.damage_taken_pct, None);
}

// ═══════════════════════════════════════════════════════════════════════════
// Percentages
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_shares_sum_to_one() {
    let mut cache = cache_of(&[
        (1, "A", 123.0, 7.0),
        (2, "B", 456.0, 0.0),
        (3, "C", 789.0, 11.0),
        (4, "D", 1.5, 0.0),
    ]);
    compute_percentages(&mut cache);

    let damage: f64 = cache.records().map(|r| r.percentages.damage).sum();
    let healing: f64 = cache.records().map(|r| r.percentages.healing).sum();
    assert!((damage - 1.0).abs() < 1e-9);
    assert!((healing - 1.0).abs() < 1e-9);
}

#[test]
fn test_zero_total_gives_zero_shares() {
    let mut cache = cache_of(&[(1, "A", 0.0, 0.0), (2, "B", 0.0, 0.0)]);
    compute_percentages(&mut cache);
    assert!(
        cache
            .records()
            .all(|r| r.percentages.damage == 0.0 && r.percentages.damage_taken == 0.0)
    );

    let rows = build_rows(&cache, SortColumn::Damage, &SearchFilter::default());
    assert!(rows.iter().all(|r| r.damage_pct.is_none() && r.damage_taken_pct.is_none()));
    assert_eq!(share(5.0, 0.0), 0.0);
}

#[test]
fn test_damage_taken_always_shown_and_small_shares_hidden() {
    let mut cache = cache_of(&[(1, "A", 1000.0, 0.0), (2, "B", 5.0, 0.0)]);
    cache.get_mut(1).unwrap().data.taken_damage = 30.0;
    cache.get_mut(2).unwrap().data.taken_damage = 70.0;
    refresh(&mut cache, SortSpec::new(SortColumn::Healing, SortDirection::Descending));

    let rows = build_rows(&cache, SortColumn::Healing, &SearchFilter::default());
    let a = rows.iter().find(|r| r.id == 1).unwrap();
    let b = rows.iter().find(|r| r.id == 2).unwrap();
    assert_eq!(a.damage_taken_pct.as_deref(), Some(" 30%"));
    assert_eq!(b.damage_taken_pct.as_deref(), Some(" 70%"));
    assert_eq!(a.damage_pct, None);

    let rows = build_rows(&cache, SortColumn::Damage, &SearchFilter::default());
    let b = rows.iter().find(|r| r.id == 2).unwrap();
    // 5 / 1005 is below one percent
    assert_eq!(b.damage_pct, None);
}

// ═══════════════════════════════════════════════════════════════════════════
// Rows and Filter
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_search_filter_hides_but_keeps_rank() {
    let mut cache = cache_of(&[(1001, "Alice", 100.0, 0.0), (2002, "Bob", 300.0, 0.0)]);
    refresh(&mut cache, damage_desc());

    let filter = SearchFilter::new(SearchMode::ByName, "ALI");
    let rows = build_rows(&cache, SortColumn::Damage, &filter);
    let alice = rows.iter().find(|r| r.id == 1001).unwrap();
    let bob = rows.iter().find(|r| r.id == 2002).unwrap();
    assert!(alice.visible);
    assert_eq!(alice.rank, 2);
    assert!(!bob.visible);

    let by_id = SearchFilter::new(SearchMode::ById, "20");
    let rows = build_rows(&cache, SortColumn::Damage, &by_id);
    assert_eq!(rows.iter().filter(|r| r.visible).count(), 1);
    assert!(rows.iter().find(|r| r.id == 2002).unwrap().visible);
}

#[test]
fn test_column_totals() {
    let mut cache = cache_of(&[(1, "A", 12_000.0, 0.0), (2, "B", 3_000.0, 500.0)]);
    compute_percentages(&mut cache);
    let totals = column_totals(&active_totals(&cache));

    let damage = totals.damage.unwrap();
    assert_eq!(damage.compact, "1.5W");
    assert_eq!(damage.exact, "15,000");
    assert_eq!(totals.healing.unwrap().exact, "500");
    assert_eq!(totals.damage_rate.unwrap().exact, "1,500.00");

    assert_eq!(column_totals(&TeamTotals::default()), Default::default());
}

#[test]
fn test_row_formatting() {
    let mut cache = cache_of(&[(1, "A", 2_500_000.0, 0.0)]);
    cache.get_mut(1).unwrap().data.profession = "Healer-Lifebind".into();
    let rows = build_rows(&cache, SortColumn::Damage, &SearchFilter::default());

    assert_eq!(rows[0].damage, "2.5M");
    assert_eq!(rows[0].healing, "");
    assert_eq!(rows[0].role, "Lifebind");
    assert!(rows[0].visible);
}
