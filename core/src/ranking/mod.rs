//! Team totals, percentage shares, ordering and display rows
//!
//! A refresh runs these in order: [`compute_percentages`] (live only; frozen
//! records keep their stored shares), [`sort_and_rank`], then [`build_rows`]
//! and [`column_totals`] for the presentation layer.

mod filter;
mod metrics;
mod rows;
mod sorter;

#[cfg(test)]
mod ranking_tests;

pub use filter::SearchFilter;
pub use metrics::{
    PercentLabels, TeamTotals, active_totals, compute_percentages, share, visible_percentages,
};
pub use rows::{build_rows, column_totals, display_entry};
pub use sorter::{SortSpec, sort_and_rank};
