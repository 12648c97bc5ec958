//! Terminal presenter
//!
//! Subscribes to the engine's [`MeterView`] and keeps the latest value of every
//! field on a [`Board`]. The REPL renders the board on request; notices and
//! entity summaries are printed as soon as they arrive.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use resonance_core::MeterView;
use resonance_core::detail::DetailSummary;
use resonance_core::format::format_percent_1;
use resonance_types::{ColumnTotal, ColumnTotals, ConnectionStatus, DisplayEntry, ViewMode};

#[derive(Debug, Default, Clone)]
pub struct Board {
    pub rows: Vec<DisplayEntry>,
    pub totals: ColumnTotals,
    pub mode: ViewMode,
    pub duration: String,
    pub connection: ConnectionStatus,
    pub paused: bool,
    pub countdown: String,
    pub snapshot_name: Option<String>,
}

pub type SharedBoard = Arc<Mutex<Board>>;

fn update(board: &SharedBoard, apply: impl FnOnce(&mut Board)) {
    if let Ok(mut board) = board.lock() {
        apply(&mut *board);
    }
}

/// Wire every view field to the board. Call before the engine starts.
pub fn attach(view: &mut MeterView, board: &SharedBoard) {
    let b = Arc::clone(board);
    view.rows.subscribe(move |rows| update(&b, |s| s.rows = rows.clone()));
    let b = Arc::clone(board);
    view.totals
        .subscribe(move |totals| update(&b, |s| s.totals = totals.clone()));
    let b = Arc::clone(board);
    view.mode.subscribe(move |mode| update(&b, |s| s.mode = *mode));
    let b = Arc::clone(board);
    view.duration
        .subscribe(move |text| update(&b, |s| s.duration = text.clone()));
    let b = Arc::clone(board);
    view.connection
        .subscribe(move |status| update(&b, |s| s.connection = *status));
    let b = Arc::clone(board);
    view.paused.subscribe(move |paused| update(&b, |s| s.paused = *paused));
    let b = Arc::clone(board);
    view.countdown
        .subscribe(move |text| update(&b, |s| s.countdown = text.clone()));
    let b = Arc::clone(board);
    view.snapshot_name
        .subscribe(move |name| update(&b, |s| s.snapshot_name = name.clone()));

    view.notice.subscribe(|notice| {
        if let Some(text) = notice {
            println!("\n* {text}");
        }
    });
    view.inspection.subscribe(|summary| {
        if let Some(summary) = summary {
            println!("\n{}", render_summary(summary));
        }
    });

    if let Ok(mut state) = board.lock() {
        state.duration = view.duration.get().clone();
    }
}

impl Board {
    pub fn status_line(&self) -> String {
        let mut line = match self.mode {
            ViewMode::Live => "LIVE".to_string(),
            ViewMode::Frozen => format!(
                "SNAPSHOT {}",
                self.snapshot_name.as_deref().unwrap_or_default()
            ),
        };
        let _ = write!(line, "  {}  {}", self.duration, self.connection.label());
        if self.paused {
            line.push_str("  [paused]");
        }
        if !self.countdown.is_empty() {
            let _ = write!(line, "  countdown {}", self.countdown);
        }
        line
    }

    /// Visible rows as a fixed-width table with a totals footer.
    pub fn render(&self) -> String {
        let mut out = self.status_line();
        out.push('\n');
        let _ = writeln!(
            out,
            "{:>4}  {:<16} {:<10} {:>14} {:>12} {:>14} {:>12} {:>12}",
            "#", "Name", "Role", "Damage", "DPS", "Healing", "HPS", "Taken"
        );
        for row in self.rows.iter().filter(|r| r.visible) {
            let rank = if row.idle {
                "-".to_string()
            } else {
                row.rank.to_string()
            };
            let _ = writeln!(
                out,
                "{:>4}  {:<16} {:<10} {:>14} {:>12} {:>14} {:>12} {:>12}",
                rank,
                truncate(&row.name, 16),
                truncate(&row.role, 10),
                cell(&row.damage, &row.damage_pct),
                cell(&row.damage_rate, &row.damage_rate_pct),
                cell(&row.healing, &row.healing_pct),
                cell(&row.healing_rate, &row.healing_rate_pct),
                cell(&row.damage_taken, &row.damage_taken_pct),
            );
        }
        let _ = write!(
            out,
            "{:>4}  {:<27} {:>14} {:>12} {:>14} {:>12} {:>12}",
            "",
            "Total",
            total(&self.totals.damage),
            total(&self.totals.damage_rate),
            total(&self.totals.healing),
            total(&self.totals.healing_rate),
            total(&self.totals.damage_taken),
        );
        out
    }
}

fn cell(value: &str, pct: &Option<String>) -> String {
    match pct {
        Some(pct) => format!("{value}{pct}"),
        None => value.to_string(),
    }
}

fn total(value: &Option<ColumnTotal>) -> &str {
    value.as_ref().map(|t| t.compact.as_str()).unwrap_or("")
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

pub fn render_summary(summary: &DetailSummary) -> String {
    let mut out = format!("{} ({})", summary.name, summary.id);
    for skill in &summary.top_skills {
        let _ = write!(
            out,
            "\n  {:<24} {:>8}",
            truncate(&skill.name, 24),
            format_percent_1(skill.share)
        );
    }
    if let Some(bonus) = summary.damage_crit_bonus {
        let _ = write!(out, "\n  Damage crit bonus  {}", format_percent_1(bonus));
    }
    if let Some(bonus) = summary.healing_crit_bonus {
        let _ = write!(out, "\n  Healing crit bonus {}", format_percent_1(bonus));
    }
    out
}
