//! Shared types for Resonance
//!
//! This crate contains the serializable settings document and the display-ready
//! rows that the engine (resonance-core) hands to whatever front-end renders them.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Sorting
// ─────────────────────────────────────────────────────────────────────────────

/// Column the meter list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    Score,
    Role,
    Damage,
    Healing,
    #[default]
    DamageRate,
    HealingRate,
    DamageTaken,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        SortColumn::Name,
        SortColumn::Score,
        SortColumn::Role,
        SortColumn::Damage,
        SortColumn::Healing,
        SortColumn::DamageRate,
        SortColumn::HealingRate,
        SortColumn::DamageTaken,
    ];

    /// Short header label (Name, DPS, HPS, ...)
    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Score => "Score",
            SortColumn::Role => "Role",
            SortColumn::Damage => "Damage",
            SortColumn::Healing => "Healing",
            SortColumn::DamageRate => "DPS",
            SortColumn::HealingRate => "HPS",
            SortColumn::DamageTaken => "Taken",
        }
    }

    /// Parse a user-typed column name. Accepts the snake_case name or the label.
    pub fn parse(input: &str) -> Option<Self> {
        let needle = input.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| {
            c.label().eq_ignore_ascii_case(&needle) || c.key() == needle
        })
    }

    fn key(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Score => "score",
            SortColumn::Role => "role",
            SortColumn::Damage => "damage",
            SortColumn::Healing => "healing",
            SortColumn::DamageRate => "damage_rate",
            SortColumn::HealingRate => "healing_rate",
            SortColumn::DamageTaken => "damage_taken",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// How the search box matches rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    #[default]
    ByName,
    ById,
}

// ─────────────────────────────────────────────────────────────────────────────
// Scalar State
// ─────────────────────────────────────────────────────────────────────────────

/// Which data source the displayed list is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Live,
    Frozen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display Rows
// ─────────────────────────────────────────────────────────────────────────────

/// One display-ready row of the meter list.
///
/// All numbers are pre-formatted; percentage labels are `None` when the
/// display policy hides them (wrong sort column, below 1 %, idle entity).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayEntry {
    /// 1-based rank among active entities, 0 when idle
    pub rank: u32,
    pub id: i64,
    pub name: String,
    /// Role as shown (sub-class part of the profession)
    pub role: String,
    pub profession: String,
    pub score: i64,

    pub damage: String,
    pub healing: String,
    pub damage_rate: String,
    pub healing_rate: String,
    pub damage_taken: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_pct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing_pct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_rate_pct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing_rate_pct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_taken_pct: Option<String>,

    /// Crit rate over all hits, 0.0..=1.0
    pub crit_rate: f64,
    /// Lucky-hit rate over all hits, 0.0..=1.0
    pub lucky_rate: f64,

    pub idle: bool,
    /// False when the search filter hides this row
    pub visible: bool,
}

/// Team total for one column, formatted both compactly and exactly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnTotal {
    pub compact: String,
    pub exact: String,
}

/// Header tooltips: team totals over the displayed subset.
/// Every field is `None` when the subset is empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnTotals {
    pub damage: Option<ColumnTotal>,
    pub healing: Option<ColumnTotal>,
    pub damage_rate: Option<ColumnTotal>,
    pub healing_rate: Option<ColumnTotal>,
    pub damage_taken: Option<ColumnTotal>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_backend_url() -> String {
    "http://localhost:8989".to_string()
}
fn default_ui_update_interval_ms() -> u64 {
    500
}
fn default_idle_threshold_secs() -> u64 {
    30
}
fn default_snapshot_dir() -> String {
    ".".to_string()
}

/// Persisted settings. Every field carries a serde default so that older or
/// partial documents still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterSettings {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_ui_update_interval_ms")]
    pub ui_update_interval_ms: u64,

    /// Exclude entities without recent activity from totals and ranking
    #[serde(default = "default_true")]
    pub idle_mode_enabled: bool,
    #[serde(default = "default_idle_threshold_secs")]
    pub idle_threshold_secs: u64,

    /// Pause the backend while a snapshot is displayed
    #[serde(default = "default_true")]
    pub pause_on_snapshot: bool,
    /// Pause the backend when the application exits
    #[serde(default = "default_true")]
    pub pause_on_exit: bool,

    #[serde(default)]
    pub sort_column: SortColumn,
    #[serde(default)]
    pub sort_direction: SortDirection,

    /// Combat duration at last save
    #[serde(default)]
    pub elapsed_seconds: u64,
    #[serde(default)]
    pub fight_active: bool,

    /// Where snapshot documents are written
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
}

impl Default for MeterSettings {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            ui_update_interval_ms: default_ui_update_interval_ms(),
            idle_mode_enabled: true,
            idle_threshold_secs: default_idle_threshold_secs(),
            pause_on_snapshot: true,
            pause_on_exit: true,
            sort_column: SortColumn::default(),
            sort_direction: SortDirection::default(),
            elapsed_seconds: 0,
            fight_active: false,
            snapshot_dir: default_snapshot_dir(),
        }
    }
}
