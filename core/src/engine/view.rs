use resonance_types::{ColumnTotals, ConnectionStatus, DisplayEntry, ViewMode};

use crate::detail::DetailSummary;
use crate::observable::Observable;

/// Everything the presentation layer can subscribe to.
#[derive(Debug, Default)]
pub struct MeterView {
    pub rows: Observable<Vec<DisplayEntry>>,
    pub totals: Observable<ColumnTotals>,
    pub mode: Observable<ViewMode>,
    pub duration: Observable<String>,
    pub connection: Observable<ConnectionStatus>,
    pub paused: Observable<bool>,
    /// `mm:ss` while a countdown runs, empty otherwise
    pub countdown: Observable<String>,
    /// Transient user-facing message; fires on every publish
    pub notice: Observable<Option<String>>,
    /// Display name of the loaded snapshot while frozen
    pub snapshot_name: Observable<Option<String>>,
    pub inspection: Observable<Option<DetailSummary>>,
}

impl MeterView {
    pub fn new() -> Self {
        Self {
            duration: Observable::new("0:00".to_string()),
            ..Self::default()
        }
    }
}
