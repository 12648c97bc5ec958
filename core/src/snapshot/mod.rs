//! Snapshot documents: a frozen copy of the displayed entities
//!
//! A snapshot stores the combat duration plus, per entity, the raw metrics, the
//! skill breakdown and the percentage shares computed at capture time. It is
//! self-describing JSON and loads without a backend.

mod error;

pub use error::SnapshotError;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cache::{EntityCache, EntityRecord, Percentages};
use crate::dataset::{DetailBlock, EntityId, UserData};

const FILE_PREFIX: &str = "resonance-";
const FILE_EXTENSION: &str = "json";

/// Immutable once captured. Loading builds fresh records from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotRecord {
    #[serde(default)]
    pub elapsed_seconds: u64,
    #[serde(default)]
    pub players: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotEntry {
    /// Absent in older documents; the skill block's uid is used instead.
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub user_data: UserData,
    #[serde(default)]
    pub skill_data: Option<DetailBlock>,
    #[serde(flatten)]
    pub percentages: Percentages,
}

impl SnapshotEntry {
    fn entity_id(&self) -> Option<EntityId> {
        self.id.or_else(|| self.skill_data.as_ref().map(|d| d.uid))
    }
}

impl SnapshotRecord {
    /// Capture the cache in display order.
    pub fn capture(cache: &EntityCache, elapsed_seconds: u64) -> Result<Self, SnapshotError> {
        if cache.is_empty() {
            return Err(SnapshotError::Empty);
        }
        let players = cache
            .ordered()
            .map(|r| SnapshotEntry {
                id: Some(r.id),
                user_data: r.data.clone(),
                skill_data: r.detail.clone(),
                percentages: r.percentages,
            })
            .collect();
        Ok(Self {
            elapsed_seconds,
            players,
        })
    }

    /// Write pretty JSON via a temp file and rename, so a partial document is
    /// never visible under the final name.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self).map_err(SnapshotError::Serialize)?;
        let tmp_path = path.with_extension("tmp");
        let write_err = |source| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        };

        {
            let mut file = File::create(&tmp_path).map_err(write_err)?;
            file.write_all(json.as_bytes()).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }
        fs::rename(&tmp_path, path).map_err(write_err)?;

        tracing::info!(path = %path.display(), players = self.players.len(), "Snapshot saved");
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fresh records carrying the stored metrics, details and shares.
    ///
    /// Entries without any id, or repeating an earlier id, are skipped.
    pub fn to_records(&self, now: Instant) -> Vec<EntityRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(self.players.len());
        for entry in &self.players {
            let Some(id) = entry.entity_id() else {
                tracing::warn!(name = %entry.user_data.name, "Snapshot entry without id skipped");
                continue;
            };
            if !seen.insert(id) {
                tracing::warn!(entity_id = id, "Duplicate snapshot entry skipped");
                continue;
            }
            let mut record = EntityRecord::restored(
                id,
                entry.user_data.clone(),
                entry.skill_data.clone(),
                entry.percentages,
                now,
            );
            record.rank = records.len() as u32 + 1;
            records.push(record);
        }
        records
    }
}

/// `<dir>/resonance-YYYYMMDD_HHMMSS.json`
pub fn snapshot_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{FILE_PREFIX}{}.{FILE_EXTENSION}",
        at.format("%Y%m%d_%H%M%S")
    ))
}

/// File stem without the `resonance-` prefix, for display while frozen.
pub fn display_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix(FILE_PREFIX) {
        Some(rest) => rest.to_string(),
        None => stem,
    }
}
