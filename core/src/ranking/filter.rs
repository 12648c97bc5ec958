use resonance_types::SearchMode;

use crate::cache::EntityRecord;

/// Search box state. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub mode: SearchMode,
    query: String,
}

impl SearchFilter {
    pub fn new(mode: SearchMode, query: impl Into<String>) -> Self {
        Self {
            mode,
            query: query.into().trim().to_lowercase(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Name: case-insensitive substring. Id: decimal prefix.
    pub fn matches(&self, record: &EntityRecord) -> bool {
        if self.query.is_empty() {
            return true;
        }
        match self.mode {
            SearchMode::ByName => record.data.name.to_lowercase().contains(&self.query),
            SearchMode::ById => record.id.to_string().starts_with(&self.query),
        }
    }
}
