use serde::{Deserialize, Serialize};

pub const MAX_HISTORY_ENTRIES: usize = 5;

/// LocalStorage key holding the JSON array of recent searches.
pub const SEARCH_HISTORY_STORAGE_KEY: &str = "mapa_search_history";

/// Recent geocoder results: unique, newest first, at most [`MAX_HISTORY_ENTRIES`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    /// Build from stored entries (newest first), dropping blanks and later
    /// duplicates and capping the length.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut normalized: Vec<String> = Vec::with_capacity(MAX_HISTORY_ENTRIES);
        for entry in entries {
            let entry = entry.into();
            if entry.trim().is_empty() || normalized.contains(&entry) {
                continue;
            }
            normalized.push(entry);
            if normalized.len() == MAX_HISTORY_ENTRIES {
                break;
            }
        }
        Self {
            entries: normalized,
        }
    }

    /// Parse the persisted value. Absent or unreadable data yields an empty history.
    pub fn from_json(raw: Option<&str>) -> Self {
        raw.and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .map(Self::from_entries)
            .unwrap_or_default()
    }

    /// Move `place` to the front, inserting it if new. Returns whether the
    /// list changed, i.e. whether it needs to be persisted.
    pub fn record(&mut self, place: &str) -> bool {
        let place = place.trim();
        if place.is_empty() {
            return false;
        }
        if self.entries.first().is_some_and(|first| first == place) {
            return false;
        }
        self.entries.retain(|entry| entry != place);
        self.entries.insert(0, place.to_string());
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<String>> for SearchHistory {
    fn from(entries: Vec<String>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<SearchHistory> for Vec<String> {
    fn from(history: SearchHistory) -> Self {
        history.entries
    }
}
