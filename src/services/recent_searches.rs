//! Recently submitted search terms, persisted in a local key-value file.
//!
//! The file is a JSON object shared with other local settings; only the
//! configured storage key is read and written here.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{config::RecentSearchConfig, error::AppResult, services::suggestions::normalize_term};

pub struct RecentSearches {
    path: PathBuf,
    key: String,
    capacity: usize,
    entries: Vec<String>,
}

impl RecentSearches {
    /// Load persisted terms. A missing or unreadable file yields an empty list.
    pub fn load(config: &RecentSearchConfig) -> Self {
        let path = PathBuf::from(&config.path);
        let entries = match read_store(&path) {
            Ok(store) => store
                .get(&config.storage_key)
                .and_then(|v| serde_json::from_value::<Vec<String>>(v.clone()).ok())
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Could not read recent searches from {}: {}", path.display(), e);
                Vec::new()
            }
        };

        let mut recent = Self {
            path,
            key: config.storage_key.clone(),
            capacity: config.capacity,
            entries: Vec::new(),
        };
        // stored data may predate the current capacity or contain duplicates
        for term in entries.iter().rev() {
            recent.push_front(term);
        }
        recent
    }

    /// Most recent first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Move `term` to the front, dropping case-insensitive duplicates and
    /// anything beyond capacity.
    pub fn record(&mut self, term: &str) -> bool {
        if !self.push_front(term) {
            return false;
        }
        self.save();
        true
    }

    pub fn remove(&mut self, term: &str) -> bool {
        let key = normalize_term(term);
        let before = self.entries.len();
        self.entries.retain(|e| normalize_term(e) != key);
        if self.entries.len() == before {
            return false;
        }
        self.save();
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.save();
    }

    fn push_front(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() || self.capacity == 0 {
            return false;
        }
        let key = normalize_term(term);
        self.entries.retain(|e| normalize_term(e) != key);
        self.entries.insert(0, term.to_string());
        self.entries.truncate(self.capacity);
        true
    }

    fn save(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!("Could not save recent searches to {}: {}", self.path.display(), e);
        }
    }

    fn persist(&self) -> AppResult<()> {
        let mut store = read_store(&self.path).unwrap_or_default();
        store.insert(self.key.clone(), serde_json::to_value(&self.entries)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&Value::Object(store))?)?;
        Ok(())
    }
}

fn read_store(path: &Path) -> AppResult<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let bytes = fs::read(path)?;
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &tempfile::TempDir, capacity: usize) -> RecentSearchConfig {
        RecentSearchConfig {
            path: dir.path().join("store/local.json").to_string_lossy().into_owned(),
            storage_key: "recent_searches".to_string(),
            capacity,
        }
    }

    #[test]
    fn test_record_dedups_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        let mut recent = RecentSearches::load(&config(&dir, 3));

        for term in ["dune", "Tolkien", "  ", "DUNE", "asimov", "le guin"] {
            recent.record(term);
        }
        assert_eq!(recent.entries(), &["le guin", "asimov", "DUNE"]);
    }

    #[test]
    fn test_persists_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 5);
        {
            let mut recent = RecentSearches::load(&cfg);
            recent.record("dune");
            recent.record("foundation");
            recent.remove("DUNE");
        }
        let reloaded = RecentSearches::load(&cfg);
        assert_eq!(reloaded.entries(), &["foundation"]);
    }

    #[test]
    fn test_other_keys_survive() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 5);
        fs::create_dir_all(dir.path().join("store")).unwrap();
        fs::write(&cfg.path, r#"{"theme": "dark", "recent_searches": ["a", "A", "b"]}"#).unwrap();

        let mut recent = RecentSearches::load(&cfg);
        assert_eq!(recent.entries(), &["a", "b"]);
        recent.clear();

        let raw: Value = serde_json::from_slice(&fs::read(&cfg.path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["recent_searches"], serde_json::json!([]));
    }

    #[test]
    fn test_corrupt_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, 5);
        fs::create_dir_all(dir.path().join("store")).unwrap();
        fs::write(&cfg.path, "not json").unwrap();

        let mut recent = RecentSearches::load(&cfg);
        assert!(recent.entries().is_empty());
        assert!(recent.record("dune"));
        assert_eq!(RecentSearches::load(&cfg).entries(), &["dune"]);
    }
}
