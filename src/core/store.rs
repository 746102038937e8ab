use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::config::to_pretty_json;
use crate::error::{MakedocError, Result};

/// Repository over the single packed doc JSON file.
///
/// Every read loads the whole file and every write rewrites it in full,
/// sorted keys, four-space indent. There is no locking: concurrent runs
/// against one project are unsupported, the last writer wins.
pub struct PackedDocStore {
    path: PathBuf,
}

impl PackedDocStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the whole mapping, partial path to free-text doc.
    pub fn read(&self) -> Result<BTreeMap<String, String>> {
        let content = fs::read_to_string(&self.path).map_err(|source| MakedocError::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MakedocError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the whole mapping.
    pub fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = to_pretty_json(entries).map_err(|source| MakedocError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| MakedocError::WriteFile {
            path: self.path.clone(),
            source,
        })
    }

    /// The entry for one partial path, if registered.
    pub fn get(&self, partial_path: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(partial_path).cloned())
    }

    /// Insert or replace one entry, read-modify-write.
    pub fn insert(&self, partial_path: &str, doc: String) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(partial_path.to_string(), doc);
        self.write(&entries)
    }

    /// Register a default entry when none exists yet. Existing entries are
    /// never clobbered.
    pub fn ensure_entry(&self, partial_path: &str, default_doc: &str) -> Result<()> {
        let mut entries = self.read()?;
        if !entries.contains_key(partial_path) {
            entries.insert(partial_path.to_string(), default_doc.to_string());
            self.write(&entries)?;
        }
        Ok(())
    }
}
