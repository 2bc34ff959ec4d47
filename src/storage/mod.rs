//! Seen-set persistence: one flat JSON document, rewritten in full every run.
//!
//! ```json
//! {
//!   "seen_ids": ["abc-123", "def-456"],
//!   "last_check": "2026-04-01 09:30:00"
//! }
//! ```
//!
//! A missing file is a fresh start. A file that exists but cannot be read or
//! parsed is an error: resetting would re-notify every listing ever seen.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("{path:?} is not a valid seen-set file: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },

    #[error("could not write {path:?}: {source}")]
    Write { path: PathBuf, source: std::io::Error },

    #[error("could not serialize seen-set: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ── Record ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeenSet {
    pub seen_ids: BTreeSet<String>,
    #[serde(default, with = "last_check_format")]
    pub last_check: Option<NaiveDateTime>,
}

impl SeenSet {
    pub fn len(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_ids.is_empty()
    }
}

mod last_check_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(ts) => s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<SeenSet, StoreError> {
        if !self.path.exists() {
            info!("No seen-set at {:?}, starting empty", self.path);
            return Ok(SeenSet::default());
        }

        let data = std::fs::read_to_string(&self.path)
            .map_err(|source| StoreError::Read { path: self.path.clone(), source })?;
        let record: SeenSet = serde_json::from_str(&data)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;

        debug!("Loaded {} seen ids (last check {:?})", record.len(), record.last_check);
        Ok(record)
    }

    /// Stamp `last_check` with the current local time and rewrite the file.
    pub fn save(&self, record: &mut SeenSet) -> Result<(), StoreError> {
        record.last_check = Some(Local::now().naive_local());
        self.write(record)
    }

    fn write(&self, record: &SeenSet) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(record)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;

        debug!("Saved {} seen ids to {:?}", record.len(), self.path);
        Ok(())
    }
}
