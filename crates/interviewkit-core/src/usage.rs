//! Daily usage counter stores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::traits::UsageStore;

/// In-memory counts keyed by date.
#[derive(Default)]
pub struct MemoryUsageStore {
    counts: Mutex<HashMap<String, u32>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `count` interviews for `date_key`.
    pub fn with_count(date_key: &str, count: u32) -> Self {
        let store = Self::default();
        store.counts.lock().insert(date_key.to_string(), count);
        store
    }
}

impl UsageStore for MemoryUsageStore {
    fn get(&self, date_key: &str) -> Result<u32> {
        Ok(self.counts.lock().get(date_key).copied().unwrap_or(0))
    }

    fn increment(&self, date_key: &str) -> Result<u32> {
        let mut counts = self.counts.lock();
        let count = counts.entry(date_key.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

/// The single record kept on disk: only the latest date survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UsageRecord {
    date: String,
    count: u32,
}

/// JSON-file usage store holding the count for the most recent date only.
///
/// Reading any other date yields zero, so a new day starts fresh. A file that
/// cannot be parsed is an error for both `get` and `increment` until `reset`.
pub struct FileUsageStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileUsageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget every recorded interview.
    pub fn reset(&self) -> Result<()> {
        let _guard = self.lock.lock();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to remove usage file {}", self.path.display())),
        }
    }

    fn read(&self) -> Result<Option<UsageRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read usage file {}", self.path.display()))
            }
        };
        // A damaged record never reads as zero.
        serde_json::from_str(&content).map(Some).with_context(|| {
            format!(
                "corrupt usage file {}; run `interviewkit usage --reset` to clear it",
                self.path.display()
            )
        })
    }

    fn write(&self, record: &UsageRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(record).context("failed to serialize usage record")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write usage file {}", self.path.display()))
    }
}

impl UsageStore for FileUsageStore {
    fn get(&self, date_key: &str) -> Result<u32> {
        let _guard = self.lock.lock();
        Ok(self
            .read()?
            .filter(|r| r.date == date_key)
            .map(|r| r.count)
            .unwrap_or(0))
    }

    fn increment(&self, date_key: &str) -> Result<u32> {
        let _guard = self.lock.lock();
        let current = self
            .read()?
            .filter(|r| r.date == date_key)
            .map(|r| r.count)
            .unwrap_or(0);
        let record = UsageRecord {
            date: date_key.to_string(),
            count: current + 1,
        };
        self.write(&record)?;
        Ok(record.count)
    }
}
