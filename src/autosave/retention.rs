//! Persisted catalog of autosaves with an oldest-first retention policy.

use crate::error::{EditorError, Result};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the catalog inside the autosave directory.
pub const CATALOG_FILE: &str = "autosaves.json";

/// Default number of autosaves kept on disk.
pub const DEFAULT_MAX_RETAINED: usize = 8;

/// Name shown for autosaves of documents without a name.
const UNNAMED_DOCUMENT: &str = "Untitled";

/// One autosave known to the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSaveRecord {
    /// Absolute path of the payload file.
    #[serde(rename = "file")]
    pub file_path: PathBuf,

    /// Display name of the saved document.
    #[serde(rename = "name")]
    pub document_name: String,

    /// Save time in seconds since the Unix epoch.
    #[serde(rename = "time")]
    pub saved_at_secs: u64,
}

/// Opaque reference to a catalog entry, handed to the restore menu.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AutoSaveHandle(PathBuf);

impl AutoSaveHandle {
    /// Payload file this handle points at.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// One row of the "restore autosave" menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AutoSaveMenuEntry {
    /// Document name plus age, e.g. "Dugong (saved 3 minutes ago)".
    pub label: String,
    pub age: String,
    /// Exact age, e.g. "1h 4m 10s ago".
    pub tooltip: String,
    pub handle: AutoSaveHandle,
}

/// The autosave catalog.
///
/// Only the main thread mutates this; workers report back through the
/// dispatcher.
pub struct RetentionIndex {
    dir: PathBuf,
    catalog_path: PathBuf,
    entries: Vec<AutoSaveRecord>,
    max_retained: usize,
    /// False when the directory could not be created; the index then only
    /// lives in memory.
    persistent: bool,
}

impl RetentionIndex {
    /// Open the catalog in `dir`, creating the directory and an empty
    /// catalog as needed.
    ///
    /// Never fails: an unreadable or corrupt catalog is treated as empty and
    /// a directory that cannot be created leaves the index in memory only.
    pub fn load_or_init(dir: impl AsRef<Path>, max_retained: usize) -> Self {
        let dir = dir.as_ref().to_path_buf();

        let persistent = match fs::create_dir_all(&dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), "failed to create autosave directory: {e}");
                false
            }
        };
        // Catalog records hold absolute paths.
        let dir = if persistent {
            fs::canonicalize(&dir).unwrap_or(dir)
        } else {
            dir
        };
        let catalog_path = dir.join(CATALOG_FILE);

        let mut index = Self {
            dir,
            catalog_path,
            entries: Vec::new(),
            max_retained: max_retained.max(1),
            persistent,
        };

        if !index.persistent {
            return index;
        }

        if index.catalog_path.exists() {
            match Self::read_catalog(&index.catalog_path) {
                Ok(entries) => index.entries = entries,
                Err(e) => {
                    tracing::warn!(
                        path = %index.catalog_path.display(),
                        "autosave catalog unreadable, starting empty: {e}"
                    );
                }
            }
        } else if let Err(e) = index.persist() {
            tracing::warn!(
                path = %index.catalog_path.display(),
                "failed to create autosave catalog: {e}"
            );
        }

        index
    }

    /// Add a record, persist, then evict the oldest records until the
    /// retention limit holds. Returns the evicted records.
    pub fn insert(&mut self, record: AutoSaveRecord) -> Vec<AutoSaveRecord> {
        tracing::debug!(file = %record.file_path.display(), "recording autosave");
        self.entries.push(record);
        self.persist_logged();
        self.enforce_limit()
    }

    /// Change the retention limit, evicting immediately if needed.
    pub fn set_max_retained(&mut self, max_retained: usize) -> Vec<AutoSaveRecord> {
        self.max_retained = max_retained.max(1);
        self.enforce_limit()
    }

    /// Write the catalog to disk atomically.
    pub fn persist(&self) -> Result<()> {
        if !self.persistent {
            return Ok(());
        }
        let data = serde_json::to_vec_pretty(&self.entries)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(&data)?;
        temp.flush()?;
        temp.as_file().sync_all()?;
        temp.persist(&self.catalog_path)
            .map_err(|e| EditorError::Io(e.error))?;
        Ok(())
    }

    /// Records in insertion order.
    pub fn entries(&self) -> &[AutoSaveRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_retained(&self) -> usize {
        self.max_retained
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Look up the record behind a menu handle.
    pub fn resolve(&self, handle: &AutoSaveHandle) -> Option<&AutoSaveRecord> {
        self.entries.iter().find(|r| r.file_path == handle.0)
    }

    /// Menu rows, newest first.
    pub fn menu_entries(&self, now: Timestamp) -> Vec<AutoSaveMenuEntry> {
        self.entries
            .iter()
            .rev()
            .map(|record| {
                let elapsed = now.as_secs().saturating_sub(record.saved_at_secs);
                let name = if record.document_name.is_empty() {
                    UNNAMED_DOCUMENT
                } else {
                    record.document_name.as_str()
                };
                let age = format_age(elapsed);
                AutoSaveMenuEntry {
                    label: format!("{name} ({age})"),
                    tooltip: format_exact_age(elapsed),
                    age,
                    handle: AutoSaveHandle(record.file_path.clone()),
                }
            })
            .collect()
    }

    fn enforce_limit(&mut self) -> Vec<AutoSaveRecord> {
        let mut evicted = Vec::new();
        while self.entries.len() > self.max_retained {
            let Some(oldest) = self
                .entries
                .iter()
                .enumerate()
                .min_by_key(|(_, r)| r.saved_at_secs)
                .map(|(i, _)| i)
            else {
                break;
            };
            let record = self.entries.remove(oldest);
            delete_payload(&record.file_path);
            self.persist_logged();
            evicted.push(record);
        }
        evicted
    }

    fn persist_logged(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!(
                path = %self.catalog_path.display(),
                "failed to save autosave catalog: {e}"
            );
        }
    }

    fn read_catalog(path: &Path) -> Result<Vec<AutoSaveRecord>> {
        let data = fs::read(path)?;
        serde_json::from_slice(&data).map_err(|e| EditorError::Deserialization(e.to_string()))
    }
}

/// Remove an evicted payload. A file that is already gone counts as removed.
fn delete_payload(path: &Path) {
    if path.as_os_str().is_empty() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(file = %path.display(), "deleted old autosave"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(file = %path.display(), "failed to delete old autosave: {e}"),
    }
}

fn format_age(elapsed_secs: u64) -> String {
    let minutes = elapsed_secs / 60;
    if minutes < 1 {
        "saved just now".to_string()
    } else if elapsed_secs > 3600 {
        "saved more than an hour ago".to_string()
    } else if minutes == 1 {
        "saved 1 minute ago".to_string()
    } else {
        format!("saved {minutes} minutes ago")
    }
}

fn format_exact_age(elapsed_secs: u64) -> String {
    let hours = elapsed_secs / 3600;
    let minutes = (elapsed_secs % 3600) / 60;
    let seconds = elapsed_secs % 60;
    format!("{hours}h {minutes}m {seconds}s ago")
}
