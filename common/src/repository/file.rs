use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use log::{error, info, warn};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    entities::{
        email_log::EmailLogEntry,
        insurance::{EntryPatch, InsuranceEntry, NewEntry},
    },
    error,
};

use super::{EntryStore, LogStore};

const ENTRIES_FILE: &str = "insurance.json";
const LOGS_FILE: &str = "email-logs.json";

/// JSON-file-backed storage, used when no document store is configured.
/// The whole collection is rewritten on every mutation. In-process
/// mutations are serialized by the mutexes; a second process writing the
/// same files can still lose updates. Suitable only at small scale.
pub struct FileStorage {
    dir: Option<PathBuf>,
    entries: Mutex<Vec<InsuranceEntry>>,
    logs: Mutex<Vec<EmailLogEntry>>,
    last_id: Mutex<i64>,
}

impl FileStorage {
    pub fn open(dir: &Path) -> Self {
        if let Err(err) = fs::create_dir_all(dir) {
            warn!("failed to create data directory {}: {err}", dir.display());
        }

        let entries: Vec<InsuranceEntry> = load_array(&dir.join(ENTRIES_FILE));
        let logs: Vec<EmailLogEntry> = load_array(&dir.join(LOGS_FILE));
        info!(
            "loaded {} insurance entries and {} email logs from {}",
            entries.len(),
            logs.len(),
            dir.display()
        );

        Self {
            dir: Some(dir.to_path_buf()),
            entries: Mutex::new(entries),
            logs: Mutex::new(logs),
            last_id: Mutex::new(0),
        }
    }

    /// No backing files; everything lives and dies in memory. Used by
    /// tests.
    pub fn ephemeral() -> Self {
        Self {
            dir: None,
            entries: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            last_id: Mutex::new(0),
        }
    }

    /// Millisecond-timestamp ids, bumped when two assignments land in
    /// the same millisecond.
    fn next_id(&self) -> String {
        let mut last = self.last_id.lock().unwrap();
        let now = Utc::now().timestamp_millis();
        *last = if now > *last { now } else { *last + 1 };
        last.to_string()
    }

    fn persist_entries(&self, entries: &[InsuranceEntry]) {
        if let Some(dir) = &self.dir {
            persist(&dir.join(ENTRIES_FILE), entries);
        }
    }

    fn persist_logs(&self, logs: &[EmailLogEntry]) {
        if let Some(dir) = &self.dir {
            persist(&dir.join(LOGS_FILE), logs);
        }
    }
}

/// A missing or corrupt file degrades to an empty collection rather
/// than failing startup.
fn load_array<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            warn!("failed to parse {}: {err}; starting empty", path.display());
            Vec::new()
        }
    }
}

fn persist<T: Serialize>(path: &Path, items: &[T]) {
    let json = match serde_json::to_string_pretty(items) {
        Ok(json) => json,
        Err(err) => {
            error!("failed to serialize {}: {err}", path.display());
            return;
        }
    };
    if let Err(err) = fs::write(path, json) {
        error!("failed to write {}: {err}", path.display());
    }
}

#[async_trait]
impl EntryStore for FileStorage {
    async fn list(&self) -> error::Result<Vec<InsuranceEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn get(&self, id: &str) -> error::Result<Option<InsuranceEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn add(&self, entry: NewEntry) -> error::Result<InsuranceEntry> {
        let entry = entry.into_entry(self.next_id(), Utc::now().to_rfc3339());
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry.clone());
        self.persist_entries(&entries);
        Ok(entry)
    }

    async fn bulk_add(&self, new_entries: Vec<NewEntry>) -> error::Result<Vec<InsuranceEntry>> {
        let created_at = Utc::now().to_rfc3339();
        let stored: Vec<InsuranceEntry> = new_entries
            .into_iter()
            .map(|entry| entry.into_entry(self.next_id(), created_at.clone()))
            .collect();

        let mut entries = self.entries.lock().unwrap();
        entries.extend(stored.iter().cloned());
        self.persist_entries(&entries);
        Ok(stored)
    }

    async fn update(
        &self,
        id: &str,
        patch: EntryPatch,
    ) -> error::Result<Option<InsuranceEntry>> {
        let mut entries = self.entries.lock().unwrap();
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        entries[pos].apply(patch);
        let updated = entries[pos].clone();
        self.persist_entries(&entries);
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let Some(pos) = entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        entries.remove(pos);
        self.persist_entries(&entries);
        Ok(true)
    }
}

#[async_trait]
impl LogStore for FileStorage {
    async fn list(&self) -> error::Result<Vec<EmailLogEntry>> {
        Ok(self.logs.lock().unwrap().clone())
    }

    async fn add(&self, mut log: EmailLogEntry) -> error::Result<EmailLogEntry> {
        log.id = self.next_id();
        let mut logs = self.logs.lock().unwrap();
        // newest first, matching the list contract
        logs.insert(0, log.clone());
        self.persist_logs(&logs);
        Ok(log)
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        let mut logs = self.logs.lock().unwrap();
        let Some(pos) = logs.iter().position(|l| l.id == id) else {
            return Ok(false);
        };
        logs.remove(pos);
        self.persist_logs(&logs);
        Ok(true)
    }

    async fn clear(&self) -> error::Result<u64> {
        let mut logs = self.logs.lock().unwrap();
        let removed = logs.len() as u64;
        logs.clear();
        self.persist_logs(&logs);
        Ok(removed)
    }
}
