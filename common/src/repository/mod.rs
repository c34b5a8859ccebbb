pub mod file;
pub mod mongo;

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use crate::{
    config::Config,
    entities::{
        email_log::EmailLogEntry,
        insurance::{EntryPatch, InsuranceEntry, NewEntry},
    },
    error,
};

#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn list(&self) -> error::Result<Vec<InsuranceEntry>>;
    async fn get(&self, id: &str) -> error::Result<Option<InsuranceEntry>>;
    async fn add(&self, entry: NewEntry) -> error::Result<InsuranceEntry>;
    async fn bulk_add(&self, entries: Vec<NewEntry>) -> error::Result<Vec<InsuranceEntry>>;
    async fn update(&self, id: &str, patch: EntryPatch)
        -> error::Result<Option<InsuranceEntry>>;
    async fn delete(&self, id: &str) -> error::Result<bool>;
}

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Most recent first.
    async fn list(&self) -> error::Result<Vec<EmailLogEntry>>;
    async fn add(&self, log: EmailLogEntry) -> error::Result<EmailLogEntry>;
    async fn delete(&self, id: &str) -> error::Result<bool>;
    async fn clear(&self) -> error::Result<u64>;
}

pub type EntryStoreObject = Arc<dyn EntryStore>;
pub type LogStoreObject = Arc<dyn LogStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Database,
    File,
}

impl StorageMode {
    pub fn label(&self) -> &'static str {
        match self {
            StorageMode::Database => "MongoDB",
            StorageMode::File => "File Storage",
        }
    }

    pub fn is_database(&self) -> bool {
        matches!(self, StorageMode::Database)
    }
}

/// The one storage handle the rest of the process goes through. The
/// backend is chosen once at startup and never changes at runtime.
pub struct Storage {
    pub entries: EntryStoreObject,
    pub logs: LogStoreObject,
    pub mode: StorageMode,
}

impl Storage {
    /// Try the document store first; any connection failure falls back
    /// to file-backed storage rather than aborting startup.
    pub async fn init(config: &Config) -> Storage {
        if let Some(uri) = &config.mongo_uri {
            match mongo::MongoStorage::connect(uri, &config.database_name).await {
                Ok(storage) => {
                    info!("connected to MongoDB database: {}", config.database_name);
                    let storage = Arc::new(storage);
                    return Storage {
                        entries: storage.clone(),
                        logs: storage,
                        mode: StorageMode::Database,
                    };
                }
                Err(err) => {
                    warn!("failed to connect to MongoDB: {err}; falling back to file storage");
                }
            }
        } else {
            warn!("MONGODB_URI not configured; using file-based storage");
        }

        let storage = Arc::new(file::FileStorage::open(&config.data_dir));
        Storage {
            entries: storage.clone(),
            logs: storage,
            mode: StorageMode::File,
        }
    }

    /// In-memory storage with no backing files, for tests.
    pub fn ephemeral() -> Storage {
        let storage = Arc::new(file::FileStorage::ephemeral());
        Storage {
            entries: storage.clone(),
            logs: storage,
            mode: StorageMode::File,
        }
    }
}
