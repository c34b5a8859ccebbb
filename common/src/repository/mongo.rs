use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use log::{error, warn};
use mongodb::{
    bson::{doc, oid::ObjectId, to_document, Bson, Document},
    options::{ClientOptions, FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Collection, Database,
};
use serde::de::DeserializeOwned;

use crate::{
    entities::{
        email_log::EmailLogEntry,
        insurance::{EntryPatch, InsuranceEntry, NewEntry},
    },
    error::{self, AddCode},
};

use super::{EntryStore, LogStore};

const ENTRIES_COLLECTION: &str = "insurance";
const LOGS_COLLECTION: &str = "emailLogs";

pub struct MongoStorage {
    db: Database,
}

impl MongoStorage {
    /// Connect and ping. A short server-selection timeout keeps startup
    /// from hanging on an unreachable cluster.
    pub async fn connect(uri: &str, database: &str) -> anyhow::Result<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(Duration::from_secs(5));
        let client = Client::with_options(options)?;
        let db = client.database(database);
        db.run_command(doc! {"ping": 1}, None).await?;
        Ok(Self { db })
    }

    fn entries(&self) -> Collection<Document> {
        self.db.collection(ENTRIES_COLLECTION)
    }

    fn logs(&self) -> Collection<Document> {
        self.db.collection(LOGS_COLLECTION)
    }
}

/// The calling layer does not consistently know whether it holds a hex
/// ObjectId or a plain string id, so every lookup tries the native form
/// first and falls back to an exact string match.
fn id_filters(id: &str) -> Vec<Document> {
    let mut filters = Vec::new();
    if let Ok(oid) = ObjectId::parse_str(id) {
        filters.push(doc! {"_id": oid});
    }
    filters.push(doc! {"_id": id});
    filters
}

/// Map a stored document back to an entity, lifting `_id` into the
/// entity's string `id`. Malformed documents are skipped, not fatal.
fn from_doc<T: DeserializeOwned>(mut doc: Document) -> Option<T> {
    let id = match doc.remove("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s,
        Some(other) => other.to_string(),
        None => return None,
    };
    doc.insert("id", id);
    match mongodb::bson::from_document(doc) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("skipping malformed document: {err}");
            None
        }
    }
}

fn to_stored_doc<T: serde::Serialize>(value: &T, oid: ObjectId) -> error::Result<Document> {
    let mut doc = to_document(value)?;
    doc.remove("id");
    doc.insert("_id", oid);
    Ok(doc)
}

#[async_trait]
impl EntryStore for MongoStorage {
    async fn list(&self) -> error::Result<Vec<InsuranceEntry>> {
        let cursor = match self.entries().find(None, None).await {
            Ok(cursor) => cursor,
            Err(err) => {
                error!("failed to read insurance collection: {err}");
                return Ok(Vec::new());
            }
        };

        let docs: Vec<mongodb::error::Result<Document>> = cursor.collect().await;
        Ok(docs
            .into_iter()
            .filter_map(|doc| doc.ok())
            .filter_map(from_doc)
            .collect())
    }

    async fn get(&self, id: &str) -> error::Result<Option<InsuranceEntry>> {
        for filter in id_filters(id) {
            match self.entries().find_one(filter, None).await {
                Ok(Some(doc)) => return Ok(from_doc(doc)),
                Ok(None) => {}
                Err(err) => {
                    error!("failed to read insurance entry {id}: {err}");
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }

    async fn add(&self, entry: NewEntry) -> error::Result<InsuranceEntry> {
        let oid = ObjectId::new();
        let entry = entry.into_entry(oid.to_hex(), Utc::now().to_rfc3339());
        let doc = to_stored_doc(&entry, oid)?;
        self.entries()
            .insert_one(doc, None)
            .await
            .map_err(|err| anyhow::Error::from(err).code(503))?;
        Ok(entry)
    }

    async fn bulk_add(&self, entries: Vec<NewEntry>) -> error::Result<Vec<InsuranceEntry>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let created_at = Utc::now().to_rfc3339();
        let mut stored = Vec::with_capacity(entries.len());
        let mut docs = Vec::with_capacity(entries.len());
        for entry in entries {
            let oid = ObjectId::new();
            let entry = entry.into_entry(oid.to_hex(), created_at.clone());
            docs.push(to_stored_doc(&entry, oid)?);
            stored.push(entry);
        }

        self.entries()
            .insert_many(docs, None)
            .await
            .map_err(|err| anyhow::Error::from(err).code(503))?;
        Ok(stored)
    }

    async fn update(
        &self,
        id: &str,
        patch: EntryPatch,
    ) -> error::Result<Option<InsuranceEntry>> {
        let mut set = to_document(&patch)?;
        set.insert("updatedAt", Utc::now().to_rfc3339());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        for filter in id_filters(id) {
            let updated = self
                .entries()
                .find_one_and_update(filter, doc! {"$set": set.clone()}, options.clone())
                .await
                .map_err(|err| anyhow::Error::from(err).code(503))?;
            if let Some(doc) = updated {
                return Ok(from_doc(doc));
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        for filter in id_filters(id) {
            let result = self
                .entries()
                .delete_one(filter, None)
                .await
                .map_err(|err| anyhow::Error::from(err).code(503))?;
            if result.deleted_count > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl LogStore for MongoStorage {
    async fn list(&self) -> error::Result<Vec<EmailLogEntry>> {
        let options = FindOptions::builder()
            .sort(doc! {"timestamp": -1})
            .build();

        let cursor = match self.logs().find(None, options).await {
            Ok(cursor) => cursor,
            Err(err) => {
                error!("failed to read email logs: {err}");
                return Ok(Vec::new());
            }
        };

        let docs: Vec<mongodb::error::Result<Document>> = cursor.collect().await;
        Ok(docs
            .into_iter()
            .filter_map(|doc| doc.ok())
            .filter_map(from_doc)
            .collect())
    }

    async fn add(&self, mut log: EmailLogEntry) -> error::Result<EmailLogEntry> {
        let oid = ObjectId::new();
        log.id = oid.to_hex();
        let doc = to_stored_doc(&log, oid)?;
        self.logs()
            .insert_one(doc, None)
            .await
            .map_err(|err| anyhow::Error::from(err).code(503))?;
        Ok(log)
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        for filter in id_filters(id) {
            let result = self
                .logs()
                .delete_one(filter, None)
                .await
                .map_err(|err| anyhow::Error::from(err).code(503))?;
            if result.deleted_count > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn clear(&self) -> error::Result<u64> {
        let result = self
            .logs()
            .delete_many(doc! {}, None)
            .await
            .map_err(|err| anyhow::Error::from(err).code(503))?;
        Ok(result.deleted_count)
    }
}
