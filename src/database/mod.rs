//! Document storage.
//!
//! Handlers and services never talk to the driver directly: they go through a
//! `Repository<T>` which converts entities to BSON and delegates to a
//! `DocumentStore` (MongoDB in production, in-memory for tests and local runs).

pub mod memory;
pub mod mongo;
pub mod repository;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use thiserror::Error;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use repository::{compact_document, Entity, Record, Repository};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key on {collection}({key})")]
    Duplicate { collection: String, key: String },

    #[error("failed to encode document: {0}")]
    Encode(String),

    #[error("failed to decode document: {0}")]
    Decode(String),

    #[error("{0}")]
    Backend(String),
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        StoreError::Encode(e.to_string())
    }
}

impl From<mongodb::bson::de::Error> for StoreError {
    fn from(e: mongodb::bson::de::Error) -> Self {
        StoreError::Decode(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    pub field: &'static str,
    pub descending: bool,
}

impl SortBy {
    pub const fn desc(field: &'static str) -> Self {
        Self { field, descending: true }
    }

    pub const fn asc(field: &'static str) -> Self {
        Self { field, descending: false }
    }
}

/// A find request. Filters are top-level field equality.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Document,
    pub sort: Option<SortBy>,
    pub limit: Option<i64>,
}

impl FindQuery {
    pub fn new(filter: Document) -> Self {
        Self { filter, ..Default::default() }
    }

    pub fn sort(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a document that already carries its `_id`.
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<()>;

    async fn find(&self, collection: &str, query: FindQuery) -> StoreResult<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>>;

    /// Applies `$set` / `$inc` to the first match and returns the updated document.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> StoreResult<Option<Document>>;

    /// Applies `$set` to every match and returns how many documents changed.
    async fn update_many(&self, collection: &str, filter: Document, set: Document) -> StoreResult<u64>;

    async fn delete_by_ids(&self, collection: &str, ids: &[ObjectId]) -> StoreResult<u64>;

    async fn count(&self, collection: &str, filter: Document) -> StoreResult<u64>;

    async fn create_index(&self, spec: &IndexSpec) -> StoreResult<()>;

    async fn ping(&self) -> StoreResult<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub keys: &'static [&'static str],
    pub unique: bool,
}

/// Indexes required by the service. Unique entries are the data-model constraints.
pub const INDEXES: &[IndexSpec] = &[
    IndexSpec { collection: "users", keys: &["email"], unique: true },
    IndexSpec { collection: "projects", keys: &["name"], unique: true },
    IndexSpec { collection: "attendance", keys: &["worker_id", "date"], unique: true },
    IndexSpec { collection: "redirects", keys: &["source"], unique: true },
    IndexSpec { collection: "leads", keys: &["status"], unique: false },
    IndexSpec { collection: "leads", keys: &["assigned_to"], unique: false },
    IndexSpec { collection: "workers", keys: &["project_id"], unique: false },
    IndexSpec { collection: "payments", keys: &["project_id"], unique: false },
    IndexSpec { collection: "milestones", keys: &["project_id"], unique: false },
    IndexSpec { collection: "materials", keys: &["project_id"], unique: false },
    IndexSpec { collection: "site_logs", keys: &["project_id", "date"], unique: false },
    IndexSpec { collection: "site_visits", keys: &["lead_id"], unique: false },
    IndexSpec { collection: "notifications", keys: &["user_id", "read"], unique: false },
];

/// Creates every index in [`INDEXES`]. Safe to call on every startup.
pub async fn ensure_indexes(store: &dyn DocumentStore) -> StoreResult<()> {
    log::info!("🔧 Creating database indexes...");

    for spec in INDEXES {
        store.create_index(spec).await?;
        log::debug!(
            "   ✅ Index ready: {}({}){}",
            spec.collection,
            spec.keys.join(", "),
            if spec.unique { " unique" } else { "" }
        );
    }

    log::info!("✅ Database indexes ready");
    Ok(())
}

/// Human-readable unique key of a collection, used in duplicate-key errors.
pub fn unique_key(collection: &str) -> String {
    INDEXES
        .iter()
        .find(|spec| spec.unique && spec.collection == collection)
        .map(|spec| spec.keys.join(", "))
        .unwrap_or_else(|| "_id".to_string())
}
