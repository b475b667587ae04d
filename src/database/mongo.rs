use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

use super::{unique_key, DocumentStore, FindQuery, IndexSpec, SortBy, StoreError, StoreResult};

const DEFAULT_DB_NAME: &str = "siteops";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str) -> StoreResult<Self> {
        let mut client_options = ClientOptions::parse(uri).await.map_err(backend)?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options).map_err(backend)?;
        let db = client.database(&database_name(uri));

        // Test connection
        db.list_collection_names().await.map_err(backend)?;

        Ok(Self { db })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

/// Database name is the last path segment of the URI, without query options.
fn database_name(uri: &str) -> String {
    let without_scheme = uri.split("://").nth(1).unwrap_or(uri);
    without_scheme
        .split_once('/')
        .map(|(_, rest)| rest.split('?').next().unwrap_or(""))
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DB_NAME)
        .to_string()
}

fn sort_document(sort: &SortBy) -> Document {
    let mut order = Document::new();
    order.insert(sort.field, if sort.descending { -1 } else { 1 });
    order
}

fn backend(e: MongoError) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_duplicate_key(e: &MongoError) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn write_error(collection: &str, e: MongoError) -> StoreError {
    if is_duplicate_key(&e) {
        StoreError::Duplicate {
            collection: collection.to_string(),
            key: unique_key(collection),
        }
    } else {
        backend(e)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<()> {
        self.collection(collection)
            .insert_one(doc)
            .await
            .map_err(|e| write_error(collection, e))?;
        Ok(())
    }

    async fn find(&self, collection: &str, query: FindQuery) -> StoreResult<Vec<Document>> {
        let coll = self.collection(collection);
        let mut action = coll.find(query.filter);
        if let Some(sort) = &query.sort {
            action = action.sort(sort_document(sort));
        }
        if let Some(limit) = query.limit {
            action = action.limit(limit);
        }

        let cursor = action.await.map_err(backend)?;
        cursor.try_collect::<Vec<Document>>().await.map_err(backend)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        self.collection(collection).find_one(filter).await.map_err(backend)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> StoreResult<Option<Document>> {
        self.collection(collection)
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| write_error(collection, e))
    }

    async fn update_many(&self, collection: &str, filter: Document, set: Document) -> StoreResult<u64> {
        let result = self
            .collection(collection)
            .update_many(filter, doc! { "$set": set })
            .await
            .map_err(|e| write_error(collection, e))?;
        Ok(result.modified_count)
    }

    async fn delete_by_ids(&self, collection: &str, ids: &[ObjectId]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection(collection)
            .delete_many(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(backend)?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: &str, filter: Document) -> StoreResult<u64> {
        self.collection(collection)
            .count_documents(filter)
            .await
            .map_err(backend)
    }

    async fn create_index(&self, spec: &IndexSpec) -> StoreResult<()> {
        let mut keys = Document::new();
        for key in spec.keys {
            keys.insert(*key, 1);
        }

        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(spec.unique).build())
            .build();

        match self.collection(spec.collection).create_index(index).await {
            Ok(_) => Ok(()),
            Err(e) if spec.unique => {
                log::error!(
                    "   ❌ Unique index {}({}) could not be created: {}",
                    spec.collection,
                    spec.keys.join(", "),
                    e
                );
                Err(backend(e))
            }
            Err(e) => {
                log::debug!("   ℹ️  Index already exists: {}", e);
                Ok(())
            }
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await.map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, INDEXES};

    #[test]
    fn sort_direction_maps_to_mongo_order() {
        assert_eq!(sort_document(&SortBy::desc("created_at")), doc! { "created_at": -1 });
        assert_eq!(sort_document(&SortBy::asc("name")), doc! { "name": 1 });
    }

    #[test]
    fn database_name_comes_from_uri_path() {
        assert_eq!(database_name("mongodb://localhost:27017/crm"), "crm");
        assert_eq!(
            database_name("mongodb+srv://u:p@cluster0.example.net/sales?retryWrites=true"),
            "sales"
        );
        assert_eq!(database_name("mongodb://localhost:27017"), "siteops");
        assert_eq!(database_name("mongodb://localhost:27017/"), "siteops");
    }

    #[test]
    fn unique_key_lists_compound_fields() {
        assert_eq!(unique_key("attendance"), "worker_id, date");
        assert_eq!(unique_key("leads"), "_id");
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_roundtrip() {
        dotenv::dotenv().ok();
        let uri = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/siteops_test".to_string());

        let store = MongoStore::connect(&uri).await.unwrap();
        for spec in INDEXES {
            store.create_index(spec).await.unwrap();
        }
        store.ping().await.unwrap();

        let name = format!("Tower {}", ObjectId::new().to_hex());
        let first = doc! { "_id": ObjectId::new(), "name": &name };
        store.insert("projects", first).await.unwrap();

        let duplicate = doc! { "_id": ObjectId::new(), "name": &name };
        let err = store.insert("projects", duplicate).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        // Behaviour should match the in-memory store used by the handler tests.
        let memory = MemoryStore::new();
        for spec in INDEXES {
            memory.create_index(spec).await.unwrap();
        }
        memory.insert("projects", doc! { "_id": ObjectId::new(), "name": &name }).await.unwrap();
        let err = memory
            .insert("projects", doc! { "_id": ObjectId::new(), "name": &name })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }
}
