use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::marker::PhantomData;
use std::sync::Arc;

use super::{DocumentStore, FindQuery, StoreError, StoreResult};

/// A document type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Resource name used in event names, e.g. `lead` → `lead.created`.
    const RESOURCE: &'static str;
}

/// An entity together with its id. Serializes as `{"_id": "<hex>", ...fields}`.
#[derive(Debug, Clone, Serialize)]
pub struct Record<T> {
    #[serde(rename = "_id", serialize_with = "serialize_hex")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub data: T,
}

fn serialize_hex<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.to_hex())
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), marker: PhantomData }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, marker: PhantomData }
    }

    pub async fn insert(&self, data: T) -> StoreResult<Record<T>> {
        let id = ObjectId::new();
        let mut doc = bson::to_document(&data)?;
        doc.insert("_id", id);
        self.store.insert(T::COLLECTION, doc).await?;
        Ok(Record { id, data })
    }

    pub async fn find_by_id(&self, id: ObjectId) -> StoreResult<Option<Record<T>>> {
        self.find_one(doc! { "_id": id }).await
    }

    pub async fn find_one(&self, filter: Document) -> StoreResult<Option<Record<T>>> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn find(&self, query: FindQuery) -> StoreResult<Vec<Record<T>>> {
        self.store
            .find(T::COLLECTION, query)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Sets the given fields on one document and returns it as stored afterwards.
    pub async fn update_by_id(&self, id: ObjectId, set: Document) -> StoreResult<Option<Record<T>>> {
        self.update_one(doc! { "_id": id }, doc! { "$set": set }).await
    }

    pub async fn update_one(&self, filter: Document, update: Document) -> StoreResult<Option<Record<T>>> {
        self.store
            .update_one(T::COLLECTION, filter, update)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn update_many(&self, filter: Document, set: Document) -> StoreResult<u64> {
        self.store.update_many(T::COLLECTION, filter, set).await
    }

    pub async fn delete_by_ids(&self, ids: &[ObjectId]) -> StoreResult<u64> {
        self.store.delete_by_ids(T::COLLECTION, ids).await
    }

    pub async fn count(&self, filter: Document) -> StoreResult<u64> {
        self.store.count(T::COLLECTION, filter).await
    }
}

fn decode<T: Entity>(mut doc: Document) -> StoreResult<Record<T>> {
    let id = match doc.remove("_id") {
        Some(bson::Bson::ObjectId(id)) => id,
        other => {
            return Err(StoreError::Decode(format!(
                "{} document has no object id (found {:?})",
                T::COLLECTION,
                other
            )))
        }
    };
    let data = bson::from_document(doc)?;
    Ok(Record { id, data })
}

/// Serializes a struct into a document without its unset (null) fields.
/// Used both for partial `$set` updates and for equality filters.
pub fn compact_document<U: Serialize>(changes: &U) -> StoreResult<Document> {
    let mut set = bson::to_document(changes)?;
    let empty: Vec<String> = set
        .iter()
        .filter(|(_, v)| matches!(v, bson::Bson::Null))
        .map(|(k, _)| k.clone())
        .collect();
    for key in empty {
        set.remove(&key);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Crane {
        name: String,
        tonnage: i32,
        #[serde(default)]
        operator: Option<String>,
    }

    impl Entity for Crane {
        const COLLECTION: &'static str = "cranes";
        const RESOURCE: &'static str = "crane";
    }

    #[derive(Serialize)]
    struct CraneChanges {
        tonnage: Option<i32>,
        operator: Option<String>,
    }

    #[tokio::test]
    async fn insert_then_find_by_id() {
        let repo = Repository::<Crane>::new(Arc::new(MemoryStore::new()));
        let created = repo
            .insert(Crane { name: "Liebherr".into(), tonnage: 12, operator: None })
            .await
            .unwrap();

        let fetched = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.data, created.data);
        assert!(repo.find_by_id(ObjectId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_update_only_touches_given_fields() {
        let repo = Repository::<Crane>::new(Arc::new(MemoryStore::new()));
        let created = repo
            .insert(Crane { name: "Tower".into(), tonnage: 8, operator: Some("Ravi".into()) })
            .await
            .unwrap();

        let set = compact_document(&CraneChanges { tonnage: Some(10), operator: None }).unwrap();
        assert_eq!(set, doc! { "tonnage": 10 });

        let updated = repo.update_by_id(created.id, set).await.unwrap().unwrap();
        assert_eq!(updated.data.tonnage, 10);
        assert_eq!(updated.data.operator.as_deref(), Some("Ravi"));
    }

    #[test]
    fn record_serializes_id_as_hex() {
        let id = ObjectId::new();
        let record = Record { id, data: Crane { name: "Mobile".into(), tonnage: 3, operator: None } };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["_id"], serde_json::json!(id.to_hex()));
        assert_eq!(json["name"], "Mobile");
        assert_eq!(json["tonnage"], 3);
    }
}
