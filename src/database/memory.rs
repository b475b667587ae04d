//! In-memory storage for development and testing

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DocumentStore, FindQuery, IndexSpec, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    unique_indexes: RwLock<Vec<IndexSpec>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already enforces the unique entries of `indexes`.
    pub fn with_indexes(indexes: &[IndexSpec]) -> Self {
        Self {
            collections: RwLock::default(),
            unique_indexes: RwLock::new(indexes.iter().filter(|s| s.unique).copied().collect()),
        }
    }

    async fn check_unique(&self, collection: &str, docs: &[Document], candidate: &Document) -> StoreResult<()> {
        let indexes = self.unique_indexes.read().await;
        for spec in indexes.iter().filter(|s| s.collection == collection) {
            let key: Vec<Option<&Bson>> = spec.keys.iter().map(|k| candidate.get(*k)).collect();
            let clash = docs.iter().any(|existing| {
                existing.get("_id") != candidate.get("_id")
                    && spec.keys.iter().map(|k| existing.get(*k)).eq(key.iter().copied())
            });
            if clash {
                return Err(StoreError::Duplicate {
                    collection: collection.to_string(),
                    key: spec.keys.join(", "),
                });
            }
        }
        Ok(())
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| doc.get(key) == Some(expected))
}

fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a, b) {
                (Bson::String(x), Bson::String(y)) => x.cmp(y),
                (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
                (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
                (Bson::ObjectId(x), Bson::ObjectId(y)) => x.cmp(y),
                _ => Ordering::Equal,
            },
        },
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn increment(current: Option<&Bson>, by: &Bson) -> StoreResult<Bson> {
    let result = match (current, by) {
        (None, by) => by.clone(),
        (Some(Bson::Int32(a)), Bson::Int32(b)) => Bson::Int32(a + b),
        (Some(Bson::Int64(a)), Bson::Int32(b)) => Bson::Int64(a + *b as i64),
        (Some(Bson::Int32(a)), Bson::Int64(b)) => Bson::Int64(*a as i64 + b),
        (Some(Bson::Int64(a)), Bson::Int64(b)) => Bson::Int64(a + b),
        (Some(a), b) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => Bson::Double(x + y),
            _ => return Err(StoreError::Backend("cannot apply $inc to a non-numeric field".to_string())),
        },
    };
    Ok(result)
}

fn apply_update(doc: &mut Document, update: &Document) -> StoreResult<()> {
    for (operator, fields) in update {
        let fields = fields
            .as_document()
            .ok_or_else(|| StoreError::Backend(format!("{} expects a document", operator)))?;
        match operator.as_str() {
            "$set" => {
                for (k, v) in fields {
                    doc.insert(k.clone(), v.clone());
                }
            }
            "$inc" => {
                for (k, by) in fields {
                    let next = increment(doc.get(k), by)?;
                    doc.insert(k.clone(), next);
                }
            }
            other => return Err(StoreError::Backend(format!("unsupported update operator {}", other))),
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        self.check_unique(collection, docs, &doc).await?;
        docs.push(doc);
        Ok(())
    }

    async fn find(&self, collection: &str, query: FindQuery) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut found: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &query.filter)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = query.sort {
            found.sort_by(|a, b| {
                let ordering = compare(a.get(sort.field), b.get(sort.field));
                if sort.descending { ordering.reverse() } else { ordering }
            });
        }
        if let Some(limit) = query.limit.filter(|l| *l > 0) {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> StoreResult<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(position) = docs.iter().position(|d| matches(d, &filter)) else {
            return Ok(None);
        };

        let mut updated = docs[position].clone();
        apply_update(&mut updated, &update)?;
        self.check_unique(collection, docs, &updated).await?;
        docs[position] = updated.clone();
        Ok(Some(updated))
    }

    async fn update_many(&self, collection: &str, filter: Document, set: Document) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let mut changed = 0;
        for doc in docs.iter_mut().filter(|d| matches(d, &filter)) {
            let before = doc.clone();
            for (k, v) in &set {
                doc.insert(k.clone(), v.clone());
            }
            if *doc != before {
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_by_ids(&self, collection: &str, ids: &[ObjectId]) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !matches!(d.get("_id"), Some(Bson::ObjectId(id)) if ids.contains(id)));
        Ok((before - docs.len()) as u64)
    }

    async fn count(&self, collection: &str, filter: Document) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn create_index(&self, spec: &IndexSpec) -> StoreResult<()> {
        if spec.unique {
            let mut indexes = self.unique_indexes.write().await;
            if !indexes.iter().any(|s| s.collection == spec.collection && s.keys == spec.keys) {
                indexes.push(*spec);
            }
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
