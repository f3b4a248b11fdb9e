//! In-process document store
//!
//! Keeps documents as bson in insertion order, which mirrors the natural
//! order MongoDB returns for an unsorted `find`. Used in dev mode when no
//! MongoDB is configured and by every service test.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use std::marker::PhantomData;
use tokio::sync::RwLock;
use tracing::warn;

use crate::db::store::{DocumentStore, StoredDocument};
use crate::types::{Result, ThinkBeyondError};

/// Memory-backed collection of `T`
pub struct MemoryCollection<T> {
    docs: RwLock<Vec<Document>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: StoredDocument> MemoryCollection<T> {
    pub fn new(name: &str) -> Self {
        warn!("Collection '{}' running in memory-only mode (no MongoDB)", name);
        Self {
            docs: RwLock::new(Vec::new()),
            _marker: PhantomData,
        }
    }
}

/// Equality on bson values, treating all numeric types as comparable
/// the way MongoDB query matching does.
fn values_equal(left: &Bson, right: &Bson) -> bool {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| doc.get(key).is_some_and(|actual| values_equal(actual, expected)))
}

fn decode<T: StoredDocument>(doc: &Document) -> Result<T> {
    bson::from_document(doc.clone()).map_err(ThinkBeyondError::from)
}

fn apply_set(doc: &mut Document, set: &Document) {
    for (key, value) in set {
        doc.insert(key.clone(), value.clone());
    }
}

#[async_trait]
impl<T: StoredDocument> DocumentStore<T> for MemoryCollection<T> {
    async fn find_many(&self, filter: Document) -> Result<Vec<T>> {
        let docs = self.docs.read().await;
        docs.iter()
            .filter(|doc| matches(doc, &filter))
            .map(decode)
            .collect()
    }

    async fn find_one(&self, filter: Document) -> Result<Option<T>> {
        let docs = self.docs.read().await;
        docs.iter()
            .find(|doc| matches(doc, &filter))
            .map(decode)
            .transpose()
    }

    async fn count(&self, filter: Document) -> Result<u64> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|doc| matches(doc, &filter)).count() as u64)
    }

    async fn insert_one(&self, item: T) -> Result<ObjectId> {
        let mut doc = bson::to_document(&item)?;
        let id = match doc.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        };
        self.docs.write().await.push(doc);
        Ok(id)
    }

    async fn update_one(&self, filter: Document, set: Document) -> Result<Option<T>> {
        let mut docs = self.docs.write().await;
        let Some(stored) = docs.iter_mut().find(|doc| matches(doc, &filter)) else {
            return Ok(None);
        };
        // Only commit a document that still decodes
        let mut updated = stored.clone();
        apply_set(&mut updated, &set);
        let item = decode(&updated)?;
        *stored = updated;
        Ok(Some(item))
    }

    async fn update_many(&self, filter: Document, set: Document) -> Result<u64> {
        let mut docs = self.docs.write().await;
        let mut matched = 0;
        for doc in docs.iter_mut().filter(|doc| matches(doc, &filter)) {
            apply_set(doc, &set);
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete_one(&self, filter: Document) -> Result<bool> {
        let mut docs = self.docs.write().await;
        match docs.iter().position(|doc| matches(doc, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
    struct Item {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
        name: String,
        rank: i32,
        #[serde(default)]
        flag: bool,
    }

    fn item(name: &str, rank: i32) -> Item {
        Item {
            name: name.to_string(),
            rank,
            ..Item::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_keeps_order() {
        let store = MemoryCollection::<Item>::new("items");
        let a = store.insert_one(item("a", 2)).await.unwrap();
        let b = store.insert_one(item("b", 1)).await.unwrap();
        assert_ne!(a, b);

        let all = store.find_many(doc! {}).await.unwrap();
        let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(all[0].id, Some(a));
    }

    #[tokio::test]
    async fn test_update_one_keeps_document_when_result_does_not_decode() {
        let store = MemoryCollection::<Item>::new("items");
        store.insert_one(item("a", 1)).await.unwrap();

        let result = store
            .update_one(doc! { "name": "a" }, doc! { "rank": "first", "flag": true })
            .await;
        assert!(result.is_err());

        let kept = store.find_one(doc! { "name": "a" }).await.unwrap().unwrap();
        assert_eq!(kept.rank, 1);
        assert!(!kept.flag);
    }

    #[tokio::test]
    async fn test_numeric_filters_ignore_width() {
        let store = MemoryCollection::<Item>::new("items");
        store.insert_one(item("a", 3)).await.unwrap();

        assert_eq!(store.count(doc! { "rank": 3_i64 }).await.unwrap(), 1);
        assert_eq!(store.count(doc! { "rank": 3.0 }).await.unwrap(), 1);
        assert_eq!(store.count(doc! { "rank": 4 }).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_one_returns_new_document() {
        let store = MemoryCollection::<Item>::new("items");
        store.insert_one(item("a", 1)).await.unwrap();

        let updated = store
            .update_one(doc! { "name": "a" }, doc! { "flag": true })
            .await
            .unwrap()
            .unwrap();
        assert!(updated.flag);

        let missing = store
            .update_one(doc! { "name": "zz" }, doc! { "flag": true })
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_many_counts_matches() {
        let store = MemoryCollection::<Item>::new("items");
        store.insert_one(item("a", 1)).await.unwrap();
        store.insert_one(item("b", 1)).await.unwrap();
        store.insert_one(item("c", 2)).await.unwrap();

        let matched = store
            .update_many(doc! { "rank": 1 }, doc! { "flag": true })
            .await
            .unwrap();
        assert_eq!(matched, 2);
        assert_eq!(store.count(doc! { "flag": true }).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_one() {
        let store = MemoryCollection::<Item>::new("items");
        let id = store.insert_one(item("a", 1)).await.unwrap();

        assert!(store.delete_one(doc! { "_id": id }).await.unwrap());
        assert!(!store.delete_one(doc! { "_id": id }).await.unwrap());
        assert_eq!(store.count(doc! {}).await.unwrap(), 0);
    }
}
