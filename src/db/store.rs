//! Document store contract
//!
//! Services talk to collections through [`DocumentStore`] so the same card,
//! progress, methodology and company logic runs against MongoDB in production
//! and against [`MemoryCollection`](crate::db::MemoryCollection) in dev mode
//! and tests.
//!
//! Filters are bson documents of top-level field equalities. Updates are the
//! body of a `$set`; the store wraps them.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::types::Result;

/// Bounds every stored document type satisfies
pub trait StoredDocument: Serialize + DeserializeOwned + Unpin + Send + Sync + Clone + 'static {}

impl<T> StoredDocument for T where T: Serialize + DeserializeOwned + Unpin + Send + Sync + Clone + 'static {}

/// Equality-filtered access to one collection of `T`
#[async_trait]
pub trait DocumentStore<T: StoredDocument>: Send + Sync {
    /// All documents matching `filter`, in store order
    async fn find_many(&self, filter: Document) -> Result<Vec<T>>;

    /// First document matching `filter`
    async fn find_one(&self, filter: Document) -> Result<Option<T>>;

    /// Number of documents matching `filter`
    async fn count(&self, filter: Document) -> Result<u64>;

    /// Insert a document, returning its `_id`
    async fn insert_one(&self, item: T) -> Result<ObjectId>;

    /// Apply `set` to the first match and return the updated document
    async fn update_one(&self, filter: Document, set: Document) -> Result<Option<T>>;

    /// Apply `set` to every match, returning how many matched
    async fn update_many(&self, filter: Document, set: Document) -> Result<u64>;

    /// Delete the first match. Returns false when nothing matched.
    async fn delete_one(&self, filter: Document) -> Result<bool>;
}

/// Filter selecting a document by its hex `_id`
pub fn id_filter(id: &str) -> Result<Document> {
    let oid = ObjectId::parse_str(id.trim())?;
    Ok(doc! { "_id": oid })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_filter_parses_hex() {
        let oid = ObjectId::new();
        let filter = id_filter(&oid.to_hex()).unwrap();
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);
    }

    #[test]
    fn test_id_filter_rejects_garbage() {
        assert!(id_filter("not-an-id").is_err());
    }
}
