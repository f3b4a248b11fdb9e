//! Helpers shared by the entity services

use bson::Document;
use serde::{Deserialize, Serialize};

use crate::db::schemas::SharedUser;
use crate::db::{DocumentStore, StoredDocument};
use crate::types::{Result, ThinkBeyondError};

/// A request field that carries either one record or a list of them
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Serialize an allow-listed patch into the body of a `$set`.
///
/// Patch structs skip unset fields, so only what the client sent is written.
pub fn patch_to_set<P: Serialize>(patch: &P) -> Result<Document> {
    Ok(bson::to_document(patch)?)
}

/// `$set` body replacing one list field
pub fn list_set<T: Serialize>(field: &str, items: &[T]) -> Result<Document> {
    let mut set = Document::new();
    set.insert(field, bson::to_bson(items)?);
    Ok(set)
}

/// Apply `set` to the document matching `filter`, or just read it back when
/// there is nothing to write (MongoDB rejects an empty `$set`).
pub async fn update_or_fetch<T: StoredDocument>(
    store: &dyn DocumentStore<T>,
    filter: Document,
    set: Document,
) -> Result<Option<T>> {
    if set.is_empty() {
        store.find_one(filter).await
    } else {
        store.update_one(filter, set).await
    }
}

/// Remove exactly one collaborator by its `_id`
pub fn remove_shared_user(shared: &mut Vec<SharedUser>, shared_id: &str) -> Result<SharedUser> {
    let shared_id = shared_id.trim();
    let index = shared
        .iter()
        .position(|user| user.id.to_hex() == shared_id)
        .ok_or_else(|| ThinkBeyondError::NotFound(format!("shared user {}", shared_id)))?;
    Ok(shared.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use serde_json::json;

    fn user(name: &str) -> SharedUser {
        SharedUser {
            id: ObjectId::new(),
            username: name.into(),
            email: format!("{}@example.com", name),
            role: None,
            owner: false,
        }
    }

    #[test]
    fn test_one_or_many_accepts_both_shapes() {
        let one: OneOrMany<SharedUser> =
            serde_json::from_value(json!({ "username": "ana", "email": "ana@example.com" })).unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: OneOrMany<SharedUser> = serde_json::from_value(json!([
            { "username": "ana", "email": "ana@example.com" },
            { "username": "bo", "email": "bo@example.com" }
        ]))
        .unwrap();
        assert_eq!(many.into_vec().len(), 2);
    }

    #[test]
    fn test_remove_shared_user_removes_exactly_one() {
        let first = user("ana");
        let mut shared = vec![first.clone(), user("bo"), first.clone()];

        let removed = remove_shared_user(&mut shared, &first.id.to_hex()).unwrap();
        assert_eq!(removed.username, "ana");
        assert_eq!(shared.len(), 2);
        assert_eq!(shared[1].id, first.id);
    }

    #[test]
    fn test_remove_unknown_shared_user_is_not_found() {
        let mut shared = vec![user("ana")];
        let err = remove_shared_user(&mut shared, &ObjectId::new().to_hex()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(shared.len(), 1);
    }
}
