//! Database schemas for the planner
//!
//! Field names are camelCase to stay compatible with the existing
//! collections. Responses go through [`PublicView`], which exposes the store
//! key `_id` as a hex `id`.

mod card;
mod company;
pub mod datetime;
mod methodology;
pub mod oid;
mod progress;

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Result, ThinkBeyondError};

pub use card::{Canvas, CardDoc, CardSize, ChatMessage, Comment, CARD_COLLECTION};
pub use company::{CompanyDoc, COMPANY_COLLECTION};
pub use methodology::{CanvasEntry, Framework, MethodologyDoc, METHODOLOGY_COLLECTION};
pub use progress::{CardInfo, ProgressDoc, PROGRESS_COLLECTION, BMC_STATUS_COMPLETE};

/// Collaborator a card or company is shared with
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SharedUser {
    #[serde(rename = "_id", default = "ObjectId::new", deserialize_with = "oid::deserialize")]
    pub id: ObjectId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub owner: bool,
}

/// JSON view of a stored document
pub trait PublicView: Serialize {
    fn public_view(&self) -> Result<Value> {
        render(self)
    }
}

/// Render a document for an API response: ObjectIds become hex strings and
/// the top-level `_id` is renamed `id`.
pub fn render<T: Serialize + ?Sized>(doc: &T) -> Result<Value> {
    let mut value = serde_json::to_value(doc)
        .map_err(|e| ThinkBeyondError::Internal(format!("Failed to render document: {}", e)))?;
    flatten_object_ids(&mut value);
    if let Value::Object(map) = &mut value {
        rename_id(map);
    }
    Ok(value)
}

fn rename_id(map: &mut Map<String, Value>) {
    if let Some(id) = map.remove("_id") {
        map.insert("id".to_string(), id);
    }
}

/// Replace every extended-JSON `{"$oid": "..."}` with its hex string
fn flatten_object_ids(value: &mut Value) {
    let hex = value
        .as_object()
        .filter(|map| map.len() == 1)
        .and_then(|map| map.get("$oid"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    if let Some(hex) = hex {
        *value = Value::String(hex);
        return;
    }

    match value {
        Value::Object(map) => map.values_mut().for_each(flatten_object_ids),
        Value::Array(items) => items.iter_mut().for_each(flatten_object_ids),
        _ => {}
    }
}

/// Render a list of stored documents
pub fn public_list<T: PublicView>(docs: &[T]) -> Result<Value> {
    docs.iter()
        .map(T::public_view)
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Sample {
        #[serde(rename = "_id")]
        id: ObjectId,
        shared: Vec<SharedUser>,
    }

    impl PublicView for Sample {}

    #[test]
    fn test_public_view_exposes_hex_id() {
        let id = ObjectId::new();
        let user_id = ObjectId::new();
        let sample = Sample {
            id,
            shared: vec![SharedUser {
                id: user_id,
                username: "ana".into(),
                email: "ana@example.com".into(),
                role: None,
                owner: true,
            }],
        };

        let view = sample.public_view().unwrap();
        assert_eq!(view["id"], json!(id.to_hex()));
        assert!(view.get("_id").is_none());
        // Sub-document ids keep their key but become plain strings
        assert_eq!(view["shared"][0]["_id"], json!(user_id.to_hex()));
    }

    #[test]
    fn test_shared_user_gets_fresh_id_when_absent() {
        let user: SharedUser = serde_json::from_value(json!({
            "username": "bo",
            "email": "bo@example.com",
            "role": "editor"
        }))
        .unwrap();
        assert_eq!(user.role.as_deref(), Some("editor"));
        assert!(!user.owner);
    }
}
