//! Lenient ObjectId deserialization shared by all schemas
//!
//! Stored documents carry native ObjectIds; request bodies may carry a hex
//! string or extended JSON `{"$oid": ...}`. Both decode to the same id.

use bson::{oid::ObjectId, Bson};
use serde::{de::Error as _, Deserialize, Deserializer};

fn from_bson<E: serde::de::Error>(value: Bson) -> Result<Option<ObjectId>, E> {
    match value {
        Bson::Null | Bson::Undefined => Ok(None),
        Bson::ObjectId(oid) => Ok(Some(oid)),
        Bson::String(hex) => ObjectId::parse_str(&hex).map(Some).map_err(E::custom),
        other => Err(E::custom(format!("expected an ObjectId, got {}", other))),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
    from_bson(Bson::deserialize(deserializer)?)?.ok_or_else(|| D::Error::custom("missing ObjectId"))
}

pub fn deserialize_option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ObjectId>, D::Error> {
    from_bson(Bson::deserialize(deserializer)?)
}
