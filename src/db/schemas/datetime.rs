//! Lenient timestamp deserialization
//!
//! Stored documents carry native BSON dates. Seed files and request bodies
//! may give an RFC 3339 string or extended JSON `{"$date": ...}` instead.

use bson::{Bson, DateTime};
use serde::{Deserialize, Deserializer};

pub fn deserialize_option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime>, D::Error> {
    use serde::de::Error as _;

    match Bson::deserialize(deserializer)? {
        Bson::Null | Bson::Undefined => Ok(None),
        Bson::DateTime(date) => Ok(Some(date)),
        Bson::String(text) => chrono::DateTime::parse_from_rfc3339(&text)
            .map(|parsed| Some(DateTime::from_chrono(parsed.with_timezone(&chrono::Utc))))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {}: {}", text, e))),
        other => Err(D::Error::custom(format!("expected a timestamp, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Stamped {
        #[serde(default, deserialize_with = "deserialize_option")]
        at: Option<DateTime>,
    }

    #[test]
    fn test_json_accepts_rfc3339_string() {
        let json = serde_json::json!({ "at": "2024-03-09T10:30:00Z" });
        let back: Stamped = serde_json::from_value(json).unwrap();
        assert_eq!(back.at.unwrap().timestamp_millis(), 1_709_980_200_000);
    }

    #[test]
    fn test_json_accepts_extended_form() {
        let json = serde_json::json!({ "at": { "$date": { "$numberLong": "1709980200000" } } });
        let back: Stamped = serde_json::from_value(json).unwrap();
        assert_eq!(back.at.unwrap().timestamp_millis(), 1_709_980_200_000);
    }

    #[test]
    fn test_bson_keeps_native_date() {
        let now = DateTime::now();
        let doc = bson::to_document(&Stamped { at: Some(now) }).unwrap();
        let back: Stamped = bson::from_document(doc).unwrap();
        assert_eq!(back.at, Some(now));
    }

    #[test]
    fn test_rejects_malformed_string() {
        let json = serde_json::json!({ "at": "yesterday" });
        assert!(serde_json::from_value::<Stamped>(json).is_err());
    }
}
