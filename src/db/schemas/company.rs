//! Company profile schema

use bson::{oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{datetime, oid, render, PublicView, SharedUser};
use crate::types::Result;

/// Collection name for companies
pub const COMPANY_COLLECTION: &str = "companies";

/// Company document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDoc {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "oid::deserialize_option"
    )]
    pub id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_headquarters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_target_regions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_model: Option<String>,

    #[serde(default)]
    pub shared: Vec<SharedUser>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "datetime::deserialize_option"
    )]
    pub created_at: Option<DateTime>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "datetime::deserialize_option"
    )]
    pub updated_at: Option<DateTime>,
}

impl CompanyDoc {
    /// Stamp creation and update times
    pub fn touch_created(&mut self) {
        let now = DateTime::now();
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }
}

impl PublicView for CompanyDoc {
    /// Companies show the creation day as `DD/MM/YYYY` and hide `updatedAt`
    fn public_view(&self) -> Result<Value> {
        let rendered = CompanyDoc {
            created_at: None,
            updated_at: None,
            ..self.clone()
        };
        let mut value = render(&rendered)?;
        if let (Value::Object(map), Some(created)) = (&mut value, self.created_at) {
            let day = created.to_chrono().format("%d/%m/%Y").to_string();
            map.insert("createdAt".to_string(), Value::String(day));
        }
        Ok(value)
    }
}

impl IntoIndexes for CompanyDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_public_view_formats_created_day() {
        let created = chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .map(|dt| dt.and_utc())
            .unwrap();
        let company = CompanyDoc {
            id: Some(ObjectId::new()),
            company_name: Some("Acme".into()),
            created_at: Some(DateTime::from_chrono(created)),
            updated_at: Some(DateTime::now()),
            ..CompanyDoc::default()
        };

        let view = company.public_view().unwrap();
        assert_eq!(view["createdAt"], json!("09/03/2024"));
        assert_eq!(view["companyName"], json!("Acme"));
        assert!(view.get("updatedAt").is_none());
        assert!(view["id"].is_string());
    }
}
