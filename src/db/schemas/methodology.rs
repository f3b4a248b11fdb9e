//! Methodology (navigation menu) schema
//!
//! A single document describes every framework and its canvases.

use bson::{doc, oid::ObjectId, Document};
use serde_json::Value;
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{oid, render, PublicView};
use crate::types::Result;

/// Collection name for the methodology singleton
pub const METHODOLOGY_COLLECTION: &str = "methodologies";

/// Canvas entry in a framework's menu
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CanvasEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

/// Group of canvases shown together in the menu
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Framework {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub canvases: Vec<CanvasEntry>,
}

impl Framework {
    pub fn canvas_mut(&mut self, name: &str) -> Option<&mut CanvasEntry> {
        self.canvases.iter_mut().find(|c| c.name == name)
    }
}

/// Methodology document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MethodologyDoc {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "oid::deserialize_option"
    )]
    pub id: Option<ObjectId>,

    /// Singleton key
    #[serde(default)]
    pub methodology: String,

    #[serde(default)]
    pub frameworks: Vec<Framework>,
}

impl MethodologyDoc {
    pub fn framework_mut(&mut self, name: &str) -> Option<&mut Framework> {
        self.frameworks.iter_mut().find(|f| f.name == name)
    }
}

/// The menu is addressed by name, so responses carry no id
impl PublicView for MethodologyDoc {
    fn public_view(&self) -> Result<Value> {
        let mut value = render(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("id");
        }
        Ok(value)
    }
}

impl IntoIndexes for MethodologyDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "methodology": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("methodology_unique".to_string())
                    .build(),
            ),
        )]
    }
}
