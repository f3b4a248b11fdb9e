//! ThinkBeyond onboarding card schema
//!
//! Ten cards walked in `cardNumber` order (1-indexed). Some cards close out a
//! business-model-canvas section, tracked on an earlier card's `bmc_status`.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{oid, PublicView};

/// Collection name for onboarding cards
pub const PROGRESS_COLLECTION: &str = "thinkbeyonds";

/// `bmc_status` value once the section a card opens has been completed
pub const BMC_STATUS_COMPLETE: &str = "complete";

/// Prompt row inside an onboarding card
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CardInfo {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub placeholder: String,
}

/// Onboarding card document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDoc {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "oid::deserialize_option"
    )]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub card_name: String,

    #[serde(default)]
    pub card_number: i32,

    #[serde(default)]
    pub selected: bool,

    #[serde(default)]
    pub started: bool,

    #[serde(default)]
    pub complete: bool,

    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub open: bool,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,

    #[serde(default)]
    pub card_info: Vec<CardInfo>,

    #[serde(rename = "bmc_status", default)]
    pub bmc_status: String,
}

impl ProgressDoc {
    pub fn new(card_number: i32, card_name: impl Into<String>) -> Self {
        Self {
            card_name: card_name.into(),
            card_number,
            ..Self::default()
        }
    }
}

impl PublicView for ProgressDoc {}

impl IntoIndexes for ProgressDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "cardNumber": 1 },
            Some(
                IndexOptions::builder()
                    .name("card_number_index".to_string())
                    .build(),
            ),
        )]
    }
}
