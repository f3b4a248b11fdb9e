//! Canvas card document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::schemas::{oid, PublicView, SharedUser};

/// Collection name for canvas cards
pub const CARD_COLLECTION: &str = "cards";

/// Canvas a card belongs to; together with `future` it partitions the cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Canvas {
    BusinessModel,
    CustomerValueProposition,
}

impl Canvas {
    pub const ALL: [Canvas; 2] = [Canvas::BusinessModel, Canvas::CustomerValueProposition];

    /// Stored `cardCanvas` value
    pub fn name(self) -> &'static str {
        match self {
            Canvas::BusinessModel => "Business Model Canvas",
            Canvas::CustomerValueProposition => "Customer Value Proposition Canvas",
        }
    }

    /// URL path segment (`BMC` / `CVP`)
    pub fn segment(self) -> &'static str {
        match self {
            Canvas::BusinessModel => "BMC",
            Canvas::CustomerValueProposition => "CVP",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.segment() == segment)
    }

    /// Accepts either the stored name or the path segment
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == value || c.segment() == value)
    }
}

/// Display width of a card on the canvas
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Half,
    #[default]
    Full,
}

/// One turn of the assistant conversation attached to a card
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Comment left on a card by a collaborator
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", default = "ObjectId::new", deserialize_with = "oid::deserialize")]
    pub id: ObjectId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub liked: bool,
}

/// Canvas card document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardDoc {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "oid::deserialize_option"
    )]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub card_name: String,

    /// Position within the `(future, cardCanvas)` partition, starting at 0
    #[serde(default)]
    pub card_number: i32,

    #[serde(default)]
    pub selected: bool,

    #[serde(default = "default_true")]
    pub locked: bool,

    #[serde(default)]
    pub complete: bool,

    #[serde(default)]
    pub loading_key_points: bool,

    #[serde(default)]
    pub key_points: String,

    #[serde(default)]
    pub chat: Vec<ChatMessage>,

    #[serde(default)]
    pub card_canvas: String,

    /// Scenario index, 1..=3
    #[serde(default)]
    pub future: i32,

    #[serde(default)]
    pub size: CardSize,

    #[serde(default)]
    pub label_heading: String,

    #[serde(default)]
    pub label: Vec<String>,

    /// Confidence in the key points, 0 when unset
    #[serde(default)]
    pub surety: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub comments: Vec<Comment>,

    #[serde(default)]
    pub shared: Vec<SharedUser>,
}

fn default_true() -> bool {
    true
}

impl Default for CardDoc {
    fn default() -> Self {
        Self {
            id: None,
            card_name: String::new(),
            card_number: 0,
            selected: false,
            locked: true,
            complete: false,
            loading_key_points: false,
            key_points: String::new(),
            chat: Vec::new(),
            card_canvas: String::new(),
            future: 0,
            size: CardSize::Full,
            label_heading: String::new(),
            label: Vec::new(),
            surety: 0.0,
            color: None,
            comments: Vec::new(),
            shared: Vec::new(),
        }
    }
}

impl CardDoc {
    /// New locked card at `card_number` of a partition
    pub fn new(future: i32, canvas: Canvas, card_number: i32, card_name: impl Into<String>) -> Self {
        Self {
            card_name: card_name.into(),
            card_number,
            card_canvas: canvas.name().to_string(),
            future,
            ..Self::default()
        }
    }
}

impl PublicView for CardDoc {}

impl IntoIndexes for CardDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "future": 1, "cardCanvas": 1, "cardNumber": 1 },
            Some(
                IndexOptions::builder()
                    .name("partition_order".to_string())
                    .build(),
            ),
        )]
    }
}
