//! Canvas card service
//!
//! Cards live in partitions keyed by `(future, cardCanvas)`. Within a
//! partition they are walked in `cardNumber` order starting at 0: advancing
//! completes the current card and unlocks and selects its successor,
//! wrapping back to card 0 after the last one.
//!
//! Multi-document sequences (reset, advance, prefill) are not transactional.
//! A failure part way leaves the earlier writes in place.

use bson::{doc, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::schemas::{Canvas, CardSize, ChatMessage, Comment, SharedUser};
use crate::db::{id_filter, CardDoc, DocumentStore};
use crate::services::shared::{list_set, patch_to_set, remove_shared_user, update_or_fetch};
use crate::types::{Result, ThinkBeyondError};

// ============================================================================
// Partition
// ============================================================================

/// Scenario indexes a partition may use
pub const FUTURES: RangeInclusive<i32> = 1..=3;

/// One `(future, cardCanvas)` slice of the card collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    pub future: i32,
    pub canvas: Canvas,
}

impl Partition {
    pub fn new(future: i32, canvas: Canvas) -> Result<Self> {
        if !FUTURES.contains(&future) {
            return Err(ThinkBeyondError::BadRequest(format!(
                "future must be between {} and {}, got {}",
                FUTURES.start(),
                FUTURES.end(),
                future
            )));
        }
        Ok(Self { future, canvas })
    }

    /// Filter selecting every card of the partition
    pub fn filter(&self) -> Document {
        doc! { "future": self.future, "cardCanvas": self.canvas.name() }
    }

    fn card_filter(&self, card_number: i32) -> Document {
        let mut filter = self.filter();
        filter.insert("cardNumber", card_number);
        filter
    }

    fn reset_policy(&self) -> ResetPolicy {
        match self.canvas {
            Canvas::BusinessModel => ResetPolicy {
                locked: true,
                first_card: doc! { "locked": false, "selected": true },
            },
            Canvas::CustomerValueProposition => ResetPolicy {
                locked: false,
                first_card: doc! { "selected": true },
            },
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "future_{}/{}", self.future, self.canvas.segment())
    }
}

/// How a canvas returns to its starting state
struct ResetPolicy {
    /// `locked` given to every card
    locked: bool,
    /// Extra fields set on card 0 afterwards
    first_card: Document,
}

impl ResetPolicy {
    fn defaults(&self) -> Document {
        doc! {
            "selected": false,
            "keyPoints": "",
            "locked": self.locked,
            "loadingKeyPoints": false,
            "chat": [],
            "surety": 0,
        }
    }
}

/// Successor of `card_number` in a partition of `total` cards (0-indexed)
pub fn next_card_number(card_number: i32, total: u64) -> Result<i32> {
    let total = i64::try_from(total)
        .map_err(|_| ThinkBeyondError::Internal(format!("partition size {} out of range", total)))?;
    let next = (i64::from(card_number) + 1)
        .checked_rem(total)
        .ok_or_else(|| ThinkBeyondError::Internal("cannot advance in an empty partition".into()))?;
    i32::try_from(next).map_err(|_| ThinkBeyondError::Internal(format!("card number {} out of range", next)))
}

// ============================================================================
// Request types
// ============================================================================

/// Card fields a client may change. Partition keys, ordering and the
/// comment and collaborator lists are not patchable.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Vec<ChatMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_key_points: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<CardSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surety: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Key points to drop into a card ahead of the user reaching it
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PrefillEntry {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub surety: f64,
}

/// Chat history of one card
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub card_name: String,
    pub chat: Vec<ChatMessage>,
}

// ============================================================================
// Card Service
// ============================================================================

#[derive(Clone)]
pub struct CardService {
    store: Arc<dyn DocumentStore<CardDoc>>,
}

impl CardService {
    pub fn new(store: Arc<dyn DocumentStore<CardDoc>>) -> Self {
        Self { store }
    }

    /// Cards of a partition in store order
    pub async fn list(&self, partition: Partition) -> Result<Vec<CardDoc>> {
        self.store.find_many(partition.filter()).await
    }

    /// `{cardName, chat}` for every card of a partition
    pub async fn chat(&self, partition: Partition) -> Result<Vec<ChatEntry>> {
        let cards = self.list(partition).await?;
        Ok(cards
            .into_iter()
            .map(|card| ChatEntry {
                card_name: card.card_name,
                chat: card.chat,
            })
            .collect())
    }

    /// Apply a patch to one card and return it
    pub async fn update(&self, card_id: &str, patch: &CardPatch) -> Result<CardDoc> {
        let set = patch_to_set(patch)?;
        update_or_fetch(self.store.as_ref(), id_filter(card_id)?, set)
            .await?
            .ok_or_else(|| not_found(card_id))
    }

    /// Return a partition to its starting state
    pub async fn reset(&self, partition: Partition) -> Result<Vec<CardDoc>> {
        let policy = partition.reset_policy();

        let matched = self
            .store
            .update_many(partition.filter(), policy.defaults())
            .await?;
        if matched == 0 {
            return Err(ThinkBeyondError::NotFound(format!("no cards in {}", partition)));
        }

        if self
            .store
            .update_one(partition.card_filter(0), policy.first_card)
            .await?
            .is_none()
        {
            warn!(%partition, "Reset found no card 0 to select");
        }

        info!(%partition, cards = matched, "Partition reset");
        self.list(partition).await
    }

    /// Complete a card and move the selection to its successor.
    ///
    /// Returns the completed card followed by the successor when one exists.
    pub async fn advance(&self, partition: Partition, card_id: &str, patch: &CardPatch) -> Result<Vec<CardDoc>> {
        let mut filter = id_filter(card_id)?;
        for (key, value) in partition.filter() {
            filter.insert(key, value);
        }

        let mut set = patch_to_set(patch)?;
        set.insert("complete", true);
        set.insert("selected", false);

        let current = self
            .store
            .update_one(filter, set)
            .await?
            .ok_or_else(|| not_found(card_id))?;

        let total = self.store.count(partition.filter()).await?;
        let next_number = next_card_number(current.card_number, total)?;
        debug!(%partition, from = current.card_number, to = next_number, "Advancing card");

        let next = self
            .store
            .update_one(
                partition.card_filter(next_number),
                doc! { "locked": false, "selected": true },
            )
            .await?;

        let mut advanced = vec![current];
        match next {
            Some(card) => advanced.push(card),
            None => warn!(%partition, card_number = next_number, "No successor card to select"),
        }
        Ok(advanced)
    }

    /// Write prepared key points into cards by name and unlock them
    pub async fn prefill(
        &self,
        partition: Partition,
        entries: BTreeMap<String, PrefillEntry>,
    ) -> Result<Vec<CardDoc>> {
        let mut updated = Vec::with_capacity(entries.len());
        for (card_name, entry) in entries {
            let mut filter = partition.filter();
            filter.insert("cardName", card_name.as_str());
            let set = doc! {
                "keyPoints": entry.content,
                "surety": entry.surety,
                "locked": false,
            };
            match self.store.update_one(filter, set).await? {
                Some(card) => updated.push(card),
                None => warn!(%partition, card_name = %card_name, "Prefill skipped unknown card"),
            }
        }
        info!(%partition, cards = updated.len(), "Partition prefilled");
        Ok(updated)
    }

    pub async fn add_comment(&self, card_id: &str, comment: Comment) -> Result<CardDoc> {
        let mut card = self.load(card_id).await?;
        card.comments.push(comment);
        self.write_list(card_id, "comments", &card.comments).await
    }

    pub async fn delete_comment(&self, card_id: &str, comment_id: &str) -> Result<CardDoc> {
        let mut card = self.load(card_id).await?;
        let comment_id = comment_id.trim();
        let index = card
            .comments
            .iter()
            .position(|c| c.id.to_hex() == comment_id)
            .ok_or_else(|| ThinkBeyondError::NotFound(format!("comment {}", comment_id)))?;
        card.comments.remove(index);
        self.write_list(card_id, "comments", &card.comments).await
    }

    /// Append collaborators. Duplicates are kept.
    pub async fn add_shared_users(&self, card_id: &str, users: Vec<SharedUser>) -> Result<CardDoc> {
        let mut card = self.load(card_id).await?;
        card.shared.extend(users);
        self.write_list(card_id, "shared", &card.shared).await
    }

    pub async fn delete_shared_user(&self, card_id: &str, shared_id: &str) -> Result<CardDoc> {
        let mut card = self.load(card_id).await?;
        remove_shared_user(&mut card.shared, shared_id)?;
        self.write_list(card_id, "shared", &card.shared).await
    }

    async fn load(&self, card_id: &str) -> Result<CardDoc> {
        self.store
            .find_one(id_filter(card_id)?)
            .await?
            .ok_or_else(|| not_found(card_id))
    }

    async fn write_list<T: Serialize>(&self, card_id: &str, field: &str, items: &[T]) -> Result<CardDoc> {
        self.store
            .update_one(id_filter(card_id)?, list_set(field, items)?)
            .await?
            .ok_or_else(|| not_found(card_id))
    }
}

fn not_found(card_id: &str) -> ThinkBeyondError {
    ThinkBeyondError::NotFound(format!("card {}", card_id))
}
