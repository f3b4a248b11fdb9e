//! ThinkBeyond onboarding progress
//!
//! Onboarding cards are numbered 1..=N. Advancing completes a card and opens
//! the next one; the card numbered [`FINAL_CARD`] ends the walk. Completing a
//! card in [`SECTION_CLOSERS`] marks the card two places back as `complete`
//! in its `bmc_status`.

use bson::doc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::schemas::{CardInfo, BMC_STATUS_COMPLETE};
use crate::db::{id_filter, DocumentStore, ProgressDoc};
use crate::services::shared::{list_set, patch_to_set, update_or_fetch};
use crate::types::{Result, ThinkBeyondError};

/// Cards whose completion closes the section opened two cards earlier
pub const SECTION_CLOSERS: [i32; 3] = [4, 7, 10];

/// Last card of the onboarding; completing it selects nothing
pub const FINAL_CARD: i32 = 10;

/// Successor of `card_number` among `total` cards numbered from 1.
///
/// The last card is its own successor.
pub fn next_progress_number(card_number: i32, total: u64) -> Result<i32> {
    let total = i64::try_from(total)
        .map_err(|_| ThinkBeyondError::Internal(format!("card count {} out of range", total)))?;
    let current = i64::from(card_number);
    if total > 0 && current >= total {
        return i32::try_from(total)
            .map_err(|_| ThinkBeyondError::Internal(format!("card number {} out of range", total)));
    }
    let next = (current + 1)
        .checked_rem(total)
        .ok_or_else(|| ThinkBeyondError::Internal("cannot advance without onboarding cards".into()))?;
    let next = if next == 0 { total } else { next };
    i32::try_from(next).map_err(|_| ThinkBeyondError::Internal(format!("card number {} out of range", next)))
}

/// Onboarding card fields a client may change
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_info: Option<Vec<CardInfo>>,
    #[serde(rename = "bmc_status", default, skip_serializing_if = "Option::is_none")]
    pub bmc_status: Option<String>,
}

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn DocumentStore<ProgressDoc>>,
    start_card: String,
}

impl ProgressService {
    pub fn new(store: Arc<dyn DocumentStore<ProgressDoc>>, start_card: impl Into<String>) -> Self {
        Self {
            store,
            start_card: start_card.into(),
        }
    }

    /// All onboarding cards in store order
    pub async fn list(&self) -> Result<Vec<ProgressDoc>> {
        self.store.find_many(doc! {}).await
    }

    pub async fn update(&self, card_id: &str, patch: &ProgressPatch) -> Result<ProgressDoc> {
        let set = patch_to_set(patch)?;
        update_or_fetch(self.store.as_ref(), id_filter(card_id)?, set)
            .await?
            .ok_or_else(|| not_found(card_id))
    }

    /// Complete a card and open the next one.
    ///
    /// Returns every card written, in write order: the completed card, the
    /// section card whose status closed (if any), then the successor.
    pub async fn advance(&self, card_id: &str, patch: &ProgressPatch) -> Result<Vec<ProgressDoc>> {
        let mut set = patch_to_set(patch)?;
        set.insert("complete", true);
        set.insert("selected", false);

        let current = self
            .store
            .update_one(id_filter(card_id)?, set)
            .await?
            .ok_or_else(|| not_found(card_id))?;
        let number = current.card_number;
        let mut mutated = vec![current];

        if SECTION_CLOSERS.contains(&number) {
            let section = number - 2;
            match self
                .store
                .update_one(
                    doc! { "cardNumber": section },
                    doc! { "bmc_status": BMC_STATUS_COMPLETE },
                )
                .await?
            {
                Some(card) => mutated.push(card),
                None => warn!(card_number = section, "No section card to mark complete"),
            }
        }

        if number == FINAL_CARD {
            info!("Onboarding finished");
            return Ok(mutated);
        }

        let total = self.store.count(doc! {}).await?;
        let next_number = next_progress_number(number, total)?;
        debug!(from = number, to = next_number, "Advancing onboarding");

        match self
            .store
            .update_one(
                doc! { "cardNumber": next_number },
                doc! { "locked": false, "selected": true },
            )
            .await?
        {
            Some(card) => mutated.push(card),
            None => warn!(card_number = next_number, "No successor onboarding card"),
        }
        Ok(mutated)
    }

    /// Return the onboarding to its first card, keeping prompts but
    /// clearing answers
    pub async fn reset(&self) -> Result<Vec<ProgressDoc>> {
        let matched = self
            .store
            .update_many(
                doc! {},
                doc! {
                    "selected": false,
                    "started": false,
                    "complete": false,
                    "locked": true,
                    "open": false,
                    "bmc_status": "",
                },
            )
            .await?;

        for card in self.list().await? {
            if card.card_info.iter().all(|info| info.text.is_empty()) {
                continue;
            }
            let Some(id) = card.id else { continue };
            let blanked: Vec<CardInfo> = card
                .card_info
                .into_iter()
                .map(|info| CardInfo {
                    text: String::new(),
                    ..info
                })
                .collect();
            self.store
                .update_one(doc! { "_id": id }, list_set("cardInfo", &blanked)?)
                .await?;
        }

        if self
            .store
            .update_one(
                doc! { "cardName": self.start_card.as_str() },
                doc! { "selected": true, "locked": false },
            )
            .await?
            .is_none()
        {
            warn!(start_card = %self.start_card, "Start card not found after reset");
        }

        info!(cards = matched, "Onboarding reset");
        self.list().await
    }
}

fn not_found(card_id: &str) -> ThinkBeyondError {
    ThinkBeyondError::NotFound(format!("onboarding card {}", card_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collections;
    use bson::oid::ObjectId;
    use tokio_test::assert_ok;

    const START: &str = "What is the change";

    /// Ten onboarding cards, card 1 named after the start card
    async fn seeded() -> (ProgressService, Vec<ObjectId>) {
        let collections = Collections::memory();
        let mut ids = Vec::new();
        for number in 1..=10 {
            let name = if number == 1 { START.to_string() } else { format!("Step {}", number) };
            let mut card = ProgressDoc::new(number, name);
            card.card_info = vec![CardInfo {
                heading: "Answer".into(),
                text: format!("answer {}", number),
                placeholder: "Type here".into(),
            }];
            ids.push(collections.progress.insert_one(card).await.unwrap());
        }
        (ProgressService::new(collections.progress.clone(), START), ids)
    }

    #[test]
    fn test_next_progress_number_is_one_indexed() {
        assert_eq!(next_progress_number(1, 10).unwrap(), 2);
        assert_eq!(next_progress_number(9, 10).unwrap(), 10);
        // From the last card the remapped successor is the last card itself
        assert_eq!(next_progress_number(10, 10).unwrap(), 10);
        assert_eq!(next_progress_number(5, 5).unwrap(), 5);
        assert!(next_progress_number(1, 0).is_err());
    }

    async fn numbered(numbers: &[i32]) -> (ProgressService, Vec<ObjectId>) {
        let collections = Collections::memory();
        let mut ids = Vec::new();
        for &number in numbers {
            let card = ProgressDoc::new(number, format!("Step {}", number));
            ids.push(collections.progress.insert_one(card).await.unwrap());
        }
        (ProgressService::new(collections.progress.clone(), START), ids)
    }

    #[tokio::test]
    async fn test_advance_from_last_card_reselects_it() {
        let (service, ids) = numbered(&[1, 2, 3, 4, 5]).await;

        let mutated = assert_ok!(service.advance(&ids[4].to_hex(), &ProgressPatch::default()).await);
        assert_eq!(mutated.len(), 2);
        assert!(mutated[0].complete);
        let last = mutated.last().unwrap();
        assert_eq!(last.card_number, 5);
        assert!(last.selected && !last.locked);
    }

    #[tokio::test]
    async fn test_advance_without_successor_returns_current_only() {
        // Two cards make the successor of card 1 number 2, which is absent
        let (service, ids) = numbered(&[1, 5]).await;

        let mutated = assert_ok!(service.advance(&ids[0].to_hex(), &ProgressPatch::default()).await);
        assert_eq!(mutated.len(), 1);
        assert_eq!(mutated[0].card_number, 1);
        assert!(service.list().await.unwrap().iter().all(|c| !c.selected));
    }

    #[tokio::test]
    async fn test_advance_plain_card_selects_successor() {
        let (service, ids) = seeded().await;

        let mutated = assert_ok!(service.advance(&ids[0].to_hex(), &ProgressPatch::default()).await);
        assert_eq!(mutated.len(), 2);
        assert!(mutated[0].complete && !mutated[0].selected);
        assert_eq!(mutated[1].card_number, 2);
        assert!(mutated[1].selected && !mutated[1].locked);
    }

    #[tokio::test]
    async fn test_completing_card_seven_closes_card_five() {
        let (service, ids) = seeded().await;

        let mutated = service.advance(&ids[6].to_hex(), &ProgressPatch::default()).await.unwrap();
        assert_eq!(mutated.len(), 3);
        assert_eq!(mutated[1].card_number, 5);
        assert_eq!(mutated[1].bmc_status, BMC_STATUS_COMPLETE);
        assert_eq!(mutated[2].card_number, 8);
    }

    #[tokio::test]
    async fn test_completing_final_card_selects_nothing() {
        let (service, ids) = seeded().await;

        let mutated = service.advance(&ids[9].to_hex(), &ProgressPatch::default()).await.unwrap();
        assert_eq!(mutated.len(), 2);
        assert_eq!(mutated[0].card_number, 10);
        assert_eq!(mutated[1].card_number, 8);
        assert!(service.list().await.unwrap().iter().all(|c| !c.selected));
    }

    #[tokio::test]
    async fn test_advance_merges_patch() {
        let (service, ids) = seeded().await;
        let patch = ProgressPatch {
            started: Some(true),
            card_type: Some("bmc".into()),
            ..ProgressPatch::default()
        };

        let mutated = service.advance(&ids[1].to_hex(), &patch).await.unwrap();
        assert!(mutated[0].started);
        assert_eq!(mutated[0].card_type.as_deref(), Some("bmc"));
    }

    #[tokio::test]
    async fn test_reset_blanks_answers_and_selects_start_card() {
        let (service, ids) = seeded().await;
        service.advance(&ids[3].to_hex(), &ProgressPatch::default()).await.unwrap();

        let cards = service.reset().await.unwrap();
        assert_eq!(cards.len(), 10);
        for card in &cards {
            assert!(!card.complete);
            assert!(card.bmc_status.is_empty());
            assert_eq!(card.card_info[0].text, "");
            assert_eq!(card.card_info[0].placeholder, "Type here");
            let is_start = card.card_name == START;
            assert_eq!(card.selected, is_start);
            assert_eq!(card.locked, !is_start);
        }
    }

    #[tokio::test]
    async fn test_update_unknown_card_is_not_found() {
        let (service, _) = seeded().await;
        let err = service
            .update(&ObjectId::new().to_hex(), &ProgressPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
