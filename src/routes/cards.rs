//! Canvas card routes
//!
//! Partition routes live under `/future_{1..3}/{BMC,CVP}`; card-level
//! routes (`/updateCard`, comments, collaborators) address a card by id.

use bytes::Bytes;
use hyper::Response;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::db::schemas::{public_list, render, Canvas, Comment, PublicView, SharedUser};
use crate::routes::{parse_json, respond, FullBody, PatchRequest};
use crate::services::{CardPatch, OneOrMany, Partition, PrefillEntry, Services};
use crate::types::{Result, ThinkBeyondError};

/// Split `/future_{n}/{SEG}[/{action}]` into its partition and action.
///
/// Returns `None` for paths outside the partition routes, including
/// unknown futures and canvases.
pub fn match_partition(path: &str) -> Option<(Partition, &str)> {
    let rest = path.strip_prefix("/future_")?;
    let (future, rest) = rest.split_once('/')?;
    let (segment, action) = rest.split_once('/').unwrap_or((rest, ""));

    let future: i32 = future.parse().ok()?;
    let canvas = Canvas::from_segment(segment)?;
    let partition = Partition::new(future, canvas).ok()?;
    Some((partition, action.trim_end_matches('/')))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateCardRequest {
    data: PatchRequest<CardPatch>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetCardRequest {
    future: i32,
    card_canvas: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentRequest {
    card_id: String,
    comment: Comment,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteCommentRequest {
    card_id: String,
    comment_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddSharedUserRequest {
    card_id: String,
    shared_user: OneOrMany<SharedUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSharedUserRequest {
    card_id: String,
    shared_user_id: String,
}

pub async fn list(services: &Services, partition: Partition) -> Response<FullBody> {
    let result = services.cards.list(partition).await.and_then(|cards| public_list(&cards));
    respond("Error fetching cards", result)
}

pub async fn chat(services: &Services, partition: Partition) -> Response<FullBody> {
    let result = services
        .cards
        .chat(partition)
        .await
        .and_then(|entries| render(&entries));
    respond("Error fetching chat", result)
}

pub async fn next_card(services: &Services, partition: Partition, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: PatchRequest<CardPatch> = parse_json(body)?;
        let cards = services.cards.advance(partition, &request.id, &request.patch).await?;
        public_list(&cards)
    }
    .await;
    respond("Error moving to next card", result)
}

pub async fn reset(services: &Services, partition: Partition) -> Response<FullBody> {
    let result = services.cards.reset(partition).await.and_then(|cards| public_list(&cards));
    respond("Error resetting cards", result)
}

pub async fn prefill(services: &Services, partition: Partition, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let entries: BTreeMap<String, PrefillEntry> = parse_json(body)?;
        let cards = services.cards.prefill(partition, entries).await?;
        public_list(&cards)
    }
    .await;
    respond("Error prefilling cards", result)
}

/// `POST /updateCard` with `{data: {id, ...patch}}`
pub async fn update_card(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: UpdateCardRequest = parse_json(body)?;
        let card = services.cards.update(&request.data.id, &request.data.patch).await?;
        card.public_view()
    }
    .await;
    respond("Error updating card", result)
}

/// `POST /resetCard` with `{future, cardCanvas}`
pub async fn reset_card(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: ResetCardRequest = parse_json(body)?;
        let canvas = Canvas::parse(&request.card_canvas).ok_or_else(|| {
            ThinkBeyondError::BadRequest(format!("unknown canvas {}", request.card_canvas))
        })?;
        let partition = Partition::new(request.future, canvas)?;
        let cards = services.cards.reset(partition).await?;
        public_list(&cards)
    }
    .await;
    respond("Error resetting card", result)
}

pub async fn add_comment(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: AddCommentRequest = parse_json(body)?;
        services.cards.add_comment(&request.card_id, request.comment).await?.public_view()
    }
    .await;
    respond("Error adding comment", result)
}

pub async fn delete_comment(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: DeleteCommentRequest = parse_json(body)?;
        services
            .cards
            .delete_comment(&request.card_id, &request.comment_id)
            .await?
            .public_view()
    }
    .await;
    respond("Error deleting comment", result)
}

pub async fn add_shared_user(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: AddSharedUserRequest = parse_json(body)?;
        services
            .cards
            .add_shared_users(&request.card_id, request.shared_user.into_vec())
            .await?
            .public_view()
    }
    .await;
    respond("Error adding shared user", result)
}

pub async fn delete_shared_user(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: DeleteSharedUserRequest = parse_json(body)?;
        services
            .cards
            .delete_shared_user(&request.card_id, &request.shared_user_id)
            .await?
            .public_view()
    }
    .await;
    respond("Error deleting shared user", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_partition() {
        let (partition, action) = match_partition("/future_2/CVP/nextCard").unwrap();
        assert_eq!(partition.future, 2);
        assert_eq!(partition.canvas, Canvas::CustomerValueProposition);
        assert_eq!(action, "nextCard");

        let (partition, action) = match_partition("/future_1/BMC").unwrap();
        assert_eq!(partition.canvas, Canvas::BusinessModel);
        assert_eq!(action, "");

        assert!(match_partition("/future_4/BMC").is_none());
        assert!(match_partition("/future_1/XYZ").is_none());
        assert!(match_partition("/future_one/BMC").is_none());
        assert!(match_partition("/company").is_none());
    }
}
