//! ThinkBeyond onboarding routes

use bytes::Bytes;
use hyper::Response;
use serde_json::Value;

use crate::db::schemas::{public_list, PublicView};
use crate::routes::{parse_json, respond, FullBody, PatchRequest};
use crate::services::{ProgressPatch, Services};
use crate::types::Result;

pub async fn list(services: &Services) -> Response<FullBody> {
    let result = services.progress.list().await.and_then(|cards| public_list(&cards));
    respond("Error fetching ThinkBeyond cards", result)
}

pub async fn update(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: PatchRequest<ProgressPatch> = parse_json(body)?;
        services.progress.update(&request.id, &request.patch).await?.public_view()
    }
    .await;
    respond("Error updating ThinkBeyond card", result)
}

pub async fn next_card(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: PatchRequest<ProgressPatch> = parse_json(body)?;
        let cards = services.progress.advance(&request.id, &request.patch).await?;
        public_list(&cards)
    }
    .await;
    respond("Error moving to next ThinkBeyond card", result)
}

pub async fn reset(services: &Services) -> Response<FullBody> {
    let result = services.progress.reset().await.and_then(|cards| public_list(&cards));
    respond("Error resetting ThinkBeyond cards", result)
}
