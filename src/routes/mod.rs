//! HTTP route handlers
//!
//! Each handler parses its body, calls one service operation and renders the
//! result. Every failure becomes a 500 with `{"error": "<context>: <error>"}`.
//! CORS and security headers are added by the server for all responses.

pub mod cards;
pub mod company;
pub mod health;
pub mod menu;
pub mod progress;

pub use health::{health_check, version_info};

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::types::{Result, ThinkBeyondError};

pub type FullBody = Full<Bytes>;

/// Body addressing one document by `id` (or `cardId`) with the remaining
/// fields as a patch
#[derive(Deserialize, Debug, Clone)]
pub struct PatchRequest<P> {
    #[serde(alias = "cardId")]
    pub id: String,
    #[serde(flatten)]
    pub patch: P,
}

/// Parse a JSON request body
pub fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ThinkBeyondError::BadRequest(format!("Invalid JSON: {}", e)))
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub fn text_response(status: StatusCode, text: &'static str) -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::from_static(text.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}

/// Failure response for a route
pub fn error_response(context: &str, err: &ThinkBeyondError) -> Response<FullBody> {
    if err.is_not_found() {
        warn!("{}: {}", context, err);
    } else {
        error!("{}: {}", context, err);
    }
    json_response(
        err.status_code(),
        &serde_json::json!({ "error": format!("{}: {}", context, err) }),
    )
}

/// Render a rendered view as 200, or the error under `context`
pub fn respond(context: &str, result: Result<Value>) -> Response<FullBody> {
    respond_with(StatusCode::OK, context, result)
}

pub fn respond_with(status: StatusCode, context: &str, result: Result<Value>) -> Response<FullBody> {
    match result {
        Ok(value) => json_response(status, &value),
        Err(e) => error_response(context, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{CardPatch, ProgressPatch};
    use http_body_util::BodyExt;

    #[test]
    fn test_patch_request_accepts_both_shapes() {
        let plain: PatchRequest<CardPatch> = parse_json(&Bytes::from_static(br#"{"cardId":"abc"}"#)).unwrap();
        assert_eq!(plain.id, "abc");
        assert_eq!(plain.patch, CardPatch::default());

        let patched: PatchRequest<CardPatch> = parse_json(&Bytes::from_static(
            br#"{"id":"abc","keyPoints":"done","future":3,"cardNumber":9}"#,
        ))
        .unwrap();
        assert_eq!(patched.id, "abc");
        assert_eq!(patched.patch.key_points.as_deref(), Some("done"));

        let progress: PatchRequest<ProgressPatch> =
            parse_json(&Bytes::from_static(br#"{"id":"abc","bmc_status":"complete"}"#)).unwrap();
        assert_eq!(progress.patch.bmc_status.as_deref(), Some("complete"));
    }

    #[test]
    fn test_missing_id_is_bad_request() {
        let err = parse_json::<PatchRequest<CardPatch>>(&Bytes::from_static(b"{}")).unwrap_err();
        assert!(matches!(err, ThinkBeyondError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let err = ThinkBeyondError::NotFound("card 1".into());
        let response = error_response("Error updating card", &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "Error updating card: Not found: card 1");
    }
}
