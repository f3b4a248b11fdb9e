//! Methodology menu routes

use bytes::Bytes;
use hyper::Response;
use serde::Deserialize;
use serde_json::Value;

use crate::db::schemas::{Framework, PublicView};
use crate::db::MethodologyDoc;
use crate::routes::{parse_json, respond, FullBody};
use crate::services::Services;
use crate::types::Result;

#[derive(Deserialize)]
struct FrameworksRequest {
    frameworks: Vec<Framework>,
}

/// Body of `updateLock` / `updateSelected`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasFlagRequest {
    canvas_name: String,
    value: bool,
    #[serde(default)]
    framework: Option<String>,
}

/// Which canvas flag a request sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasFlag {
    Locked,
    Selected,
}

/// Menu reads answer with the matching documents as a list
fn as_listing(menu: MethodologyDoc) -> Result<Value> {
    Ok(Value::Array(vec![menu.public_view()?]))
}

pub async fn get(services: &Services) -> Response<FullBody> {
    let result = services.methodology.get().await.and_then(as_listing);
    respond("Error fetching menu", result)
}

pub async fn set_frameworks(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: FrameworksRequest = parse_json(body)?;
        services
            .methodology
            .set_frameworks(&request.frameworks)
            .await?
            .public_view()
    }
    .await;
    respond("Error updating menu", result)
}

pub async fn set_canvas_flag(services: &Services, flag: CanvasFlag, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: CanvasFlagRequest = parse_json(body)?;
        let framework = request.framework.as_deref();
        let menu = match flag {
            CanvasFlag::Locked => {
                services
                    .methodology
                    .set_canvas_locked(framework, &request.canvas_name, request.value)
                    .await?
            }
            CanvasFlag::Selected => {
                services
                    .methodology
                    .set_canvas_selected(framework, &request.canvas_name, request.value)
                    .await?
            }
        };
        as_listing(menu)
    }
    .await;
    let context = match flag {
        CanvasFlag::Locked => "Error updating menu lock",
        CanvasFlag::Selected => "Error updating menu selection",
    };
    respond(context, result)
}
