//! Health check endpoints
//!
//! - /health, /healthz - Liveness probe, always 200 while the process runs.
//!   The body reports whether the document store answers.
//! - /version - Build information captured by build.rs

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::{json_response, FullBody};
use crate::server::AppState;

/// Health response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall health status (true if service is running)
    pub healthy: bool,
    /// 'online' when storage answers, 'degraded' otherwise
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
    /// Document store status
    pub storage: StorageHealth,
    /// Operating mode
    pub mode: &'static str,
    /// Node identifier
    pub node_id: String,
    /// Current timestamp
    pub timestamp: String,
}

/// Document store status
#[derive(Serialize)]
pub struct StorageHealth {
    /// `mongodb` or `memory`
    pub backend: &'static str,
    /// Whether the store answered a ping (always true in memory)
    pub connected: bool,
}

async fn build_health_response(state: &AppState) -> HealthResponse {
    let connected = match &state.mongo {
        Some(mongo) => mongo.ping().await,
        None => true,
    };

    HealthResponse {
        healthy: true,
        status: if connected { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        storage: StorageHealth {
            backend: state.backend.as_str(),
            connected,
        },
        mode: if state.args.dev_mode { "development" } else { "production" },
        node_id: state.args.node_id.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Handle liveness probe (/health, /healthz)
pub async fn health_check(state: &AppState) -> Response<FullBody> {
    let response = build_health_response(state).await;
    json_response(StatusCode::OK, &response)
}

/// Version information for deployment verification
#[derive(Serialize)]
pub struct VersionResponse {
    /// Cargo package version
    pub version: &'static str,
    /// Git commit hash (short)
    pub commit: &'static str,
    /// Git commit hash (full)
    pub commit_full: &'static str,
    /// Build timestamp
    pub build_time: &'static str,
    /// Service name
    pub service: &'static str,
}

/// Handle version endpoint (/version)
pub fn version_info() -> Response<FullBody> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "thinkbeyond",
    };
    json_response(StatusCode::OK, &response)
}
