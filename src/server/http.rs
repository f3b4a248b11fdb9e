//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo, one task per connection. Request bodies
//! are collected up front and dispatched through [`route`], which does not
//! depend on the connection and is what the tests drive.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::db::{Backend, Collections, MongoClient};
use crate::routes::{self, cards, company, json_response, menu, menu::CanvasFlag, progress, text_response, FullBody};
use crate::services::Services;
use crate::types::Result;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Present when the collections live in MongoDB
    pub mongo: Option<MongoClient>,
    pub backend: Backend,
    pub services: Services,
}

impl AppState {
    pub fn new(args: Args, mongo: Option<MongoClient>, collections: &Collections) -> Self {
        let services = Services::new(collections, args.service_config());
        Self {
            args,
            mongo,
            backend: collections.backend,
            services,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "ThinkBeyond listening on {} as node {} ({} storage)",
        state.args.listen,
        state.args.node_id,
        state.backend.as_str()
    );

    if state.backend == Backend::Memory {
        warn!("Using in-memory storage - data is lost on restart");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Read the body and dispatch
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> std::result::Result<Response<FullBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("Request body error from {}: {}", addr, e);
            return Ok(with_common_headers(bad_request_response("Failed to read request body")));
        }
    };

    Ok(route(&state, &method, &path, body).await)
}

/// Route a request to its handler and add the headers every response carries
pub async fn route(state: &AppState, method: &Method, path: &str, body: Bytes) -> Response<FullBody> {
    with_common_headers(dispatch(state, method, path, &body).await)
}

async fn dispatch(state: &AppState, method: &Method, path: &str, body: &Bytes) -> Response<FullBody> {
    let services = &state.services;

    if *method == Method::OPTIONS {
        return preflight_response();
    }

    if let Some((partition, action)) = cards::match_partition(path) {
        debug!(%partition, action, "Card partition route");
        return match (method, action) {
            (&Method::GET, "") => cards::list(services, partition).await,
            (&Method::GET, "chat") => cards::chat(services, partition).await,
            (&Method::POST, "nextCard") => cards::next_card(services, partition, body).await,
            (&Method::POST, "reset") => cards::reset(services, partition).await,
            (&Method::POST, "prefill") => cards::prefill(services, partition, body).await,
            _ => not_found_response(path),
        };
    }

    match (method, path) {
        (&Method::GET, "/") => text_response(StatusCode::OK, "Hello"),

        // Liveness probe
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => routes::health_check(state).await,

        // Version info for deployment verification
        (&Method::GET, "/version") => routes::version_info(),

        // Onboarding progress
        (&Method::GET, "/ThinkBeyond") => progress::list(services).await,
        (&Method::POST, "/ThinkBeyond") => progress::update(services, body).await,
        (&Method::POST, "/ThinkBeyond/nextCard") => progress::next_card(services, body).await,
        (&Method::POST, "/ThinkBeyond/reset") => progress::reset(services).await,

        // Methodology menu
        (&Method::GET, "/Menu") => menu::get(services).await,
        (&Method::POST, "/Menu") => menu::set_frameworks(services, body).await,
        (&Method::POST, "/Menu/updateLock") => menu::set_canvas_flag(services, CanvasFlag::Locked, body).await,
        (&Method::POST, "/Menu/updateSelected") => {
            menu::set_canvas_flag(services, CanvasFlag::Selected, body).await
        }

        // Companies
        (&Method::GET, "/company") => company::list(services).await,
        (&Method::POST, "/company") => company::create(services, body).await,
        (&Method::POST, "/company/add-shared-user") => company::add_shared_user(services, body).await,
        (&Method::POST, "/company/delete-shared-user") => company::delete_shared_user(services, body).await,
        (&Method::POST, p) if p.starts_with("/company/delete/") => match path_id(p, "/company/delete/") {
            Some(id) => company::delete(services, id).await,
            None => not_found_response(path),
        },
        (&Method::GET, p) if p.starts_with("/company/") => match path_id(p, "/company/") {
            Some(id) => company::get(services, id).await,
            None => not_found_response(path),
        },

        // Card-level operations
        (&Method::POST, "/updateCard") => cards::update_card(services, body).await,
        (&Method::POST, "/resetCard") => cards::reset_card(services, body).await,
        (&Method::POST, "/add-comment") => cards::add_comment(services, body).await,
        (&Method::POST, "/delete-comment") => cards::delete_comment(services, body).await,
        (&Method::POST, "/add-shared-user") => cards::add_shared_user(services, body).await,
        (&Method::POST, "/delete-shared-user") => cards::delete_shared_user(services, body).await,

        _ => not_found_response(path),
    }
}

/// Single trailing path segment after `prefix`
fn path_id<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .map(|id| id.trim_end_matches('/'))
        .filter(|id| !id.is_empty() && !id.contains('/'))
}

const COMMON_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
];

/// CORS and security headers
fn with_common_headers(mut response: Response<FullBody>) -> Response<FullBody> {
    let headers = response.headers_mut();
    for (name, value) in COMMON_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

/// CORS preflight response
fn preflight_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert("access-control-allow-headers", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

/// Not found response
fn not_found_response(path: &str) -> Response<FullBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
        }),
    )
}

/// Bad request response
fn bad_request_response(message: &str) -> Response<FullBody> {
    json_response(
        StatusCode::BAD_REQUEST,
        &serde_json::json!({
            "error": "Bad Request",
            "message": message
        }),
    )
}
