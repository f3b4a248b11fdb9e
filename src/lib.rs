//! ThinkBeyond - business planning canvas backend
//!
//! Persists Business Model and Customer Value Proposition canvas cards,
//! walks users through them one card at a time, and serves the onboarding
//! sequence, the methodology menu and company profiles over HTTP/JSON.
//!
//! ## Layers
//!
//! - **db**: MongoDB collections (or an in-memory stand-in) behind
//!   [`db::DocumentStore`]
//! - **services**: card, progress, methodology and company logic
//! - **routes**: request parsing and JSON rendering per endpoint
//! - **server**: hyper accept loop and path dispatch

pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, ThinkBeyondError};
