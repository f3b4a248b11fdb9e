//! Shared types for the planner backend

mod error;

pub use error::{Result, ThinkBeyondError};
