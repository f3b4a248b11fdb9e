//! Database layer for the planner
//!
//! MongoDB storage for cards, onboarding progress, the methodology menu and
//! companies, plus a memory-backed store with the same contract.

pub mod collections;
pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod seed;
pub mod store;

pub use collections::{Backend, Collections};
pub use memory::MemoryCollection;
pub use mongo::{MongoClient, MongoCollection};
pub use schemas::{CardDoc, CompanyDoc, MethodologyDoc, ProgressDoc};
pub use seed::SeedData;
pub use store::{id_filter, DocumentStore, StoredDocument};
