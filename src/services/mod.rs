//! Services layer for the planner
//!
//! Business logic over the document store. Routes parse requests and call
//! into these; nothing here knows about HTTP.
//!
//! ## Services
//!
//! - **Cards**: canvas cards partitioned by `(future, cardCanvas)`
//! - **Progress**: the ThinkBeyond onboarding sequence
//! - **Methodology**: the navigation menu singleton
//! - **Company**: company profiles and their collaborators

pub mod cards;
pub mod company;
pub mod methodology;
pub mod progress;
pub mod shared;

pub use cards::{CardPatch, CardService, ChatEntry, Partition, PrefillEntry};
pub use company::{CompanyService, NewCompany};
pub use methodology::{MethodologyService, MethodologySingleton};
pub use progress::{ProgressPatch, ProgressService};
pub use shared::OneOrMany;

use crate::db::Collections;

/// Names the services fall back to when a request or the store leaves
/// them unspecified
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Singleton key of the methodology document
    pub methodology_name: String,
    /// Framework used by menu updates that do not name one
    pub default_framework: String,
    /// Onboarding card selected after a progress reset
    pub start_card: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            methodology_name: "ThinkBeyond".to_string(),
            default_framework: "Micro frameworks".to_string(),
            start_card: "What is the change".to_string(),
        }
    }
}

/// Every service, sharing one set of collections
#[derive(Clone)]
pub struct Services {
    pub cards: CardService,
    pub progress: ProgressService,
    pub methodology: MethodologyService,
    pub companies: CompanyService,
}

impl Services {
    pub fn new(collections: &Collections, config: ServiceConfig) -> Self {
        Self {
            cards: CardService::new(collections.cards.clone()),
            progress: ProgressService::new(collections.progress.clone(), config.start_card),
            methodology: MethodologyService::new(
                MethodologySingleton::new(collections.methodology.clone(), config.methodology_name),
                config.default_framework,
            ),
            companies: CompanyService::new(collections.companies.clone()),
        }
    }
}
