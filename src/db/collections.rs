//! The four planner collections, opened against one backend

use std::sync::Arc;
use tracing::info;

use crate::db::schemas::{
    CARD_COLLECTION, COMPANY_COLLECTION, METHODOLOGY_COLLECTION, PROGRESS_COLLECTION,
};
use crate::db::{CardDoc, CompanyDoc, DocumentStore, MemoryCollection, MethodologyDoc, MongoClient, ProgressDoc};
use crate::types::Result;

/// Which backend the collections live in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mongo,
    Memory,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Mongo => "mongodb",
            Backend::Memory => "memory",
        }
    }
}

/// Handles to every collection the services use
#[derive(Clone)]
pub struct Collections {
    pub backend: Backend,
    pub cards: Arc<dyn DocumentStore<CardDoc>>,
    pub progress: Arc<dyn DocumentStore<ProgressDoc>>,
    pub methodology: Arc<dyn DocumentStore<MethodologyDoc>>,
    pub companies: Arc<dyn DocumentStore<CompanyDoc>>,
}

impl Collections {
    /// Open the collections in MongoDB, applying schema indexes
    pub async fn mongo(client: &MongoClient) -> Result<Self> {
        let cards = client.collection::<CardDoc>(CARD_COLLECTION).await?;
        let progress = client.collection::<ProgressDoc>(PROGRESS_COLLECTION).await?;
        let methodology = client.collection::<MethodologyDoc>(METHODOLOGY_COLLECTION).await?;
        let companies = client.collection::<CompanyDoc>(COMPANY_COLLECTION).await?;
        info!("Collections opened in database '{}'", client.db_name());

        Ok(Self {
            backend: Backend::Mongo,
            cards: Arc::new(cards),
            progress: Arc::new(progress),
            methodology: Arc::new(methodology),
            companies: Arc::new(companies),
        })
    }

    /// Empty in-process collections
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            cards: Arc::new(MemoryCollection::<CardDoc>::new(CARD_COLLECTION)),
            progress: Arc::new(MemoryCollection::<ProgressDoc>::new(PROGRESS_COLLECTION)),
            methodology: Arc::new(MemoryCollection::<MethodologyDoc>::new(METHODOLOGY_COLLECTION)),
            companies: Arc::new(MemoryCollection::<CompanyDoc>::new(COMPANY_COLLECTION)),
        }
    }
}
