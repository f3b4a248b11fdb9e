//! Startup seeding from a JSON file
//!
//! Cards and onboarding progress are provisioned out-of-band. For dev mode
//! and fresh databases a seed file can provide them; every list is inserted
//! only when its collection is still empty.
//!
//! Company `createdAt`/`updatedAt` may be written as RFC 3339 strings
//! (`"2024-03-09T10:30:00Z"`) or extended JSON `{"$date": ...}`.

use bson::doc;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::db::{CardDoc, Collections, CompanyDoc, DocumentStore, MethodologyDoc, ProgressDoc, StoredDocument};
use crate::types::{Result, ThinkBeyondError};

/// Seed file contents
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SeedData {
    pub cards: Vec<CardDoc>,
    pub progress: Vec<ProgressDoc>,
    pub methodology: Option<MethodologyDoc>,
    pub companies: Vec<CompanyDoc>,
}

/// Documents inserted per collection
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub cards: usize,
    pub progress: usize,
    pub methodology: usize,
    pub companies: usize,
}

impl SeedData {
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path).await.map_err(|e| {
            ThinkBeyondError::Config(format!("Cannot read seed file {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&raw).map_err(|e| {
            ThinkBeyondError::Config(format!("Invalid seed file {}: {}", path.display(), e))
        })
    }

    /// Insert into every collection that has no documents yet
    pub async fn apply(self, collections: &Collections) -> Result<SeedReport> {
        let report = SeedReport {
            cards: seed_collection("cards", collections.cards.as_ref(), self.cards).await?,
            progress: seed_collection("progress", collections.progress.as_ref(), self.progress).await?,
            methodology: seed_collection(
                "methodology",
                collections.methodology.as_ref(),
                self.methodology.into_iter().collect(),
            )
            .await?,
            companies: seed_collection("companies", collections.companies.as_ref(), self.companies).await?,
        };
        info!(?report, "Seed applied");
        Ok(report)
    }
}

async fn seed_collection<T: StoredDocument>(
    label: &str,
    store: &dyn DocumentStore<T>,
    docs: Vec<T>,
) -> Result<usize> {
    if docs.is_empty() {
        return Ok(0);
    }
    if store.count(doc! {}).await? > 0 {
        debug!("Seed skipped for {}: collection not empty", label);
        return Ok(0);
    }

    let total = docs.len();
    for item in docs {
        store.insert_one(item).await?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SeedData {
        serde_json::from_value(json!({
            "cards": [
                { "cardName": "Customer Segments", "cardNumber": 0, "future": 1, "cardCanvas": "Business Model Canvas" },
                { "cardName": "Value Propositions", "cardNumber": 1, "future": 1, "cardCanvas": "Business Model Canvas" }
            ],
            "methodology": { "methodology": "ThinkBeyond", "frameworks": [] }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_seed_fills_empty_collections_once() {
        let collections = Collections::memory();

        let first = sample().apply(&collections).await.unwrap();
        assert_eq!(first.cards, 2);
        assert_eq!(first.methodology, 1);
        assert_eq!(first.progress, 0);

        let second = sample().apply(&collections).await.unwrap();
        assert_eq!(second, SeedReport::default());
        assert_eq!(collections.cards.count(doc! {}).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_company_dates_accept_plain_strings() {
        let seed: SeedData = serde_json::from_value(json!({
            "companies": [
                { "companyName": "Acme", "createdAt": "2024-03-09T10:30:00Z" }
            ]
        }))
        .unwrap();
        let collections = Collections::memory();

        let report = seed.apply(&collections).await.unwrap();
        assert_eq!(report.companies, 1);

        let stored = collections.companies.find_many(doc! {}).await.unwrap();
        let created = stored[0].created_at.unwrap();
        assert_eq!(created.timestamp_millis(), 1_709_980_200_000);
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_config_error() {
        let err = SeedData::load(Path::new("/nonexistent/seed.json")).await.unwrap_err();
        assert!(matches!(err, ThinkBeyondError::Config(_)));
    }
}
