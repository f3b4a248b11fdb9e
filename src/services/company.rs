//! Company profiles

use bson::{doc, DateTime};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::SharedUser;
use crate::db::{id_filter, CompanyDoc, DocumentStore};
use crate::services::shared::remove_shared_user;
use crate::types::{Result, ThinkBeyondError};

/// Fields accepted when creating a company
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub vertical: Option<String>,
    pub company_type: Option<String>,
    pub company_size: Option<String>,
    pub company_headquarters: Option<String>,
    pub company_target_regions: Option<String>,
    pub funding_stage: Option<String>,
    pub annual_revenue: Option<String>,
    pub business_model: Option<String>,
    #[serde(default)]
    pub shared: Vec<SharedUser>,
}

impl From<NewCompany> for CompanyDoc {
    fn from(input: NewCompany) -> Self {
        CompanyDoc {
            id: None,
            company_name: input.company_name,
            industry: input.industry,
            vertical: input.vertical,
            company_type: input.company_type,
            company_size: input.company_size,
            company_headquarters: input.company_headquarters,
            company_target_regions: input.company_target_regions,
            funding_stage: input.funding_stage,
            annual_revenue: input.annual_revenue,
            business_model: input.business_model,
            shared: input.shared,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Clone)]
pub struct CompanyService {
    store: Arc<dyn DocumentStore<CompanyDoc>>,
}

impl CompanyService {
    pub fn new(store: Arc<dyn DocumentStore<CompanyDoc>>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: NewCompany) -> Result<CompanyDoc> {
        let mut company = CompanyDoc::from(input);
        company.touch_created();
        let id = self.store.insert_one(company.clone()).await?;
        company.id = Some(id);
        info!(company_id = %id, "Company created");
        Ok(company)
    }

    pub async fn list(&self) -> Result<Vec<CompanyDoc>> {
        self.store.find_many(doc! {}).await
    }

    pub async fn get(&self, company_id: &str) -> Result<CompanyDoc> {
        self.store
            .find_one(id_filter(company_id)?)
            .await?
            .ok_or_else(|| not_found(company_id))
    }

    pub async fn delete(&self, company_id: &str) -> Result<()> {
        if !self.store.delete_one(id_filter(company_id)?).await? {
            return Err(not_found(company_id));
        }
        info!(company_id, "Company deleted");
        Ok(())
    }

    /// Append collaborators. Duplicates are kept.
    pub async fn add_shared_users(&self, company_id: &str, users: Vec<SharedUser>) -> Result<CompanyDoc> {
        let mut company = self.get(company_id).await?;
        company.shared.extend(users);
        self.write_shared(company_id, &company.shared).await
    }

    pub async fn delete_shared_user(&self, company_id: &str, shared_id: &str) -> Result<CompanyDoc> {
        let mut company = self.get(company_id).await?;
        remove_shared_user(&mut company.shared, shared_id)?;
        self.write_shared(company_id, &company.shared).await
    }

    async fn write_shared(&self, company_id: &str, shared: &[SharedUser]) -> Result<CompanyDoc> {
        let set = doc! {
            "shared": bson::to_bson(shared)?,
            "updatedAt": DateTime::now(),
        };
        self.store
            .update_one(id_filter(company_id)?, set)
            .await?
            .ok_or_else(|| not_found(company_id))
    }
}

fn not_found(company_id: &str) -> ThinkBeyondError {
    ThinkBeyondError::NotFound(format!("company {}", company_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collections;
    use bson::oid::ObjectId;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn service() -> CompanyService {
        CompanyService::new(Collections::memory().companies)
    }

    fn acme() -> NewCompany {
        serde_json::from_value(json!({
            "companyName": "Acme",
            "industry": "Manufacturing",
            "fundingStage": "Seed",
            "createdAt": "01/01/1999"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_stamps_times_and_assigns_id() {
        let service = service();

        let company = assert_ok!(service.create(acme()).await);
        let id = company.id.unwrap();
        assert!(company.created_at.is_some());

        let stored = service.get(&id.to_hex()).await.unwrap();
        assert_eq!(stored.company_name.as_deref(), Some("Acme"));
        assert_eq!(stored.funding_stage.as_deref(), Some("Seed"));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let id = service.create(acme()).await.unwrap().id.unwrap().to_hex();

        service.delete(&id).await.unwrap();
        assert!(service.get(&id).await.unwrap_err().is_not_found());
        assert!(service.delete(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_shared_users_on_company() {
        let service = service();
        let id = service.create(acme()).await.unwrap().id.unwrap().to_hex();
        let user: SharedUser =
            serde_json::from_value(json!({ "username": "cy", "email": "cy@example.com", "owner": true }))
                .unwrap();

        let company = service.add_shared_users(&id, vec![user.clone(), user.clone()]).await.unwrap();
        assert_eq!(company.shared.len(), 2);

        let company = service.delete_shared_user(&id, &user.id.to_hex()).await.unwrap();
        assert_eq!(company.shared.len(), 1);

        let err = service
            .delete_shared_user(&id, &ObjectId::new().to_hex())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
