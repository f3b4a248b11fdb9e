//! Company routes

use bytes::Bytes;
use hyper::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::schemas::{public_list, PublicView, SharedUser};
use crate::routes::{parse_json, respond, respond_with, FullBody};
use crate::services::{NewCompany, OneOrMany, Services};
use crate::types::Result;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddSharedUserRequest {
    company_id: String,
    shared_user: OneOrMany<SharedUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteSharedUserRequest {
    company_id: String,
    shared_user_id: String,
}

pub async fn list(services: &Services) -> Response<FullBody> {
    let result = services.companies.list().await.and_then(|companies| public_list(&companies));
    respond("Error fetching companies", result)
}

pub async fn get(services: &Services, company_id: &str) -> Response<FullBody> {
    let result = services
        .companies
        .get(company_id)
        .await
        .and_then(|company| company.public_view());
    respond("Error fetching company", result)
}

pub async fn create(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let input: NewCompany = parse_json(body)?;
        services.companies.create(input).await?.public_view()
    }
    .await;
    respond_with(StatusCode::CREATED, "Error creating company", result)
}

pub async fn delete(services: &Services, company_id: &str) -> Response<FullBody> {
    let result = services
        .companies
        .delete(company_id)
        .await
        .map(|()| json!({ "success": true }));
    respond("Error deleting company", result)
}

pub async fn add_shared_user(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: AddSharedUserRequest = parse_json(body)?;
        services
            .companies
            .add_shared_users(&request.company_id, request.shared_user.into_vec())
            .await?
            .public_view()
    }
    .await;
    respond("Error adding shared user to company", result)
}

pub async fn delete_shared_user(services: &Services, body: &Bytes) -> Response<FullBody> {
    let result: Result<Value> = async {
        let request: DeleteSharedUserRequest = parse_json(body)?;
        services
            .companies
            .delete_shared_user(&request.company_id, &request.shared_user_id)
            .await?
            .public_view()
    }
    .await;
    respond("Error deleting shared user from company", result)
}
