//! API key routes.
//!
//! ## Routes
//!
//! - `POST   /apikey/v1` - Create a key (plain key returned once)
//! - `GET    /apikey/v1/{id}` - Fetch a key record
//! - `DELETE /apikey/v1/{id}` - Delete a key record
//! - `PUT    /apikey/v1/{id}/enabled` - Enable/disable a key
//! - `POST   /apikey/v1/find` - Quick-filter search over key records
//! - `POST   /apikey/v1/verifyApiKey` - Verify a presented key

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vantage_core::quickfilter::FilterFieldMappers;
use vantage_security::{
    AppPermission, CreateHashedApiKeyRequest, CreateHashedApiKeyResponse, HashedApiKey, UserRef,
};

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// Request to search key records.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct FindApiKeysRequest {
    /// Quick-filter input, e.g. `ci owner:jbloggs`.
    #[serde(default)]
    pub quick_filter: Option<String>,
}

/// Key search response.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct FindApiKeysResponse {
    /// Matching key records.
    pub api_keys: Vec<HashedApiKey>,
}

/// Request to enable or disable a key.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct SetEnabledRequest {
    /// The new enabled state.
    pub enabled: bool,
}

/// Request to verify a presented key.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct VerifyApiKeyRequest {
    /// The plain key to verify.
    pub api_key: String,
}

/// Result of verifying a presented key.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct VerifyApiKeyResponse {
    /// Whether the key is valid right now.
    pub valid: bool,
    /// The key's owner, when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserRef>,
}

fn key_mappers() -> FilterFieldMappers<HashedApiKey> {
    FilterFieldMappers::new()
        .with_default_field("name", |k: &HashedApiKey| Some(k.name.clone()))
        .with_default_field("prefix", |k: &HashedApiKey| Some(k.api_key_prefix.clone()))
        .with_field("owner", |k: &HashedApiKey| Some(k.owner.name.clone()))
        .with_field("comments", |k: &HashedApiKey| k.comments.clone())
}

/// Creates API key routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/apikey/v1", post(create_api_key))
        .route("/apikey/v1/:id", get(fetch_api_key).delete(delete_api_key))
        .route("/apikey/v1/:id/enabled", put(set_api_key_enabled))
        .route("/apikey/v1/find", post(find_api_keys))
        .route("/apikey/v1/verifyApiKey", post(verify_api_key))
}

/// Create an API key. The plain key appears in this response and nowhere else.
///
/// POST /apikey/v1
#[utoipa::path(
    post,
    path = "/apikey/v1",
    tag = "api-keys",
    request_body = CreateHashedApiKeyRequest,
    responses(
        (status = 201, description = "Key created", body = CreateHashedApiKeyResponse),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 409, description = "Name already used", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn create_api_key(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateHashedApiKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_permission(AppPermission::ManageApiKeys)?;

    tracing::info!(
        user = %ctx.user.name,
        owner = %req.owner.name,
        name = %req.name,
        "Creating API key"
    );

    let response = state.api_keys.create(req).await.map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Fetch a key record.
///
/// GET /apikey/v1/{id}
#[utoipa::path(
    get,
    path = "/apikey/v1/{id}",
    tag = "api-keys",
    params(("id" = u64, Path, description = "Key record ID")),
    responses(
        (status = 200, description = "Key fetched", body = HashedApiKey),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn fetch_api_key(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<HashedApiKey>, ApiError> {
    ctx.require_permission(AppPermission::ManageApiKeys)?;

    let record = state
        .api_keys
        .get(id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("api key {id}")))?;
    Ok(Json(record))
}

/// Delete a key record.
///
/// DELETE /apikey/v1/{id}
#[utoipa::path(
    delete,
    path = "/apikey/v1/{id}",
    tag = "api-keys",
    params(("id" = u64, Path, description = "Key record ID")),
    responses(
        (status = 204, description = "Key deleted"),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn delete_api_key(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_permission(AppPermission::ManageApiKeys)?;

    let existed = state.api_keys.delete(id).await.map_err(ApiError::from)?;
    if existed {
        tracing::info!(user = %ctx.user.name, id, "Deleted API key");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("api key {id}")))
    }
}

/// Enable or disable a key.
///
/// PUT /apikey/v1/{id}/enabled
#[utoipa::path(
    put,
    path = "/apikey/v1/{id}/enabled",
    tag = "api-keys",
    params(("id" = u64, Path, description = "Key record ID")),
    request_body = SetEnabledRequest,
    responses(
        (status = 200, description = "Key updated", body = HashedApiKey),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn set_api_key_enabled(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<Json<HashedApiKey>, ApiError> {
    ctx.require_permission(AppPermission::ManageApiKeys)?;

    let record = state
        .api_keys
        .set_enabled(id, req.enabled)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(record))
}

/// Quick-filter search over key records.
///
/// POST /apikey/v1/find
#[utoipa::path(
    post,
    path = "/apikey/v1/find",
    tag = "api-keys",
    request_body = FindApiKeysRequest,
    responses(
        (status = 200, description = "Matching keys", body = FindApiKeysResponse),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn find_api_keys(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<FindApiKeysRequest>,
) -> Result<Json<FindApiKeysResponse>, ApiError> {
    ctx.require_permission(AppPermission::ManageApiKeys)?;

    let all = state.api_keys.list().await.map_err(ApiError::from)?;
    let filter = req.quick_filter.unwrap_or_default();
    let api_keys = key_mappers().filter(&filter, all);

    Ok(Json(FindApiKeysResponse { api_keys }))
}

/// Verify a presented key on behalf of another service.
///
/// POST /apikey/v1/verifyApiKey
#[utoipa::path(
    post,
    path = "/apikey/v1/verifyApiKey",
    tag = "api-keys",
    request_body = VerifyApiKeyRequest,
    responses(
        (status = 200, description = "Verification result", body = VerifyApiKeyResponse),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn verify_api_key(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyApiKeyRequest>,
) -> Result<Json<VerifyApiKeyResponse>, ApiError> {
    ctx.require_permission(AppPermission::VerifyApiKey)?;

    let owner = state
        .api_keys
        .verify(&req.api_key)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(VerifyApiKeyResponse {
        valid: owner.is_some(),
        owner,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn key_filter_covers_name_prefix_owner_and_comments() {
        let record = HashedApiKey {
            id: 1,
            owner: UserRef::named(Uuid::new_v4(), "jbloggs"),
            name: "ci key".into(),
            comments: Some("for the build farm".into()),
            api_key_prefix: "vgk_AbCdEfGh".into(),
            api_key_hash: "hash".into(),
            hash_algorithm: Default::default(),
            expire_time: None,
            enabled: true,
        };
        let mappers = key_mappers();
        assert!(mappers.matches("ci", &record));
        assert!(mappers.matches("vgk_AbCd", &record));
        assert!(mappers.matches("owner:jbloggs", &record));
        assert!(mappers.matches("comments:farm", &record));
        assert!(!mappers.matches("owner:other", &record));
    }
}
