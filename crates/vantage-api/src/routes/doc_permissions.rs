//! Document permission routes.
//!
//! ## Routes
//!
//! - `POST   /permission/doc/v1/fetchDocumentPermissions` - List grants on a document
//! - `POST   /permission/doc/v1/changeDocumentPermissions` - Add/remove grants
//! - `POST   /permission/doc/v1/checkDocumentPermission` - Check one user/permission pair
//! - `DELETE /permission/doc/v1/clearDocumentPermissions/{docUuid}` - Remove every grant

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use vantage_security::{AppPermission, DocumentPermission};

use crate::context::{require_doc_permission, RequestContext};
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// Request naming a document.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct FetchDocumentPermissionsRequest {
    /// The document.
    pub doc_uuid: Uuid,
}

/// The grants held on a document.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct DocumentPermissionsResponse {
    /// The document.
    pub doc_uuid: Uuid,
    /// Grant per user UUID.
    pub permissions: BTreeMap<Uuid, DocumentPermission>,
}

/// One grant to add or remove.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct PermissionChange {
    /// The user being granted or revoked.
    pub user_uuid: Uuid,
    /// The permission level.
    pub permission: DocumentPermission,
}

/// Request to change the grants on a document.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct ChangeDocumentPermissionsRequest {
    /// The document.
    pub doc_uuid: Uuid,
    /// Grants to add (replacing any existing grant per user).
    #[serde(default)]
    pub add: Vec<PermissionChange>,
    /// Users whose grants to remove.
    #[serde(default)]
    pub remove: Vec<Uuid>,
}

/// Request to check one user/permission pair.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct CheckDocumentPermissionRequest {
    /// The document.
    pub doc_uuid: Uuid,
    /// The user to check.
    pub user_uuid: Uuid,
    /// The required permission level.
    pub permission: DocumentPermission,
}

/// Result of a permission check.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct CheckDocumentPermissionResponse {
    /// Whether the user's grant covers the requirement.
    pub allowed: bool,
}

/// Creates document permission routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/permission/doc/v1/fetchDocumentPermissions",
            post(fetch_document_permissions),
        )
        .route(
            "/permission/doc/v1/changeDocumentPermissions",
            post(change_document_permissions),
        )
        .route(
            "/permission/doc/v1/checkDocumentPermission",
            post(check_document_permission),
        )
        .route(
            "/permission/doc/v1/clearDocumentPermissions/:doc_uuid",
            delete(clear_document_permissions),
        )
}

/// Managing grants needs ownership of the document or the manage-users
/// capability.
async fn require_grant_admin(
    state: &Arc<AppState>,
    ctx: &RequestContext,
    doc_uuid: Uuid,
) -> Result<(), ApiError> {
    if ctx
        .require_permission(AppPermission::ManageUsers)
        .is_ok()
    {
        return Ok(());
    }
    require_doc_permission(state, ctx, doc_uuid, DocumentPermission::Owner).await
}

/// List the grants on a document.
///
/// POST /permission/doc/v1/fetchDocumentPermissions
#[utoipa::path(
    post,
    path = "/permission/doc/v1/fetchDocumentPermissions",
    tag = "doc-permissions",
    request_body = FetchDocumentPermissionsRequest,
    responses(
        (status = 200, description = "Grants listed", body = DocumentPermissionsResponse),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn fetch_document_permissions(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<FetchDocumentPermissionsRequest>,
) -> Result<Json<DocumentPermissionsResponse>, ApiError> {
    require_grant_admin(&state, &ctx, req.doc_uuid).await?;

    let permissions = state
        .doc_permissions
        .fetch(req.doc_uuid)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DocumentPermissionsResponse {
        doc_uuid: req.doc_uuid,
        permissions,
    }))
}

/// Add and remove grants on a document.
///
/// POST /permission/doc/v1/changeDocumentPermissions
#[utoipa::path(
    post,
    path = "/permission/doc/v1/changeDocumentPermissions",
    tag = "doc-permissions",
    request_body = ChangeDocumentPermissionsRequest,
    responses(
        (status = 200, description = "Grants changed", body = DocumentPermissionsResponse),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn change_document_permissions(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChangeDocumentPermissionsRequest>,
) -> Result<Json<DocumentPermissionsResponse>, ApiError> {
    require_grant_admin(&state, &ctx, req.doc_uuid).await?;

    // Granting ownership transfers control, which needs its own capability.
    if req
        .add
        .iter()
        .any(|change| change.permission == DocumentPermission::Owner)
    {
        ctx.require(&vantage_security::AppPermissionSet::one_of([
            AppPermission::ChangeOwner,
            AppPermission::ManageUsers,
        ]))?;
    }

    tracing::info!(
        user = %ctx.user.name,
        doc = %req.doc_uuid,
        added = req.add.len(),
        removed = req.remove.len(),
        "Changing document permissions"
    );

    for change in &req.add {
        state
            .doc_permissions
            .set(req.doc_uuid, change.user_uuid, change.permission)
            .await
            .map_err(ApiError::from)?;
    }
    for user_uuid in &req.remove {
        state
            .doc_permissions
            .remove(req.doc_uuid, *user_uuid)
            .await
            .map_err(ApiError::from)?;
    }

    let permissions = state
        .doc_permissions
        .fetch(req.doc_uuid)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(DocumentPermissionsResponse {
        doc_uuid: req.doc_uuid,
        permissions,
    }))
}

/// Check whether a user's grant covers a permission level.
///
/// POST /permission/doc/v1/checkDocumentPermission
///
/// Callers may always check themselves; checking another user needs the
/// manage-users capability.
#[utoipa::path(
    post,
    path = "/permission/doc/v1/checkDocumentPermission",
    tag = "doc-permissions",
    request_body = CheckDocumentPermissionRequest,
    responses(
        (status = 200, description = "Check result", body = CheckDocumentPermissionResponse),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn check_document_permission(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckDocumentPermissionRequest>,
) -> Result<Json<CheckDocumentPermissionResponse>, ApiError> {
    if req.user_uuid != ctx.user.uuid {
        ctx.require_permission(AppPermission::ManageUsers)?;
    }

    let allowed = state
        .doc_permissions
        .check(req.doc_uuid, req.user_uuid, req.permission)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(CheckDocumentPermissionResponse { allowed }))
}

/// Remove every grant on a document.
///
/// DELETE /permission/doc/v1/clearDocumentPermissions/{docUuid}
#[utoipa::path(
    delete,
    path = "/permission/doc/v1/clearDocumentPermissions/{doc_uuid}",
    tag = "doc-permissions",
    params(("doc_uuid" = Uuid, Path, description = "Document UUID")),
    responses(
        (status = 204, description = "Grants cleared"),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn clear_document_permissions(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(doc_uuid): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_grant_admin(&state, &ctx, doc_uuid).await?;

    state
        .doc_permissions
        .clear(doc_uuid)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_request_defaults_to_empty_lists() {
        let request: ChangeDocumentPermissionsRequest = serde_json::from_value(
            serde_json::json!({"docUuid": Uuid::nil()}),
        )
        .unwrap();
        assert!(request.add.is_empty());
        assert!(request.remove.is_empty());
    }

    #[test]
    fn permission_names_on_the_wire_are_screaming_snake() {
        let change: PermissionChange = serde_json::from_value(serde_json::json!({
            "userUuid": Uuid::nil(),
            "permission": "OWNER",
        }))
        .unwrap();
        assert_eq!(change.permission, DocumentPermission::Owner);
    }
}
