//! User routes.
//!
//! ## Routes
//!
//! - `POST /user/v1` - Create a user
//! - `GET  /user/v1` - List users (quick-filterable)
//! - `GET  /user/v1/{uuid}` - Fetch a user
//! - `PUT  /user/v1/{uuid}/permissions` - Replace a user's permission grants

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use vantage_core::quickfilter::FilterFieldMappers;
use vantage_security::{AppPermission, UserAndPermissions, UserRef};

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;

/// Request to create a user or group.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// The unique account name.
    pub name: String,
    /// Preferred display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Full name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Create a group rather than an individual account.
    #[serde(default)]
    pub group: bool,
}

/// List users response.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
    /// The users.
    pub users: Vec<UserRef>,
}

/// Query parameters for the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersParams {
    /// Quick-filter input, e.g. `joe uuid:1234`.
    pub filter: Option<String>,
}

/// Request to replace a user's application permissions.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct SetPermissionsRequest {
    /// The complete new set of held permissions.
    pub permissions: BTreeSet<AppPermission>,
}

fn user_mappers() -> FilterFieldMappers<UserRef> {
    FilterFieldMappers::new()
        .with_default_field("name", |u: &UserRef| Some(u.name.clone()))
        .with_default_field("display", |u: &UserRef| u.display_name.clone())
        .with_field("full", |u: &UserRef| u.full_name.clone())
        .with_field("uuid", |u: &UserRef| Some(u.uuid.to_string()))
}

/// Creates user routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/v1", post(create_user).get(list_users))
        .route("/user/v1/:uuid", get(fetch_user))
        .route("/user/v1/:uuid/permissions", put(set_user_permissions))
}

/// Create a user or group.
///
/// POST /user/v1
#[utoipa::path(
    post,
    path = "/user/v1",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserRef),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 409, description = "Name already taken", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn create_user(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_permission(AppPermission::ManageUsers)?;

    let user = UserRef {
        uuid: Uuid::new_v4(),
        name: req.name,
        display_name: req.display_name,
        full_name: req.full_name,
        group: req.group,
        enabled: true,
    };

    tracing::info!(
        user = %ctx.user.name,
        created = %user.name,
        group = user.group,
        "Creating user"
    );

    let user = state.users.create(user).await.map_err(ApiError::from)?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users.
///
/// GET /user/v1
#[utoipa::path(
    get,
    path = "/user/v1",
    tag = "users",
    params(("filter" = Option<String>, Query, description = "Quick-filter input")),
    responses(
        (status = 200, description = "Users listed", body = ListUsersResponse),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn list_users(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    ctx.require_permission(AppPermission::ManageUsers)?;

    let all = state.users.list().await.map_err(ApiError::from)?;
    let filter = params.filter.unwrap_or_default();
    let users = user_mappers().filter(&filter, all);

    Ok(Json(ListUsersResponse { users }))
}

/// Fetch a user with their held permissions.
///
/// GET /user/v1/{uuid}
///
/// Callers may always fetch themselves; fetching another user needs the
/// manage-users capability.
#[utoipa::path(
    get,
    path = "/user/v1/{uuid}",
    tag = "users",
    params(("uuid" = Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User fetched", body = UserAndPermissions),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn fetch_user(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<UserAndPermissions>, ApiError> {
    if uuid != ctx.user.uuid {
        ctx.require_permission(AppPermission::ManageUsers)?;
    }

    let user = state
        .users
        .get(uuid)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("user {uuid}")))?;

    let permissions = state
        .users
        .held_permissions(uuid)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserAndPermissions::new(user, permissions)))
}

/// Replace a user's application permission grants.
///
/// PUT /user/v1/{uuid}/permissions
#[utoipa::path(
    put,
    path = "/user/v1/{uuid}/permissions",
    tag = "users",
    params(("uuid" = Uuid, Path, description = "User UUID")),
    request_body = SetPermissionsRequest,
    responses(
        (status = 200, description = "Permissions replaced", body = UserAndPermissions),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn set_user_permissions(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
    Json(req): Json<SetPermissionsRequest>,
) -> Result<Json<UserAndPermissions>, ApiError> {
    ctx.require_permission(AppPermission::ManageUsers)?;

    // Only an administrator may mint another administrator.
    if req.permissions.contains(&AppPermission::Administrator) && !ctx.is_administrator() {
        return Err(ApiError::forbidden(
            "only an administrator can grant the administrator permission",
        ));
    }

    let user = state
        .users
        .get(uuid)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("user {uuid}")))?;

    tracing::info!(
        user = %ctx.user.name,
        target = %user.name,
        count = req.permissions.len(),
        "Replacing user permissions"
    );

    state
        .users
        .set_permissions(uuid, req.permissions.clone())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserAndPermissions::new(user, req.permissions)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_filter_covers_names_and_uuid() {
        let mut user = UserRef::named(Uuid::new_v4(), "jbloggs");
        user.display_name = Some("Joe Bloggs".into());
        user.full_name = Some("Joseph Bloggs".into());

        let mappers = user_mappers();
        assert!(mappers.matches("joe", &user));
        assert!(mappers.matches("jblo", &user));
        assert!(mappers.matches("full:joseph", &user));
        assert!(mappers.matches(&format!("uuid:{}", user.uuid), &user));
        assert!(!mappers.matches("full:someone", &user));
    }
}
