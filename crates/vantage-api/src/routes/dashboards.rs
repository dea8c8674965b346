//! Dashboard API routes.
//!
//! ## Routes
//!
//! - `POST   /dashboard/v1` - Create a dashboard
//! - `GET    /dashboard/v1` - List dashboards (quick-filterable)
//! - `GET    /dashboard/v1/{uuid}` - Fetch a dashboard
//! - `PUT    /dashboard/v1/{uuid}` - Update a dashboard
//! - `DELETE /dashboard/v1/{uuid}` - Delete a dashboard
//! - `POST   /dashboard/v1/validateExpression` - Validate quick-filter input

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use vantage_core::quickfilter::{FilterFieldDefinition, FilterFieldMappers, QuickFilterParser};
use vantage_core::ExpressionOperator;
use vantage_dashboard::DashboardConfig;
use vantage_security::DocumentPermission;

use crate::context::{require_doc_permission, RequestContext};
use crate::error::{ApiError, ApiErrorBody};
use crate::server::AppState;
use crate::store::DashboardDoc;

/// Request to create a dashboard.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct CreateDashboardRequest {
    /// Display name.
    pub name: String,
    /// Initial configuration; a blank dashboard when absent.
    #[serde(default)]
    pub config: Option<DashboardConfig>,
}

/// List dashboards response.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct ListDashboardsResponse {
    /// The dashboards visible to the caller.
    pub dashboards: Vec<DashboardDoc>,
}

/// Query parameters for the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListDashboardsParams {
    /// Quick-filter input, e.g. `cpu uuid:1234`.
    pub filter: Option<String>,
}

/// Request to validate quick-filter input.
#[derive(Debug, Deserialize, ToSchema)]
#[cfg_attr(test, derive(serde::Serialize))]
#[serde(rename_all = "camelCase")]
pub struct ValidateExpressionRequest {
    /// The quick-filter input to validate.
    pub expression: String,
}

/// Result of validating quick-filter input.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct ValidateExpressionResponse {
    /// Whether the input parsed.
    pub ok: bool,
    /// The parsed expression, when the input was valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<ExpressionOperator>,
    /// The parse error, when the input was invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn filter_fields() -> Vec<FilterFieldDefinition> {
    vec![
        FilterFieldDefinition::default("name", "Name"),
        FilterFieldDefinition::qualified("uuid", "Uuid"),
    ]
}

fn doc_mappers() -> FilterFieldMappers<DashboardDoc> {
    FilterFieldMappers::new()
        .with_default_field("name", |doc: &DashboardDoc| Some(doc.name.clone()))
        .with_field("uuid", |doc: &DashboardDoc| Some(doc.uuid.to_string()))
}

/// Creates dashboard routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/dashboard/v1",
            post(create_dashboard).get(list_dashboards),
        )
        .route(
            "/dashboard/v1/:uuid",
            get(fetch_dashboard)
                .put(update_dashboard)
                .delete(delete_dashboard),
        )
        .route("/dashboard/v1/validateExpression", post(validate_expression))
}

/// Create a dashboard.
///
/// POST /dashboard/v1
#[utoipa::path(
    post,
    path = "/dashboard/v1",
    tag = "dashboards",
    request_body = CreateDashboardRequest,
    responses(
        (status = 201, description = "Dashboard created", body = DashboardDoc),
        (status = 400, description = "Invalid configuration", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn create_dashboard(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDashboardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let config = req.config.unwrap_or_default();
    config.validate().map_err(ApiError::from)?;

    tracing::info!(
        user = %ctx.user.name,
        name = %req.name,
        "Creating dashboard"
    );

    let doc = state
        .dashboards
        .create(req.name, config)
        .await
        .map_err(ApiError::from)?;

    // The creator owns the new document.
    state
        .doc_permissions
        .set(doc.uuid, ctx.user.uuid, DocumentPermission::Owner)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(doc)))
}

/// List dashboards the caller can view.
///
/// GET /dashboard/v1
#[utoipa::path(
    get,
    path = "/dashboard/v1",
    tag = "dashboards",
    params(("filter" = Option<String>, Query, description = "Quick-filter input")),
    responses(
        (status = 200, description = "Dashboards listed", body = ListDashboardsResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn list_dashboards(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDashboardsParams>,
) -> Result<Json<ListDashboardsResponse>, ApiError> {
    let all = state.dashboards.list().await.map_err(ApiError::from)?;

    let mut visible = Vec::with_capacity(all.len());
    for doc in all {
        if ctx.is_administrator()
            || state
                .doc_permissions
                .check(doc.uuid, ctx.user.uuid, DocumentPermission::View)
                .await
                .map_err(ApiError::from)?
        {
            visible.push(doc);
        }
    }

    let filter = params.filter.unwrap_or_default();
    let dashboards = doc_mappers().filter(&filter, visible);

    Ok(Json(ListDashboardsResponse { dashboards }))
}

/// Fetch a dashboard.
///
/// GET /dashboard/v1/{uuid}
#[utoipa::path(
    get,
    path = "/dashboard/v1/{uuid}",
    tag = "dashboards",
    params(("uuid" = Uuid, Path, description = "Dashboard UUID")),
    responses(
        (status = 200, description = "Dashboard fetched", body = DashboardDoc),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn fetch_dashboard(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
) -> Result<Json<DashboardDoc>, ApiError> {
    require_doc_permission(&state, &ctx, uuid, DocumentPermission::View).await?;

    let doc = state
        .dashboards
        .get(uuid)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found(format!("dashboard {uuid}")))?;

    Ok(Json(doc))
}

/// Update a dashboard.
///
/// PUT /dashboard/v1/{uuid}
#[utoipa::path(
    put,
    path = "/dashboard/v1/{uuid}",
    tag = "dashboards",
    params(("uuid" = Uuid, Path, description = "Dashboard UUID")),
    request_body = DashboardDoc,
    responses(
        (status = 200, description = "Dashboard updated", body = DashboardDoc),
        (status = 400, description = "Invalid configuration", body = ApiErrorBody),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn update_dashboard(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
    Json(mut doc): Json<DashboardDoc>,
) -> Result<Json<DashboardDoc>, ApiError> {
    require_doc_permission(&state, &ctx, uuid, DocumentPermission::Edit).await?;

    if doc.uuid != uuid {
        return Err(ApiError::bad_request("document uuid does not match path"));
    }
    doc.config.validate().map_err(ApiError::from)?;

    tracing::info!(
        user = %ctx.user.name,
        dashboard = %uuid,
        "Updating dashboard"
    );

    let doc = state.dashboards.update(doc).await.map_err(ApiError::from)?;
    Ok(Json(doc))
}

/// Delete a dashboard.
///
/// DELETE /dashboard/v1/{uuid}
#[utoipa::path(
    delete,
    path = "/dashboard/v1/{uuid}",
    tag = "dashboards",
    params(("uuid" = Uuid, Path, description = "Dashboard UUID")),
    responses(
        (status = 204, description = "Dashboard deleted"),
        (status = 403, description = "Forbidden", body = ApiErrorBody),
        (status = 404, description = "Not found", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn delete_dashboard(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    Path(uuid): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_doc_permission(&state, &ctx, uuid, DocumentPermission::Delete).await?;

    let existed = state
        .dashboards
        .delete(uuid)
        .await
        .map_err(ApiError::from)?;
    if !existed {
        return Err(ApiError::not_found(format!("dashboard {uuid}")));
    }

    // Grants on a deleted document are dead weight.
    state
        .doc_permissions
        .clear(uuid)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Validate quick-filter input against the dashboard filter fields.
///
/// POST /dashboard/v1/validateExpression
#[utoipa::path(
    post,
    path = "/dashboard/v1/validateExpression",
    tag = "dashboards",
    request_body = ValidateExpressionRequest,
    responses(
        (status = 200, description = "Validation result", body = ValidateExpressionResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
    security(("bearerAuth" = []))
)]
pub(crate) async fn validate_expression(
    _ctx: RequestContext,
    Json(req): Json<ValidateExpressionRequest>,
) -> Json<ValidateExpressionResponse> {
    let parser = QuickFilterParser::new(filter_fields());
    match parser.parse(&req.expression) {
        Ok(expression) => Json(ValidateExpressionResponse {
            ok: true,
            expression: Some(expression),
            error: None,
        }),
        Err(err) => Json(ValidateExpressionResponse {
            ok: false,
            expression: None,
            error: Some(err.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_config() {
        let request: CreateDashboardRequest =
            serde_json::from_value(serde_json::json!({"name": "Overview"})).unwrap();
        assert!(request.config.is_none());
    }

    #[test]
    fn doc_filter_matches_name_and_uuid() {
        let doc = DashboardDoc {
            uuid: Uuid::new_v4(),
            name: "CPU overview".into(),
            config: DashboardConfig::default(),
        };
        let mappers = doc_mappers();
        assert!(mappers.matches("cpu", &doc));
        assert!(mappers.matches(&format!("uuid:{}", doc.uuid), &doc));
        assert!(!mappers.matches("memory", &doc));
    }
}
