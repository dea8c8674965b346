//! API server implementation.
//!
//! Provides health, ready and resource endpoints for the Vantage platform.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use vantage_core::Result;
use vantage_security::{AppPermission, UserRef};

use crate::config::Config;
use crate::openapi::ApiDoc;
use crate::routes;
use crate::store::{
    ApiKeyStore, DashboardStore, DocPermissionStore, MemoryApiKeyStore, MemoryDashboardStore,
    MemoryDocPermissionStore, MemoryUserStore, UserStore,
};

// ============================================================================
// Health and Ready Responses
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ReadyResponse {
    /// Service readiness status.
    pub ready: bool,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// User accounts and permission grants.
    pub users: Arc<dyn UserStore>,
    /// API key records.
    pub api_keys: Arc<dyn ApiKeyStore>,
    /// Dashboard documents.
    pub dashboards: Arc<dyn DashboardStore>,
    /// Per-document permission grants.
    pub doc_permissions: Arc<dyn DocPermissionStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("users", &"<UserStore>")
            .field("api_keys", &"<ApiKeyStore>")
            .field("dashboards", &"<DashboardStore>")
            .field("doc_permissions", &"<DocPermissionStore>")
            .finish()
    }
}

impl AppState {
    /// Creates application state over explicit stores.
    #[must_use]
    pub fn new(
        config: Config,
        users: Arc<dyn UserStore>,
        api_keys: Arc<dyn ApiKeyStore>,
        dashboards: Arc<dyn DashboardStore>,
        doc_permissions: Arc<dyn DocPermissionStore>,
    ) -> Self {
        Self {
            config,
            users,
            api_keys,
            dashboards,
            doc_permissions,
        }
    }

    /// Creates application state with in-memory stores (debug and tests).
    #[must_use]
    pub fn with_memory_stores(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryApiKeyStore::new()),
            Arc::new(MemoryDashboardStore::new()),
            Arc::new(MemoryDocPermissionStore::new()),
        )
    }

    /// Creates the bootstrap administrator account.
    ///
    /// Debug-mode servers need one user to exist before the user management
    /// endpoints become reachable.
    ///
    /// # Errors
    ///
    /// Returns an error when the account already exists.
    pub async fn seed_admin(&self) -> Result<UserRef> {
        let admin = UserRef::named(uuid::Uuid::new_v4(), "admin");
        let admin = self.users.create(admin).await?;
        self.users
            .set_permissions(
                admin.uuid,
                std::iter::once(AppPermission::Administrator).collect(),
            )
            .await?;
        Ok(admin)
    }
}

// ============================================================================
// Router assembly
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn ready() -> Json<ReadyResponse> {
    Json(ReadyResponse { ready: true })
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi as _;
    Json(ApiDoc::openapi())
}

fn cors_layer(config: &Config) -> Option<CorsLayer> {
    if config.cors_allowed_origins.is_empty() {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Builds the full application router over the given state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/openapi.json", get(openapi_spec))
        .merge(routes::resource_routes())
        .with_state(state.clone());

    if let Some(cors) = cors_layer(&state.config) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

// ============================================================================
// Server
// ============================================================================

/// The Vantage API server.
#[derive(Debug)]
pub struct Server {
    state: AppState,
}

impl Server {
    /// Creates a server over the given state.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Creates a server with in-memory stores.
    #[must_use]
    pub fn with_memory_stores(config: Config) -> Self {
        Self::new(AppState::with_memory_stores(config))
    }

    /// Returns the application state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns the router, for tests that drive requests directly.
    #[must_use]
    pub fn test_router(&self) -> Router {
        router(Arc::new(self.state.clone()))
    }

    /// Binds the configured address and serves until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error when binding or serving fails.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.state.config.bind_addr;
        let app = router(Arc::new(self.state));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr = %addr, "Vantage API listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    use vantage_security::{DocumentPermission, HashedApiKey};

    use crate::routes::api_keys::VerifyApiKeyResponse;
    use crate::routes::dashboards::{ListDashboardsResponse, ValidateExpressionResponse};
    use crate::store::DashboardDoc;

    async fn test_server() -> Result<(Server, UserRef)> {
        let server = Server::with_memory_stores(Config::default());
        let admin = server.state().seed_admin().await.context("seed admin")?;
        Ok((server, admin))
    }

    fn get_request(uri: &str, user: &UserRef) -> Result<Request<Body>> {
        Request::builder()
            .uri(uri)
            .header("X-User-Id", user.uuid.to_string())
            .body(Body::empty())
            .context("build request")
    }

    fn json_request(
        method: &str,
        uri: &str,
        user: &UserRef,
        body: &serde_json::Value,
    ) -> Result<Request<Body>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("X-User-Id", user.uuid.to_string())
            .body(Body::from(serde_json::to_vec(body)?))
            .context("build request")
    }

    async fn body_json<T: serde::de::DeserializeOwned>(
        response: axum::response::Response,
    ) -> Result<T> {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .context("read response body")?;
        serde_json::from_slice(&bytes).context("parse JSON body")
    }

    #[tokio::test]
    async fn test_health_endpoint() -> Result<()> {
        let (server, _) = test_server().await?;
        let response = server
            .test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .context("build request")?,
            )
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = body_json(response).await?;
        assert_eq!(health.status, "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_ready_endpoint() -> Result<()> {
        let (server, _) = test_server().await?;
        let response = server
            .test_router()
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .context("build request")?,
            )
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        assert_eq!(response.status(), StatusCode::OK);
        let ready: ReadyResponse = body_json(response).await?;
        assert!(ready.ready);
        Ok(())
    }

    #[tokio::test]
    async fn test_resource_routes_require_auth() -> Result<()> {
        let (server, _) = test_server().await?;
        let response = server
            .test_router()
            .oneshot(
                Request::builder()
                    .uri("/dashboard/v1")
                    .body(Body::empty())
                    .context("build request")?,
            )
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_crud_and_visibility() -> Result<()> {
        let (server, admin) = test_server().await?;

        // Create a dashboard as admin.
        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/dashboard/v1",
                &admin,
                &json!({"name": "CPU overview"}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let doc: DashboardDoc = body_json(response).await?;
        assert_eq!(doc.name, "CPU overview");

        // Fetch it back.
        let response = server
            .test_router()
            .oneshot(get_request(&format!("/dashboard/v1/{}", doc.uuid), &admin)?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::OK);

        // A fresh user without grants sees nothing and cannot fetch.
        let viewer = server
            .state()
            .users
            .create(UserRef::named(Uuid::new_v4(), "viewer"))
            .await
            .context("create viewer")?;

        let response = server
            .test_router()
            .oneshot(get_request(&format!("/dashboard/v1/{}", doc.uuid), &viewer)?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = server
            .test_router()
            .oneshot(get_request("/dashboard/v1", &viewer)?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let listed: ListDashboardsResponse = body_json(response).await?;
        assert!(listed.dashboards.is_empty());

        // Grant view and the dashboard appears.
        server
            .state()
            .doc_permissions
            .set(doc.uuid, viewer.uuid, DocumentPermission::View)
            .await
            .context("grant view")?;

        let response = server
            .test_router()
            .oneshot(get_request("/dashboard/v1?filter=cpu", &viewer)?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let listed: ListDashboardsResponse = body_json(response).await?;
        assert_eq!(listed.dashboards.len(), 1);

        // View is not enough to delete.
        let response = server
            .test_router()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/dashboard/v1/{}", doc.uuid))
                    .header("X-User-Id", viewer.uuid.to_string())
                    .body(Body::empty())
                    .context("build request")?,
            )
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    async fn test_validate_expression_endpoint() -> Result<()> {
        let (server, admin) = test_server().await?;

        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/dashboard/v1/validateExpression",
                &admin,
                &json!({"expression": "cpu uuid:1234"}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::OK);
        let result: ValidateExpressionResponse = body_json(response).await?;
        assert!(result.ok);
        assert_eq!(result.expression.context("expression")?.children.len(), 2);

        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/dashboard/v1/validateExpression",
                &admin,
                &json!({"expression": "bogus:field"}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let result: ValidateExpressionResponse = body_json(response).await?;
        assert!(!result.ok);
        assert!(result.error.context("error")?.contains("bogus"));
        Ok(())
    }

    #[tokio::test]
    async fn test_api_key_lifecycle_over_http() -> Result<()> {
        let (server, admin) = test_server().await?;

        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/apikey/v1",
                &admin,
                &json!({
                    "owner": {"uuid": admin.uuid, "name": admin.name},
                    "name": "ci",
                }),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: serde_json::Value = body_json(response).await?;
        let plain_key = created["apiKey"].as_str().context("apiKey")?.to_string();
        assert!(plain_key.starts_with("vgk_"));

        // The key authenticates requests as its owner.
        let response = server
            .test_router()
            .oneshot(
                Request::builder()
                    .uri("/dashboard/v1")
                    .header("Authorization", format!("Bearer {plain_key}"))
                    .body(Body::empty())
                    .context("build request")?,
            )
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::OK);

        // verifyApiKey reports the owner.
        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/apikey/v1/verifyApiKey",
                &admin,
                &json!({"apiKey": plain_key}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let verified: VerifyApiKeyResponse = body_json(response).await?;
        assert!(verified.valid);
        assert_eq!(verified.owner.context("owner")?.uuid, admin.uuid);

        // Disable the key and authentication stops working.
        let id = created["hashedApiKey"]["id"].as_u64().context("id")?;
        let response = server
            .test_router()
            .oneshot(json_request(
                "PUT",
                &format!("/apikey/v1/{id}/enabled"),
                &admin,
                &json!({"enabled": false}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let record: HashedApiKey = body_json(response).await?;
        assert!(!record.enabled);

        let response = server
            .test_router()
            .oneshot(
                Request::builder()
                    .uri("/dashboard/v1")
                    .header("Authorization", format!("Bearer {plain_key}"))
                    .body(Body::empty())
                    .context("build request")?,
            )
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_permission_checks_gate_user_management() -> Result<()> {
        let (server, admin) = test_server().await?;

        let nobody = server
            .state()
            .users
            .create(UserRef::named(Uuid::new_v4(), "nobody"))
            .await
            .context("create user")?;

        // Plain users cannot create other users.
        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/user/v1",
                &nobody,
                &json!({"name": "intruder"}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Admins can.
        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/user/v1",
                &admin,
                &json!({"name": "jbloggs", "displayName": "Joe Bloggs"}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let user: UserRef = body_json(response).await?;

        // Grant manage-users and the new user can list accounts.
        let response = server
            .test_router()
            .oneshot(json_request(
                "PUT",
                &format!("/user/v1/{}/permissions", user.uuid),
                &admin,
                &json!({"permissions": ["MANAGE_USERS"]}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::OK);

        let response = server
            .test_router()
            .oneshot(get_request("/user/v1?filter=joe", &user)?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_document_permission_endpoints() -> Result<()> {
        let (server, admin) = test_server().await?;

        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/dashboard/v1",
                &admin,
                &json!({"name": "Shared"}),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let doc: DashboardDoc = body_json(response).await?;

        let user = server
            .state()
            .users
            .create(UserRef::named(Uuid::new_v4(), "jbloggs"))
            .await
            .context("create user")?;

        // Grant edit over the API.
        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/permission/doc/v1/changeDocumentPermissions",
                &admin,
                &json!({
                    "docUuid": doc.uuid,
                    "add": [{"userUuid": user.uuid, "permission": "EDIT"}],
                }),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::OK);

        // Edit implies view but not ownership.
        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/permission/doc/v1/checkDocumentPermission",
                &admin,
                &json!({
                    "docUuid": doc.uuid,
                    "userUuid": user.uuid,
                    "permission": "VIEW",
                }),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let check: serde_json::Value = body_json(response).await?;
        assert_eq!(check["allowed"], true);

        let response = server
            .test_router()
            .oneshot(json_request(
                "POST",
                "/permission/doc/v1/checkDocumentPermission",
                &admin,
                &json!({
                    "docUuid": doc.uuid,
                    "userUuid": user.uuid,
                    "permission": "OWNER",
                }),
            )?)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        let check: serde_json::Value = body_json(response).await?;
        assert_eq!(check["allowed"], false);
        Ok(())
    }
}
