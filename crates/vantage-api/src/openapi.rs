//! `OpenAPI` specification generation for `vantage-api`.
//!
//! The generated spec is served at `/openapi.json` and used to generate
//! external clients.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// `OpenAPI` documentation for the Vantage REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vantage API",
        version = "0.4.0",
        description = "Vantage analytics platform REST API"
    ),
    paths(
        crate::routes::dashboards::create_dashboard,
        crate::routes::dashboards::list_dashboards,
        crate::routes::dashboards::fetch_dashboard,
        crate::routes::dashboards::update_dashboard,
        crate::routes::dashboards::delete_dashboard,
        crate::routes::dashboards::validate_expression,
        crate::routes::api_keys::create_api_key,
        crate::routes::api_keys::fetch_api_key,
        crate::routes::api_keys::delete_api_key,
        crate::routes::api_keys::set_api_key_enabled,
        crate::routes::api_keys::find_api_keys,
        crate::routes::api_keys::verify_api_key,
        crate::routes::doc_permissions::fetch_document_permissions,
        crate::routes::doc_permissions::change_document_permissions,
        crate::routes::doc_permissions::check_document_permission,
        crate::routes::doc_permissions::clear_document_permissions,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::users::fetch_user,
        crate::routes::users::set_user_permissions,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::store::DashboardDoc,
            crate::routes::dashboards::CreateDashboardRequest,
            crate::routes::dashboards::ListDashboardsResponse,
            crate::routes::dashboards::ValidateExpressionRequest,
            crate::routes::dashboards::ValidateExpressionResponse,
            crate::routes::api_keys::FindApiKeysRequest,
            crate::routes::api_keys::FindApiKeysResponse,
            crate::routes::api_keys::SetEnabledRequest,
            crate::routes::api_keys::VerifyApiKeyRequest,
            crate::routes::api_keys::VerifyApiKeyResponse,
            crate::routes::doc_permissions::FetchDocumentPermissionsRequest,
            crate::routes::doc_permissions::DocumentPermissionsResponse,
            crate::routes::doc_permissions::PermissionChange,
            crate::routes::doc_permissions::ChangeDocumentPermissionsRequest,
            crate::routes::doc_permissions::CheckDocumentPermissionRequest,
            crate::routes::doc_permissions::CheckDocumentPermissionResponse,
            crate::routes::users::CreateUserRequest,
            crate::routes::users::ListUsersResponse,
            crate::routes::users::SetPermissionsRequest,
            vantage_core::docref::DocRef,
            vantage_core::expression::Condition,
            vantage_core::expression::ExpressionItem,
            vantage_core::expression::ExpressionOperator,
            vantage_core::expression::ExpressionTerm,
            vantage_core::expression::Op,
            vantage_core::time::TimeCondition,
            vantage_core::time::TimeRange,
            vantage_dashboard::component::ComponentConfig,
            vantage_dashboard::component::ComponentSettings,
            vantage_dashboard::component::EmbeddedQueryComponentSettings,
            vantage_dashboard::component::KeyValueInputComponentSettings,
            vantage_dashboard::component::ListInputComponentSettings,
            vantage_dashboard::component::TableFilterComponentSettings,
            vantage_dashboard::component::TextComponentSettings,
            vantage_dashboard::component::TextInputComponentSettings,
            vantage_dashboard::component::VisComponentSettings,
            vantage_dashboard::config::DashboardConfig,
            vantage_dashboard::layout::LayoutConfig,
            vantage_dashboard::layout::LayoutConstraints,
            vantage_dashboard::layout::Size,
            vantage_dashboard::layout::SplitLayoutConfig,
            vantage_dashboard::layout::TabConfig,
            vantage_dashboard::layout::TabLayoutConfig,
            vantage_dashboard::query::Automate,
            vantage_dashboard::query::QueryComponentSettings,
            vantage_dashboard::table::Column,
            vantage_dashboard::table::ConditionalFormattingRule,
            vantage_dashboard::table::Sort,
            vantage_dashboard::table::SortDirection,
            vantage_dashboard::table::TableComponentSettings,
            vantage_security::api_key::ApiKeyHashAlgorithm,
            vantage_security::api_key::CreateHashedApiKeyRequest,
            vantage_security::api_key::CreateHashedApiKeyResponse,
            vantage_security::api_key::HashedApiKey,
            vantage_security::app_permission::AppPermission,
            vantage_security::doc_permission::DocumentPermission,
            vantage_security::permission_set::AppPermissionSet,
            vantage_security::user::UserAndPermissions,
            vantage_security::user::UserRef,
        )
    ),
    tags(
        (name = "dashboards", description = "Dashboard operations"),
        (name = "api-keys", description = "API key operations"),
        (name = "doc-permissions", description = "Document permission operations"),
        (name = "users", description = "User operations"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("API key")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi as _;

    #[test]
    fn spec_builds_and_covers_every_resource() {
        let spec = ApiDoc::openapi();
        let paths: Vec<_> = spec.paths.paths.keys().cloned().collect();
        assert!(paths.iter().any(|p| p.starts_with("/dashboard/v1")));
        assert!(paths.iter().any(|p| p.starts_with("/apikey/v1")));
        assert!(paths.iter().any(|p| p.starts_with("/permission/doc/v1")));
        assert!(paths.iter().any(|p| p.starts_with("/user/v1")));
    }
}
