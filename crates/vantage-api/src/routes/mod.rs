//! HTTP route handlers.

pub mod api_keys;
pub mod dashboards;
pub mod doc_permissions;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

/// Versioned resource routes (authenticated).
pub fn resource_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(dashboards::routes())
        .merge(api_keys::routes())
        .merge(doc_permissions::routes())
        .merge(users::routes())
}
