//! Request context extraction and authentication.
//!
//! In debug mode, identity is supplied via the `X-User-Id` header for local
//! development. Otherwise callers authenticate with an API key in the
//! `Authorization: Bearer` header, verified against the key store.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use ulid::Ulid;
use uuid::Uuid;

use vantage_security::{AppPermission, AppPermissionSet, UserRef};

use crate::error::ApiError;
use crate::server::AppState;

/// Header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header carrying the caller identity in debug mode.
pub const DEBUG_USER_HEADER: &str = "X-User-Id";

/// Per-request context derived from authentication.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated caller.
    pub user: UserRef,
    /// Application permissions the caller holds.
    pub held_permissions: BTreeSet<AppPermission>,
    /// Request ID for tracing/correlation.
    pub request_id: String,
}

impl RequestContext {
    /// Returns true when the caller holds the administrator permission.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.held_permissions.contains(&AppPermission::Administrator)
    }

    /// Checks a required permission set against the caller's held set.
    ///
    /// Administrators pass every check.
    ///
    /// # Errors
    ///
    /// Returns a 403 error naming the requirement when the check fails.
    pub fn require(&self, required: &AppPermissionSet) -> Result<(), ApiError> {
        if self.is_administrator() || required.check(&self.held_permissions) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "requires {required} permission"
            )))
        }
    }

    /// Convenience form of [`require`](Self::require) for a single permission.
    ///
    /// # Errors
    ///
    /// Returns a 403 error when the check fails.
    pub fn require_permission(&self, required: AppPermission) -> Result<(), ApiError> {
        self.require(&AppPermissionSet::single(required))
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
        .filter(|s| !s.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    header_string(headers, "Authorization")
        .and_then(|v| v.strip_prefix("Bearer ").map(ToString::to_string))
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(existing.clone());
        }

        let headers = &parts.headers;
        let request_id =
            header_string(headers, REQUEST_ID_HEADER).unwrap_or_else(|| Ulid::new().to_string());

        let user = if state.config.debug {
            if let Some(user_id) = header_string(headers, DEBUG_USER_HEADER) {
                let uuid: Uuid = user_id
                    .parse()
                    .map_err(|_| ApiError::unauthorized("X-User-Id is not a UUID"))?;
                state
                    .users
                    .get(uuid)
                    .await
                    .map_err(ApiError::from)?
                    .ok_or_else(ApiError::invalid_token)?
            } else {
                authenticate_api_key(state, headers).await?
            }
        } else {
            authenticate_api_key(state, headers).await?
        };

        if !user.enabled {
            return Err(ApiError::forbidden("account is disabled"));
        }

        let held_permissions = state
            .users
            .held_permissions(user.uuid)
            .await
            .map_err(ApiError::from)?;

        let context = Self {
            user,
            held_permissions,
            request_id,
        };
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}

/// Checks a document permission for the caller.
///
/// Administrators pass every check; everyone else needs a grant covering the
/// required level.
///
/// # Errors
///
/// Returns a 403 error when the check fails.
pub async fn require_doc_permission(
    state: &Arc<AppState>,
    ctx: &RequestContext,
    doc_uuid: Uuid,
    required: vantage_security::DocumentPermission,
) -> Result<(), ApiError> {
    if ctx.is_administrator() {
        return Ok(());
    }
    let allowed = state
        .doc_permissions
        .check(doc_uuid, ctx.user.uuid, required)
        .await
        .map_err(ApiError::from)?;
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "requires {required} permission on document {doc_uuid}"
        )))
    }
}

async fn authenticate_api_key(
    state: &Arc<AppState>,
    headers: &HeaderMap,
) -> Result<UserRef, ApiError> {
    let token = bearer_token(headers).ok_or_else(ApiError::missing_auth)?;
    state
        .api_keys
        .verify(&token)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(ApiError::invalid_token)
}
