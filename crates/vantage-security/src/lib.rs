//! # vantage-security
//!
//! Permission vocabulary and API key material for the Vantage analytics platform.
//!
//! This crate defines:
//!
//! - **Application Permissions**: named capabilities gating platform features
//! - **Document Permissions**: an ordered capability ladder for individual documents
//! - **Permission Sets**: a small algebra for expressing required permission
//!   combinations and checking them against a caller's held set
//! - **API Keys**: key generation, hashing and verification
//! - **Users**: user references and user/permission pairings
//!
//! Permission identifiers and document-permission ordinals are persisted
//! externally; both are append-only vocabularies.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod api_key;
pub mod app_permission;
pub mod doc_permission;
pub mod permission_set;
pub mod user;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::api_key::{
        ApiKeyHashAlgorithm, CreateHashedApiKeyRequest, CreateHashedApiKeyResponse, HashedApiKey,
    };
    pub use crate::app_permission::AppPermission;
    pub use crate::doc_permission::{names as doc_permission_names, DocumentPermission};
    pub use crate::permission_set::AppPermissionSet;
    pub use crate::user::{UserAndPermissions, UserRef};
}

pub use api_key::{
    ApiKeyHashAlgorithm, CreateHashedApiKeyRequest, CreateHashedApiKeyResponse, HashedApiKey,
};
pub use app_permission::AppPermission;
pub use doc_permission::DocumentPermission;
pub use permission_set::AppPermissionSet;
pub use user::{UserAndPermissions, UserRef};
