//! # vantage-api
//!
//! HTTP composition layer for the Vantage analytics platform.
//!
//! This crate provides the API surface for Vantage, handling:
//!
//! - **Authentication**: API key and debug-header identity
//! - **Authorization**: application and document permission checks
//! - **Routing**: the versioned resource endpoints
//! - **Observability**: request tracing and health checks
//!
//! ## Design Principles
//!
//! This crate is a **thin composition layer** with no domain policy.
//! The models live in `vantage-dashboard` and `vantage-security`; shared
//! primitives live in `vantage-core`.
//!
//! ## Endpoints
//!
//! ```text
//! GET  /health                  - Health check
//! GET  /ready                   - Readiness check
//! GET  /openapi.json            - OpenAPI document
//! /dashboard/v1                 - Dashboard CRUD + quick-filter validation
//! /apikey/v1                    - API key management and verification
//! /permission/doc/v1            - Document permission grants
//! /user/v1                      - User accounts and permission grants
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod store;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::{AppState, Server};
}
