//! # vantage-core
//!
//! Core abstractions for the Vantage analytics platform.
//!
//! This crate provides the foundational types used across all Vantage components:
//!
//! - **Document References**: Opaque, typed references to platform documents
//! - **Expression Trees**: Structured boolean expressions over named fields
//! - **Quick Filters**: Compact textual query syntax parsed into expressions
//! - **Time Ranges**: Absolute and relative query time windows
//! - **Error Types**: Shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! `vantage-core` is the **only** crate allowed to define shared primitives.
//! Domain models (dashboards, security) build on the types defined here.
//!
//! ## Example
//!
//! ```rust
//! use vantage_core::prelude::*;
//!
//! let doc = DocRef::new("Dashboard", uuid::Uuid::new_v4());
//! assert_eq!(doc.doc_type(), "Dashboard");
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod docref;
pub mod error;
pub mod expression;
pub mod observability;
pub mod quickfilter;
pub mod time;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use vantage_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::docref::DocRef;
    pub use crate::error::{Error, Result};
    pub use crate::expression::{
        Condition, ExpressionItem, ExpressionOperator, ExpressionTerm, Op,
    };
    pub use crate::quickfilter::{FilterFieldDefinition, FilterFieldMappers, QuickFilterParser};
    pub use crate::time::{TimeCondition, TimeRange};
}

// Re-export key types at crate root for ergonomics
pub use docref::DocRef;
pub use error::{Error, Result};
pub use expression::{Condition, ExpressionItem, ExpressionOperator, ExpressionTerm, Op};
pub use observability::{init_logging, LogFormat};
pub use quickfilter::{FilterFieldDefinition, FilterFieldMappers, QuickFilterParser};
pub use time::{TimeCondition, TimeRange};
