//! # vantage-dashboard
//!
//! The dashboard configuration model for the Vantage analytics platform.
//!
//! A dashboard is an immutable configuration tree:
//!
//! - [`DashboardConfig`] — the root aggregate: parameters, time range,
//!   components and the layout tree
//! - [`ComponentConfig`] — one configurable panel, with a closed set of
//!   settings variants (query, table, visualisation, text, inputs, ...)
//! - [`LayoutConfig`] — a recursive split/tab layout tree referencing
//!   components by ID
//!
//! The JSON wire shapes of these types are a published contract: field
//! names, property order and omission rules must not change between
//! releases without a model version bump.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod config;
pub mod layout;
pub mod query;
pub mod table;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::component::{ComponentConfig, ComponentSettings};
    pub use crate::config::DashboardConfig;
    pub use crate::layout::{
        LayoutConfig, LayoutConstraints, Size, SplitLayoutConfig, TabConfig, TabLayoutConfig,
    };
    pub use crate::query::{Automate, QueryComponentSettings};
    pub use crate::table::{Column, ConditionalFormattingRule, TableComponentSettings};
}

pub use component::{ComponentConfig, ComponentSettings};
pub use config::DashboardConfig;
pub use layout::{LayoutConfig, LayoutConstraints, Size, SplitLayoutConfig, TabConfig, TabLayoutConfig};
pub use query::{Automate, QueryComponentSettings};
pub use table::{Column, ConditionalFormattingRule, TableComponentSettings};
