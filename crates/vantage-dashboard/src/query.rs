//! Query component settings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vantage_core::{DocRef, ExpressionOperator, Op};

/// Automatic query behaviour: run on open and/or refresh on an interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Automate {
    /// Run the query as soon as the dashboard opens.
    #[serde(default, skip_serializing_if = "is_false")]
    pub open: bool,
    /// Re-run the query on an interval while the dashboard is open.
    #[serde(default, skip_serializing_if = "is_false")]
    pub refresh: bool,
    /// Refresh interval expression, e.g. `10s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<String>,
}

impl Default for Automate {
    fn default() -> Self {
        Self {
            open: false,
            refresh: false,
            refresh_interval: Some("10s".to_string()),
        }
    }
}

/// Settings for a query component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryComponentSettings {
    /// The data source queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DocRef>,
    /// The query expression.
    pub expression: ExpressionOperator,
    /// Automatic run/refresh behaviour.
    #[serde(default)]
    pub automate: Automate,
    /// Key of the most recent query execution, for result correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_query_key: Option<String>,
}

impl Default for QueryComponentSettings {
    fn default() -> Self {
        Self {
            data_source: None,
            expression: ExpressionOperator::new(Op::And),
            automate: Automate::default(),
            last_query_key: None,
        }
    }
}

impl QueryComponentSettings {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> QueryComponentSettingsBuilder {
        QueryComponentSettingsBuilder::default()
    }

    /// Returns a builder seeded with this value, for making modified copies.
    #[must_use]
    pub fn copy(&self) -> QueryComponentSettingsBuilder {
        QueryComponentSettingsBuilder {
            settings: self.clone(),
        }
    }
}

/// Builder for [`QueryComponentSettings`].
#[derive(Debug, Default)]
pub struct QueryComponentSettingsBuilder {
    settings: QueryComponentSettings,
}

impl QueryComponentSettingsBuilder {
    /// Sets the data source.
    #[must_use]
    pub fn data_source(mut self, data_source: DocRef) -> Self {
        self.settings.data_source = Some(data_source);
        self
    }

    /// Sets the query expression.
    #[must_use]
    pub fn expression(mut self, expression: ExpressionOperator) -> Self {
        self.settings.expression = expression;
        self
    }

    /// Sets the automatic run/refresh behaviour.
    #[must_use]
    pub fn automate(mut self, automate: Automate) -> Self {
        self.settings.automate = automate;
        self
    }

    /// Sets the last query key.
    #[must_use]
    pub fn last_query_key(mut self, key: impl Into<String>) -> Self {
        self.settings.last_query_key = Some(key.into());
        self
    }

    /// Builds the settings.
    #[must_use]
    pub fn build(self) -> QueryComponentSettings {
        self.settings
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}
