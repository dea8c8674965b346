//! Table component settings.
//!
//! The column list is serialized under the legacy `fields` key for backward
//! compatibility with stored dashboards; accessors use the current "columns"
//! terminology.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vantage_core::{DocRef, ExpressionOperator};

/// Sort applied to a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    /// Position in the overall sort, `0` first.
    pub order: u32,
    /// Sort direction.
    pub direction: SortDirection,
}

/// Direction of a column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    /// Ascending.
    Ascending,
    /// Descending.
    Descending,
}

/// One column of a table component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Unique column ID within the table.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Value expression, e.g. `${Feed}` or an aggregate call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Sort applied to this column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    /// Grouping level, `0` outermost; ungrouped when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i32>,
    /// Column width in pixels.
    #[serde(default = "default_width")]
    pub width: i32,
    /// Hidden columns stay in the model but are not rendered.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Special columns are maintained by the system, not the user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub special: bool,
}

impl Column {
    /// Creates a visible, unsorted column.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expression: None,
            sort: None,
            group: None,
            width: default_width(),
            visible: true,
            special: false,
        }
    }

    /// Sets the value expression.
    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

/// A conditional formatting rule applied to table rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalFormattingRule {
    /// Unique rule ID within the table.
    pub id: String,
    /// Rows matching this expression get the rule's formatting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<ExpressionOperator>,
    /// Hide matching rows entirely.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hide: bool,
    /// Background colour, e.g. `#ffeeee`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Text colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Disabled rules are kept but not applied.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Settings for a table component.
///
/// Boolean options are tri-state on the wire (absent / true / false) so that
/// stored dashboards keep their meaning as defaults evolve; the plain
/// accessor methods apply the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableComponentSettings {
    /// ID of the query component feeding this table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    /// The data source the feeding query runs against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_ref: Option<DocRef>,
    /// Columns, serialized as `fields` for backward compatibility.
    #[serde(rename = "fields", default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    /// Extract field values using an extraction pipeline. Defaults to true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_values: Option<bool>,
    /// Use the data source's default extraction pipeline. Defaults to false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_default_extraction_pipeline: Option<bool>,
    /// Explicit extraction pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_pipeline: Option<DocRef>,
    /// Maximum results per grouping level, e.g. `[1000, 10, 1]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub max_results: Vec<i64>,
    /// Maximum rows displayed at once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i32>,
    /// Include grouped detail rows as well as aggregates. Defaults to false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_detail: Option<bool>,
    /// Conditional formatting rules, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_formatting_rules: Vec<ConditionalFormattingRule>,
    /// Model version the settings were written with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    /// Apply column value filters while searching. Defaults to false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_value_filters: Option<bool>,
    /// Truncate string fields to this many characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_string_field_length: Option<i32>,
    /// Allow `max_string_field_length` to exceed the system limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_max_string_field_length: Option<bool>,
}

impl TableComponentSettings {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> TableComponentSettingsBuilder {
        TableComponentSettingsBuilder::default()
    }

    /// Returns a builder seeded with this value, for making modified copies.
    #[must_use]
    pub fn copy(&self) -> TableComponentSettingsBuilder {
        TableComponentSettingsBuilder {
            settings: self.clone(),
        }
    }

    /// Whether values are extracted; true unless explicitly disabled.
    #[must_use]
    pub fn extract_values(&self) -> bool {
        self.extract_values != Some(false)
    }

    /// Whether the default extraction pipeline is used; requires opt-in.
    #[must_use]
    pub fn use_default_extraction_pipeline(&self) -> bool {
        self.use_default_extraction_pipeline == Some(true)
    }

    /// Whether grouped detail rows are included; requires opt-in.
    #[must_use]
    pub fn show_detail(&self) -> bool {
        self.show_detail == Some(true)
    }

    /// Whether column value filters apply; requires opt-in.
    #[must_use]
    pub fn apply_value_filters(&self) -> bool {
        self.apply_value_filters == Some(true)
    }

    /// Whether the string length limit may exceed the system maximum.
    #[must_use]
    pub fn override_max_string_field_length(&self) -> bool {
        self.override_max_string_field_length == Some(true)
    }
}

/// Builder for [`TableComponentSettings`].
#[derive(Debug, Default)]
pub struct TableComponentSettingsBuilder {
    settings: TableComponentSettings,
}

impl TableComponentSettingsBuilder {
    /// Sets the feeding query ID.
    #[must_use]
    pub fn query_id(mut self, query_id: impl Into<String>) -> Self {
        self.settings.query_id = Some(query_id.into());
        self
    }

    /// Sets the data source reference.
    #[must_use]
    pub fn data_source_ref(mut self, data_source_ref: DocRef) -> Self {
        self.settings.data_source_ref = Some(data_source_ref);
        self
    }

    /// Replaces the column list.
    #[must_use]
    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.settings.columns = columns;
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn add_column(mut self, column: Column) -> Self {
        self.settings.columns.push(column);
        self
    }

    /// Sets value extraction on or off.
    #[must_use]
    pub fn extract_values(mut self, extract_values: bool) -> Self {
        // True is the default, so only an explicit false is stored.
        self.settings.extract_values = if extract_values { None } else { Some(false) };
        self
    }

    /// Opts in to the default extraction pipeline.
    #[must_use]
    pub fn use_default_extraction_pipeline(mut self, value: bool) -> Self {
        self.settings.use_default_extraction_pipeline = if value { Some(true) } else { None };
        self
    }

    /// Sets the extraction pipeline.
    #[must_use]
    pub fn extraction_pipeline(mut self, extraction_pipeline: DocRef) -> Self {
        self.settings.extraction_pipeline = Some(extraction_pipeline);
        self
    }

    /// Sets the per-level result limits.
    #[must_use]
    pub fn max_results(mut self, max_results: Vec<i64>) -> Self {
        self.settings.max_results = max_results;
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn page_size(mut self, page_size: i32) -> Self {
        self.settings.page_size = Some(page_size);
        self
    }

    /// Sets whether grouped detail rows are included.
    #[must_use]
    pub fn show_detail(mut self, show_detail: bool) -> Self {
        self.settings.show_detail = Some(show_detail);
        self
    }

    /// Replaces the conditional formatting rules.
    #[must_use]
    pub fn conditional_formatting_rules(mut self, rules: Vec<ConditionalFormattingRule>) -> Self {
        self.settings.conditional_formatting_rules = rules;
        self
    }

    /// Sets the model version.
    #[must_use]
    pub fn model_version(mut self, model_version: impl Into<String>) -> Self {
        self.settings.model_version = Some(model_version.into());
        self
    }

    /// Sets whether column value filters apply.
    #[must_use]
    pub fn apply_value_filters(mut self, apply: bool) -> Self {
        self.settings.apply_value_filters = Some(apply);
        self
    }

    /// Sets the string field truncation length.
    #[must_use]
    pub fn max_string_field_length(mut self, length: i32) -> Self {
        self.settings.max_string_field_length = Some(length);
        self
    }

    /// Builds the settings.
    #[must_use]
    pub fn build(self) -> TableComponentSettings {
        self.settings
    }
}

fn default_width() -> i32 {
    200
}

fn default_true() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_serialize_under_legacy_fields_key() {
        let settings = TableComponentSettings::builder()
            .query_id("query-1")
            .add_column(Column::new("col-1", "Feed").with_expression("${Feed}"))
            .build();

        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("fields").is_some());
        assert!(json.get("columns").is_none());
        assert_eq!(json["fields"][0]["name"], "Feed");
    }

    #[test]
    fn builder_copy_roundtrips() {
        let settings = TableComponentSettings::builder()
            .query_id("query-1")
            .add_column(Column::new("col-1", "Feed"))
            .max_results(vec![1000, 10, 1])
            .page_size(100)
            .show_detail(true)
            .build();

        assert_eq!(settings.copy().build(), settings);
    }

    #[test]
    fn boolean_accessors_apply_defaults() {
        let settings = TableComponentSettings::default();
        assert!(settings.extract_values());
        assert!(!settings.show_detail());
        assert!(!settings.use_default_extraction_pipeline());
        assert!(!settings.apply_value_filters());

        let settings = TableComponentSettings::builder().extract_values(false).build();
        assert!(!settings.extract_values());
        // Only the explicit false is stored.
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["extractValues"], false);
    }

    #[test]
    fn empty_settings_serialize_to_empty_object() {
        let json = serde_json::to_value(TableComponentSettings::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn column_defaults_fill_on_deserialize() {
        let column: Column = serde_json::from_value(serde_json::json!({
            "id": "col-1",
            "name": "Feed",
        }))
        .unwrap();
        assert_eq!(column.width, 200);
        assert!(column.visible);
        assert!(!column.special);
    }
}
