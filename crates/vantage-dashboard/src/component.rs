//! Dashboard components and their settings variants.
//!
//! Every panel on a dashboard is a [`ComponentConfig`] holding one of a
//! closed set of [`ComponentSettings`] variants. The variant is dispatched
//! on the wire by the `type` discriminator inside the settings object; the
//! component also carries the same string in its own `type` field, which
//! stored dashboards rely on.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vantage_core::{DocRef, Error, Result};

use crate::query::{Automate, QueryComponentSettings};
use crate::table::TableComponentSettings;

/// Settings for a visualisation component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisComponentSettings {
    /// ID of the table component feeding this visualisation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// The visualisation document to render with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualisation: Option<DocRef>,
    /// Visualisation-specific settings as opaque JSON text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
}

/// Settings for a text component showing source data for a selected row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextComponentSettings {
    /// Pipeline used to format the displayed record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<DocRef>,
    /// ID of the table component driving the selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Column holding the source stream ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id_field: Option<String>,
    /// Column holding the record number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_no_field: Option<String>,
    /// Column holding the first line of the highlighted region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_from_field: Option<String>,
    /// Column holding the first column of the highlighted region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_from_field: Option<String>,
    /// Column holding the last line of the highlighted region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_to_field: Option<String>,
    /// Column holding the last column of the highlighted region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_to_field: Option<String>,
    /// Render the record as HTML rather than escaped text.
    #[serde(default, skip_serializing_if = "is_false")]
    pub show_as_html: bool,
    /// Offer stepping from the displayed record.
    #[serde(default, skip_serializing_if = "is_false")]
    pub show_stepping: bool,
    /// Model version the settings were written with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Settings for a key/value input component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyValueInputComponentSettings {
    /// The parameter key this input populates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Initial value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Settings for a list input component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListInputComponentSettings {
    /// The parameter key this input populates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Fixed list of selectable values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Dictionary supplying the selectable values instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<DocRef>,
    /// Take values from the dictionary rather than the fixed list.
    #[serde(default, skip_serializing_if = "is_false")]
    pub use_dictionary: bool,
}

/// Settings for a free-text input component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextInputComponentSettings {
    /// The parameter key this input populates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Initial value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Settings for an embedded query component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedQueryComponentSettings {
    /// The stored query document to embed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_ref: Option<DocRef>,
    /// Automatic run/refresh behaviour.
    #[serde(default)]
    pub automate: Automate,
    /// Reference the stored query live rather than copying it in.
    #[serde(default, skip_serializing_if = "is_false")]
    pub reference: bool,
}

/// Settings for a table filter component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableFilterComponentSettings {
    /// ID of the table component being filtered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Quick-filter expressions applied to the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
}

/// The closed set of component settings variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum ComponentSettings {
    /// A query definition.
    #[serde(rename = "query")]
    Query(QueryComponentSettings),
    /// A results table.
    #[serde(rename = "table")]
    Table(TableComponentSettings),
    /// A visualisation.
    #[serde(rename = "vis")]
    Vis(VisComponentSettings),
    /// A source-data text panel.
    #[serde(rename = "text")]
    Text(TextComponentSettings),
    /// A key/value parameter input.
    #[serde(rename = "key-value-input")]
    KeyValueInput(KeyValueInputComponentSettings),
    /// A list parameter input.
    #[serde(rename = "list-input")]
    ListInput(ListInputComponentSettings),
    /// A free-text parameter input.
    #[serde(rename = "text-input")]
    TextInput(TextInputComponentSettings),
    /// An embedded stored query.
    #[serde(rename = "embedded-query")]
    EmbeddedQuery(EmbeddedQueryComponentSettings),
    /// A table filter.
    #[serde(rename = "table-filter")]
    TableFilter(TableFilterComponentSettings),
}

impl ComponentSettings {
    /// Returns the wire discriminator for this variant.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Query(_) => "query",
            Self::Table(_) => "table",
            Self::Vis(_) => "vis",
            Self::Text(_) => "text",
            Self::KeyValueInput(_) => "key-value-input",
            Self::ListInput(_) => "list-input",
            Self::TextInput(_) => "text-input",
            Self::EmbeddedQuery(_) => "embedded-query",
            Self::TableFilter(_) => "table-filter",
        }
    }
}

/// One configurable panel within a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    /// Component type; always matches the settings discriminator.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Unique component ID within the dashboard.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The variant-specific settings.
    pub settings: ComponentSettings,
}

impl ComponentConfig {
    /// Creates a component, deriving the type string from the settings.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        settings: ComponentSettings,
    ) -> Self {
        Self {
            component_type: settings.type_name().to_string(),
            id: id.into(),
            name: name.into(),
            settings,
        }
    }

    /// Checks that the declared type matches the settings variant.
    ///
    /// Stored dashboards carry both and they can drift when edited by hand.
    ///
    /// # Errors
    ///
    /// Returns an error when the declared type disagrees with the settings.
    pub fn validate(&self) -> Result<()> {
        if self.component_type == self.settings.type_name() {
            Ok(())
        } else {
            Err(Error::invalid_input(format!(
                "component '{}' declares type '{}' but has '{}' settings",
                self.id,
                self.component_type,
                self.settings.type_name()
            )))
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_dispatch_on_type_discriminator() {
        let settings = ComponentSettings::Table(TableComponentSettings::default());
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["type"], "table");

        let parsed: ComponentSettings = serde_json::from_value(serde_json::json!({
            "type": "text-input",
            "key": "feed",
        }))
        .unwrap();
        assert!(matches!(
            parsed,
            ComponentSettings::TextInput(TextInputComponentSettings { ref key, .. })
                if key.as_deref() == Some("feed")
        ));
    }

    #[test]
    fn new_derives_matching_type_string() {
        let component = ComponentConfig::new(
            "query-1",
            "Query",
            ComponentSettings::Query(QueryComponentSettings::default()),
        );
        assert_eq!(component.component_type, "query");
        assert!(component.validate().is_ok());
    }

    #[test]
    fn validate_catches_drifted_type() {
        let mut component = ComponentConfig::new(
            "query-1",
            "Query",
            ComponentSettings::Query(QueryComponentSettings::default()),
        );
        component.component_type = "table".into();
        assert!(component.validate().is_err());
    }

    #[test]
    fn component_roundtrips_with_both_type_fields() {
        let component = ComponentConfig::new(
            "vis-1",
            "CPU chart",
            ComponentSettings::Vis(VisComponentSettings {
                table_id: Some("table-1".into()),
                ..VisComponentSettings::default()
            }),
        );
        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["type"], "vis");
        assert_eq!(json["settings"]["type"], "vis");

        let back: ComponentConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, component);
    }
}
