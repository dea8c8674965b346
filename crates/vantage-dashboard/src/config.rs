//! The dashboard configuration root aggregate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vantage_core::{Error, Result, TimeRange};

use crate::component::ComponentConfig;
use crate::layout::{LayoutConfig, LayoutConstraints, Size};

/// A complete dashboard configuration.
///
/// Dashboards are immutable value objects: edits produce a modified copy via
/// [`DashboardConfig::copy`]. The wire shape (field names, omission rules) is
/// a published contract for stored dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Parameter string applied to all queries, e.g. `feed=events`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    /// Default query time range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    /// The components, in creation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentConfig>,
    /// The layout tree arranging the components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutConfig>,
    /// How the dashboard stretches to fill its container.
    #[serde(default)]
    pub layout_constraints: LayoutConstraints,
    /// Preferred overall size.
    #[serde(default)]
    pub preferred_size: Size,
    /// Whether the dashboard opens in design mode.
    #[serde(default, skip_serializing_if = "is_false")]
    pub design_mode: bool,
    /// Model version the config was written with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl DashboardConfig {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Returns a builder seeded with this value, for making modified copies.
    #[must_use]
    pub fn copy(&self) -> DashboardConfigBuilder {
        DashboardConfigBuilder {
            config: self.clone(),
        }
    }

    /// Finds a component by ID.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&ComponentConfig> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Validates the structural invariants of the config.
    ///
    /// - component IDs are unique
    /// - every layout tab refers to an existing component
    /// - split dimensions are `0` or `1`
    /// - each component's declared type matches its settings
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for component in &self.components {
            component.validate()?;
            if !ids.insert(component.id.as_str()) {
                return Err(Error::invalid_input(format!(
                    "duplicate component id '{}'",
                    component.id
                )));
            }
        }

        if let Some(layout) = &self.layout {
            let mut violation = None;
            layout.visit(&mut |node| {
                if violation.is_some() {
                    return;
                }
                match node {
                    LayoutConfig::Split(split) => {
                        if split.dimension > 1 {
                            violation = Some(Error::invalid_input(format!(
                                "invalid split dimension {}",
                                split.dimension
                            )));
                        }
                    }
                    LayoutConfig::Tab(tab_layout) => {
                        for tab in &tab_layout.tabs {
                            if !ids.contains(tab.id.as_str()) {
                                violation = Some(Error::invalid_input(format!(
                                    "layout tab refers to unknown component '{}'",
                                    tab.id
                                )));
                                return;
                            }
                        }
                    }
                }
            });
            if let Some(err) = violation {
                return Err(err);
            }
        }

        Ok(())
    }
}

/// Builder for [`DashboardConfig`].
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    config: DashboardConfig,
}

impl DashboardConfigBuilder {
    /// Sets the parameter string.
    #[must_use]
    pub fn parameters(mut self, parameters: impl Into<String>) -> Self {
        self.config.parameters = Some(parameters.into());
        self
    }

    /// Sets the default time range.
    #[must_use]
    pub fn time_range(mut self, time_range: TimeRange) -> Self {
        self.config.time_range = Some(time_range);
        self
    }

    /// Replaces the component list.
    #[must_use]
    pub fn components(mut self, components: Vec<ComponentConfig>) -> Self {
        self.config.components = components;
        self
    }

    /// Appends a component.
    #[must_use]
    pub fn add_component(mut self, component: ComponentConfig) -> Self {
        self.config.components.push(component);
        self
    }

    /// Sets the layout tree.
    #[must_use]
    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = Some(layout);
        self
    }

    /// Sets the layout constraints.
    #[must_use]
    pub fn layout_constraints(mut self, layout_constraints: LayoutConstraints) -> Self {
        self.config.layout_constraints = layout_constraints;
        self
    }

    /// Sets the preferred size.
    #[must_use]
    pub fn preferred_size(mut self, preferred_size: Size) -> Self {
        self.config.preferred_size = preferred_size;
        self
    }

    /// Sets design mode.
    #[must_use]
    pub fn design_mode(mut self, design_mode: bool) -> Self {
        self.config.design_mode = design_mode;
        self
    }

    /// Sets the model version.
    #[must_use]
    pub fn model_version(mut self, model_version: impl Into<String>) -> Self {
        self.config.model_version = Some(model_version.into());
        self
    }

    /// Builds the config.
    #[must_use]
    pub fn build(self) -> DashboardConfig {
        self.config
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSettings;
    use crate::layout::{SplitLayoutConfig, TabConfig, TabLayoutConfig};
    use crate::query::QueryComponentSettings;
    use crate::table::TableComponentSettings;

    fn query_component(id: &str) -> ComponentConfig {
        ComponentConfig::new(
            id,
            "Query",
            ComponentSettings::Query(QueryComponentSettings::default()),
        )
    }

    fn sample_config() -> DashboardConfig {
        DashboardConfig::builder()
            .parameters("feed=events")
            .time_range(TimeRange::last_day())
            .add_component(query_component("query-1"))
            .add_component(ComponentConfig::new(
                "table-1",
                "Table",
                ComponentSettings::Table(TableComponentSettings::default()),
            ))
            .layout(LayoutConfig::Split(SplitLayoutConfig::new(
                1,
                vec![
                    LayoutConfig::single("query-1"),
                    LayoutConfig::single("table-1"),
                ],
            )))
            .model_version("7.4")
            .build()
    }

    #[test]
    fn builder_copy_roundtrips() {
        let config = sample_config();
        assert_eq!(config.copy().build(), config);
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn duplicate_component_ids_fail_validation() {
        let config = DashboardConfig::builder()
            .add_component(query_component("dup"))
            .add_component(query_component("dup"))
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate component id"));
    }

    #[test]
    fn dangling_layout_tab_fails_validation() {
        let config = DashboardConfig::builder()
            .add_component(query_component("query-1"))
            .layout(LayoutConfig::Tab(TabLayoutConfig::new(vec![
                TabConfig::new("missing"),
            ])))
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown component 'missing'"));
    }

    #[test]
    fn bad_split_dimension_fails_validation() {
        let config = DashboardConfig::builder()
            .add_component(query_component("query-1"))
            .layout(LayoutConfig::Split(SplitLayoutConfig::new(
                2,
                vec![LayoutConfig::single("query-1")],
            )))
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid split dimension"));
    }

    #[test]
    fn design_mode_is_omitted_when_false() {
        let json = serde_json::to_value(sample_config()).unwrap();
        assert!(json.get("designMode").is_none());
        assert_eq!(json["parameters"], "feed=events");
        assert_eq!(json["layoutConstraints"]["fitWidth"], true);
    }

    #[test]
    fn roundtrips_through_json() {
        let config = sample_config();
        let json = serde_json::to_string(&config).unwrap();
        let back: DashboardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
