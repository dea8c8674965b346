//! The dashboard layout tree.
//!
//! A layout is a recursive tree of split nodes and tab nodes. Tab nodes hold
//! [`TabConfig`] entries referencing components by ID; split nodes divide the
//! available space along one dimension between child layouts.
//!
//! The tree is plain owned data. Parent relationships are computed on demand
//! by walking down from the root ([`LayoutConfig::parent_of`]) rather than
//! stored as back-pointers, so configs can be cloned and serialized freely.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A preferred size in pixels, serialized as a `[width, height]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Size {
    /// Width and height.
    pub size: [i32; 2],
}

impl Size {
    /// Creates a size from width and height.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: [width, height],
        }
    }

    /// Returns the width component.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.size[0]
    }

    /// Returns the height component.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.size[1]
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(200, 200)
    }
}

/// Constraints on how a dashboard stretches to fill its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConstraints {
    /// Stretch horizontally to fill the container.
    pub fit_width: bool,
    /// Stretch vertically to fill the container.
    pub fit_height: bool,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            fit_width: true,
            fit_height: true,
        }
    }
}

/// One tab within a tab layout, referencing a component by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TabConfig {
    /// The ID of the component shown in this tab.
    pub id: String,
    /// Hidden tabs stay in the model but are not rendered.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl TabConfig {
    /// Creates a visible tab for the given component.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            visible: true,
        }
    }
}

/// A node in the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum LayoutConfig {
    /// Divides space along one dimension between child layouts.
    #[serde(rename = "splitLayout")]
    Split(SplitLayoutConfig),
    /// Stacks components behind selectable tabs.
    #[serde(rename = "tabLayout")]
    Tab(TabLayoutConfig),
}

/// A split node dividing space between child layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SplitLayoutConfig {
    /// Preferred size of this subtree.
    #[serde(default)]
    pub preferred_size: Size,
    /// Split dimension: `0` horizontal, `1` vertical.
    pub dimension: u8,
    /// Child layouts, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutConfig>,
}

impl SplitLayoutConfig {
    /// Creates a split along the given dimension.
    #[must_use]
    pub fn new(dimension: u8, children: Vec<LayoutConfig>) -> Self {
        Self {
            preferred_size: Size::default(),
            dimension,
            children,
        }
    }
}

/// A tab node stacking components behind selectable tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TabLayoutConfig {
    /// Preferred size of this subtree.
    #[serde(default)]
    pub preferred_size: Size,
    /// The tabs, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<TabConfig>,
    /// Index of the selected tab.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<u32>,
}

impl TabLayoutConfig {
    /// Creates a tab layout over the given tabs, selecting the first.
    #[must_use]
    pub fn new(tabs: Vec<TabConfig>) -> Self {
        let selected = if tabs.is_empty() { None } else { Some(0) };
        Self {
            preferred_size: Size::default(),
            tabs,
            selected,
        }
    }

    /// Returns the visible tabs in display order.
    pub fn visible_tabs(&self) -> impl Iterator<Item = &TabConfig> {
        self.tabs.iter().filter(|t| t.visible)
    }
}

impl LayoutConfig {
    /// Wraps a single component in a tab layout.
    #[must_use]
    pub fn single(component_id: impl Into<String>) -> Self {
        Self::Tab(TabLayoutConfig::new(vec![TabConfig::new(component_id)]))
    }

    /// Visits every node in the tree, depth first, parents before children.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a LayoutConfig)) {
        f(self);
        if let Self::Split(split) = self {
            for child in &split.children {
                child.visit(f);
            }
        }
    }

    /// Iterates every tab in the tree, in display order.
    #[must_use]
    pub fn all_tabs(&self) -> Vec<&TabConfig> {
        let mut tabs = Vec::new();
        self.visit(&mut |node| {
            if let Self::Tab(tab_layout) = node {
                tabs.extend(tab_layout.tabs.iter());
            }
        });
        tabs
    }

    /// Finds the tab showing the given component, if any.
    #[must_use]
    pub fn find_tab(&self, component_id: &str) -> Option<&TabConfig> {
        self.all_tabs().into_iter().find(|t| t.id == component_id)
    }

    /// Returns the tab layout containing the given component's tab.
    ///
    /// This is the "parent" query: computed by walking down from the root
    /// instead of being stored on the child.
    #[must_use]
    pub fn parent_of(&self, component_id: &str) -> Option<&TabLayoutConfig> {
        let mut found = None;
        self.visit(&mut |node| {
            if found.is_none() {
                if let Self::Tab(tab_layout) = node {
                    if tab_layout.tabs.iter().any(|t| t.id == component_id) {
                        found = Some(tab_layout);
                    }
                }
            }
        });
        found
    }

    /// Removes the tab for a component, pruning subtrees left empty.
    ///
    /// Returns `None` when the removal empties the whole tree. Selected-tab
    /// indexes are clamped to the remaining tabs.
    #[must_use]
    pub fn remove_tab(self, component_id: &str) -> Option<LayoutConfig> {
        match self {
            Self::Tab(mut tab_layout) => {
                tab_layout.tabs.retain(|t| t.id != component_id);
                if tab_layout.tabs.is_empty() {
                    return None;
                }
                let last = u32::try_from(tab_layout.tabs.len() - 1).unwrap_or(0);
                tab_layout.selected = tab_layout.selected.map(|s| s.min(last));
                Some(Self::Tab(tab_layout))
            }
            Self::Split(mut split) => {
                split.children = split
                    .children
                    .into_iter()
                    .filter_map(|child| child.remove_tab(component_id))
                    .collect();
                if split.children.is_empty() {
                    None
                } else {
                    Some(Self::Split(split))
                }
            }
        }
    }
}

fn default_visible() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> LayoutConfig {
        LayoutConfig::Split(SplitLayoutConfig::new(
            1,
            vec![
                LayoutConfig::Tab(TabLayoutConfig::new(vec![
                    TabConfig::new("query-1"),
                    TabConfig::new("table-1"),
                ])),
                LayoutConfig::Split(SplitLayoutConfig::new(
                    0,
                    vec![LayoutConfig::Tab(TabLayoutConfig::new(vec![
                        TabConfig::new("vis-1"),
                    ]))],
                )),
            ],
        ))
    }

    #[test]
    fn all_tabs_walks_in_display_order() {
        let ids: Vec<_> = sample_tree().all_tabs().iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec!["query-1", "table-1", "vis-1"]);
    }

    #[test]
    fn parent_of_finds_containing_tab_layout() {
        let tree = sample_tree();
        let parent = tree.parent_of("table-1").unwrap();
        assert_eq!(parent.tabs.len(), 2);
        assert!(tree.parent_of("missing").is_none());
    }

    #[test]
    fn remove_tab_prunes_empty_subtrees() {
        let tree = sample_tree().remove_tab("vis-1").unwrap();
        // The nested split is gone entirely; only the first tab layout remains.
        let LayoutConfig::Split(split) = &tree else {
            panic!("expected split root");
        };
        assert_eq!(split.children.len(), 1);

        let tree = tree.remove_tab("query-1").unwrap();
        let tree = tree.remove_tab("table-1");
        assert!(tree.is_none());
    }

    #[test]
    fn remove_tab_clamps_selection() {
        let mut tab_layout = TabLayoutConfig::new(vec![
            TabConfig::new("a"),
            TabConfig::new("b"),
        ]);
        tab_layout.selected = Some(1);
        let pruned = LayoutConfig::Tab(tab_layout).remove_tab("b").unwrap();
        let LayoutConfig::Tab(tab_layout) = pruned else {
            panic!("expected tab layout");
        };
        assert_eq!(tab_layout.selected, Some(0));
    }

    #[test]
    fn wire_form_uses_layout_discriminators() {
        let json = serde_json::to_value(sample_tree()).unwrap();
        assert_eq!(json["type"], "splitLayout");
        assert_eq!(json["children"][0]["type"], "tabLayout");
        assert_eq!(json["children"][0]["tabs"][0]["id"], "query-1");

        let back: LayoutConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_tree());
    }

    #[test]
    fn size_serializes_as_pair() {
        let json = serde_json::to_value(Size::new(300, 150)).unwrap();
        assert_eq!(json, serde_json::json!({"size": [300, 150]}));
        assert_eq!(Size::default().width(), 200);
    }

    #[test]
    fn hidden_tabs_are_excluded_from_visible_iteration() {
        let mut tab_layout = TabLayoutConfig::new(vec![
            TabConfig::new("a"),
            TabConfig::new("b"),
        ]);
        tab_layout.tabs[1].visible = false;
        let visible: Vec<_> = tab_layout.visible_tabs().map(|t| t.id.as_str()).collect();
        assert_eq!(visible, vec!["a"]);
    }
}
