//! Query time windows.
//!
//! A [`TimeRange`] bounds a query either side with absolute timestamps or
//! relative expressions such as `now() - 1d`. Relative expressions are kept
//! as opaque strings; they are resolved by the query layer at execution time.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How the range bounds apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeCondition {
    /// Both bounds apply.
    Between,
    /// Only the lower bound applies.
    GreaterThan,
    /// Only the upper bound applies.
    LessThan,
}

/// A named or ad hoc query time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Display name for preset ranges, e.g. `Last hour`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// How the bounds apply.
    pub condition: TimeCondition,
    /// Lower bound, absolute or relative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Upper bound, absolute or relative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl TimeRange {
    /// A preset covering the last hour.
    pub const LAST_HOUR: &'static str = "now() - 1h";
    /// A preset covering the last day.
    pub const LAST_DAY: &'static str = "now() - 1d";
    /// A preset covering the last week.
    pub const LAST_WEEK: &'static str = "now() - 1w";

    /// Creates a range lower-bounded by a relative expression.
    #[must_use]
    pub fn since(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            condition: TimeCondition::GreaterThan,
            from: Some(from.into()),
            to: None,
        }
    }

    /// Creates a range bounded on both sides.
    #[must_use]
    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: None,
            condition: TimeCondition::Between,
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// The `Last hour` preset.
    #[must_use]
    pub fn last_hour() -> Self {
        Self::since("Last hour", Self::LAST_HOUR)
    }

    /// The `Last 24 hours` preset.
    #[must_use]
    pub fn last_day() -> Self {
        Self::since("Last 24 hours", Self::LAST_DAY)
    }

    /// The `Last week` preset.
    #[must_use]
    pub fn last_week() -> Self {
        Self::since("Last week", Self::LAST_WEEK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_serializes_without_upper_bound() {
        let range = TimeRange::last_hour();
        let json = serde_json::to_value(&range).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Last hour",
                "condition": "GREATER_THAN",
                "from": "now() - 1h",
            })
        );
    }

    #[test]
    fn between_roundtrips() {
        let range = TimeRange::between("2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z");
        let json = serde_json::to_string(&range).unwrap();
        let back: TimeRange = serde_json::from_str(&json).unwrap();
        assert_eq!(range, back);
        assert_eq!(back.condition, TimeCondition::Between);
    }
}
