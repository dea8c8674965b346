//! Required-permission combinations and the check algebra over them.
//!
//! A route or operation declares the [`AppPermissionSet`] it requires; the
//! caller's held permissions are then checked against it. The 0/1/N shapes
//! are plain enum variants, so the common empty and single-permission cases
//! allocate nothing.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_permission::AppPermission;

/// A combination of required application permissions.
///
/// Construction normalizes degenerate shapes: an empty collection becomes
/// [`Empty`](Self::Empty) and a one-element collection becomes
/// [`Single`](Self::Single), for which the one-of/all-of distinction is
/// meaningless.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppPermissionSet {
    /// No permission required; every caller satisfies it.
    #[default]
    Empty,
    /// Exactly one permission required.
    Single {
        /// The required permission.
        permission: AppPermission,
    },
    /// At least one of the listed permissions required.
    OneOf {
        /// The acceptable permissions.
        permissions: BTreeSet<AppPermission>,
    },
    /// All of the listed permissions required.
    AllOf {
        /// The required permissions.
        permissions: BTreeSet<AppPermission>,
    },
}

impl AppPermissionSet {
    /// The set requiring nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Requires exactly the given permission.
    #[must_use]
    pub fn single(permission: AppPermission) -> Self {
        Self::Single { permission }
    }

    /// Requires at least one of the given permissions.
    #[must_use]
    pub fn one_of(permissions: impl IntoIterator<Item = AppPermission>) -> Self {
        Self::normalized(permissions, false)
    }

    /// Requires all of the given permissions.
    #[must_use]
    pub fn all_of(permissions: impl IntoIterator<Item = AppPermission>) -> Self {
        Self::normalized(permissions, true)
    }

    fn normalized(permissions: impl IntoIterator<Item = AppPermission>, all: bool) -> Self {
        let permissions: BTreeSet<_> = permissions.into_iter().collect();
        match permissions.len() {
            0 => Self::Empty,
            1 => match permissions.first() {
                Some(&permission) => Self::Single { permission },
                None => Self::Empty,
            },
            _ if all => Self::AllOf { permissions },
            _ => Self::OneOf { permissions },
        }
    }

    /// Returns true when the held permissions satisfy this requirement.
    ///
    /// An empty requirement is always satisfied. A non-empty requirement is
    /// never satisfied by an empty held set. `AllOf` needs the held set to be
    /// a superset; `OneOf`/`Single` need a non-empty intersection.
    #[must_use]
    pub fn check(&self, held: &BTreeSet<AppPermission>) -> bool {
        match self {
            Self::Empty => true,
            _ if held.is_empty() => false,
            Self::Single { permission } => held.contains(permission),
            Self::OneOf { permissions } => !held.is_disjoint(permissions),
            Self::AllOf { permissions } => held.is_superset(permissions),
        }
    }

    /// Returns true when nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the required permissions as a plain set.
    #[must_use]
    pub fn as_set(&self) -> BTreeSet<AppPermission> {
        match self {
            Self::Empty => BTreeSet::new(),
            Self::Single { permission } => BTreeSet::from([*permission]),
            Self::OneOf { permissions } | Self::AllOf { permissions } => permissions.clone(),
        }
    }
}

impl From<AppPermission> for AppPermissionSet {
    fn from(permission: AppPermission) -> Self {
        Self::single(permission)
    }
}

impl fmt::Display for AppPermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("(none)"),
            Self::Single { permission } => f.write_str(permission.display_value()),
            Self::OneOf { permissions } => {
                let labels: Vec<_> = permissions.iter().map(|p| p.display_value()).collect();
                write!(f, "one of [{}]", labels.join(", "))
            }
            Self::AllOf { permissions } => {
                let labels: Vec<_> = permissions.iter().map(|p| p.display_value()).collect();
                write!(f, "all of [{}]", labels.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppPermission::{Administrator, ExportData, ManageUsers, ViewData};

    fn held(perms: &[AppPermission]) -> BTreeSet<AppPermission> {
        perms.iter().copied().collect()
    }

    #[test]
    fn empty_requirement_is_always_satisfied() {
        assert!(AppPermissionSet::empty().check(&held(&[])));
        assert!(AppPermissionSet::empty().check(&held(&[ViewData])));
    }

    #[test]
    fn nonempty_requirement_fails_empty_held_set() {
        assert!(!AppPermissionSet::single(ViewData).check(&held(&[])));
        assert!(!AppPermissionSet::all_of([ViewData, ExportData]).check(&held(&[])));
    }

    #[test]
    fn single_requires_membership() {
        let set = AppPermissionSet::single(ViewData);
        assert!(set.check(&held(&[ViewData, ExportData])));
        assert!(!set.check(&held(&[ExportData])));
    }

    #[test]
    fn all_of_requires_superset() {
        let set = AppPermissionSet::all_of([ViewData, ExportData]);
        assert!(set.check(&held(&[ViewData, ExportData, ManageUsers])));
        assert!(!set.check(&held(&[ViewData])));
    }

    #[test]
    fn one_of_requires_intersection() {
        let set = AppPermissionSet::one_of([ViewData, ExportData]);
        assert!(set.check(&held(&[ExportData])));
        assert!(!set.check(&held(&[ManageUsers])));
    }

    #[test]
    fn construction_normalizes_degenerate_shapes() {
        assert_eq!(AppPermissionSet::one_of([]), AppPermissionSet::Empty);
        assert_eq!(AppPermissionSet::all_of([]), AppPermissionSet::Empty);
        assert_eq!(
            AppPermissionSet::one_of([ViewData]),
            AppPermissionSet::single(ViewData)
        );
        assert_eq!(
            AppPermissionSet::all_of([ViewData]),
            AppPermissionSet::single(ViewData)
        );
        // Duplicates collapse before the size check.
        assert_eq!(
            AppPermissionSet::one_of([ViewData, ViewData]),
            AppPermissionSet::single(ViewData)
        );
    }

    #[test]
    fn as_set_reflects_requirement() {
        assert!(AppPermissionSet::empty().as_set().is_empty());
        assert_eq!(
            AppPermissionSet::all_of([ViewData, Administrator]).as_set(),
            held(&[ViewData, Administrator])
        );
    }

    #[test]
    fn wire_form_is_tagged_by_op() {
        let set = AppPermissionSet::all_of([ViewData, ExportData]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["op"], "ALL_OF");
        let back: AppPermissionSet = serde_json::from_value(json).unwrap();
        assert_eq!(set, back);

        let empty_json = serde_json::to_value(AppPermissionSet::empty()).unwrap();
        assert_eq!(empty_json, serde_json::json!({"op": "EMPTY"}));
    }
}
