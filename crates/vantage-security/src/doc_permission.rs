//! Document permissions: an ordered capability ladder for individual documents.
//!
//! Each permission carries a primitive value persisted in the permission
//! store. Higher values are strictly more powerful, so a single integer
//! comparison answers "does this grant cover that requirement". The values
//! are written to external storage: never renumber or reuse them.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vantage_core::{Error, Result};

/// A capability on a single document, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentPermission {
    /// Use the document indirectly, e.g. as a pipeline element.
    Use,
    /// Open and read the document.
    View,
    /// Modify the document.
    Edit,
    /// Delete the document.
    Delete,
    /// Full control, including granting permissions to others.
    Owner,
}

impl DocumentPermission {
    /// Every permission, weakest first.
    pub const ALL: &'static [DocumentPermission] =
        &[Self::Use, Self::View, Self::Edit, Self::Delete, Self::Owner];

    /// Returns the persisted primitive value.
    ///
    /// Values are spaced to leave room for future levels without renumbering.
    #[must_use]
    pub fn primitive_value(self) -> i32 {
        match self {
            Self::Use => 10,
            Self::View => 20,
            Self::Edit => 30,
            Self::Delete => 40,
            Self::Owner => 50,
        }
    }

    /// Restores a permission from its persisted primitive value.
    ///
    /// # Errors
    ///
    /// Returns an error for a value that was never assigned.
    pub fn from_primitive_value(value: i32) -> Result<Self> {
        match value {
            10 => Ok(Self::Use),
            20 => Ok(Self::View),
            30 => Ok(Self::Edit),
            40 => Ok(Self::Delete),
            50 => Ok(Self::Owner),
            other => Err(Error::invalid_input(format!(
                "unknown document permission value {other}"
            ))),
        }
    }

    /// Returns true when this permission covers `other`.
    #[must_use]
    pub fn is_equal_or_higher(self, other: Self) -> bool {
        self.primitive_value() >= other.primitive_value()
    }

    /// Returns true when this permission is strictly more powerful than `other`.
    #[must_use]
    pub fn is_higher(self, other: Self) -> bool {
        self.primitive_value() > other.primitive_value()
    }

    /// Returns the canonical display name.
    #[must_use]
    pub fn display_value(self) -> &'static str {
        match self {
            Self::Use => names::USE,
            Self::View => names::VIEW,
            Self::Edit => names::EDIT,
            Self::Delete => names::DELETE,
            Self::Owner => names::OWNER,
        }
    }
}

impl fmt::Display for DocumentPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_value())
    }
}

/// Canonical permission names as persisted in grant records, plus the
/// `Create - <type>` pseudo-permission used for folder create grants.
pub mod names {
    /// Name of the [`Use`](super::DocumentPermission::Use) permission.
    pub const USE: &str = "Use";
    /// Name of the [`View`](super::DocumentPermission::View) permission.
    pub const VIEW: &str = "View";
    /// Name of the [`Edit`](super::DocumentPermission::Edit) permission.
    pub const EDIT: &str = "Edit";
    /// Name of the [`Delete`](super::DocumentPermission::Delete) permission.
    pub const DELETE: &str = "Delete";
    /// Name of the [`Owner`](super::DocumentPermission::Owner) permission.
    pub const OWNER: &str = "Owner";

    const CREATE_PREFIX: &str = "Create - ";

    /// Returns the pseudo-permission name granting creation of documents of
    /// the given type inside a folder.
    #[must_use]
    pub fn create_permission(doc_type: &str) -> String {
        format!("{CREATE_PREFIX}{doc_type}")
    }

    /// Extracts the document type from a create pseudo-permission name.
    #[must_use]
    pub fn create_permission_type(name: &str) -> Option<&str> {
        name.strip_prefix(CREATE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_totally_ordered() {
        let mut previous: Option<DocumentPermission> = None;
        for p in DocumentPermission::ALL {
            if let Some(prev) = previous {
                assert!(p.is_higher(prev));
                assert!(p.is_equal_or_higher(prev));
                assert!(!prev.is_equal_or_higher(*p));
            }
            assert!(p.is_equal_or_higher(*p));
            assert!(!p.is_higher(*p));
            previous = Some(*p);
        }
    }

    #[test]
    fn primitive_values_roundtrip() {
        for p in DocumentPermission::ALL {
            assert_eq!(
                DocumentPermission::from_primitive_value(p.primitive_value()).unwrap(),
                *p
            );
        }
        assert!(DocumentPermission::from_primitive_value(15).is_err());
    }

    #[test]
    fn owner_covers_everything() {
        for p in DocumentPermission::ALL {
            assert!(DocumentPermission::Owner.is_equal_or_higher(*p));
        }
    }

    #[test]
    fn create_permission_names() {
        assert_eq!(names::create_permission("Dashboard"), "Create - Dashboard");
        assert_eq!(
            names::create_permission_type("Create - Dashboard"),
            Some("Dashboard")
        );
        assert_eq!(names::create_permission_type("View"), None);
    }

    #[test]
    fn serialized_names_are_stable() {
        assert_eq!(
            serde_json::to_value(DocumentPermission::Edit).unwrap(),
            serde_json::json!("EDIT")
        );
    }
}
