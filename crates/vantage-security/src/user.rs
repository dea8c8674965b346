//! User references and user/permission pairings.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app_permission::AppPermission;

/// A reference to a user or group.
///
/// Identity is the UUID alone; names are mutable display data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    /// The externally-persisted user UUID.
    pub uuid: Uuid,
    /// The unique account name.
    pub name: String,
    /// Preferred display name, when different from the account name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Full name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// True when this is a group rather than an individual account.
    #[serde(default, skip_serializing_if = "is_false")]
    pub group: bool,
    /// Disabled users fail every permission check.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl UserRef {
    /// Creates an enabled, non-group user reference.
    #[must_use]
    pub fn named(uuid: Uuid, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
            display_name: None,
            full_name: None,
            group: false,
            enabled: true,
        }
    }

    /// Returns the best name available for display.
    #[must_use]
    pub fn to_display_string(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

impl PartialEq for UserRef {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl Eq for UserRef {}

impl Hash for UserRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_display_string(), self.uuid)
    }
}

/// A user together with the application permissions they hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAndPermissions {
    /// The user.
    pub user_ref: UserRef,
    /// The permissions held, directly or via group membership.
    pub permissions: BTreeSet<AppPermission>,
}

impl UserAndPermissions {
    /// Pairs a user with their held permissions.
    #[must_use]
    pub fn new(
        user_ref: UserRef,
        permissions: impl IntoIterator<Item = AppPermission>,
    ) -> Self {
        Self {
            user_ref,
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Returns true when the user holds the administrator permission.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        self.permissions.contains(&AppPermission::Administrator)
    }
}

fn default_enabled() -> bool {
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
    fn identity_is_uuid_only() {
        let uuid = Uuid::new_v4();
        let mut a = UserRef::named(uuid, "jbloggs");
        let b = UserRef::named(uuid, "renamed");
        a.display_name = Some("Joe".into());
        assert_eq!(a, b);
    }

    #[test]
    fn display_prefers_display_name() {
        let mut user = UserRef::named(Uuid::new_v4(), "jbloggs");
        assert_eq!(user.to_display_string(), "jbloggs");
        user.display_name = Some("Joe Bloggs".into());
        assert_eq!(user.to_display_string(), "Joe Bloggs");
    }

    #[test]
    fn enabled_defaults_to_true_on_the_wire() {
        let user: UserRef = serde_json::from_value(serde_json::json!({
            "uuid": Uuid::nil(),
            "name": "jbloggs",
        }))
        .unwrap();
        assert!(user.enabled);
        assert!(!user.group);
    }
}
