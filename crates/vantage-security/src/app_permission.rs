//! Named application capabilities.
//!
//! Application permissions gate access to platform features (as opposed to
//! [`DocumentPermission`](crate::DocumentPermission), which gates individual
//! documents). The serialized names are persisted in grant records, so the
//! vocabulary is append-only: never rename or reuse a value.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named capability gating an application feature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppPermission {
    /// Grants every capability implicitly.
    Administrator,
    /// Manage user accounts and their permission grants.
    ManageUsers,
    /// Create, list and revoke API keys.
    ManageApiKeys,
    /// Verify presented API keys on behalf of other services.
    VerifyApiKey,
    /// View stored data.
    ViewData,
    /// Export data out of the platform.
    ExportData,
    /// Import data into the platform.
    ImportData,
    /// Download search results produced by dashboards.
    DownloadSearchResults,
    /// Step data through pipelines interactively.
    Stepping,
    /// Create and manage annotations.
    Annotations,
    /// Change the owner of a document.
    ChangeOwner,
    /// Manage platform caches.
    ManageCache,
    /// Manage background tasks.
    ManageTasks,
    /// Manage scheduled jobs.
    ManageJobs,
    /// Manage storage volumes.
    ManageVolumes,
    /// Manage data retention and receipt policies.
    ManagePolicies,
}

impl AppPermission {
    /// Every permission in the vocabulary.
    pub const ALL: &'static [AppPermission] = &[
        Self::Administrator,
        Self::ManageUsers,
        Self::ManageApiKeys,
        Self::VerifyApiKey,
        Self::ViewData,
        Self::ExportData,
        Self::ImportData,
        Self::DownloadSearchResults,
        Self::Stepping,
        Self::Annotations,
        Self::ChangeOwner,
        Self::ManageCache,
        Self::ManageTasks,
        Self::ManageJobs,
        Self::ManageVolumes,
        Self::ManagePolicies,
    ];

    /// Returns the human-readable label shown in permission pickers.
    #[must_use]
    pub fn display_value(self) -> &'static str {
        match self {
            Self::Administrator => "Administrator",
            Self::ManageUsers => "Manage Users",
            Self::ManageApiKeys => "Manage API Keys",
            Self::VerifyApiKey => "Verify API Key",
            Self::ViewData => "View Data",
            Self::ExportData => "Export Data",
            Self::ImportData => "Import Data",
            Self::DownloadSearchResults => "Download Search Results",
            Self::Stepping => "Pipeline Stepping",
            Self::Annotations => "Annotations",
            Self::ChangeOwner => "Change Owner",
            Self::ManageCache => "Manage Cache",
            Self::ManageTasks => "Manage Tasks",
            Self::ManageJobs => "Manage Jobs",
            Self::ManageVolumes => "Manage Volumes",
            Self::ManagePolicies => "Manage Policies",
        }
    }

    /// Returns a longer description for permissions that need one.
    #[must_use]
    pub fn description(self) -> Option<&'static str> {
        match self {
            Self::Administrator => {
                Some("Full access to every feature; implies all other permissions.")
            }
            Self::VerifyApiKey => {
                Some("Allows a processing node to verify API keys presented by clients.")
            }
            Self::ChangeOwner => {
                Some("Allows changing the owner of documents the holder can edit.")
            }
            Self::DownloadSearchResults => {
                Some("Allows downloading dashboard search results as files.")
            }
            _ => None,
        }
    }
}

impl fmt::Display for AppPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_value())
    }
}
