//! Error types and result aliases for Vantage.
//!
//! This module defines the shared error types used across all Vantage components.
//! Errors are structured for programmatic handling and include context for debugging.

/// The result type used throughout Vantage.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Vantage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A document reference could not be parsed or validated.
    #[error("invalid document reference: {message}")]
    InvalidDocRef {
        /// Description of what made the reference invalid.
        message: String,
    },

    /// A quick-filter term was qualified with a field the caller never mapped.
    #[error("unknown filter field '{field}', valid fields: {}", valid.join(", "))]
    UnknownFilterField {
        /// The qualifier the user typed.
        field: String,
        /// The qualifiers that are actually available.
        valid: Vec<String>,
    },

    /// A quick-filter token had an invalid shape (e.g. a leading `:`).
    #[error("invalid filter token '{token}'")]
    InvalidFilterToken {
        /// The offending token.
        token: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource_type} with id {id}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The caller holds insufficient permissions for the operation.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Description of the missing capability.
        message: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a new invalid document reference error.
    #[must_use]
    pub fn invalid_doc_ref(message: impl Into<String>) -> Self {
        Self::InvalidDocRef {
            message: message.into(),
        }
    }

    /// Creates a new resource not found error.
    #[must_use]
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::ResourceNotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// Creates a new permission denied error.
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    /// Creates a new serialization error from an underlying cause.
    #[must_use]
    pub fn serialization(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true when this error indicates a missing resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_filter_field_lists_valid_qualifiers() {
        let err = Error::UnknownFilterField {
            field: "typ".to_string(),
            valid: vec!["name".to_string(), "type".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'typ'"));
        assert!(msg.contains("name, type"));
    }

    #[test]
    fn not_found_helper_sets_fields() {
        let err = Error::not_found("dashboard", "abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: dashboard with id abc");
    }
}
