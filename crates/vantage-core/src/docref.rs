//! Opaque references to documents stored elsewhere in the platform.
//!
//! A [`DocRef`] carries the document type, its externally-persisted UUID and an
//! optional display name. Identity is the (type, uuid) pair: the name is display
//! decoration and takes no part in equality or hashing.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Error;

/// A typed reference to a document.
///
/// # Example
///
/// ```rust
/// use vantage_core::DocRef;
///
/// let uuid = uuid::Uuid::new_v4();
/// let a = DocRef::new("Dashboard", uuid);
/// let b = DocRef::builder()
///     .doc_type("Dashboard")
///     .uuid(uuid)
///     .name("Daily overview")
///     .build()
///     .unwrap();
///
/// // Name does not affect identity.
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocRef {
    /// The document type, e.g. `Dashboard` or `Dictionary`.
    #[serde(rename = "type")]
    doc_type: String,
    /// The externally-persisted document UUID.
    uuid: Uuid,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl DocRef {
    /// Creates a reference without a display name.
    #[must_use]
    pub fn new(doc_type: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            doc_type: doc_type.into(),
            uuid,
            name: None,
        }
    }

    /// Returns a builder for assembling a reference field by field.
    #[must_use]
    pub fn builder() -> DocRefBuilder {
        DocRefBuilder::default()
    }

    /// Returns the document type.
    #[must_use]
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Returns the document UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns a copy of this reference carrying the given display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

// Identity is (type, uuid); the name is presentation only.
impl PartialEq for DocRef {
    fn eq(&self, other: &Self) -> bool {
        self.doc_type == other.doc_type && self.uuid == other.uuid
    }
}

impl Eq for DocRef {}

impl Hash for DocRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.doc_type.hash(state);
        self.uuid.hash(state);
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type=\"{}\" uuid=\"{}\"", self.doc_type, self.uuid)?;
        if let Some(name) = &self.name {
            write!(f, " name=\"{name}\"")?;
        }
        Ok(())
    }
}

/// Builder for [`DocRef`].
#[derive(Debug, Default)]
pub struct DocRefBuilder {
    doc_type: Option<String>,
    uuid: Option<Uuid>,
    name: Option<String>,
}

impl DocRefBuilder {
    /// Sets the document type.
    #[must_use]
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    /// Sets the document UUID.
    #[must_use]
    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    /// Generates a fresh random UUID.
    #[must_use]
    pub fn random_uuid(mut self) -> Self {
        self.uuid = Some(Uuid::new_v4());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the type or UUID was never set; both are required.
    pub fn build(self) -> crate::Result<DocRef> {
        let doc_type = self
            .doc_type
            .ok_or_else(|| Error::invalid_doc_ref("missing document type"))?;
        let uuid = self
            .uuid
            .ok_or_else(|| Error::invalid_doc_ref("missing document uuid"))?;
        Ok(DocRef {
            doc_type,
            uuid,
            name: self.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn name_is_ignored_by_equality_and_hash() {
        let uuid = Uuid::new_v4();
        let bare = DocRef::new("Dashboard", uuid);
        let named = DocRef::new("Dashboard", uuid).with_name("Main");

        assert_eq!(bare, named);

        let mut set = HashSet::new();
        set.insert(bare);
        assert!(set.contains(&named));
    }

    #[test]
    fn different_types_are_different_documents() {
        let uuid = Uuid::new_v4();
        assert_ne!(DocRef::new("Dashboard", uuid), DocRef::new("Query", uuid));
    }

    #[test]
    fn wire_form_omits_missing_name() {
        let doc = DocRef::new("Dashboard", Uuid::nil());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Dashboard",
                "uuid": "00000000-0000-0000-0000-000000000000",
            })
        );

        let named = doc.with_name("Main");
        let json = serde_json::to_value(&named).unwrap();
        assert_eq!(json["name"], "Main");
    }

    #[test]
    fn roundtrips_through_json() {
        let doc = DocRef::builder()
            .doc_type("Pipeline")
            .random_uuid()
            .name("Extraction")
            .build()
            .unwrap();
        let json = serde_json::to_string(&doc).unwrap();
        let back: DocRef = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
        assert_eq!(back.name(), Some("Extraction"));
    }
}
