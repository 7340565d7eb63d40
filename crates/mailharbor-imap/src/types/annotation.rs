//! Message and mailbox annotations (RFC 5257 / RFC 5464).

/// A single annotation: an entry path, an attribute, and an optional value.
///
/// Entries are slash-separated paths such as `/comment` or
/// `/altsubject`; attributes are `value.priv` or `value.shared` (plus the
/// read-only `size.*` forms). A `None` value deletes the annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Entry path, e.g. `/comment`.
    pub entry: String,
    /// Attribute name, e.g. `value.priv`.
    pub attribute: String,
    /// Attribute value; `None` removes the annotation.
    pub value: Option<String>,
}

impl Annotation {
    /// Creates a new annotation triple.
    #[must_use]
    pub fn new(
        entry: impl Into<String>,
        attribute: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            entry: entry.into(),
            attribute: attribute.into(),
            value,
        }
    }

    /// Convenience constructor for a private value annotation.
    #[must_use]
    pub fn private(entry: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(entry, "value.priv", Some(value.into()))
    }

    /// Convenience constructor for a shared value annotation.
    #[must_use]
    pub fn shared(entry: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(entry, "value.shared", Some(value.into()))
    }

    /// Returns true if this annotation's attribute is private-scoped.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.attribute.ends_with(".priv")
    }
}

/// What annotation access the server grants on a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationAccess {
    /// Annotations are not supported here.
    #[default]
    None,
    /// Annotations may be read but not stored.
    ReadOnly,
    /// Annotations may be read and stored.
    ReadWrite,
}

/// Which annotation scopes a folder supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnnotationScopes {
    /// `value.priv` annotations are available.
    pub private: bool,
    /// `value.shared` annotations are available.
    pub shared: bool,
}
