//! Identifier type for store objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an object in the remote store.
///
/// Stable for the lifetime of the object; never interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Creates a new object ID from a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use drive_audit_core::ObjectId;
    ///
    /// let id = ObjectId::new("1AbCdEf");
    /// assert_eq!(id.as_str(), "1AbCdEf");
    /// ```
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Returns the object ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_from_str() {
        let id = ObjectId::from("abc");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(id.to_string(), "abc");
    }

    #[test]
    fn test_object_id_serializes_as_plain_string() {
        let id = ObjectId::new("0AFolder");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0AFolder\"");
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
