//! Hierarchy entries as listed by the store and as emitted by the walker.

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// Whether an object can contain other objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A container whose children are listed during discovery.
    Folder,
    /// Any non-container object.
    Leaf,
}

impl ObjectKind {
    /// Returns `true` for [`ObjectKind::Folder`].
    pub fn is_folder(self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// One item returned by a child listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    /// Object identifier
    pub id: ObjectId,
    /// Leaf display name (not unique among siblings)
    pub name: String,
    /// Folder or leaf
    pub kind: ObjectKind,
}

impl ChildEntry {
    /// Creates a folder entry.
    pub fn folder(id: impl Into<ObjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ObjectKind::Folder,
        }
    }

    /// Creates a leaf entry.
    pub fn leaf(id: impl Into<ObjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ObjectKind::Leaf,
        }
    }
}

/// One page of a paginated child listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildPage {
    /// Children on this page
    pub items: Vec<ChildEntry>,
    /// Continuation token; `None` on the last page
    pub next_page_token: Option<String>,
}

impl ChildPage {
    /// Creates a page, normalising an empty continuation token to `None`.
    pub fn new(items: Vec<ChildEntry>, next_page_token: Option<String>) -> Self {
        Self {
            items,
            next_page_token: next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

/// An object discovered by the tree walker, annotated with its full path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveObject {
    /// Object identifier
    pub id: ObjectId,
    /// Leaf display name
    pub name: String,
    /// Folder or leaf
    pub kind: ObjectKind,
    /// `parent full path + separator + name`; bare name at the root
    pub full_path: String,
}
