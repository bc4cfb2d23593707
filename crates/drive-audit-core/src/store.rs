//! Store client trait.
//!
//! The remote store is an external collaborator: authentication and the
//! transport are entirely behind this trait, so the walker and resolver
//! can be exercised against [`MemoryStore`](crate::memory::MemoryStore).

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ChildPage, ObjectId, PermissionGrant};

/// Read-only access to a hierarchical store.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Lists one page of the direct children of `parent`.
    ///
    /// Implementations must exclude trashed objects. Pass `None` for the
    /// first page and the previous page's token afterwards.
    async fn list_children(
        &self,
        parent: &ObjectId,
        page_token: Option<&str>,
    ) -> Result<ChildPage, StoreError>;

    /// Lists every permission grant on `object`, inherited ones included.
    ///
    /// Any pagination of the underlying API is followed internally.
    async fn list_permissions(&self, object: &ObjectId) -> Result<Vec<PermissionGrant>, StoreError>;

    /// Returns the name of the store backend (for logging).
    fn name(&self) -> &str;
}
