//! Permission resolution.
//!
//! Turns the grants on one object into report rows, dropping every grant
//! that is inherited from an ancestor container. Failures are isolated to
//! the object: a failed lookup yields no rows and the run continues.

use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::config::InheritancePolicy;
use crate::error::StoreError;
use crate::store::StoreClient;
use crate::types::{DriveObject, PermissionGrant, ReportRow};

/// Rows produced for one object, plus how many grants were filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One row per direct grant
    pub rows: Vec<ReportRow>,
    /// Grants dropped as inherited
    pub skipped_inherited: usize,
}

/// Fetches and filters permission grants per object.
pub struct PermissionResolver {
    client: Arc<dyn StoreClient>,
    policy: InheritancePolicy,
}

impl PermissionResolver {
    /// Creates a resolver over `client` using `policy`.
    pub fn new(client: Arc<dyn StoreClient>, policy: InheritancePolicy) -> Self {
        Self { client, policy }
    }

    /// Returns `true` when `grant` is set directly on the object.
    pub fn is_direct(&self, grant: &PermissionGrant) -> bool {
        match self.policy {
            InheritancePolicy::FirstDetail => !grant.first_detail_inherited(),
            InheritancePolicy::AnyDirect => grant.has_direct_detail(),
        }
    }

    /// Resolves the report rows for `object`.
    ///
    /// A failed lookup is logged and yields no rows.
    pub async fn resolve(&self, object: &DriveObject) -> Vec<ReportRow> {
        match self.try_resolve(object, &CancelToken::new()).await {
            Ok(resolution) => resolution.rows,
            Err(_) => Vec::new(),
        }
    }

    /// Resolves the report rows for `object`, returning the lookup error
    /// so the caller can account for it. The error is already logged.
    pub async fn try_resolve(
        &self,
        object: &DriveObject,
        cancel: &CancelToken,
    ) -> Result<Resolution, StoreError> {
        let grants = cancel
            .guard(self.client.list_permissions(&object.id))
            .await
            .inspect_err(|e| {
                if !matches!(e, StoreError::Cancelled) {
                    tracing::warn!(
                        object_id = %object.id,
                        path = %object.full_path,
                        error = %e,
                        "Error fetching permissions"
                    );
                }
            })?;

        Ok(self.filter(object, &grants))
    }

    /// Keeps the direct grants of `grants` as rows.
    pub fn filter(&self, object: &DriveObject, grants: &[PermissionGrant]) -> Resolution {
        let mut resolution = Resolution::default();
        for grant in grants {
            if self.is_direct(grant) {
                resolution.rows.push(ReportRow::direct(object, grant));
            } else {
                resolution.skipped_inherited += 1;
            }
        }
        resolution
    }
}
