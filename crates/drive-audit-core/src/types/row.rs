//! Report rows handed to the sink.

use serde::{Deserialize, Serialize};

use super::{DriveObject, ObjectId, PermissionGrant, PrincipalType};

/// One line of the access report: who can reach which object, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Full logical path of the object
    pub full_path: String,
    /// Object identifier
    pub object_id: ObjectId,
    /// Email, display name, or `"N/A"`
    pub principal_identifier: String,
    /// Principal kind
    pub principal_type: PrincipalType,
    /// Granted role
    pub role: String,
    /// Always `false` for emitted rows
    pub inherited: bool,
}

impl ReportRow {
    /// Builds the row for a direct grant on `object`.
    pub fn direct(object: &DriveObject, grant: &PermissionGrant) -> Self {
        Self {
            full_path: object.full_path.clone(),
            object_id: object.id.clone(),
            principal_identifier: grant.identifier().to_string(),
            principal_type: grant.principal_type.clone(),
            role: grant.role.clone(),
            inherited: false,
        }
    }
}
