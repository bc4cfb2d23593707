//! Data model for audit runs.

mod ids;
mod object;
mod permission;
mod proptests;
mod row;

pub use ids::ObjectId;
pub use object::{ChildEntry, ChildPage, DriveObject, ObjectKind};
pub use permission::{PermissionDetail, PermissionGrant, PrincipalType, UNKNOWN_IDENTIFIER};
pub use row::ReportRow;
