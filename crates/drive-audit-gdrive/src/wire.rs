//! Drive v3 response bodies.

use serde::Deserialize;

use drive_audit_core::{
    ChildEntry, ChildPage, ObjectKind, PermissionDetail, PermissionGrant, PrincipalType,
};

use crate::client::FOLDER_MIME_TYPE;

/// `files.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileList {
    #[serde(default)]
    pub files: Vec<FileResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

impl From<FileList> for ChildPage {
    fn from(list: FileList) -> Self {
        let items = list
            .files
            .into_iter()
            .map(|file| ChildEntry {
                kind: if file.mime_type == FOLDER_MIME_TYPE {
                    ObjectKind::Folder
                } else {
                    ObjectKind::Leaf
                },
                id: file.id.into(),
                name: file.name,
            })
            .collect();
        ChildPage::new(items, list.next_page_token)
    }
}

/// `permissions.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionList {
    #[serde(default)]
    pub permissions: Vec<PermissionResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionResource {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub permission_details: Vec<PermissionDetail>,
}

impl From<PermissionResource> for PermissionGrant {
    fn from(resource: PermissionResource) -> Self {
        PermissionGrant {
            principal_type: PrincipalType::from(resource.kind),
            role: resource.role,
            email_address: resource.email_address,
            display_name: resource.display_name,
            details: resource.permission_details,
        }
    }
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorReason {
    #[serde(default)]
    pub reason: String,
}
