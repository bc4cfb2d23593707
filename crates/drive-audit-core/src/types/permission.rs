//! Permission grants as reported by the store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier reported when a grant carries neither an email nor a name.
pub const UNKNOWN_IDENTIFIER: &str = "N/A";

/// Kind of principal a grant applies to.
///
/// Tags the engine does not know are preserved verbatim in
/// [`PrincipalType::Other`] so they still reach the report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrincipalType {
    /// A single user account
    User,
    /// A group of accounts
    Group,
    /// Everyone in a domain
    Domain,
    /// Anyone with the link
    Anyone,
    /// Any other tag reported by the store
    Other(String),
}

impl PrincipalType {
    /// Returns the lowercase tag used by the store and in reports.
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Domain => "domain",
            Self::Anyone => "anyone",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for PrincipalType {
    fn from(tag: &str) -> Self {
        match tag {
            "user" => Self::User,
            "group" => Self::Group,
            "domain" => Self::Domain,
            "anyone" => Self::Anyone,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PrincipalType {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<PrincipalType> for String {
    fn from(kind: PrincipalType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One per-object detail entry of a grant.
///
/// A store may attach several entries to one grant, e.g. a direct
/// membership and an inherited group membership on the same principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDetail {
    /// `true` when the access descends from an ancestor container.
    /// Absent flags deserialize as inherited.
    #[serde(default = "inherited_by_default")]
    pub inherited: bool,
}

fn inherited_by_default() -> bool {
    true
}

impl PermissionDetail {
    /// A detail entry set directly on the object.
    pub fn direct() -> Self {
        Self { inherited: false }
    }

    /// A detail entry descending from an ancestor.
    pub fn inherited() -> Self {
        Self { inherited: true }
    }
}

/// One access grant on one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Who the grant applies to
    pub principal_type: PrincipalType,
    /// Access level in the store's own vocabulary (reader, writer, ...)
    pub role: String,
    /// Principal email address, when the store reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// Principal display name, when the store reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Per-object detail entries
    #[serde(default)]
    pub details: Vec<PermissionDetail>,
}

impl PermissionGrant {
    /// Creates a grant with no identifiers and no detail entries.
    pub fn new(principal_type: PrincipalType, role: impl Into<String>) -> Self {
        Self {
            principal_type,
            role: role.into(),
            email_address: None,
            display_name: None,
            details: Vec::new(),
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_address = Some(email.into());
        self
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Appends a detail entry.
    pub fn with_detail(mut self, detail: PermissionDetail) -> Self {
        self.details.push(detail);
        self
    }

    /// Best available principal identifier: email, then display name,
    /// then [`UNKNOWN_IDENTIFIER`]. Empty strings count as absent.
    pub fn identifier(&self) -> &str {
        self.email_address
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.display_name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(UNKNOWN_IDENTIFIER)
    }

    /// Inherited flag of the first detail entry; `true` when there is none.
    pub fn first_detail_inherited(&self) -> bool {
        self.details.first().is_none_or(|d| d.inherited)
    }

    /// Returns `true` when at least one detail entry is direct.
    pub fn has_direct_detail(&self) -> bool {
        self.details.iter().any(|d| !d.inherited)
    }
}
