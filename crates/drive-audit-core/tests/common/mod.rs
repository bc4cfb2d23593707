//! Common fixtures for drive audit tests.

#![allow(dead_code)]

use drive_audit_core::memory::MemoryStore;
use drive_audit_core::{ChildEntry, PermissionDetail, PermissionGrant, PrincipalType};

/// Root container id used by every fixture.
pub const ROOT: &str = "0AShared";

/// A direct user grant.
pub fn direct_user(email: &str, role: &str) -> PermissionGrant {
    PermissionGrant::new(PrincipalType::User, role)
        .with_email(email)
        .with_detail(PermissionDetail::direct())
}

/// An inherited user grant.
pub fn inherited_user(email: &str, role: &str) -> PermissionGrant {
    PermissionGrant::new(PrincipalType::User, role)
        .with_email(email)
        .with_detail(PermissionDetail::inherited())
}

/// Root with folder "Reports" holding "Q1.pdf": one direct reader grant
/// for alice and one inherited writer grant for bob.
pub fn reports_store() -> MemoryStore {
    MemoryStore::new()
        .with_child(ROOT, ChildEntry::folder("reports", "Reports"))
        .with_child("reports", ChildEntry::leaf("q1", "Q1.pdf"))
        .with_grant("reports", inherited_user("bob@example.com", "writer"))
        .with_grant("q1", direct_user("alice@example.com", "reader"))
        .with_grant("q1", inherited_user("bob@example.com", "writer"))
}

/// A folder with `count` leaf children, each carrying one direct grant.
pub fn wide_folder(count: usize, page_size: usize) -> MemoryStore {
    let mut store = MemoryStore::new()
        .with_page_size(page_size)
        .with_child(ROOT, ChildEntry::folder("wide", "Wide"));
    for i in 0..count {
        let id = format!("leaf-{i}");
        store = store
            .with_child("wide", ChildEntry::leaf(id.as_str(), format!("{i}.txt")))
            .with_grant(id.as_str(), direct_user("owner@example.com", "owner"));
    }
    store
}
