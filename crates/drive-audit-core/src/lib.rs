#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Drive Audit Core Library
//!
//! Traversal and aggregation engine for shared drive access audits:
//! discovers every object below a root container, resolves each object's
//! full logical path, and turns its direct (non-inherited) permission
//! grants into flat report rows.
//!
//! The remote store and the report destination are injected through the
//! [`StoreClient`] and [`ReportSink`] traits.

pub mod audit;
pub mod cancel;
pub mod config;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod sink;
pub mod store;
pub mod types;
pub mod walker;

// Re-exports for convenience
pub use audit::{AuditRunner, AuditSummary};
pub use cancel::CancelToken;
pub use config::{AppConfig, AuditConfig, DriveSettings, InheritancePolicy, RootScope};
pub use error::{AuditError, Result, SinkError, StoreError};
pub use resolver::{PermissionResolver, Resolution};
pub use sink::ReportSink;
pub use store::StoreClient;
pub use types::{
    ChildEntry, ChildPage, DriveObject, ObjectId, ObjectKind, PermissionDetail,
    PermissionGrant, PrincipalType, ReportRow, UNKNOWN_IDENTIFIER,
};
pub use walker::{PathIndex, TreeWalker, WalkOptions};
