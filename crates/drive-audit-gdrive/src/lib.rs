#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Google Drive store client for drive-audit.
//!
//! Implements [`drive_audit_core::StoreClient`] on top of the Drive v3
//! REST API:
//! - child listings scoped to one shared drive, trashed items excluded
//! - permission listings with per-object inheritance details
//! - service-account credentials with domain-wide delegation
//! - exponential backoff on rate limits and server errors

pub mod auth;
pub mod client;
mod wire;

pub use auth::{AuthError, ServiceAccountAuth, ServiceAccountKey, StaticToken, TokenSource};
pub use client::{DriveClient, DRIVE_API_BASE_URL, FOLDER_MIME_TYPE};
