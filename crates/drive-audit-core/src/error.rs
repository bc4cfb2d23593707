//! Error types for the audit engine.
//!
//! Three families live here: [`StoreError`] for the remote store,
//! [`SinkError`] for the report destination, and [`AuditError`] for the
//! run as a whole. Only discovery failures are promoted into an
//! [`AuditError`]; permission failures stay at the object boundary.

use std::time::Duration;

use crate::types::ObjectId;

/// Errors returned by a [`StoreClient`](crate::StoreClient) implementation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The store answered with a non-success status.
    #[error("store returned HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The store throttled the caller.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Response body or reason phrase
        message: String,
        /// Server-requested wait before the next attempt, when given
        retry_after: Option<Duration>,
    },

    /// Credentials were rejected or could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The response body could not be decoded.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// The call was abandoned because the run was cancelled.
    #[error("store call cancelled")]
    Cancelled,
}

impl StoreError {
    /// Returns whether retrying the same call may succeed.
    ///
    /// Transport failures, rate limiting and server errors (5xx) are
    /// transient; everything else is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport { .. } => true,
            StoreError::RateLimited { .. } => true,
            StoreError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            StoreError::Auth(_) => false,
            StoreError::Decode(_) => false,
            StoreError::Cancelled => false,
        }
    }

    /// Wait the store asked for before retrying, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            StoreError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Creates a transport error with a message.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        StoreError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transport error with a message and source error.
    pub fn transport_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors returned by a [`ReportSink`](crate::ReportSink).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SinkError {
    /// I/O error writing the report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoder-specific failure (CSV quoting, serialization)
    #[error("encoding error: {0}")]
    Encode(String),
}

/// Errors that abort an audit run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuditError {
    /// Listing the children of a folder failed; the tree would be incomplete.
    #[error("discovery failed while listing folder {folder_id}: {source}")]
    Discovery {
        /// Folder whose listing failed
        folder_id: ObjectId,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// A folder was popped from the work list without a resolved path.
    ///
    /// Internal invariant check: the walker indexes a folder's path before
    /// queueing it, so this signals a walker bug rather than a store fault.
    #[error("no resolved path for folder {id}")]
    MissingPath {
        /// Folder id missing from the path index
        id: ObjectId,
    },

    /// Writing a report row failed.
    #[error("report sink error: {0}")]
    Sink(#[from] SinkError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// The run was cancelled before completion.
    #[error("audit cancelled")]
    Cancelled,
}

/// Convenience `Result` type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

impl AuditError {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        AuditError::Config {
            message: message.into(),
        }
    }

    /// Wraps a listing failure for the given folder.
    ///
    /// A cancelled store call is reported as [`AuditError::Cancelled`]
    /// rather than as a discovery failure.
    pub fn discovery(folder_id: &ObjectId, source: StoreError) -> Self {
        match source {
            StoreError::Cancelled => AuditError::Cancelled,
            source => AuditError::Discovery {
                folder_id: folder_id.clone(),
                source,
            },
        }
    }
}
