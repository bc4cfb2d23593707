//! Run-scoped cancellation.
//!
//! ```rust
//! use drive_audit_core::CancelToken;
//!
//! let token = CancelToken::new();
//! let observer = token.clone();
//! assert!(!observer.is_cancelled());
//!
//! token.cancel();
//! assert!(observer.is_cancelled());
//! ```

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::StoreError;

/// Cancellation token shared by every stage of one audit run.
///
/// Cheap to clone (Arc internals). Cancelling is permanent.
#[derive(Clone, Debug)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancels the run. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves when the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // wait_for checks the current value first
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Runs a store call, abandoning it with [`StoreError::Cancelled`] if
    /// the token fires first.
    pub async fn guard<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(StoreError::Cancelled),
            result = call => result,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
