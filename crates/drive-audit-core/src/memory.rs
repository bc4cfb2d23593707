//! In-memory store and sink.
//!
//! Used by the test suites and handy for dry runs: build a tree with
//! [`MemoryStore::with_child`], attach grants, optionally inject
//! failures, then audit it like a real store.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{SinkError, StoreError};
use crate::sink::ReportSink;
use crate::store::StoreClient;
use crate::types::{ChildEntry, ChildPage, ObjectId, PermissionGrant, ReportRow};

/// Default number of children returned per page.
const DEFAULT_PAGE_SIZE: usize = 1000;

/// Scriptable in-memory [`StoreClient`].
#[derive(Debug)]
pub struct MemoryStore {
    children: HashMap<ObjectId, Vec<ChildEntry>>,
    permissions: HashMap<ObjectId, Vec<PermissionGrant>>,
    failing_listings: HashSet<ObjectId>,
    failing_permissions: HashSet<ObjectId>,
    page_size: usize,
    listing_calls: AtomicUsize,
    permission_calls: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            permissions: HashMap::new(),
            failing_listings: HashSet::new(),
            failing_permissions: HashSet::new(),
            page_size: DEFAULT_PAGE_SIZE,
            listing_calls: AtomicUsize::new(0),
            permission_calls: AtomicUsize::new(0),
        }
    }

    /// Sets the number of children returned per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Adds `child` under `parent`. A child may be added under several
    /// parents to model multi-parent stores.
    pub fn with_child(mut self, parent: impl Into<ObjectId>, child: ChildEntry) -> Self {
        self.children.entry(parent.into()).or_default().push(child);
        self
    }

    /// Attaches a grant to `object`.
    pub fn with_grant(mut self, object: impl Into<ObjectId>, grant: PermissionGrant) -> Self {
        self.permissions.entry(object.into()).or_default().push(grant);
        self
    }

    /// Makes every listing of `folder` fail with a server error.
    pub fn with_failing_listing(mut self, folder: impl Into<ObjectId>) -> Self {
        self.failing_listings.insert(folder.into());
        self
    }

    /// Makes the permission lookup for `object` fail with a transport error.
    pub fn with_failing_permissions(mut self, object: impl Into<ObjectId>) -> Self {
        self.failing_permissions.insert(object.into());
        self
    }

    /// Number of `list_children` calls served so far.
    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    /// Number of `list_permissions` calls served so far.
    pub fn permission_calls(&self) -> usize {
        self.permission_calls.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn list_children(
        &self,
        parent: &ObjectId,
        page_token: Option<&str>,
    ) -> Result<ChildPage, StoreError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_listings.contains(parent) {
            return Err(StoreError::Status {
                status: 500,
                message: format!("listing {parent} failed"),
            });
        }

        let Some(all) = self.children.get(parent) else {
            return Ok(ChildPage::default());
        };

        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| StoreError::Decode(format!("invalid page token '{token}'")))?,
            None => 0,
        };
        let end = (offset + self.page_size).min(all.len());
        let items = all.get(offset..end).unwrap_or_default().to_vec();
        let next = (end < all.len()).then(|| end.to_string());

        Ok(ChildPage::new(items, next))
    }

    async fn list_permissions(&self, object: &ObjectId) -> Result<Vec<PermissionGrant>, StoreError> {
        self.permission_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_permissions.contains(object) {
            return Err(StoreError::transport(format!(
                "permissions for {object} unavailable"
            )));
        }

        Ok(self.permissions.get(object).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// [`ReportSink`] that keeps rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Rows written so far, in write order.
    pub rows: Vec<ReportRow>,
    /// Whether [`ReportSink::finish`] was called.
    pub finished: bool,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn write_row(&mut self, row: &ReportRow) -> Result<(), SinkError> {
        self.rows.push(row.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}
