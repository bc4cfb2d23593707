//! Tree discovery.
//!
//! The [`TreeWalker`] expands a root container into the flat list of every
//! object below it, each annotated with its full logical path.
//!
//! # Traversal
//!
//! Traversal is iterative: an explicit LIFO work list holds the ids of
//! folders still to expand, and a [`PathIndex`] side table maps each
//! queued folder to its resolved path. A folder's path is written when
//! the folder is discovered, so it is always present by the time the
//! folder is popped. All pages of a folder are fetched before any of its
//! children are processed.
//!
//! Objects are de-duplicated by id: an object reachable through more than
//! one parent is reported once, under the first path seen, and expanded
//! once. The same rule terminates cyclic membership.
//!
//! Listing failures are fatal. A partially discovered tree would produce
//! a report that looks complete but is not.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::config::{AuditConfig, RootScope};
use crate::error::{AuditError, Result};
use crate::store::StoreClient;
use crate::types::{ChildEntry, DriveObject, ObjectId};

// ============================================================================
// PathIndex
// ============================================================================

/// Folder id → resolved full path, scoped to one walk.
///
/// Entries are only ever added.
#[derive(Debug, Default)]
pub struct PathIndex {
    paths: HashMap<ObjectId, String>,
}

impl PathIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the path of a folder. An existing entry is kept.
    pub fn insert(&mut self, id: ObjectId, path: String) {
        self.paths.entry(id).or_insert(path);
    }

    /// Looks up the resolved path of a folder.
    pub fn get(&self, id: &ObjectId) -> Option<&str> {
        self.paths.get(id).map(String::as_str)
    }

    /// Number of folders indexed.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns `true` when no folder has been indexed.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

// ============================================================================
// WalkOptions
// ============================================================================

/// Tuning for a [`TreeWalker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Placed between a parent path and a child name.
    pub separator: String,
    /// Whether leaves directly under the root are reported.
    pub root_scope: RootScope,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            separator: "/".to_string(),
            root_scope: RootScope::All,
        }
    }
}

impl From<&AuditConfig> for WalkOptions {
    fn from(config: &AuditConfig) -> Self {
        Self {
            separator: config.separator.clone(),
            root_scope: config.root_scope,
        }
    }
}

// ============================================================================
// TreeWalker
// ============================================================================

/// Discovers every object below a root container.
pub struct TreeWalker {
    client: Arc<dyn StoreClient>,
    options: WalkOptions,
}

/// Mutable state of one walk.
struct WalkState {
    objects: Vec<DriveObject>,
    pending: Vec<ObjectId>,
    paths: PathIndex,
    seen: HashSet<ObjectId>,
    pages: usize,
    duplicates: usize,
}

impl TreeWalker {
    /// Creates a walker over `client`.
    pub fn new(client: Arc<dyn StoreClient>, options: WalkOptions) -> Self {
        Self { client, options }
    }

    /// Walks the tree under `root` and returns every object found, in
    /// discovery order.
    ///
    /// # Errors
    ///
    /// [`AuditError::Discovery`] if any listing fails, and
    /// [`AuditError::Cancelled`] if `cancel` fires first.
    pub async fn walk(&self, root: &ObjectId, cancel: &CancelToken) -> Result<Vec<DriveObject>> {
        tracing::info!(root = %root, store = self.client.name(), "Starting tree discovery");

        let mut state = WalkState {
            objects: Vec::new(),
            pending: Vec::new(),
            paths: PathIndex::new(),
            seen: HashSet::from([root.clone()]),
            pages: 0,
            duplicates: 0,
        };

        // Root children take their bare name as path.
        let roots = self.list_all(root, cancel, &mut state.pages).await?;
        for child in roots {
            if !child.kind.is_folder() && self.options.root_scope == RootScope::FoldersOnly {
                tracing::debug!(id = %child.id, name = %child.name, "Skipping root-level leaf");
                continue;
            }
            let path = child.name.clone();
            self.record(&mut state, child, path);
        }

        let mut folders_expanded = 0usize;
        while let Some(folder_id) = state.pending.pop() {
            if cancel.is_cancelled() {
                return Err(AuditError::Cancelled);
            }

            // `record` indexes every folder before queueing it.
            let parent_path = state
                .paths
                .get(&folder_id)
                .ok_or_else(|| AuditError::MissingPath {
                    id: folder_id.clone(),
                })?
                .to_string();

            let children = self.list_all(&folder_id, cancel, &mut state.pages).await?;
            tracing::debug!(
                folder = %folder_id,
                path = %parent_path,
                children = children.len(),
                "Expanded folder"
            );

            for child in children {
                let path = format!("{parent_path}{}{}", self.options.separator, child.name);
                self.record(&mut state, child, path);
            }
            folders_expanded += 1;
        }

        tracing::info!(
            objects = state.objects.len(),
            folders_expanded,
            pages = state.pages,
            duplicates = state.duplicates,
            "Tree discovery complete"
        );

        Ok(state.objects)
    }

    /// Emits a discovered child and queues it when it is a folder.
    fn record(&self, state: &mut WalkState, child: ChildEntry, full_path: String) {
        if !state.seen.insert(child.id.clone()) {
            state.duplicates += 1;
            tracing::debug!(
                id = %child.id,
                path = %full_path,
                "Object already discovered under another path, skipping"
            );
            return;
        }

        if child.kind.is_folder() {
            state.paths.insert(child.id.clone(), full_path.clone());
            state.pending.push(child.id.clone());
        }

        state.objects.push(DriveObject {
            id: child.id,
            name: child.name,
            kind: child.kind,
            full_path,
        });
    }

    /// Fetches every page of `parent`'s children.
    async fn list_all(
        &self,
        parent: &ObjectId,
        cancel: &CancelToken,
        pages: &mut usize,
    ) -> Result<Vec<ChildEntry>> {
        let mut children = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = cancel
                .guard(self.client.list_children(parent, page_token.as_deref()))
                .await
                .map_err(|e| AuditError::discovery(parent, e))?;
            *pages += 1;
            children.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(children)
    }
}
