//! Path and uniqueness properties of the tree walker over generated trees.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use drive_audit_core::memory::MemoryStore;
use drive_audit_core::{CancelToken, ChildEntry, ObjectId, TreeWalker, WalkOptions};
use proptest::prelude::*;

use crate::common::ROOT;

/// A generated acyclic single-parent tree: `parents[i]` is the index of
/// node `i`'s parent among nodes `0..i`, or `None` for the root.
#[derive(Debug, Clone)]
struct GeneratedTree {
    parents: Vec<Option<usize>>,
    folders: Vec<bool>,
    names: Vec<String>,
}

fn tree_strategy() -> impl Strategy<Value = GeneratedTree> {
    (1usize..40).prop_flat_map(|n| {
        let parents = (0..n)
            .map(|i| {
                if i == 0 {
                    Just(None::<usize>).boxed()
                } else {
                    proptest::option::weighted(0.85, 0..i).boxed()
                }
            })
            .collect::<Vec<_>>();
        let folders = proptest::collection::vec(any::<bool>(), n);
        let names = proptest::collection::vec("[a-z]{1,6}", n);
        (parents, folders, names).prop_map(|(parents, folders, names)| GeneratedTree {
            parents,
            folders,
            names,
        })
    })
}

impl GeneratedTree {
    /// Parents that are leaves get re-parented to the root so every
    /// listed child hangs off a folder.
    fn normalised_parent(&self, i: usize) -> Option<usize> {
        self.parents[i].filter(|p| self.folders[*p])
    }

    fn store(&self, page_size: usize) -> MemoryStore {
        let mut store = MemoryStore::new().with_page_size(page_size);
        for i in 0..self.parents.len() {
            let parent = match self.normalised_parent(i) {
                Some(p) => format!("n{p}"),
                None => ROOT.to_string(),
            };
            let id = format!("n{i}");
            let entry = if self.folders[i] {
                ChildEntry::folder(id.as_str(), self.names[i].clone())
            } else {
                ChildEntry::leaf(id.as_str(), self.names[i].clone())
            };
            store = store.with_child(parent, entry);
        }
        store
    }
}

fn walk(tree: &GeneratedTree, page_size: usize) -> Vec<drive_audit_core::DriveObject> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime
        .block_on(
            TreeWalker::new(Arc::new(tree.store(page_size)), WalkOptions::default())
                .walk(&ObjectId::new(ROOT), &CancelToken::new()),
        )
        .unwrap()
}

proptest! {
    #[test]
    fn test_every_node_discovered_exactly_once(tree in tree_strategy(), page_size in 1usize..6) {
        let objects = walk(&tree, page_size);

        prop_assert_eq!(objects.len(), tree.parents.len());
        let unique: HashSet<_> = objects.iter().map(|o| o.id.clone()).collect();
        prop_assert_eq!(unique.len(), objects.len());
    }

    #[test]
    fn test_child_path_extends_parent_path(tree in tree_strategy()) {
        let objects = walk(&tree, 1000);
        let paths: HashMap<_, _> = objects
            .iter()
            .map(|o| (o.id.as_str().to_string(), o.full_path.clone()))
            .collect();

        for i in 0..tree.parents.len() {
            let own = &paths[&format!("n{i}")];
            match tree.normalised_parent(i) {
                Some(p) => {
                    let expected = format!("{}/{}", paths[&format!("n{p}")], tree.names[i]);
                    prop_assert_eq!(own, &expected);
                }
                None => prop_assert_eq!(own, &tree.names[i]),
            }
        }
    }
}
