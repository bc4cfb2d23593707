//! Discovery across paginated listings.

use std::collections::HashSet;
use std::sync::Arc;

use drive_audit_core::memory::MemorySink;
use drive_audit_core::{
    AuditConfig, AuditRunner, CancelToken, ObjectId, TreeWalker, WalkOptions,
};

use crate::common::{wide_folder, ROOT};

#[tokio::test]
async fn test_folder_with_2500_children_spans_three_pages() {
    let store = Arc::new(wide_folder(2500, 1000));
    let walker = TreeWalker::new(store.clone(), WalkOptions::default());

    let objects = walker
        .walk(&ObjectId::new(ROOT), &CancelToken::new())
        .await
        .unwrap();

    let children: Vec<_> = objects
        .iter()
        .filter(|o| o.full_path.starts_with("Wide/"))
        .collect();
    assert_eq!(children.len(), 2500);

    let unique: HashSet<_> = children.iter().map(|o| &o.id).collect();
    assert_eq!(unique.len(), 2500);

    // one root page plus three pages for "Wide"
    assert_eq!(store.listing_calls(), 4);
}

#[tokio::test]
async fn test_page_boundary_alignment_does_not_matter() {
    for page_size in [1, 3, 999, 1000, 2500, 2501] {
        let store = Arc::new(wide_folder(2500, page_size));
        let objects = TreeWalker::new(store, WalkOptions::default())
            .walk(&ObjectId::new(ROOT), &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(objects.len(), 2501, "page size {page_size}");
    }
}

#[tokio::test]
async fn test_every_paged_child_gets_a_row() {
    let runner = AuditRunner::new(Arc::new(wide_folder(1200, 500)), AuditConfig::default()).unwrap();
    let mut sink = MemorySink::new();

    let summary = runner
        .run(&ObjectId::new(ROOT), &mut sink, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(summary.rows_written, 1200);
    assert_eq!(sink.rows.len(), 1200);
}
