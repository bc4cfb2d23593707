//! End-to-end audits over small trees.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use drive_audit_core::memory::{MemorySink, MemoryStore};
use drive_audit_core::{
    AuditConfig, AuditError, AuditRunner, CancelToken, ChildEntry, ChildPage, InheritancePolicy,
    ObjectId, PermissionDetail, PermissionGrant, PrincipalType, RootScope, StoreClient,
    StoreError,
};

use crate::common::{direct_user, reports_store, ROOT};

async fn audit(store: MemoryStore, config: AuditConfig) -> (drive_audit_core::AuditSummary, MemorySink) {
    let runner = AuditRunner::new(Arc::new(store), config).expect("valid config");
    let mut sink = MemorySink::new();
    let summary = runner
        .run(&ObjectId::new(ROOT), &mut sink, &CancelToken::new())
        .await
        .expect("audit should complete");
    (summary, sink)
}

#[tokio::test]
async fn test_reports_scenario_emits_only_direct_grant() {
    let (summary, sink) = audit(reports_store(), AuditConfig::default()).await;

    assert_eq!(sink.rows.len(), 1);
    let row = &sink.rows[0];
    assert_eq!(row.full_path, "Reports/Q1.pdf");
    assert_eq!(row.object_id.as_str(), "q1");
    assert_eq!(row.principal_identifier, "alice@example.com");
    assert_eq!(row.principal_type.as_str(), "user");
    assert_eq!(row.role, "reader");
    assert!(!row.inherited);

    assert_eq!(summary.objects, 2);
    assert_eq!(summary.folders, 1);
    assert_eq!(summary.grants_skipped_inherited, 2);
    assert!(summary.is_complete());
}

#[tokio::test]
async fn test_permission_failure_is_isolated() {
    let store = MemoryStore::new()
        .with_child(ROOT, ChildEntry::folder("dir", "Dir"))
        .with_child("dir", ChildEntry::leaf("a", "a.txt"))
        .with_child("dir", ChildEntry::leaf("x", "x.txt"))
        .with_child("dir", ChildEntry::leaf("b", "b.txt"))
        .with_grant("a", direct_user("a@example.com", "reader"))
        .with_grant("x", direct_user("x@example.com", "reader"))
        .with_grant("b", direct_user("b@example.com", "reader"))
        .with_failing_permissions("x");

    let (summary, sink) = audit(store, AuditConfig::default()).await;

    let ids: Vec<_> = sink.rows.iter().map(|r| r.object_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(summary.permission_failures, vec![ObjectId::new("x")]);
    assert!(!summary.is_complete());
    assert!(sink.finished);
}

#[tokio::test]
async fn test_discovery_failure_aborts_without_rows() {
    let store = reports_store()
        .with_child(ROOT, ChildEntry::folder("broken", "Broken"))
        .with_failing_listing("broken");
    let runner = AuditRunner::new(Arc::new(store), AuditConfig::default()).unwrap();
    let mut sink = MemorySink::new();

    let err = runner
        .run(&ObjectId::new(ROOT), &mut sink, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AuditError::Discovery { .. }));
    assert!(sink.rows.is_empty());
    assert!(!sink.finished);
}

#[tokio::test]
async fn test_folders_with_direct_grants_are_audited() {
    let store = MemoryStore::new()
        .with_child(ROOT, ChildEntry::folder("legal", "Legal"))
        .with_child("legal", ChildEntry::folder("contracts", "Contracts"))
        .with_grant("contracts", direct_user("counsel@example.com", "writer"));

    let (_, sink) = audit(store, AuditConfig::default()).await;

    assert_eq!(sink.rows.len(), 1);
    assert_eq!(sink.rows[0].full_path, "Legal/Contracts");
}

#[tokio::test]
async fn test_root_level_leaf_scope() {
    let store = || {
        reports_store()
            .with_child(ROOT, ChildEntry::leaf("readme", "README.txt"))
            .with_grant("readme", direct_user("dana@example.com", "commenter"))
    };

    let (_, all) = audit(store(), AuditConfig::default()).await;
    assert!(all.rows.iter().any(|r| r.full_path == "README.txt"));

    let (_, folders_only) = audit(
        store(),
        AuditConfig {
            root_scope: RootScope::FoldersOnly,
            ..Default::default()
        },
    )
    .await;
    assert!(folders_only.rows.iter().all(|r| r.full_path != "README.txt"));
    assert_eq!(folders_only.rows.len(), 1);
}

#[tokio::test]
async fn test_inheritance_policy_changes_mixed_grant() {
    let mixed = PermissionGrant::new(PrincipalType::Group, "writer")
        .with_email("eng@example.com")
        .with_detail(PermissionDetail::inherited())
        .with_detail(PermissionDetail::direct());
    let store = || {
        MemoryStore::new()
            .with_child(ROOT, ChildEntry::leaf("brief", "brief.doc"))
            .with_grant("brief", mixed.clone())
    };

    let (_, first) = audit(store(), AuditConfig::default()).await;
    assert!(first.rows.is_empty());

    let (_, any) = audit(
        store(),
        AuditConfig {
            inheritance_policy: InheritancePolicy::AnyDirect,
            ..Default::default()
        },
    )
    .await;
    assert_eq!(any.rows.len(), 1);
    assert_eq!(any.rows[0].principal_type, PrincipalType::Group);
}

#[tokio::test]
async fn test_empty_drive_produces_empty_report() {
    let (summary, sink) = audit(MemoryStore::new(), AuditConfig::default()).await;
    assert_eq!(summary, drive_audit_core::AuditSummary::default());
    assert!(sink.rows.is_empty());
    assert!(sink.finished);
}

#[tokio::test]
async fn test_sequential_and_concurrent_runs_agree() {
    let (_, sequential) = audit(
        crate::common::wide_folder(50, 7),
        AuditConfig {
            concurrency: 1,
            ..Default::default()
        },
    )
    .await;
    let (_, concurrent) = audit(
        crate::common::wide_folder(50, 7),
        AuditConfig {
            concurrency: 16,
            ..Default::default()
        },
    )
    .await;

    assert_eq!(sequential.rows, concurrent.rows);
}

/// Root listing of `count` leaves named `f00`, `f01`, ...
fn numbered_leaves(count: usize) -> ChildPage {
    let items = (0..count)
        .map(|i| {
            let id = format!("f{i:02}");
            ChildEntry::leaf(id.as_str(), format!("{id}.txt"))
        })
        .collect();
    ChildPage::new(items, None)
}

fn leaf_index(object: &ObjectId) -> usize {
    object.as_str()[1..].parse().unwrap_or(0)
}

/// Answers lookups for later leaves first: the delay shrinks with the index.
struct LateFirstStore {
    count: usize,
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl StoreClient for LateFirstStore {
    async fn list_children(
        &self,
        parent: &ObjectId,
        _page_token: Option<&str>,
    ) -> Result<ChildPage, StoreError> {
        if parent.as_str() == ROOT {
            Ok(numbered_leaves(self.count))
        } else {
            Ok(ChildPage::default())
        }
    }

    async fn list_permissions(&self, object: &ObjectId) -> Result<Vec<PermissionGrant>, StoreError> {
        let remaining = (self.count - leaf_index(object)) as u64;
        tokio::time::sleep(Duration::from_millis(remaining * 10)).await;
        self.completed
            .lock()
            .expect("completion log")
            .push(object.to_string());
        Ok(vec![direct_user(&format!("{object}@example.com"), "reader")])
    }

    fn name(&self) -> &str {
        "late-first"
    }
}

/// Cancels the run from inside the `cancel_at`-th permission lookup.
struct CancellingStore {
    count: usize,
    cancel_at: usize,
    cancel: CancelToken,
    calls: AtomicUsize,
}

#[async_trait]
impl StoreClient for CancellingStore {
    async fn list_children(
        &self,
        parent: &ObjectId,
        _page_token: Option<&str>,
    ) -> Result<ChildPage, StoreError> {
        if parent.as_str() == ROOT {
            Ok(numbered_leaves(self.count))
        } else {
            Ok(ChildPage::default())
        }
    }

    async fn list_permissions(&self, object: &ObjectId) -> Result<Vec<PermissionGrant>, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.cancel_at {
            self.cancel.cancel();
            std::future::pending::<()>().await;
        }
        Ok(vec![direct_user(&format!("{object}@example.com"), "reader")])
    }

    fn name(&self) -> &str {
        "cancelling"
    }
}

#[tokio::test(start_paused = true)]
async fn test_rows_keep_discovery_order_when_lookups_finish_out_of_order() {
    let store = Arc::new(LateFirstStore {
        count: 12,
        completed: Mutex::new(Vec::new()),
    });
    let runner = AuditRunner::new(
        store.clone(),
        AuditConfig {
            concurrency: 12,
            ..Default::default()
        },
    )
    .expect("valid config");
    let mut sink = MemorySink::new();

    runner
        .run(&ObjectId::new(ROOT), &mut sink, &CancelToken::new())
        .await
        .expect("audit should complete");

    let expected: Vec<String> = (0..12).map(|i| format!("f{i:02}")).collect();
    let completed = store.completed.lock().expect("completion log").clone();
    assert_eq!(completed.first().map(String::as_str), Some("f11"));
    assert_eq!(completed.last().map(String::as_str), Some("f00"));

    let written: Vec<String> = sink.rows.iter().map(|r| r.object_id.to_string()).collect();
    assert_eq!(written, expected);
}

#[tokio::test]
async fn test_cancel_during_resolution_stops_run() {
    let cancel = CancelToken::new();
    let store = CancellingStore {
        count: 12,
        cancel_at: 6,
        cancel: cancel.clone(),
        calls: AtomicUsize::new(0),
    };
    let runner = AuditRunner::new(
        Arc::new(store),
        AuditConfig {
            concurrency: 2,
            ..Default::default()
        },
    )
    .expect("valid config");
    let mut sink = MemorySink::new();

    let err = runner
        .run(&ObjectId::new(ROOT), &mut sink, &cancel)
        .await
        .expect_err("run should be cancelled");

    assert!(matches!(err, AuditError::Cancelled));
    assert!(!sink.finished);
    assert!(!sink.rows.is_empty());
    assert!(sink.rows.len() < 6);
    for (i, row) in sink.rows.iter().enumerate() {
        assert_eq!(row.object_id.to_string(), format!("f{i:02}"));
    }
}
