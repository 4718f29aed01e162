mod common;

use common::TestProject;
use mill_config::ExecutionMode;
use mill_foundation::protocol::Phase;
use mill_foundation::{Declaration, FileOperation, MillError, TargetPointer};
use mill_safe_delete::{FileSystemDocuments, SafeDeleteOutcome, SafeDeleteProcessor, Traversal};
use mill_test_support::mocks::{untouchable_document_store, MockFileUpdater};
use mill_test_support::{create_test_config, location};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Root with one declaration and one external usage
fn simple_project() -> (TestProject, TargetPointer) {
    let project = TestProject::new();
    let root = project.fixture.add_target(1, "foo");
    project
        .fixture
        .add_declaration(root, location("lib.rs", 0..20));
    project.fixture.add_usage(root, location("main.rs", 5..10));
    (project, root)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_happy_path_commits_one_transaction() {
    let (project, root) = simple_project();

    let outcome = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap();

    let report = outcome.applied().expect("applied");
    assert_eq!(report.operation_count, 2);

    let transactions = project.documents.transactions();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].label, "Safe delete foo");
    assert_eq!(transactions[0].operations.len(), 2);
    assert!(project.conflicts.shown().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_phases_run_in_order() {
    let (project, root) = simple_project();

    project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        project.progress.phases_begun(),
        vec![
            Phase::CollectTargets,
            Phase::CheckDeclarations,
            Phase::FindUsages,
            Phase::Classify,
            Phase::Apply,
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_any_conflict_blocks_every_edit() {
    let (project, root) = simple_project();
    let other = project.fixture.add_target(2, "bar");
    project.fixture.add_dependent(root, other);
    project
        .fixture
        .add_declaration(other, location("bar.rs", 0..20));
    for i in 0..5 {
        project
            .fixture
            .add_usage(other, location(&format!("user_{i}.rs"), 0..3));
    }
    project.fixture.add_unsafe_usage(
        root,
        location("api.rs", 0..3),
        Some("foo is used by the public API"),
    );

    let err = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.conflict_messages(),
        Some(&["foo is used by the public API".to_string()][..])
    );
    assert_eq!(project.documents.applied_operation_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unlabeled_conflicts_are_summarized() {
    let (project, root) = simple_project();
    project
        .fixture
        .add_unsafe_usage(root, location("a.rs", 0..3), None);
    project
        .fixture
        .add_unsafe_usage(root, location("b.rs", 0..3), None);

    let err = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.conflict_messages(),
        Some(&["foo has 2 usages that are not safe to delete.".to_string()][..])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ignore_conflicts_applies_safe_edits() {
    let (project, root) = simple_project();
    project
        .fixture
        .add_unsafe_usage(root, location("api.rs", 0..3), Some("exported"));

    let mut config = create_test_config();
    config.execution.ignore_conflicts = true;

    let outcome = project
        .processor_with(config)
        .run(root, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.applied().map(|r| r.operation_count), Some(2));
    assert_eq!(project.documents.applied_operation_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interactive_mode_shows_dialog_and_aborts() {
    let (project, root) = simple_project();
    project
        .fixture
        .add_unsafe_usage(root, location("api.rs", 0..3), Some("exported"));

    let mut config = create_test_config();
    config.execution.mode = ExecutionMode::Interactive;
    // Only honoured headless
    config.execution.ignore_conflicts = true;

    let outcome = project
        .processor_with(config)
        .run(root, CancellationToken::new())
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        SafeDeleteOutcome::ConflictsReported(ref messages) if messages == &["exported".to_string()]
    ));
    assert_eq!(
        project.conflicts.shown(),
        vec![("foo".to_string(), vec!["exported".to_string()])]
    );
    assert!(project.documents.transactions().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_root_exemption_reports_conflict() {
    let project = TestProject::new();
    let root = project.fixture.add_target(1, "foo");
    project
        .fixture
        .add_unsafe_declaration(root, location("lib.rs", 0..20), Some("locked"));

    let err = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.conflict_messages(), Some(&["locked".to_string()][..]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dry_run_returns_plan_without_committing() {
    let (project, root) = simple_project();
    project
        .fixture
        .add_unsafe_usage(root, location("api.rs", 0..3), Some("exported"));

    let mut config = create_test_config();
    config.execution.dry_run = true;
    let processor = SafeDeleteProcessor::new(
        project.services_with_documents(Arc::new(untouchable_document_store())),
        config,
    );

    let outcome = processor.run(root, CancellationToken::new()).await.unwrap();

    let plan = match outcome {
        SafeDeleteOutcome::Preview(plan) => plan,
        other => panic!("expected a preview, got {other:?}"),
    };
    assert_eq!(plan.root, "foo");
    assert_eq!(plan.targets, vec!["foo".to_string()]);
    assert_eq!(plan.declaration_count, 1);
    assert_eq!(plan.usage_count, 2);
    assert_eq!(plan.operations.len(), 2);
    assert_eq!(plan.conflicts, vec!["exported".to_string()]);
    assert!(project.conflicts.shown().is_empty());

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["usageCount"], 2);
    assert_eq!(json["operations"][0]["kind"], "delete");
}

#[tokio::test]
async fn test_missing_root_is_not_found() {
    let project = TestProject::new();

    let err = project
        .processor()
        .run(TargetPointer::new(404), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, MillError::NotFound { .. }));
}

#[tokio::test]
async fn test_failed_commit_is_reported() {
    let (project, root) = simple_project();
    project.documents.fail_commits();

    let err = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.category(), "transaction_error");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_handle_applies_nothing() {
    let (project, root) = simple_project();
    for i in 0..20 {
        project
            .fixture
            .add_usage(root, location(&format!("user_{i}.rs"), 0..4));
    }
    project.fixture.set_latency(Duration::from_millis(50));

    let processor = Arc::new(project.processor());
    let handle = processor.spawn(root);
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.cancel();

    let outcome = handle.wait().await.unwrap();

    assert!(outcome.is_cancelled());
    assert!(project.documents.transactions().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropped_run_stops_its_search() {
    let (project, root) = simple_project();
    for i in 0..20 {
        project
            .fixture
            .add_usage(root, location(&format!("user_{i}.rs"), 0..4));
    }
    project.fixture.set_latency(Duration::from_millis(20));

    let processor = project.processor();
    let timed_out = tokio::time::timeout(
        Duration::from_millis(70),
        processor.run(root, CancellationToken::new()),
    )
    .await;
    assert!(timed_out.is_err());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let pushed = project.fixture.pushed_results();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(project.fixture.pushed_results(), pushed);
    assert!(pushed < 21);
    assert!(project.documents.transactions().is_empty());
}

#[tokio::test]
async fn test_classification_runs_under_a_read_scope() {
    let project = TestProject::new();
    let root = project.fixture.add_target(1, "foo");
    let declared_at = location("lib.rs", 0..20);

    let writer_excluded = Arc::new(AtomicBool::new(false));
    let mut updater = MockFileUpdater::new();
    {
        let lock = project.lock.clone();
        let writer_excluded = writer_excluded.clone();
        let declared_at = declared_at.clone();
        updater.expect_prepare_update().times(1).returning(move || {
            writer_excluded.store(lock.try_write().is_none(), Ordering::SeqCst);
            Ok(vec![FileOperation::delete_range(
                declared_at.clone(),
                "Delete declaration",
            )])
        });
    }
    project
        .fixture
        .push_declaration(Declaration::new(root, declared_at, Arc::new(updater)));

    let outcome = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.applied().expect("applied").operation_count, 1);
    assert!(writer_excluded.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_failing_file_updater_aborts_without_commit() {
    let project = TestProject::new();
    let root = project.fixture.add_target(1, "foo");
    let mut updater = MockFileUpdater::new();
    updater
        .expect_prepare_update()
        .returning(|| Err(MillError::plugin("fixture", "cannot compute edit")));
    project.fixture.push_declaration(Declaration::new(
        root,
        location("lib.rs", 0..20),
        Arc::new(updater),
    ));
    project.fixture.add_usage(root, location("main.rs", 5..10));

    let err = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.category(), "plugin_error");
    assert!(project.documents.transactions().is_empty());
    assert!(project.conflicts.shown().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_excluded_dependent_contributes_nothing() {
    let (project, root) = simple_project();
    let pinned = project.fixture.add_target(2, "pinned");
    project.fixture.add_dependent(root, pinned);
    project.fixture.add_unsafe_declaration(
        pinned,
        location("pinned.rs", 0..30),
        Some("pinned is exported"),
    );
    project
        .fixture
        .add_usage(pinned, location("consumer.rs", 0..6));
    project.fixture.add_unsafe_usage(
        pinned,
        location("consumer.rs", 10..16),
        Some("pinned is used by a macro"),
    );

    let outcome = project
        .processor()
        .run(root, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.applied().expect("applied").operation_count, 2);
    let transactions = project.documents.transactions();
    assert_eq!(transactions.len(), 1);
    let mut files: Vec<_> = transactions[0]
        .operations
        .iter()
        .map(|op| op.file_path.display().to_string())
        .collect();
    files.sort();
    assert_eq!(files, vec!["lib.rs".to_string(), "main.rs".to_string()]);
    assert!(project.conflicts.shown().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_breadth_first_processor_matches_depth_first() {
    let (project, root) = simple_project();
    let helper = project.fixture.add_target(2, "helper");
    project.fixture.add_dependent(root, helper);
    project
        .fixture
        .add_declaration(helper, location("lib.rs", 30..40));

    let outcome = project
        .processor()
        .with_traversal(Traversal::BreadthFirst)
        .run(root, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.applied().map(|r| r.operation_count), Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_end_to_end_on_disk() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lib.rs"), "fn foo() {}\nfn bar() {}\n").unwrap();
    std::fs::write(dir.path().join("main.rs"), "fn main() { foo(); bar(); }\n").unwrap();

    let project = TestProject::new();
    let root = project.fixture.add_target(1, "foo");
    project
        .fixture
        .add_declaration(root, location("lib.rs", 0..12));
    // Inside foo's own declaration: not a real usage
    project.fixture.add_usage(root, location("lib.rs", 3..6));
    project.fixture.add_usage(root, location("main.rs", 12..19));

    let processor = SafeDeleteProcessor::new(
        project.services_with_documents(Arc::new(FileSystemDocuments::new(dir.path()))),
        create_test_config(),
    );

    let outcome = processor.run(root, CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.applied().map(|r| r.modified_files.len()), Some(2));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
        "fn bar() {}\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("main.rs")).unwrap(),
        "fn main() { bar(); }\n"
    );
}
