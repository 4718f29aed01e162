mod common;

use common::TestProject;
use mill_foundation::protocol::Phase;
use mill_foundation::TargetPointer;
use mill_safe_delete::{build_closure, build_closure_with, filter_declarations, Traversal};
use mill_test_support::{location, ProgressEvent};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn as_set(closure: &mill_safe_delete::Closure) -> BTreeSet<TargetPointer> {
    closure.iter().copied().collect()
}

#[tokio::test]
async fn test_traversal_order_does_not_change_the_closure() {
    let project = TestProject::new();
    let f = &project.fixture;
    let root = f.add_target(1, "root");
    let a = f.add_target(2, "a");
    let b = f.add_target(3, "b");
    let c = f.add_target(4, "c");
    let d = f.add_target(5, "d");
    f.add_dependent(root, a);
    f.add_dependent(root, b);
    f.add_dependent(a, c);
    f.add_dependent(b, c);
    f.add_dependent(c, d);

    let ctx = project.context();
    let depth_first = build_closure_with(&ctx, root, Traversal::DepthFirst)
        .await
        .unwrap();
    let breadth_first = build_closure_with(&ctx, root, Traversal::BreadthFirst)
        .await
        .unwrap();

    assert_eq!(as_set(&depth_first), BTreeSet::from([root, a, b, c, d]));
    assert_eq!(as_set(&depth_first), as_set(&breadth_first));
    assert_eq!(depth_first.first(), Some(&root));
}

#[tokio::test]
async fn test_cycles_terminate_and_expand_each_target_once() {
    let project = TestProject::new();
    let f = &project.fixture;
    let root = f.add_target(1, "root");
    let a = f.add_target(2, "a");
    let b = f.add_target(3, "b");
    f.add_dependent(root, a);
    f.add_dependent(a, b);
    f.add_dependent(b, root);
    f.add_dependent(b, b);

    let closure = build_closure(&project.context(), root).await.unwrap();

    assert_eq!(as_set(&closure), BTreeSet::from([root, a, b]));
    for pointer in [root, a, b] {
        assert_eq!(project.fixture.expansion_count(pointer), 1);
    }
}

#[tokio::test]
async fn test_vanished_dependent_is_kept_but_not_expanded() {
    let project = TestProject::new();
    let f = &project.fixture;
    let root = f.add_target(1, "root");
    let gone = f.add_target(2, "gone");
    let behind = f.add_target(3, "behind");
    f.add_dependent(root, gone);
    f.add_dependent(gone, behind);
    f.remove_target(gone);

    let closure = build_closure(&project.context(), root).await.unwrap();

    assert_eq!(as_set(&closure), BTreeSet::from([root, gone]));
    assert_eq!(project.fixture.expansion_count(gone), 0);
    assert!(project
        .progress
        .events()
        .contains(&ProgressEvent::Advance(Phase::CollectTargets, 2)));

    // The declaration check then drops it
    let surviving = filter_declarations(&project.context(), closure, root)
        .await
        .unwrap();
    assert_eq!(as_set(&surviving.closure), BTreeSet::from([root]));
    assert!(project
        .progress
        .events()
        .contains(&ProgressEvent::Advance(Phase::CheckDeclarations, 2)));
}

#[tokio::test]
async fn test_unknown_kind_is_not_supported() {
    let project = TestProject::new();
    let root = project.fixture.add_target_of_kind(1, "macro", "m");
    project.fixture.add_declaration(root, location("a.rs", 0..5));

    let err = build_closure(&project.context(), root).await.unwrap_err();

    assert_eq!(err.category(), "unsupported_operation");
}

#[tokio::test]
async fn test_cancelled_context_stops_the_walk() {
    let project = TestProject::new();
    let root = project.fixture.add_target(1, "root");
    let ctx = project.context();
    ctx.cancel.cancel();

    let err = build_closure(&ctx, root).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(project.fixture.expansion_count(root), 0);
}
