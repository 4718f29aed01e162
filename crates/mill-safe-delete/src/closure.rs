//! Target closure: every target that must be deleted together with the root

use crate::context::PhaseContext;
use indexmap::IndexSet;
use mill_foundation::protocol::Phase;
use mill_foundation::{MillResult, TargetPointer};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Set of target pointers, iterated in discovery order
pub type Closure = IndexSet<TargetPointer>;

/// Order in which the adjacency relation is explored.
///
/// The resulting set does not depend on the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
    #[default]
    DepthFirst,
    BreadthFirst,
}

/// Compute the closure of `root` depth-first
pub async fn build_closure(ctx: &PhaseContext, root: TargetPointer) -> MillResult<Closure> {
    build_closure_with(ctx, root, Traversal::DepthFirst).await
}

/// Compute the closure of `root` using the given traversal order.
///
/// A pointer is inserted into the visited set before its additional targets
/// are requested, so each target is expanded at most once and cycles in the
/// adjacency relation terminate. Pointers that no longer resolve stay in the
/// set unexpanded; the declaration filter drops them.
pub async fn build_closure_with(
    ctx: &PhaseContext,
    root: TargetPointer,
    traversal: Traversal,
) -> MillResult<Closure> {
    ctx.progress.begin(Phase::CollectTargets);

    let mut visited = Closure::new();
    let mut pending = VecDeque::from([root]);

    while let Some(pointer) = next_pending(&mut pending, traversal) {
        ctx.check_cancelled()?;

        if !visited.insert(pointer) {
            continue;
        }
        ctx.progress.advance(Phase::CollectTargets, visited.len());

        let additional = {
            let _scope = ctx.lock.read().await;
            let Some(target) = ctx.model.resolve(&pointer) else {
                debug!(target = %pointer, "Target no longer exists, not expanding");
                continue;
            };
            let support = ctx.registry.support_for(&target)?;
            support.additional_targets(&target, ctx.model.as_ref())?
        };

        debug!(
            target = %pointer,
            additional_count = additional.len(),
            "Expanded target"
        );

        for next in additional {
            if !visited.contains(&next) {
                pending.push_back(next);
            }
        }
    }

    ctx.progress.finish(Phase::CollectTargets);
    info!(target_count = visited.len(), "Collected targets to delete");
    Ok(visited)
}

fn next_pending(pending: &mut VecDeque<TargetPointer>, traversal: Traversal) -> Option<TargetPointer> {
    match traversal {
        Traversal::DepthFirst => pending.pop_back(),
        Traversal::BreadthFirst => pending.pop_front(),
    }
}
