//! Declaration safety filter

use crate::closure::Closure;
use crate::context::PhaseContext;
use mill_foundation::protocol::Phase;
use mill_foundation::{Declaration, MillResult, SafeDeleteItem, Target, TargetPointer};
use tracing::{debug, info};

/// Targets that survived the declaration check, with their declarations
#[derive(Debug, Default)]
pub struct SurvivingTargets {
    pub closure: Closure,
    /// Live instances of the surviving targets, in closure order
    pub targets: Vec<Target>,
    /// Union of the surviving targets' declarations
    pub declarations: Vec<Declaration>,
}

impl SurvivingTargets {
    pub fn contains(&self, pointer: &TargetPointer) -> bool {
        self.closure.contains(pointer)
    }
}

/// Drop dependents whose own declarations are unsafe and gather the rest.
///
/// A non-root target with any unsafe declaration is excluded silently: it is
/// not a conflict, it simply is not deleted. The root is never excluded and
/// its unsafe declarations are kept so they surface as conflicts later.
/// Targets that no longer resolve are dropped.
pub async fn filter_declarations(
    ctx: &PhaseContext,
    closure: Closure,
    root: TargetPointer,
) -> MillResult<SurvivingTargets> {
    ctx.progress.begin(Phase::CheckDeclarations);

    let mut surviving = SurvivingTargets::default();

    for (index, pointer) in closure.into_iter().enumerate() {
        ctx.check_cancelled()?;

        let resolved = {
            let _scope = ctx.lock.read().await;
            match ctx.model.resolve(&pointer) {
                Some(target) => {
                    let declarations = ctx.registry.support_for(&target)?.declarations(&target)?;
                    Some((target, declarations))
                }
                None => None,
            }
        };

        let Some((target, declarations)) = resolved else {
            debug!(target = %pointer, "Target no longer exists, dropping");
            ctx.progress.advance(Phase::CheckDeclarations, index + 1);
            continue;
        };

        if pointer != root && declarations.iter().any(|d| !d.is_safe_to_delete()) {
            debug!(
                target = %pointer,
                name = %target.presentation(),
                "Dependent has an unsafe declaration, excluding it"
            );
            ctx.progress.advance(Phase::CheckDeclarations, index + 1);
            continue;
        }

        surviving.closure.insert(pointer);
        surviving.targets.push(target);
        surviving.declarations.extend(declarations);
        ctx.progress.advance(Phase::CheckDeclarations, index + 1);
    }

    ctx.progress.finish(Phase::CheckDeclarations);
    info!(
        target_count = surviving.targets.len(),
        declaration_count = surviving.declarations.len(),
        "Checked declarations"
    );
    Ok(surviving)
}
