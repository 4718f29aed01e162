//! Usage collection: concurrent search producer and resolving consumer

use crate::context::PhaseContext;
use crate::lock::ProjectLock;
use mill_config::SearchConfig;
use mill_foundation::protocol::{
    Phase, ProgressReporter, RawSearchResult, ResultSink, SearchOptions, SearchQuery,
    SearchService,
};
use mill_foundation::{Declaration, Location, MillError, MillResult, Target, Usage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, info};

/// Finds every external usage of the surviving targets
pub struct UsageCollector {
    search: Arc<dyn SearchService>,
    capacity: usize,
    options: SearchOptions,
}

impl UsageCollector {
    pub fn new(search: Arc<dyn SearchService>, config: &SearchConfig) -> Self {
        Self {
            search,
            capacity: config.effective_capacity(),
            options: SearchOptions {
                include_non_code_usages: config.include_non_code_usages,
            },
        }
    }

    /// Collect usages of `targets`, discarding those inside `declarations`.
    ///
    /// The merged query runs as a producer task feeding a bounded queue while
    /// a consumer task resolves results as they arrive. The output is neither
    /// ordered nor deduplicated.
    pub async fn collect(
        &self,
        ctx: &PhaseContext,
        targets: &[Target],
        declarations: &[Declaration],
    ) -> MillResult<Vec<Usage>> {
        ctx.progress.begin(Phase::FindUsages);
        ctx.check_cancelled()?;

        let queries = {
            let _scope = ctx.lock.read().await;
            targets
                .iter()
                .map(|target| {
                    ctx.registry
                        .support_for(target)?
                        .search_query(target, &self.options)
                })
                .collect::<MillResult<Vec<SearchQuery>>>()?
        };

        if queries.is_empty() {
            ctx.progress.finish(Phase::FindUsages);
            return Ok(Vec::new());
        }

        let query = self.search.merge_queries(queries);
        let declared: Arc<[Location]> = declarations.iter().map(|d| d.location.clone()).collect();

        // Child scope so a failing consumer can stop the producer without
        // cancelling the whole invocation
        let scope = ctx.cancel.child_token();
        // Dropping this future cancels the scope and aborts both tasks
        let _scope_guard = scope.clone().drop_guard();
        let (tx, rx) = mpsc::channel(self.capacity);

        let producer = AbortOnDropHandle::new(tokio::spawn(produce(
            self.search.clone(),
            query,
            ResultSink::new(tx),
            scope.clone(),
        )));
        let consumer = AbortOnDropHandle::new(tokio::spawn(consume(
            self.search.clone(),
            ctx.lock.clone(),
            ctx.progress.clone(),
            rx,
            declared,
            scope.clone(),
        )));

        let usages = match flatten(consumer.await) {
            Ok(usages) => usages,
            Err(err) => {
                scope.cancel();
                producer.abort();
                let _ = producer.await;
                return Err(err);
            }
        };

        // The queue only closes once the producer has dropped its sink
        flatten(producer.await)?;

        ctx.progress.finish(Phase::FindUsages);
        info!(usage_count = usages.len(), "Collected usages");
        Ok(usages)
    }
}

async fn produce(
    search: Arc<dyn SearchService>,
    query: SearchQuery,
    sink: ResultSink,
    cancel: CancellationToken,
) -> MillResult<()> {
    let result = search.execute(query, sink, cancel).await;
    if let Err(err) = &result {
        error!(error = %err, "Usage search failed");
    }
    result
}

async fn consume(
    search: Arc<dyn SearchService>,
    lock: ProjectLock,
    progress: Arc<dyn ProgressReporter>,
    mut rx: mpsc::Receiver<RawSearchResult>,
    declared: Arc<[Location]>,
    cancel: CancellationToken,
) -> MillResult<Vec<Usage>> {
    let mut usages = Vec::new();
    let mut received = 0usize;

    loop {
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MillError::Cancelled),
            next = rx.recv() => match next {
                Some(raw) => raw,
                None => break,
            },
        };
        received += 1;

        let resolved = {
            let _scope = lock.read().await;
            search.resolve(&raw)?
        };

        let Some(usage) = resolved else {
            debug!(file = %raw.location.file.display(), "Search result went stale, dropping");
            continue;
        };

        if declared.iter().any(|decl| decl.contains(&usage.location)) {
            debug!(
                file = %usage.location.file.display(),
                start = usage.location.range.start,
                "Usage is inside a deleted declaration, ignoring"
            );
            continue;
        }

        usages.push(usage);
        progress.advance(Phase::FindUsages, received);
    }

    Ok(usages)
}

fn flatten<T>(joined: Result<MillResult<T>, JoinError>) -> MillResult<T> {
    match joined {
        Ok(result) => result,
        Err(err) if err.is_cancelled() => Err(MillError::Cancelled),
        Err(err) => Err(MillError::internal(format!("Usage search task failed: {}", err))),
    }
}
