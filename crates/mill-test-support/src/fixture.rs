//! In-memory project used to drive the engine end to end

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use mill_foundation::protocol::{
    CodeModel, RawSearchResult, ResultSink, SearchOptions, SearchQuery, SearchService,
    TargetSupport,
};
use mill_foundation::{
    Declaration, Location, MillError, MillResult, Target, TargetPointer, Usage,
};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Kind of every target created by [`FixtureProject::add_target`]
pub const FIXTURE_KIND: &str = "fixture";

struct FixtureUsage {
    usage: Usage,
    non_code: bool,
}

/// Dashmap-backed code model, target capability and search engine.
///
/// Targets, declarations, dependency edges and usages are registered up
/// front. Search latency and failures can be injected to exercise the
/// producer/consumer pipeline.
#[derive(Default)]
pub struct FixtureProject {
    targets: DashMap<TargetPointer, Target>,
    declarations: DashMap<TargetPointer, Vec<Declaration>>,
    dependents: DashMap<TargetPointer, Vec<TargetPointer>>,
    usages: DashMap<TargetPointer, Vec<FixtureUsage>>,
    stale_results: DashSet<Location>,
    expansions: DashMap<TargetPointer, usize>,
    pushed_results: AtomicUsize,
    latency_ms: AtomicU64,
    failure: Mutex<Option<(usize, String)>>,
}

impl FixtureProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_target(&self, id: u64, name: &str) -> TargetPointer {
        self.add_target_of_kind(id, FIXTURE_KIND, name)
    }

    pub fn add_target_of_kind(&self, id: u64, kind: &str, name: &str) -> TargetPointer {
        let pointer = TargetPointer::new(id);
        self.targets.insert(pointer, Target::new(pointer, kind, name));
        pointer
    }

    /// Make the target disappear from the code model
    pub fn remove_target(&self, pointer: TargetPointer) {
        self.targets.remove(&pointer);
    }

    pub fn add_declaration(&self, target: TargetPointer, location: Location) {
        self.push_declaration(Declaration::deleting_range(target, location));
    }

    pub fn add_unsafe_declaration(
        &self,
        target: TargetPointer,
        location: Location,
        message: Option<&str>,
    ) {
        let mut declaration = Declaration::deleting_range(target, location);
        declaration.mark_unsafe(message.map(str::to_string));
        self.push_declaration(declaration);
    }

    pub fn push_declaration(&self, declaration: Declaration) {
        self.declarations
            .entry(declaration.target)
            .or_default()
            .push(declaration);
    }

    /// `dependent` must be deleted whenever `target` is
    pub fn add_dependent(&self, target: TargetPointer, dependent: TargetPointer) {
        self.dependents.entry(target).or_default().push(dependent);
    }

    pub fn add_usage(&self, target: TargetPointer, location: Location) {
        self.push_usage(Usage::deleting_range(target, location), false);
    }

    pub fn add_unsafe_usage(
        &self,
        target: TargetPointer,
        location: Location,
        message: Option<&str>,
    ) {
        let mut usage = Usage::deleting_range(target, location);
        usage.mark_unsafe(message.map(str::to_string));
        self.push_usage(usage, false);
    }

    /// Occurrence in a comment or string literal
    pub fn add_non_code_usage(&self, target: TargetPointer, location: Location) {
        self.push_usage(Usage::deleting_range(target, location), true);
    }

    pub fn push_usage(&self, usage: Usage, non_code: bool) {
        self.usages
            .entry(usage.target)
            .or_default()
            .push(FixtureUsage { usage, non_code });
    }

    /// The search still reports `location`, but it no longer resolves
    pub fn mark_stale(&self, location: Location) {
        self.stale_results.insert(location);
    }

    /// Delay before each search result is pushed
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Fail the search after `after` results have been pushed, or at the end
    /// if there are fewer
    pub fn fail_search_after(&self, after: usize, message: &str) {
        *self.failure.lock().unwrap() = Some((after, message.to_string()));
    }

    /// How many times the closure builder expanded `pointer`
    pub fn expansion_count(&self, pointer: TargetPointer) -> usize {
        self.expansions.get(&pointer).map(|count| *count).unwrap_or(0)
    }

    /// Total raw results pushed into sinks so far
    pub fn pushed_results(&self) -> usize {
        self.pushed_results.load(Ordering::SeqCst)
    }

    fn failure_point(&self) -> Option<(usize, String)> {
        self.failure.lock().unwrap().clone()
    }
}

impl CodeModel for FixtureProject {
    fn resolve(&self, pointer: &TargetPointer) -> Option<Target> {
        self.targets.get(pointer).map(|target| target.clone())
    }
}

impl TargetSupport for FixtureProject {
    fn kind(&self) -> &'static str {
        FIXTURE_KIND
    }

    fn additional_targets(
        &self,
        target: &Target,
        _model: &dyn CodeModel,
    ) -> MillResult<Vec<TargetPointer>> {
        *self.expansions.entry(target.pointer()).or_insert(0) += 1;
        Ok(self
            .dependents
            .get(&target.pointer())
            .map(|edges| edges.clone())
            .unwrap_or_default())
    }

    fn declarations(&self, target: &Target) -> MillResult<Vec<Declaration>> {
        Ok(self
            .declarations
            .get(&target.pointer())
            .map(|declarations| declarations.clone())
            .unwrap_or_default())
    }

    fn search_query(&self, target: &Target, options: &SearchOptions) -> MillResult<SearchQuery> {
        Ok(SearchQuery::references(target.pointer(), options))
    }
}

#[async_trait]
impl SearchService for FixtureProject {
    async fn execute(
        &self,
        query: SearchQuery,
        sink: ResultSink,
        cancel: CancellationToken,
    ) -> MillResult<()> {
        let include_non_code = match &query {
            SearchQuery::Union(parts) => parts.iter().any(|part| {
                matches!(part, SearchQuery::References { include_non_code: true, .. })
            }),
            SearchQuery::References { include_non_code, .. } => *include_non_code,
            _ => false,
        };

        // Collect first so no dashmap guard is held across an await
        let results: Vec<RawSearchResult> = query
            .targets()
            .into_iter()
            .flat_map(|target| {
                self.usages
                    .get(&target)
                    .map(|entries| {
                        entries
                            .iter()
                            .filter(|entry| include_non_code || !entry.non_code)
                            .map(|entry| RawSearchResult {
                                target,
                                location: entry.usage.location.clone(),
                                non_code: entry.non_code,
                            })
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            })
            .collect();

        let failure = self.failure_point();
        let latency = Duration::from_millis(self.latency_ms.load(Ordering::SeqCst));

        for (index, result) in results.into_iter().enumerate() {
            if let Some((after, message)) = &failure {
                if index == *after {
                    return Err(MillError::search(message.clone()));
                }
            }

            if !latency.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(MillError::Cancelled),
                    _ = tokio::time::sleep(latency) => {}
                }
            }
            if cancel.is_cancelled() {
                return Err(MillError::Cancelled);
            }

            if !sink.push(result).await {
                return Ok(());
            }
            self.pushed_results.fetch_add(1, Ordering::SeqCst);
        }

        // Failure point past the last result: fail once everything is pushed
        match failure {
            Some((_, message)) => Err(MillError::search(message)),
            None => Ok(()),
        }
    }

    fn resolve(&self, result: &RawSearchResult) -> MillResult<Option<Usage>> {
        if self.stale_results.contains(&result.location) {
            return Ok(None);
        }
        Ok(self.usages.get(&result.target).and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.usage.location == result.location)
                .map(|entry| entry.usage.clone())
        }))
    }
}
