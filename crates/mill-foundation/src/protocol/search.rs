//! Search queries, raw results and the search service contract.

use crate::error::MillResult;
use crate::model::{Location, TargetPointer, Usage};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Options forwarded to every per-target query factory call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Also report textual occurrences in comments and string literals
    pub include_non_code_usages: bool,
}

/// Search query understood by a [`SearchService`]
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SearchQuery {
    /// All references to one target
    References {
        target: TargetPointer,
        include_non_code: bool,
        /// Kind-specific search parameters
        parameters: serde_json::Value,
    },
    /// Fan-in of several queries
    Union(Vec<SearchQuery>),
}

impl SearchQuery {
    pub fn references(target: TargetPointer, options: &SearchOptions) -> Self {
        SearchQuery::References {
            target,
            include_non_code: options.include_non_code_usages,
            parameters: serde_json::Value::Null,
        }
    }

    /// Merge queries into one, flattening nested unions
    pub fn union(queries: impl IntoIterator<Item = SearchQuery>) -> Self {
        let mut parts = Vec::new();
        for query in queries {
            match query {
                SearchQuery::Union(nested) => parts.extend(nested),
                other => parts.push(other),
            }
        }
        if parts.len() == 1 {
            return parts.remove(0);
        }
        SearchQuery::Union(parts)
    }

    /// Every target this query searches for, in query order
    pub fn targets(&self) -> Vec<TargetPointer> {
        match self {
            SearchQuery::References { target, .. } => vec![*target],
            SearchQuery::Union(parts) => parts.iter().flat_map(SearchQuery::targets).collect(),
        }
    }
}

/// A located search hit that has not yet been resolved into a [`Usage`]
#[derive(Debug, Clone, PartialEq)]
pub struct RawSearchResult {
    /// Target the hit refers to
    pub target: TargetPointer,
    pub location: Location,
    /// Whether the hit is a textual occurrence outside code
    pub non_code: bool,
}

/// Write end of the bounded hand-off queue between search and resolution
#[derive(Debug, Clone)]
pub struct ResultSink {
    tx: mpsc::Sender<RawSearchResult>,
}

impl ResultSink {
    pub fn new(tx: mpsc::Sender<RawSearchResult>) -> Self {
        Self { tx }
    }

    /// Push a result, waiting while the queue is full.
    ///
    /// Returns `false` once the consumer has gone away; producers should stop.
    pub async fn push(&self, result: RawSearchResult) -> bool {
        self.tx.send(result).await.is_ok()
    }

    /// Push without waiting; `false` if the queue is full or closed
    pub fn try_push(&self, result: RawSearchResult) -> bool {
        self.tx.try_send(result).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Search/index engine that turns queries into located references
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Fan several per-target queries into one logical query
    fn merge_queries(&self, queries: Vec<SearchQuery>) -> SearchQuery {
        SearchQuery::union(queries)
    }

    /// Run `query`, pushing every hit into `sink` as it is found.
    ///
    /// Must return promptly once `cancel` fires or the sink closes.
    async fn execute(
        &self,
        query: SearchQuery,
        sink: ResultSink,
        cancel: CancellationToken,
    ) -> MillResult<()>;

    /// Resolve a raw hit into a concrete usage; `None` when the hit went stale
    fn resolve(&self, result: &RawSearchResult) -> MillResult<Option<Usage>>;
}
