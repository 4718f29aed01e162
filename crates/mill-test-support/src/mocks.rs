//! Mock implementations for testing

use async_trait::async_trait;
use mill_foundation::protocol::{
    CodeModel, ConflictReporter, DocumentStore, RawSearchResult, ResultSink, SearchQuery,
    SearchService, Transaction,
};
use mill_foundation::{
    ApplyReport, FileOperation, FileUpdater, MillResult, Target, TargetPointer, Usage,
};
use mockall::mock;
use tokio_util::sync::CancellationToken;

mock! {
    pub SearchService {}

    #[async_trait]
    impl SearchService for SearchService {
        async fn execute(
            &self,
            query: SearchQuery,
            sink: ResultSink,
            cancel: CancellationToken,
        ) -> MillResult<()>;
        fn resolve(&self, result: &RawSearchResult) -> MillResult<Option<Usage>>;
    }
}

mock! {
    pub CodeModel {}

    impl CodeModel for CodeModel {
        fn resolve(&self, pointer: &TargetPointer) -> Option<Target>;
    }
}

mock! {
    pub DocumentStore {}

    #[async_trait]
    impl DocumentStore for DocumentStore {
        async fn commit(&self, transaction: Transaction) -> MillResult<ApplyReport>;
    }
}

mock! {
    pub ConflictReporter {}

    impl ConflictReporter for ConflictReporter {
        fn show_conflicts(&self, root: &str, messages: &[String]);
    }
}

mock! {
    pub FileUpdater {}

    impl FileUpdater for FileUpdater {
        fn prepare_update(&self) -> MillResult<Vec<FileOperation>>;
    }
}

/// Create a mock search service for testing
pub fn mock_search_service() -> MockSearchService {
    MockSearchService::new()
}

/// Create a document store that must never be committed to
pub fn untouchable_document_store() -> MockDocumentStore {
    let mut store = MockDocumentStore::new();
    store.expect_commit().never();
    store
}
