//! Bulk loader.
//!
//! Writes a lazy stream of documents into the destination index one batch
//! at a time and yields a [`LoadOutcome`] per document.

use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::progress::ProgressSink;
use crate::retry::RetryPolicy;
use centralsearch_repository::{BatchOperationSummary, DestinationIndex, SearchIndexError};
use centralsearch_shared::{IndexDocument, LoadOutcome, Progress};

/// Default number of documents per bulk request.
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Configuration for the bulk loader.
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// Number of documents written per bulk request.
    pub batch_size: usize,
    /// Backoff for individual retries of failed documents.
    pub retry: RetryPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            retry: RetryPolicy::document_write(),
        }
    }
}

impl LoaderConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Whether a destination write error is worth retrying.
pub fn is_retryable_error(error: &SearchIndexError) -> bool {
    match error {
        SearchIndexError::ConnectionError(_)
        | SearchIndexError::BulkOperationError(_)
        | SearchIndexError::ParseError(_) => true,
        SearchIndexError::StatusError { status, .. } => {
            *status >= 500 || *status == 429 || *status == 408
        }
        SearchIndexError::ValidationError(_)
        | SearchIndexError::IndexError(_)
        | SearchIndexError::IndexCreationError(_) => false,
    }
}

/// Loader that writes documents into the destination index.
///
/// The loader is responsible for:
/// - Batching documents into bulk requests
/// - Retrying failed documents individually with backoff
/// - Reporting cumulative progress
pub struct BulkLoader {
    index: Arc<dyn DestinationIndex>,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a new loader with the default configuration.
    pub fn new(index: Arc<dyn DestinationIndex>) -> Self {
        Self::with_config(index, LoaderConfig::default())
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(index: Arc<dyn DestinationIndex>, config: LoaderConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Name of the destination index.
    pub fn index_name(&self) -> &str {
        self.index.index_name()
    }

    /// Ensure the destination index exists.
    pub async fn ensure_index(&self) -> Result<(), PipelineError> {
        self.index.ensure_index_exists().await?;
        Ok(())
    }

    /// Check if the destination is healthy.
    pub async fn health_check(&self) -> Result<bool, PipelineError> {
        Ok(self.index.health_check().await?)
    }

    /// Load `documents` lazily.
    ///
    /// At most one batch is pulled from upstream before its outcomes are
    /// yielded. An upstream error is yielded after the outcomes of the
    /// documents already pulled and ends the stream. `progress` receives
    /// `(processed, min(total_hits, max_records))` after every batch and
    /// once more when the stream ends.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the batch size is zero.
    pub fn load<'a, S>(
        &'a self,
        documents: S,
        total_hits: watch::Receiver<Option<u64>>,
        max_records: Option<u64>,
        progress: &'a dyn ProgressSink,
    ) -> Result<BoxStream<'a, Result<LoadOutcome, PipelineError>>, PipelineError>
    where
        S: Stream<Item = Result<IndexDocument, PipelineError>> + Send + 'a,
    {
        if self.config.batch_size == 0 {
            return Err(PipelineError::config("batch size must be greater than zero"));
        }

        let state = LoadState {
            loader: self,
            documents: documents.boxed(),
            outcomes: VecDeque::with_capacity(self.config.batch_size),
            upstream_error: None,
            upstream_done: false,
            finished: false,
            processed: 0,
            total_hits,
            max_records,
            progress,
        };

        Ok(stream::unfold(state, |mut state| async move {
            loop {
                if let Some(outcome) = state.outcomes.pop_front() {
                    return Some((Ok(outcome), state));
                }
                if let Some(e) = state.upstream_error.take() {
                    state.finish();
                    return Some((Err(e), state));
                }
                if state.upstream_done {
                    state.finish();
                    return None;
                }
                state.load_next_batch().await;
            }
        })
        .boxed())
    }

    /// Write one batch: a single bulk request, then individual retries for
    /// every document the bulk request did not write.
    #[instrument(skip(self, batch), fields(index = self.index.index_name(), count = batch.len()))]
    async fn write_batch(&self, batch: Vec<IndexDocument>) -> Vec<LoadOutcome> {
        let written = match self.index.bulk_index_documents(&batch).await {
            Ok(summary) => written_flags(&batch, &summary),
            Err(e) => {
                warn!(error = %e, "Bulk request failed, retrying documents individually");
                vec![false; batch.len()]
            }
        };

        let mut outcomes = Vec::with_capacity(batch.len());
        for (document, written) in batch.iter().zip(written) {
            if written {
                outcomes.push(LoadOutcome::Indexed {
                    id: document.id.clone(),
                });
            } else {
                outcomes.push(self.index_document_with_retry(document).await);
            }
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        debug!(succeeded = outcomes.len() - failed, failed, "Batch written");
        outcomes
    }

    async fn index_document_with_retry(&self, document: &IndexDocument) -> LoadOutcome {
        let index = &self.index;
        let result = self
            .config
            .retry
            .run(
                "document write",
                move || index.index_document(document),
                is_retryable_error,
            )
            .await;

        match result {
            Ok(()) => LoadOutcome::Indexed {
                id: document.id.clone(),
            },
            Err(e) => {
                error!(id = %document.id, error = %e, "Failed to index document");
                LoadOutcome::Failed {
                    id: document.id.clone(),
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Per-document success flags for a bulk summary, in batch order. A summary
/// that does not line up with the batch marks every document for retry.
fn written_flags(batch: &[IndexDocument], summary: &BatchOperationSummary) -> Vec<bool> {
    let aligned = summary.results.len() == batch.len()
        && summary
            .results
            .iter()
            .zip(batch)
            .all(|(result, document)| result.id == document.id);

    if !aligned {
        warn!(
            expected = batch.len(),
            received = summary.results.len(),
            "Bulk response does not match the request, retrying documents individually"
        );
        return vec![false; batch.len()];
    }

    for failure in summary.failures() {
        debug!(
            id = %failure.id,
            error = ?failure.error,
            "Document rejected by bulk request"
        );
    }
    summary.results.iter().map(|r| r.success).collect()
}

/// State owned by one `load` stream.
struct LoadState<'a> {
    loader: &'a BulkLoader,
    documents: BoxStream<'a, Result<IndexDocument, PipelineError>>,
    outcomes: VecDeque<LoadOutcome>,
    upstream_error: Option<PipelineError>,
    upstream_done: bool,
    finished: bool,
    processed: u64,
    total_hits: watch::Receiver<Option<u64>>,
    max_records: Option<u64>,
    progress: &'a dyn ProgressSink,
}

impl LoadState<'_> {
    fn current_progress(&self) -> Progress {
        let hits = *self.total_hits.borrow();
        let total = hits.map(|h| self.max_records.map_or(h, |m| h.min(m)));
        Progress::new(self.processed, total)
    }

    /// Pull up to one batch from upstream and write it.
    async fn load_next_batch(&mut self) {
        let batch_size = self.loader.config.batch_size;
        let mut batch = Vec::with_capacity(batch_size);
        while batch.len() < batch_size {
            match self.documents.next().await {
                Some(Ok(document)) => batch.push(document),
                Some(Err(e)) => {
                    self.upstream_error = Some(e);
                    self.upstream_done = true;
                    break;
                }
                None => {
                    self.upstream_done = true;
                    break;
                }
            }
        }

        if batch.is_empty() {
            return;
        }

        let outcomes = self.loader.write_batch(batch).await;
        self.processed += outcomes.len() as u64;
        self.outcomes.extend(outcomes);
        self.progress.update(self.current_progress());
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let progress = self.current_progress();
        info!(
            index = self.loader.index_name(),
            processed = progress.completed,
            total = ?progress.total,
            "Load finished"
        );
        self.progress.finish(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SourceError;
    use crate::progress::NoProgress;
    use async_trait::async_trait;
    use centralsearch_repository::BatchOperationResult;
    use centralsearch_shared::Record;
    use serde_json::json;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock destination index for testing.
    #[derive(Default)]
    struct MockIndex {
        stored: Mutex<BTreeMap<String, Record>>,
        failing: HashSet<String>,
        bulk_fails: bool,
        unhealthy: bool,
        bulk_calls: AtomicUsize,
        single_calls: AtomicUsize,
    }

    impl MockIndex {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|id| id.to_string()).collect(),
                ..Default::default()
            }
        }

        fn stored(&self) -> BTreeMap<String, Record> {
            self.stored.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DestinationIndex for MockIndex {
        fn index_name(&self) -> &str {
            "test-index"
        }

        async fn index_document(&self, document: &IndexDocument) -> Result<(), SearchIndexError> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&document.id) {
                return Err(SearchIndexError::connection("connection refused"));
            }
            self.stored
                .lock()
                .unwrap()
                .insert(document.id.clone(), document.body.clone());
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            documents: &[IndexDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            self.bulk_calls.fetch_add(1, Ordering::SeqCst);
            if self.bulk_fails {
                return Err(SearchIndexError::status(503, "unavailable"));
            }
            let results = documents
                .iter()
                .map(|document| {
                    if self.failing.contains(&document.id) {
                        BatchOperationResult::failed(
                            document.id.clone(),
                            SearchIndexError::status(503, "unavailable"),
                        )
                    } else {
                        self.stored
                            .lock()
                            .unwrap()
                            .insert(document.id.clone(), document.body.clone());
                        BatchOperationResult::succeeded(document.id.clone())
                    }
                })
                .collect();
            Ok(BatchOperationSummary::from_results(results))
        }

        async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(!self.unhealthy)
        }
    }

    /// Progress sink recording every update.
    #[derive(Default)]
    struct RecordingProgress {
        updates: Mutex<Vec<Progress>>,
        finished: Mutex<Option<Progress>>,
    }

    impl ProgressSink for RecordingProgress {
        fn update(&self, progress: Progress) {
            self.updates.lock().unwrap().push(progress);
        }

        fn finish(&self, progress: Progress) {
            *self.finished.lock().unwrap() = Some(progress);
        }
    }

    fn document(id: &str) -> IndexDocument {
        let body = json!({"id": id, "titles": [format!("Title {}", id)]});
        IndexDocument::new(id, body.as_object().cloned().unwrap())
    }

    fn documents(ids: &[&str]) -> Vec<Result<IndexDocument, PipelineError>> {
        ids.iter().map(|id| Ok(document(id))).collect()
    }

    fn loader(index: Arc<MockIndex>, batch_size: usize) -> BulkLoader {
        BulkLoader::with_config(index, LoaderConfig::default().with_batch_size(batch_size))
    }

    async fn collect(
        loader: &BulkLoader,
        docs: Vec<Result<IndexDocument, PipelineError>>,
        hits: Option<u64>,
        max_records: Option<u64>,
        progress: &dyn ProgressSink,
    ) -> Vec<Result<LoadOutcome, PipelineError>> {
        let (_tx, rx) = watch::channel(hits);
        loader
            .load(stream::iter(docs), rx, max_records, progress)
            .unwrap()
            .collect()
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_document_does_not_abort_run() {
        let index = Arc::new(MockIndex::failing(&["c"]));
        let loader = loader(index.clone(), 2);
        let progress = RecordingProgress::default();

        let outcomes = collect(
            &loader,
            documents(&["a", "b", "c", "d", "e"]),
            Some(5),
            None,
            &progress,
        )
        .await;

        let outcomes: Vec<LoadOutcome> = outcomes.into_iter().map(Result::unwrap).collect();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 4);
        assert!(matches!(&outcomes[2], LoadOutcome::Failed { id, .. } if id == "c"));
        assert_eq!(
            outcomes.iter().map(LoadOutcome::id).collect::<Vec<_>>(),
            vec!["a", "b", "c", "d", "e"]
        );

        assert_eq!(
            *progress.updates.lock().unwrap(),
            vec![
                Progress::new(2, Some(5)),
                Progress::new(4, Some(5)),
                Progress::new(5, Some(5)),
            ]
        );
        assert_eq!(*progress.finished.lock().unwrap(), Some(Progress::new(5, Some(5))));

        assert_eq!(index.bulk_calls.load(Ordering::SeqCst), 3);
        // One initial attempt plus the default five retries.
        assert_eq!(index.single_calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_bulk_request_falls_back_to_individual_writes() {
        let index = Arc::new(MockIndex {
            bulk_fails: true,
            ..Default::default()
        });
        let loader = loader(index.clone(), 10);

        let outcomes = collect(&loader, documents(&["a", "b", "c"]), Some(3), None, &NoProgress).await;

        assert!(outcomes.iter().all(|o| matches!(o, Ok(LoadOutcome::Indexed { .. }))));
        assert_eq!(index.single_calls.load(Ordering::SeqCst), 3);
        assert_eq!(index.stored().len(), 3);
    }

    #[tokio::test]
    async fn test_upstream_error_after_pulled_outcomes() {
        let index = Arc::new(MockIndex::default());
        let loader = loader(index.clone(), 10);
        let mut docs = documents(&["a", "b"]);
        docs.push(Err(PipelineError::PageError {
            offset: 2,
            source: SourceError::Transport("source went away".into()),
        }));
        docs.push(Ok(document("never")));
        let progress = RecordingProgress::default();

        let outcomes = collect(&loader, docs, Some(4), None, &progress).await;

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(&outcomes[0], Ok(LoadOutcome::Indexed { id }) if id == "a"));
        assert!(matches!(&outcomes[1], Ok(LoadOutcome::Indexed { id }) if id == "b"));
        assert!(matches!(&outcomes[2], Err(PipelineError::PageError { offset: 2, .. })));
        assert!(!index.stored().contains_key("never"));
        assert_eq!(*progress.finished.lock().unwrap(), Some(Progress::new(2, Some(4))));
    }

    #[tokio::test]
    async fn test_replay_is_idempotent() {
        let index = Arc::new(MockIndex::default());
        let loader = loader(index.clone(), 2);
        let ids = ["a", "b", "c"];

        collect(&loader, documents(&ids), Some(3), None, &NoProgress).await;
        let after_first = index.stored();
        collect(&loader, documents(&ids), Some(3), None, &NoProgress).await;

        assert_eq!(index.stored(), after_first);
        assert_eq!(after_first.len(), 3);
    }

    #[tokio::test]
    async fn test_pulls_at_most_one_batch_ahead() {
        let index = Arc::new(MockIndex::default());
        let loader = loader(index, 3);
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let docs = stream::iter(0..100).map(move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(document(&n.to_string()))
        });
        let (_tx, rx) = watch::channel(Some(100));

        let mut outcomes = loader.load(docs, rx, None, &NoProgress).unwrap();
        let first = outcomes.next().await;

        assert!(matches!(first, Some(Ok(LoadOutcome::Indexed { .. }))));
        assert_eq!(pulled.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_progress_total_capped_by_max_records() {
        let index = Arc::new(MockIndex::default());
        let loader = loader(index, 5);
        let progress = RecordingProgress::default();

        collect(&loader, documents(&["a", "b", "c"]), Some(1000), Some(3), &progress).await;

        assert_eq!(*progress.updates.lock().unwrap(), vec![Progress::new(3, Some(3))]);
    }

    #[tokio::test]
    async fn test_empty_input_reports_final_progress() {
        let index = Arc::new(MockIndex::default());
        let loader = loader(index.clone(), 5);
        let progress = RecordingProgress::default();

        let outcomes = collect(&loader, vec![], Some(0), None, &progress).await;

        assert!(outcomes.is_empty());
        assert!(progress.updates.lock().unwrap().is_empty());
        assert_eq!(*progress.finished.lock().unwrap(), Some(Progress::new(0, Some(0))));
        assert_eq!(index.bulk_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let loader = loader(Arc::new(MockIndex::default()), 0);
        let (_tx, rx) = watch::channel(None);

        let result = loader.load(stream::empty(), rx, None, &NoProgress);

        assert!(matches!(result, Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error(&SearchIndexError::connection("reset")));
        assert!(is_retryable_error(&SearchIndexError::status(503, "")));
        assert!(is_retryable_error(&SearchIndexError::status(429, "")));
        assert!(!is_retryable_error(&SearchIndexError::status(400, "mapper_parsing_exception")));
        assert!(!is_retryable_error(&SearchIndexError::validation("empty id")));
        assert!(is_retryable_error(&SearchIndexError::bulk_operation("item count mismatch")));
        assert!(!is_retryable_error(&SearchIndexError::index("document rejected")));
    }

    #[tokio::test]
    async fn test_health_check_reports_destination_state() {
        let healthy = loader(Arc::new(MockIndex::default()), 2);
        let unhealthy = loader(
            Arc::new(MockIndex {
                unhealthy: true,
                ..Default::default()
            }),
            2,
        );

        assert!(healthy.health_check().await.unwrap());
        assert!(!unhealthy.health_check().await.unwrap());
    }
}
