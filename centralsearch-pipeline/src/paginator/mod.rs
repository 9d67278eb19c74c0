//! Cursor paginator.
//!
//! Turns a backend's offset/limit page protocol into a lazy stream of
//! records. The backend-reported hit count is re-read on every page and
//! published on a watch channel so the loader can size its progress total.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::errors::{PipelineError, SourceError};
use crate::retry::RetryPolicy;
use centralsearch_shared::{PageRequest, PageResult, Record, SourceQuery};

/// Fetches a single page from a source backend.
///
/// Implementations only know how to shape one request and parse one
/// response; pagination and retries are handled by [`Paginator`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short backend name used in logs.
    fn backend_name(&self) -> &'static str;

    /// Fetch one page.
    ///
    /// # Returns
    ///
    /// * `Ok(PageResult)` - The records of this page and the total-hit count
    ///   the backend reported for this request
    /// * `Err(SourceError)` - If the request or response parsing failed
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageResult, SourceError>;
}

/// The result of starting an extraction.
pub struct Extraction<'a> {
    /// Records in backend order. A fatal page failure ends the stream with
    /// an error item.
    pub records: BoxStream<'a, Result<Record, PipelineError>>,
    /// Latest total-hit count reported by the backend, `None` until the
    /// first page arrives.
    pub total_hits: watch::Receiver<Option<u64>>,
}

/// Drives offset/limit pagination over a [`PageFetcher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Paginator {
    retry: RetryPolicy,
}

impl Paginator {
    /// Create a paginator retrying failed page requests with `retry`.
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Start a lazy extraction.
    ///
    /// Nothing is requested until the returned stream is polled. The stream
    /// yields exactly `min(total_hits, max_records)` records when the hit
    /// count is stable, using one request per `page_size` records.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `query.page_size` is zero.
    pub fn paginate<'a>(
        &self,
        fetcher: &'a dyn PageFetcher,
        query: SourceQuery,
    ) -> Result<Extraction<'a>, PipelineError> {
        if query.page_size == 0 {
            return Err(PipelineError::config("page size must be greater than zero"));
        }

        let (hits_tx, total_hits) = watch::channel(None);
        let cursor = PageCursor {
            fetcher,
            query,
            retry: self.retry,
            offset: 0,
            total_hits: None,
            requests: 0,
            buffer: Vec::new().into_iter(),
            hits_tx,
        };

        let records = stream::try_unfold(cursor, |mut cursor| async move {
            loop {
                if let Some(record) = cursor.buffer.next() {
                    return Ok(Some((record, cursor)));
                }
                if !cursor.has_more() {
                    debug!(
                        backend = cursor.fetcher.backend_name(),
                        offset = cursor.offset,
                        total_hits = ?cursor.total_hits,
                        requests = cursor.requests,
                        "Extraction finished"
                    );
                    return Ok(None);
                }
                cursor.fetch_next().await?;
            }
        })
        .boxed();

        Ok(Extraction {
            records,
            total_hits,
        })
    }
}

/// Pagination state owned by one extraction.
struct PageCursor<'a> {
    fetcher: &'a dyn PageFetcher,
    query: SourceQuery,
    retry: RetryPolicy,
    offset: u64,
    total_hits: Option<u64>,
    requests: u64,
    buffer: std::vec::IntoIter<Record>,
    hits_tx: watch::Sender<Option<u64>>,
}

impl PageCursor<'_> {
    /// Continue while `offset < total_hits` and `offset < max_records`.
    /// Before the first page the hit count is unknown and only the ceiling
    /// bounds the loop.
    fn has_more(&self) -> bool {
        self.offset < self.bound()
    }

    fn bound(&self) -> u64 {
        let ceiling = self.query.ceiling();
        self.total_hits.map_or(ceiling, |hits| hits.min(ceiling))
    }

    /// Rows for the next request, clamped so `offset + rows` stays within
    /// `max_records` and the last known hit count. Only called while
    /// `has_more()`, so never zero.
    fn next_rows(&self) -> u64 {
        let remaining = self.bound() - self.offset;
        (self.query.page_size as u64).min(remaining)
    }

    async fn fetch_next(&mut self) -> Result<(), PipelineError> {
        let offset = self.offset;
        let rows = self.next_rows();
        let request = PageRequest {
            filter: &self.query.filter,
            offset,
            rows,
            query_parser: self.query.query_parser,
        };

        let fetcher = self.fetcher;
        let request = &request;
        let page = self
            .retry
            .run(
                "page fetch",
                move || fetcher.fetch_page(request),
                SourceError::is_transient,
            )
            .await
            .map_err(|source| PipelineError::PageError { offset, source })?;
        self.requests += 1;

        let mut records = page.records;
        if records.len() as u64 > rows {
            warn!(
                backend = self.fetcher.backend_name(),
                offset,
                rows,
                returned = records.len(),
                "Backend returned more records than requested, truncating"
            );
            records.truncate(rows as usize);
        }

        if let Some(previous) = self.total_hits {
            if previous != page.total_hits {
                debug!(
                    previous,
                    current = page.total_hits,
                    "Total hit count changed between pages"
                );
            }
        }
        self.total_hits = Some(page.total_hits);
        // The receiver may be gone; the hit count is still tracked locally.
        let _ = self.hits_tx.send(Some(page.total_hits));

        debug!(
            backend = self.fetcher.backend_name(),
            offset,
            rows,
            returned = records.len(),
            total_hits = page.total_hits,
            "Fetched page"
        );

        self.offset += rows;
        self.buffer = records.into_iter();
        Ok(())
    }
}
