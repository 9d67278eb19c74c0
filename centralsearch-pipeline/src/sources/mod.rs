//! Source connectors.
//!
//! Each backend knows how to shape one page request and parse one response
//! envelope. [`SourceConnector`] puts the [`Paginator`] on top so every
//! backend exposes the same extraction contract.

mod crawl_index;
mod dataverse;
mod http;
mod solr;

pub use crawl_index::CrawlIndexSearch;
pub use dataverse::{DataverseSearch, PUBLISHED_FILTER};
pub use http::{SourceHttpClient, DEFAULT_SOURCE_TIMEOUT};
pub use solr::SolrSearch;

use async_trait::async_trait;
use futures::TryStreamExt;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

use crate::errors::{PipelineError, SourceError};
use crate::paginator::{Extraction, PageFetcher, Paginator};
use crate::retry::RetryPolicy;
use centralsearch_shared::{PageRequest, PageResult, SourceQuery};

/// The kind of backend a connector talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Generic paginated search (`select` handler).
    Solr,
    /// Published-only institutional repository search.
    Dataverse,
    /// Crawl-index JSON search.
    Crawl,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Solr => "solr",
            SourceKind::Dataverse => "dataverse",
            SourceKind::Crawl => "crawl",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "solr" => Ok(SourceKind::Solr),
            "dataverse" => Ok(SourceKind::Dataverse),
            "crawl" | "crawl-index" => Ok(SourceKind::Crawl),
            other => Err(format!(
                "unknown source type '{}', expected one of: solr, dataverse, crawl",
                other
            )),
        }
    }
}

/// The closed set of source backends, chosen once at startup.
#[derive(Debug, Clone)]
pub enum SourceBackend {
    Solr(SolrSearch),
    Dataverse(DataverseSearch),
    Crawl(CrawlIndexSearch),
}

impl SourceBackend {
    /// Build the backend for `kind` talking to `url`.
    pub fn connect(kind: SourceKind, url: &str) -> Result<Self, SourceError> {
        let http = SourceHttpClient::new(url, DEFAULT_SOURCE_TIMEOUT)?;
        Ok(match kind {
            SourceKind::Solr => SourceBackend::Solr(SolrSearch::new(http)),
            SourceKind::Dataverse => SourceBackend::Dataverse(DataverseSearch::new(http)),
            SourceKind::Crawl => SourceBackend::Crawl(CrawlIndexSearch::new(http)),
        })
    }
}

#[async_trait]
impl PageFetcher for SourceBackend {
    fn backend_name(&self) -> &'static str {
        match self {
            SourceBackend::Solr(s) => s.backend_name(),
            SourceBackend::Dataverse(d) => d.backend_name(),
            SourceBackend::Crawl(c) => c.backend_name(),
        }
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageResult, SourceError> {
        match self {
            SourceBackend::Solr(s) => s.fetch_page(request).await,
            SourceBackend::Dataverse(d) => d.fetch_page(request).await,
            SourceBackend::Crawl(c) => c.fetch_page(request).await,
        }
    }
}

/// A source backend plus pagination: the uniform extraction contract.
///
/// Each call to [`extract`](Self::extract) owns its own cursor state, so
/// one connector can serve several extractions one after another.
#[derive(Debug, Clone)]
pub struct SourceConnector<F = SourceBackend> {
    backend: F,
    paginator: Paginator,
}

impl SourceConnector<SourceBackend> {
    /// Connect to a backend of `kind` at `url`, retrying page requests
    /// with `retry`.
    pub fn new(kind: SourceKind, url: &str, retry: RetryPolicy) -> Result<Self, PipelineError> {
        let backend = SourceBackend::connect(kind, url)?;
        Ok(Self::from_backend(backend, Paginator::new(retry)))
    }
}

impl<F: PageFetcher> SourceConnector<F> {
    pub fn from_backend(backend: F, paginator: Paginator) -> Self {
        Self { backend, paginator }
    }

    pub fn backend(&self) -> &F {
        &self.backend
    }

    /// Start a lazy extraction of the records matching `query`.
    pub fn extract(&self, query: SourceQuery) -> Result<Extraction<'_>, PipelineError> {
        self.paginator.paginate(&self.backend, query)
    }

    /// Count how many records carry each field across the whole result set.
    pub async fn field_histogram(
        &self,
        filter: &str,
        page_size: usize,
    ) -> Result<BTreeMap<String, u64>, PipelineError> {
        field_histogram(&self.paginator, &self.backend, filter, page_size).await
    }
}

/// Extract every record matching `filter` (no ceiling) and count, per field
/// name, the number of records containing it.
#[instrument(skip(paginator, fetcher), fields(backend = fetcher.backend_name()))]
pub async fn field_histogram(
    paginator: &Paginator,
    fetcher: &dyn PageFetcher,
    filter: &str,
    page_size: usize,
) -> Result<BTreeMap<String, u64>, PipelineError> {
    let query = SourceQuery::new(filter).with_page_size(page_size);
    let extraction = paginator.paginate(fetcher, query)?;

    let mut records = 0u64;
    let histogram = extraction
        .records
        .try_fold(BTreeMap::new(), |mut histogram, record| {
            records += 1;
            for field in record.keys() {
                *histogram.entry(field.clone()).or_insert(0u64) += 1;
            }
            futures::future::ready(Ok(histogram))
        })
        .await?;

    info!(records, fields = histogram.len(), "Field histogram complete");
    Ok(histogram)
}
