use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::http::{hit_count, record_list, SourceHttpClient};
use crate::errors::SourceError;
use crate::paginator::PageFetcher;
use centralsearch_shared::{PageRequest, PageResult};

/// Filter restricting every request to published objects.
pub const PUBLISHED_FILTER: &str = "publicationStatus:Published";

/// Published-only search against a Dataverse search API endpoint.
///
/// The published-state filter is part of every request and cannot be
/// turned off by the caller's query.
#[derive(Debug, Clone)]
pub struct DataverseSearch {
    http: SourceHttpClient,
}

impl DataverseSearch {
    pub fn new(http: SourceHttpClient) -> Self {
        Self { http }
    }

    fn params(request: &PageRequest<'_>) -> Vec<(&'static str, String)> {
        vec![
            ("q", request.filter.to_string()),
            ("fq", PUBLISHED_FILTER.to_string()),
            ("start", request.offset.to_string()),
            ("per_page", request.rows.to_string()),
        ]
    }

    fn parse_response(body: &Value) -> Result<PageResult, SourceError> {
        let total_hits = hit_count(body, &["data", "total_count"])?;
        let records = record_list(body, &["data", "items"])?;
        Ok(PageResult::new(records, total_hits))
    }
}

#[async_trait]
impl PageFetcher for DataverseSearch {
    fn backend_name(&self) -> &'static str {
        "dataverse"
    }

    #[instrument(skip(self, request), fields(offset = request.offset, rows = request.rows))]
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageResult, SourceError> {
        let url = self.http.endpoint().clone();
        let body = self.http.get_json(url, &Self::params(request)).await?;
        Self::parse_response(&body)
    }
}
