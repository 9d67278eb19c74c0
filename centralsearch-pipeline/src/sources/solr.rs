use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::http::{hit_count, record_list, SourceHttpClient};
use crate::errors::SourceError;
use crate::paginator::PageFetcher;
use centralsearch_shared::{PageRequest, PageResult};

/// Generic paginated search against a Solr core's `select` handler.
#[derive(Debug, Clone)]
pub struct SolrSearch {
    http: SourceHttpClient,
}

impl SolrSearch {
    pub fn new(http: SourceHttpClient) -> Self {
        Self { http }
    }

    fn params(request: &PageRequest<'_>) -> Vec<(&'static str, String)> {
        vec![
            ("q", request.filter.to_string()),
            (
                "defType",
                request.query_parser.unwrap_or_default().as_str().to_string(),
            ),
            ("start", request.offset.to_string()),
            ("rows", request.rows.to_string()),
            ("wt", "json".to_string()),
        ]
    }

    fn parse_response(body: &Value) -> Result<PageResult, SourceError> {
        let total_hits = hit_count(body, &["response", "numFound"])?;
        let records = record_list(body, &["response", "docs"])?;
        Ok(PageResult::new(records, total_hits))
    }
}

#[async_trait]
impl PageFetcher for SolrSearch {
    fn backend_name(&self) -> &'static str {
        "solr"
    }

    #[instrument(skip(self, request), fields(offset = request.offset, rows = request.rows))]
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageResult, SourceError> {
        let url = self.http.endpoint_with_segment("select")?;
        let body = self.http.get_json(url, &Self::params(request)).await?;
        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use centralsearch_shared::QueryParser;
    use serde_json::json;

    #[test]
    fn test_params_default_to_lucene() {
        let request = PageRequest {
            filter: "*:*",
            offset: 2000,
            rows: 1000,
            query_parser: None,
        };

        let params = SolrSearch::params(&request);

        assert!(params.contains(&("q", "*:*".to_string())));
        assert!(params.contains(&("defType", "lucene".to_string())));
        assert!(params.contains(&("start", "2000".to_string())));
        assert!(params.contains(&("rows", "1000".to_string())));
        assert!(params.contains(&("wt", "json".to_string())));
    }

    #[test]
    fn test_params_with_edismax() {
        let request = PageRequest {
            filter: "title:maps",
            offset: 0,
            rows: 10,
            query_parser: Some(QueryParser::Edismax),
        };

        assert!(SolrSearch::params(&request).contains(&("defType", "edismax".to_string())));
    }

    #[test]
    fn test_parse_response() {
        let body = json!({
            "responseHeader": {"status": 0},
            "response": {
                "numFound": 3,
                "start": 0,
                "docs": [{"id": "a"}, {"id": "b"}]
            }
        });

        let page = SolrSearch::parse_response(&body).unwrap();

        assert_eq!(page.total_hits, 3);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[1]["id"], "b");
    }

    #[test]
    fn test_parse_response_missing_envelope() {
        let body = json!({"error": {"msg": "undefined field"}});
        assert!(matches!(
            SolrSearch::parse_response(&body),
            Err(SourceError::Parse(_))
        ));
    }
}
