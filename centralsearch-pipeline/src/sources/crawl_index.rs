use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::http::{lookup, SourceHttpClient};
use crate::errors::SourceError;
use crate::paginator::PageFetcher;
use centralsearch_shared::{PageRequest, PageResult, Record};

/// Search against a crawl index exposing an Elasticsearch-style JSON
/// search endpoint (`from`/`size` paging, `hits.hits` envelope).
#[derive(Debug, Clone)]
pub struct CrawlIndexSearch {
    http: SourceHttpClient,
}

impl CrawlIndexSearch {
    pub fn new(http: SourceHttpClient) -> Self {
        Self { http }
    }

    fn params(request: &PageRequest<'_>) -> Vec<(&'static str, String)> {
        vec![
            ("q", request.filter.to_string()),
            ("from", request.offset.to_string()),
            ("size", request.rows.to_string()),
        ]
    }

    fn parse_response(body: &Value) -> Result<PageResult, SourceError> {
        // Older engines report a bare number, newer ones `{ "value": n }`.
        let total_hits = match lookup(body, &["hits", "total"]) {
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
            Some(total) => total.as_u64(),
            None => None,
        }
        .ok_or_else(|| SourceError::parse("missing hit count at 'hits.total'"))?;

        let hits = lookup(body, &["hits", "hits"])
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::parse("missing record list at 'hits.hits'"))?;

        let records = hits
            .iter()
            .map(hit_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResult::new(records, total_hits))
    }
}

fn hit_record(hit: &Value) -> Result<Record, SourceError> {
    let source = hit.get("_source").unwrap_or(hit);
    match source {
        Value::Object(map) => Ok(map.clone()),
        other => Err(SourceError::parse(format!(
            "expected a record object, found {}",
            other
        ))),
    }
}

#[async_trait]
impl PageFetcher for CrawlIndexSearch {
    fn backend_name(&self) -> &'static str {
        "crawl"
    }

    #[instrument(skip(self, request), fields(offset = request.offset, rows = request.rows))]
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<PageResult, SourceError> {
        let url = self.http.endpoint().clone();
        let body = self.http.get_json(url, &Self::params(request)).await?;
        Self::parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params() {
        let request = PageRequest {
            filter: "site:library.ucla.edu",
            offset: 40,
            rows: 20,
            query_parser: None,
        };

        assert_eq!(
            CrawlIndexSearch::params(&request),
            vec![
                ("q", "site:library.ucla.edu".to_string()),
                ("from", "40".to_string()),
                ("size", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_object_total_and_sources() {
        let body = json!({
            "hits": {
                "total": {"value": 7, "relation": "eq"},
                "hits": [
                    {"_id": "1", "_source": {"id": "1", "title": "Home"}},
                    {"_id": "2", "_source": {"id": "2", "title": "About"}}
                ]
            }
        });

        let page = CrawlIndexSearch::parse_response(&body).unwrap();

        assert_eq!(page.total_hits, 7);
        assert_eq!(page.records[0]["title"], "Home");
        assert!(page.records[0].get("_id").is_none());
    }

    #[test]
    fn test_parse_numeric_total_and_bare_hits() {
        let body = json!({
            "hits": {
                "total": 1,
                "hits": [{"id": "only", "title": "Bare"}]
            }
        });

        let page = CrawlIndexSearch::parse_response(&body).unwrap();

        assert_eq!(page.total_hits, 1);
        assert_eq!(page.records[0]["id"], "only");
    }

    #[test]
    fn test_parse_rejects_non_object_source() {
        let body = json!({"hits": {"total": 1, "hits": [{"_source": 3}]}});
        assert!(CrawlIndexSearch::parse_response(&body).is_err());
    }
}
