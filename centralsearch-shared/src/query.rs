//! Query and page types for paginated extraction.

use std::fmt;
use std::str::FromStr;

use crate::record::Record;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Query-parser mode passed through to Lucene-style search endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryParser {
    /// Literal term matching with the standard Lucene syntax.
    #[default]
    Lucene,
    /// Relevance-ranked matching across fields.
    Edismax,
    /// Simplified relevance-ranked matching.
    Dismax,
}

impl QueryParser {
    /// The parameter value understood by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryParser::Lucene => "lucene",
            QueryParser::Edismax => "edismax",
            QueryParser::Dismax => "dismax",
        }
    }
}

impl fmt::Display for QueryParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryParser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lucene" => Ok(QueryParser::Lucene),
            "edismax" => Ok(QueryParser::Edismax),
            "dismax" => Ok(QueryParser::Dismax),
            other => Err(format!("unknown query parser: {}", other)),
        }
    }
}

/// A query against a source backend plus its pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    /// Backend-specific filter expression, passed through opaquely.
    pub filter: String,
    /// Number of records requested per page.
    pub page_size: usize,
    /// Ceiling on the number of records extracted. `None` means unbounded.
    pub max_records: Option<u64>,
    /// Query-parser mode, honoured by the generic search connector only.
    pub query_parser: Option<QueryParser>,
}

impl SourceQuery {
    /// Create a query with the default page size and no ceiling.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_records: None,
            query_parser: None,
        }
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the max-records ceiling.
    pub fn with_max_records(mut self, max_records: Option<u64>) -> Self {
        self.max_records = max_records;
        self
    }

    /// Set the query-parser mode.
    pub fn with_query_parser(mut self, query_parser: Option<QueryParser>) -> Self {
        self.query_parser = query_parser;
        self
    }

    /// The effective ceiling, `u64::MAX` when unbounded.
    pub fn ceiling(&self) -> u64 {
        self.max_records.unwrap_or(u64::MAX)
    }
}

/// A single page request issued by the paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<'a> {
    pub filter: &'a str,
    /// 0-based offset of the first record.
    pub offset: u64,
    /// Number of records requested. Never zero.
    pub rows: u64,
    pub query_parser: Option<QueryParser>,
}

/// One page of records plus the total-hit count reported with it.
///
/// The total is recomputed by some backends on every request, so it is only
/// valid for the page it arrived with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub records: Vec<Record>,
    pub total_hits: u64,
}

impl PageResult {
    pub fn new(records: Vec<Record>, total_hits: u64) -> Self {
        Self {
            records,
            total_hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = SourceQuery::new("*:*")
            .with_page_size(250)
            .with_max_records(Some(10))
            .with_query_parser(Some(QueryParser::Edismax));

        assert_eq!(query.filter, "*:*");
        assert_eq!(query.page_size, 250);
        assert_eq!(query.ceiling(), 10);
        assert_eq!(query.query_parser, Some(QueryParser::Edismax));
    }

    #[test]
    fn test_unbounded_ceiling() {
        let query = SourceQuery::new("*:*");
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.ceiling(), u64::MAX);
    }

    #[test]
    fn test_query_parser_from_str() {
        assert_eq!("lucene".parse::<QueryParser>(), Ok(QueryParser::Lucene));
        assert_eq!("EDISMAX".parse::<QueryParser>(), Ok(QueryParser::Edismax));
        assert!("fuzzy".parse::<QueryParser>().is_err());
        assert_eq!(QueryParser::Dismax.to_string(), "dismax");
    }
}
