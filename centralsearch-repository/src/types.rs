//! Result types for batch index operations.

use crate::errors::SearchIndexError;

/// Result of one document within a batch operation.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// Identifier of the document.
    pub id: String,
    /// Whether the write succeeded.
    pub success: bool,
    /// Error details if the write failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    /// A successful result for the given document.
    pub fn succeeded(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            error: None,
        }
    }

    /// A failed result for the given document.
    pub fn failed(id: impl Into<String>, error: SearchIndexError) -> Self {
        Self {
            id: id.into(),
            success: false,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Number of documents in the batch.
    pub total: usize,
    /// Number of documents written.
    pub succeeded: usize,
    /// Number of documents that failed.
    pub failed: usize,
    /// Per-document results, in request order.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Build a summary from per-document results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Iterate over the results that failed.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
