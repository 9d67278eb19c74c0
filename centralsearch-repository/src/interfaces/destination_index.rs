//! Destination index trait definition.
//!
//! This module defines the abstract interface for writing normalized records
//! into the central index, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory mocks).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use centralsearch_shared::IndexDocument;

/// Abstracts the destination index the pipeline writes into.
///
/// Every write is keyed by the document identifier and fully replaces any
/// document already stored under that identifier. Replaying the same
/// document is therefore idempotent.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error
/// handling across implementations.
#[async_trait]
pub trait DestinationIndex: Send + Sync {
    /// Name of the index documents are written to.
    fn index_name(&self) -> &str;

    /// Index a single document, replacing any document with the same ID.
    ///
    /// # Arguments
    ///
    /// * `document` - The identifier and normalized body to write
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was written
    /// * `Err(SearchIndexError)` - If the write failed
    async fn index_document(&self, document: &IndexDocument) -> Result<(), SearchIndexError>;

    /// Index multiple documents in one bulk request.
    ///
    /// Failures of individual documents are reported in the summary, in the
    /// same order as `documents`. An `Err` means the bulk request as a whole
    /// failed and no per-document status is known.
    ///
    /// # Arguments
    ///
    /// * `documents` - Slice of documents to write
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Aggregate statistics and per-document results
    /// * `Err(SearchIndexError)` - If the bulk request failed entirely
    async fn bulk_index_documents(
        &self,
        documents: &[IndexDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Create the index with bootstrap settings if it does not exist yet.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Check if the search engine is reachable and not in a failed state.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster is healthy
    /// * `Ok(false)` - If the cluster reports a red status
    /// * `Err(SearchIndexError)` - If the health check could not be executed
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
