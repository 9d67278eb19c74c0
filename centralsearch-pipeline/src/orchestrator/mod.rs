//! Orchestrator module for the replication pipeline.
//!
//! Wires a source connector, a mapping profile and the bulk loader together.

use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::errors::PipelineError;
use crate::loader::BulkLoader;
use crate::paginator::PageFetcher;
use crate::profiles::MappingProfile;
use crate::progress::ProgressSink;
use crate::sources::{SourceBackend, SourceConnector};
use centralsearch_shared::{LoadOutcome, SourceQuery};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents the loader attempted to write.
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Expected total: the last hit count, capped by the record ceiling.
    pub total: Option<u64>,
}

impl RunSummary {
    fn record(&mut self, outcome: &LoadOutcome) {
        self.processed += 1;
        match outcome {
            LoadOutcome::Indexed { .. } => self.succeeded += 1,
            LoadOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Replicates one source into the destination index.
///
/// The replicator:
/// - Bootstraps the destination index
/// - Extracts records lazily from the source
/// - Maps each record through the profile
/// - Streams the documents through the bulk loader
pub struct Replicator<F = SourceBackend> {
    connector: SourceConnector<F>,
    profile: Arc<dyn MappingProfile>,
    loader: BulkLoader,
}

impl<F: PageFetcher> Replicator<F> {
    /// Create a new replicator with the given components.
    pub fn new(connector: SourceConnector<F>, profile: Arc<dyn MappingProfile>, loader: BulkLoader) -> Self {
        Self {
            connector,
            profile,
            loader,
        }
    }

    pub fn profile(&self) -> &dyn MappingProfile {
        self.profile.as_ref()
    }

    /// Run one replication.
    ///
    /// Per-document write failures are counted and logged, the run goes on.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be bootstrapped, a page cannot be
    /// fetched, or a record cannot be mapped. Documents written before the
    /// failure stay in the index.
    #[instrument(skip(self, query, progress), fields(profile = self.profile.name(), index = self.loader.index_name()))]
    pub async fn run(
        &self,
        query: SourceQuery,
        progress: &dyn ProgressSink,
    ) -> Result<RunSummary, PipelineError> {
        info!(filter = %query.filter, page_size = query.page_size, max_records = ?query.max_records, "Starting replication");

        self.loader.ensure_index().await?;

        let max_records = query.max_records;
        let extraction = self.connector.extract(query)?;
        let total_hits = extraction.total_hits.clone();

        let profile = self.profile.as_ref();
        let documents = extraction.records.map(move |record| {
            record.and_then(|record| profile.to_document(&record).map_err(PipelineError::from))
        });

        let mut summary = RunSummary::default();
        let mut outcomes = self
            .loader
            .load(documents, extraction.total_hits, max_records, progress)?;
        while let Some(outcome) = outcomes.try_next().await? {
            summary.record(&outcome);
        }

        if summary.failed > 0 {
            warn!(failed = summary.failed, "Some documents could not be indexed");
        }

        let hits = *total_hits.borrow();
        summary.total = hits.map(|h| max_records.map_or(h, |m| h.min(m)));

        info!(
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            total = ?summary.total,
            "Replication complete"
        );
        Ok(summary)
    }
}
