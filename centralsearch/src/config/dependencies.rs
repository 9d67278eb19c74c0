//! Dependency initialization and wiring for the replicator.

use std::sync::Arc;
use tracing::info;

use crate::config::CopySettings;
use crate::AppError;
use centralsearch_pipeline::{
    BulkLoader, LogProgress, ProfileRegistry, ProgressBarSink, ProgressSink, Replicator,
    RetryPolicy, SourceConnector,
};
use centralsearch_repository::{IndexConfig, OpenSearchClient};
use centralsearch_shared::SourceQuery;

/// Container for all initialized dependencies of a `copy` run.
pub struct Dependencies {
    /// The configured replicator ready to run.
    pub replicator: Replicator,
    /// The resolved source query.
    pub query: SourceQuery,
    /// Where progress is reported.
    pub progress: Box<dyn ProgressSink>,
}

impl Dependencies {
    /// Initialize all dependencies from validated settings.
    ///
    /// The profile is resolved before any connection is made so a typo
    /// fails fast.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the profile is unknown, a URL is invalid or
    ///   the destination is unreachable or unhealthy
    pub async fn new(settings: &CopySettings) -> Result<Self, AppError> {
        let registry = ProfileRegistry::builtin()?;
        let profile = registry.resolve(settings.profile.as_deref())?;

        info!(
            source_type = %settings.source_kind,
            profile = profile.name(),
            index = %settings.index_name,
            "Initializing dependencies"
        );

        // Initialize destination client
        let index_config = IndexConfig::new(settings.index_name.clone());
        let client = OpenSearchClient::new(&settings.destination, index_config).await?;
        let loader = BulkLoader::with_config(Arc::new(client), settings.loader_config());

        // Verify the destination is reachable
        if !loader.health_check().await? {
            return Err(AppError::config("Destination cluster is unhealthy"));
        }

        info!("Destination connection verified");

        let connector =
            SourceConnector::new(settings.source_kind, &settings.source_url, RetryPolicy::page_fetch())?;
        let query = settings.source_query(profile.as_ref());

        let progress: Box<dyn ProgressSink> = if settings.show_progress {
            Box::new(ProgressBarSink::new())
        } else {
            Box::new(LogProgress)
        };

        Ok(Self {
            replicator: Replicator::new(connector, profile, loader),
            query,
            progress,
        })
    }
}
