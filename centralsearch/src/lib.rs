//! # Central Search
//!
//! Command-line front end for the central search replicator.
//!
//! This crate parses the command line, wires the pipeline components
//! together and installs logging.

pub mod cli;
pub mod config;
pub mod logging;

pub use config::{CopySettings, Dependencies};

use std::future::{self, Future};
use std::io;
use thiserror::Error;
use tracing::warn;

/// Errors that can stop the replicator.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] centralsearch_pipeline::PipelineError),

    /// Destination index error.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] centralsearch_repository::SearchIndexError),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

/// Resolve once `signal` reports an interrupt.
///
/// If the handler cannot be installed the error is logged and this never
/// resolves, so the run carries on without Ctrl-C support.
pub async fn interrupted<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_interrupted_on_signal() {
        interrupted(future::ready(Ok(()))).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_handler_failure_is_not_an_interrupt() {
        let signal = future::ready(Err(io::Error::other("no signal driver")));

        let result = tokio::time::timeout(Duration::from_secs(60), interrupted(signal)).await;

        assert!(result.is_err());
    }
}
