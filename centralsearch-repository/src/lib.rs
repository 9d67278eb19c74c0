//! # Central Search Repository
//!
//! This crate provides the interface to the destination index and a concrete
//! implementation for OpenSearch (wire-compatible with Elasticsearch). It
//! includes definitions for errors, batch result types and the configuration
//! used to connect to and bootstrap the index.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use config::DestinationConfig;
pub use errors::SearchIndexError;
pub use interfaces::DestinationIndex;
pub use opensearch::{IndexConfig, OpenSearchClient};
pub use types::{BatchOperationResult, BatchOperationSummary};
