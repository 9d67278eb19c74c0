//! # Central Search Pipeline
//!
//! This crate provides the pipeline components that replicate records from a
//! source search backend into the central index.
//!
//! ## Architecture
//!
//! The pipeline follows the Source-Profile-Loader pattern:
//!
//! 1. **Paginator**: Turns offset/limit page requests into a lazy record stream
//! 2. **Sources**: Backend-specific request shapes and response envelopes
//! 3. **Profiles**: Derive an identifier and a normalized record per source
//! 4. **Loader**: Batches documents into the destination index with retries
//! 5. **Orchestrator**: Wires a connector, a profile and the loader together

pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod paginator;
pub mod profiles;
pub mod progress;
pub mod retry;
pub mod sources;

pub use errors::{MappingError, PipelineError, SourceError};
pub use loader::{BulkLoader, LoaderConfig};
pub use orchestrator::{Replicator, RunSummary};
pub use paginator::{Extraction, PageFetcher, Paginator};
pub use profiles::{MappingProfile, ProfileRegistry};
pub use progress::{LogProgress, NoProgress, ProgressBarSink, ProgressSink};
pub use retry::RetryPolicy;
pub use sources::{SourceBackend, SourceConnector, SourceKind};
