//! # Central Search Shared
//!
//! Shared types for the central search replication pipeline: the untyped
//! [`Record`] read from a source backend, the query and page types used by
//! the paginator, and the documents and outcomes handed to the loader.

mod document;
mod query;
mod record;

pub use document::{IndexDocument, LoadOutcome, Progress};
pub use query::{PageRequest, PageResult, QueryParser, SourceQuery, DEFAULT_PAGE_SIZE};
pub use record::{text_value, Record};
