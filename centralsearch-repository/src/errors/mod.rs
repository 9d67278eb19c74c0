//! Error types for the destination index repository.

mod search_index_error;

pub use search_index_error::SearchIndexError;
