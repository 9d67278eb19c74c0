//! Settings and dependency wiring for the replicator.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{CopySettings, DEFAULT_SOURCE_QUERY};
