//! Documents, outcomes and progress for the loading stage.

use crate::record::Record;

/// A normalized record keyed by its destination identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    /// Identifier derived by the mapping profile. Writing the same identifier
    /// again replaces the previous document.
    pub id: String,
    /// The normalized record body.
    pub body: Record,
}

impl IndexDocument {
    pub fn new(id: impl Into<String>, body: Record) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}

/// Result of writing one document to the destination index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document was written.
    Indexed { id: String },
    /// The write failed after all retries.
    Failed { id: String, error: String },
}

impl LoadOutcome {
    /// Identifier of the document this outcome is about.
    pub fn id(&self) -> &str {
        match self {
            LoadOutcome::Indexed { id } | LoadOutcome::Failed { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LoadOutcome::Indexed { .. })
    }
}

/// Cumulative progress of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Documents processed so far, successful or not.
    pub completed: u64,
    /// Expected total, unknown until the source reported a hit count.
    pub total: Option<u64>,
}

impl Progress {
    pub fn new(completed: u64, total: Option<u64>) -> Self {
        Self { completed, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_outcome_accessors() {
        let ok = LoadOutcome::Indexed {
            id: "a".to_string(),
        };
        let failed = LoadOutcome::Failed {
            id: "b".to_string(),
            error: "boom".to_string(),
        };

        assert!(ok.is_success());
        assert!(!failed.is_success());
        assert_eq!(ok.id(), "a");
        assert_eq!(failed.id(), "b");
    }
}
