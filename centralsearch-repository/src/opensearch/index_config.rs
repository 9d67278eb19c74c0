//! OpenSearch index configuration and bootstrap mappings.
//!
//! Records arrive with heterogeneous field sets, so the index relies on
//! dynamic mapping and only pins the fields every profile synthesizes.

use serde_json::{json, Value};

/// Configuration for the destination index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Name of the index (or alias) documents are written to.
    pub name: String,
    /// Primary shard count used when the index has to be created.
    pub number_of_shards: u32,
    /// Replica count used when the index has to be created.
    pub number_of_replicas: u32,
}

impl IndexConfig {
    /// Create a config for the named index with single-shard defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }

    /// Get the settings and mappings used when creating the index.
    ///
    /// The configuration includes:
    /// - **Keyword fields**: `id`, `source` and `url`, for filtering and exact lookups
    /// - **Text fields**: `titles` with a `raw` keyword sub-field for sorting
    /// - **Dynamic mapping**: every other field is mapped on first sight
    pub fn index_settings(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            },
            "mappings": {
                "dynamic": true,
                "properties": {
                    "id": {
                        "type": "keyword"
                    },
                    "source": {
                        "type": "keyword"
                    },
                    "url": {
                        "type": "keyword",
                        "index": false
                    },
                    "titles": {
                        "type": "text",
                        "fields": {
                            "raw": {
                                "type": "keyword",
                                "ignore_above": 256
                            }
                        }
                    }
                }
            }
        })
    }
}
