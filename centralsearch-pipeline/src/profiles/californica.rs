use chrono::DateTime;
use regex::Regex;
use serde_json::Value;

use super::fields::{as_list, required_text};
use super::MappingProfile;
use crate::errors::MappingError;
use centralsearch_shared::Record;

/// Solr dynamic-field suffixes appended by Hyrax (`_tesim`, `_ssi`, `_dtsim`, `_bsi`, ...).
const HYRAX_SUFFIX: &str = r"_(te|s|b|dt)s?i?m?$";

/// Repository bookkeeping fields that never reach the central index.
const SYSTEM_FIELDS: &[&str] = &[
    "accessControl",
    "id",
    "score",
    "system_create",
    "system_modified",
    "timestamp",
];

/// Californica (Hyrax repository index).
///
/// Keeps every descriptive field, dropping repository bookkeeping and the
/// Hyrax type suffixes from field names.
#[derive(Debug, Clone)]
pub struct CalifornicaProfile {
    suffix: Regex,
}

impl CalifornicaProfile {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            suffix: Regex::new(HYRAX_SUFFIX)?,
        })
    }

    fn strip_suffix(&self, key: &str) -> String {
        self.suffix.replace(key, "").into_owned()
    }
}

/// Keep only values that parse as RFC 3339 timestamps.
fn datetime_values(value: &Value) -> Value {
    Value::Array(
        as_list(value)
            .into_iter()
            .filter(|v| {
                v.as_str()
                    .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok())
            })
            .collect(),
    )
}

impl MappingProfile for CalifornicaProfile {
    fn name(&self) -> &'static str {
        "californica"
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "ark_ssi")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let ark = required_text(record, "ark_ssi")?;

        let mut output = Record::new();
        for (key, value) in record {
            if SYSTEM_FIELDS.contains(&key.as_str()) {
                continue;
            }
            let value = if key == "date_dtsim" {
                datetime_values(value)
            } else {
                value.clone()
            };
            output.insert(self.strip_suffix(key), value);
        }

        output.insert(
            "url".into(),
            Value::String(format!("https://digital.library.ucla.edu/catalog/{}", ark)),
        );
        output.insert("source".into(), "Californica".into());
        Ok(output)
    }
}
