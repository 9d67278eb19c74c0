use serde_json::Value;

use super::fields::{concat_lists, keep_renamed, required_text};
use super::MappingProfile;
use crate::errors::MappingError;
use centralsearch_shared::Record;

const CATALOG_URL: &str = "https://digital.library.ucla.edu/catalog";

const URSUS_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("ark_ssi", "ark"),
    ("title_tesim", "titles"),
    ("artist_tesim", "artists"),
    ("author_tesim", "authors"),
    ("composer_tesim", "composers"),
    ("creator_tesim", "creators"),
    ("director_tesim", "directors"),
    ("editor_tesim", "editors"),
    ("named_subject_tesim", "named_subjects"),
    ("photographer_tesim", "photographers"),
    ("producer_tesim", "producers"),
    ("program_tesim", "programs"),
    ("description_tesim", "descriptions"),
    ("publisher_tesim", "publishers"),
    ("subject_tesim", "subjects"),
    ("subject_topic_tesim", "subject_topics"),
    ("genre_tesim", "types"),
    ("external_link", "url"),
];

/// Person fields folded into `names`, in this order.
const NAME_FIELDS: &[&str] = &[
    "artists",
    "authors",
    "composers",
    "creators",
    "directors",
    "editors",
    "photographers",
    "producers",
];

/// Ursus (UCLA Digital Library Blacklight index).
///
/// Records are keyed by their public catalog URL, built from the ARK.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrsusProfile;

impl MappingProfile for UrsusProfile {
    fn name(&self) -> &'static str {
        "ursus"
    }

    fn source_query(&self) -> Option<&str> {
        Some("ark_ssi:*")
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        let ark = required_text(record, "ark_ssi")?;
        Ok(format!("{}/{}", CATALOG_URL, ark))
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let ark = required_text(record, "ark_ssi")?;
        let mut output = keep_renamed(record, URSUS_FIELDS, true);

        let names = concat_lists(&output, NAME_FIELDS);
        output.insert("names".into(), Value::Array(names));

        // The catalog link wins over any external link.
        output.insert("url".into(), Value::String(format!("{}/{}", CATALOG_URL, ark)));
        output.insert("source".into(), "Ursus".into());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ursus_record() {
        let rec = record(json!({
            "id": "zz0026hbx1",
            "ark_ssi": "ark:/21198/zz0026hbx1",
            "title_tesim": ["Los Angeles street scene"],
            "photographer_tesim": ["Doe, Jane"],
            "author_tesim": ["Roe, Rick"],
            "editor_tesim": [" "],
            "genre_tesim": ["photographs"],
            "system_create_dtsi": "2020-01-01T00:00:00Z"
        }));

        let document = UrsusProfile.to_document(&rec).unwrap();

        assert_eq!(
            document.id,
            "https://digital.library.ucla.edu/catalog/ark:/21198/zz0026hbx1"
        );
        assert_eq!(document.body["ark"], json!("ark:/21198/zz0026hbx1"));
        assert_eq!(document.body["titles"], json!(["Los Angeles street scene"]));
        assert_eq!(document.body["names"], json!(["Roe, Rick", "Doe, Jane"]));
        assert_eq!(document.body["types"], json!(["photographs"]));
        assert_eq!(document.body["url"], json!(document.id));
        assert_eq!(document.body["source"], json!("Ursus"));
        assert!(!document.body.contains_key("editors"));
        assert!(!document.body.contains_key("system_create_dtsi"));
    }

    #[test]
    fn test_ursus_requires_ark() {
        let rec = record(json!({"id": "zz0026hbx1"}));

        assert_eq!(
            UrsusProfile.identifier(&rec),
            Err(MappingError::missing("ark_ssi"))
        );
        assert!(UrsusProfile.normalize(&rec).is_err());
    }
}
