//! Profiles for sources whose mapping is a field selection plus a few
//! derived fields.

use serde_json::Value;

use super::fields::{as_list, concat_lists, keep_renamed, listify, required_text};
use super::MappingProfile;
use crate::errors::MappingError;
use centralsearch_shared::{text_value, Record};

/// Keyed by `id`, records passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProfile;

impl MappingProfile for IdentityProfile {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "id")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        Ok(record.clone())
    }
}

/// Frontera (Drupal search index).
#[derive(Debug, Clone, Copy, Default)]
pub struct FronteraProfile;

const FRONTERA_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("ss_title", "titles"),
    ("content", "description"),
    ("ss_type", "type"),
    ("ss_field_recording_artist_name_string", "recording_artist_name"),
    ("ss_field_composer_string", "composer"),
];

impl MappingProfile for FronteraProfile {
    fn name(&self) -> &'static str {
        "frontera"
    }

    fn source_query(&self) -> Option<&str> {
        Some("*:*")
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "id")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let id = required_text(record, "id")?;
        let mut output = keep_renamed(record, FRONTERA_FIELDS, false);
        listify(&mut output, "titles");

        // Node ids look like "{index}-{entity}-{nid}".
        let node = id.rsplit('-').next().unwrap_or(&id);
        output.insert(
            "url".into(),
            Value::String(format!("https://frontera.library.ucla.edu/node/{}", node)),
        );
        output.insert("source".into(), "Frontera".into());
        Ok(output)
    }
}

/// Dataverse search items.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataverseProfile;

const DATAVERSE_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("type", "type"),
    ("url", "url"),
    ("name", "titles"),
    ("publisher", "publisher"),
    ("description", "description"),
    ("subjects", "subjects"),
    ("keywords", "keywords"),
];

impl MappingProfile for DataverseProfile {
    fn name(&self) -> &'static str {
        "dataverse"
    }

    fn source_query(&self) -> Option<&str> {
        Some("*")
    }

    /// Only dataverse-type items carry a reliable `identifier`, so the
    /// persistent URL is used for every item type.
    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "url")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let mut output = keep_renamed(record, DATAVERSE_FIELDS, false);
        listify(&mut output, "titles");
        output.insert("source".into(), "Dataverse".into());
        Ok(output)
    }
}

/// Oral History Blacklight index.
#[derive(Debug, Clone, Copy, Default)]
pub struct OralHistoryProfile;

const ORAL_HISTORY_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("title_display", "titles"),
    ("subject_topic_facet", "subjects"),
    ("author_display", "names"),
];

impl MappingProfile for OralHistoryProfile {
    fn name(&self) -> &'static str {
        "oral-history"
    }

    fn source_query(&self) -> Option<&str> {
        Some("*:*")
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "id")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let id = required_text(record, "id")?;
        let mut output = keep_renamed(record, ORAL_HISTORY_FIELDS, false);

        let titles = concat_lists(record, &["title_display", "subtitle_display"]);
        if !titles.is_empty() {
            output.insert("titles".into(), Value::Array(titles));
        }

        let names = concat_lists(record, &["author_display", "interviewee_display"]);
        if !names.is_empty() {
            output.insert("names".into(), Value::Array(names));
        }

        // Solr copies subjects from several fields, so duplicates are common.
        if let Some(subjects) = output.get("subjects").map(as_list) {
            let mut subjects: Vec<String> = subjects
                .into_iter()
                .filter_map(|s| text_value(&s))
                .collect();
            subjects.sort();
            subjects.dedup();
            output.insert(
                "subjects".into(),
                Value::Array(subjects.into_iter().map(Value::String).collect()),
            );
        }

        output.insert(
            "url".into(),
            Value::String(format!("https://oralhistory.library.ucla.edu/catalog/{}", id)),
        );
        output.insert("source".into(), "Oral History".into());
        Ok(output)
    }
}

/// Sinai Palimpsests Blacklight index.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinaiPalimpsestsProfile;

const SINAI_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("title_tesim", "titles"),
    ("alternative_title_tesim", "alternative_titles"),
    ("descriptive_title_tesim", "descriptive_titles"),
    ("uniform_title_tesim", "uniform_titles"),
    ("contributor_tesim", "contributors"),
    ("contents_tesim", "contents"),
    ("contents_note_tesim", "contents_notes"),
    ("keywords_tesim", "keywords"),
];

impl MappingProfile for SinaiPalimpsestsProfile {
    fn name(&self) -> &'static str {
        "sinai-palimpsests"
    }

    fn source_query(&self) -> Option<&str> {
        Some("*:*")
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "id")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let id = required_text(record, "id")?;
        let mut output = keep_renamed(record, SINAI_FIELDS, false);
        // Ids are ARKs; the catalog route expects the slashes encoded.
        output.insert(
            "url".into(),
            Value::String(format!(
                "https://sinaimanuscripts.library.ucla.edu/catalog/{}",
                id.replace('/', "%2F")
            )),
        );
        output.insert("source".into(), "Sinai Palimpsests".into());
        Ok(output)
    }
}

/// Pacific Rim Library harvest index.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrlProfile;

const PRL_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("title_keyword", "titles"),
    ("description_keyword", "descriptions"),
    ("publisher_keyword", "publishers"),
    ("subject_keyword", "subjects"),
    ("creator_keyword", "creators"),
    ("contributor_keyword", "contributors"),
    ("type_keyword", "types"),
    ("external_link", "url"),
];

impl MappingProfile for PrlProfile {
    fn name(&self) -> &'static str {
        "prl"
    }

    fn source_query(&self) -> Option<&str> {
        Some("*:*")
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "id")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let mut output = keep_renamed(record, PRL_FIELDS, true);
        let names = concat_lists(&output, &["creators", "contributors"]);
        output.insert("names".into(), Value::Array(names));
        output.insert("source".into(), "PRL".into());
        Ok(output)
    }
}

/// Sheet music collection index.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetMusicProfile;

/// The `_keyword` copies are already deduplicated by the index.
const SHEET_MUSIC_FIELDS: &[(&str, &str)] = &[
    ("id", "id"),
    ("title_keyword", "title"),
    ("publisher_keyword", "publisher"),
    ("subjectTopic_keyword", "subject"),
    ("nameNamePart_keyword", "name"),
    ("url_keyword", "url"),
];

impl MappingProfile for SheetMusicProfile {
    fn name(&self) -> &'static str {
        "sheet-music"
    }

    fn source_query(&self) -> Option<&str> {
        Some("*:*")
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "id")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        let id = required_text(record, "id")?;
        let mut output = keep_renamed(record, SHEET_MUSIC_FIELDS, false);

        // The MODS location is not stored in the index but follows from the
        // collection key.
        let collection = record
            .get("collectionKey")
            .map(as_list)
            .and_then(|keys| keys.first().and_then(text_value));
        if let Some(collection) = collection {
            output.insert(
                "mods_url".into(),
                Value::String(format!(
                    "https://static.library.ucla.edu/sheetmusic/mods/{}/{}",
                    collection, id
                )),
            );
        }

        output.insert("source".into(), "Sheet Music".into());
        Ok(output)
    }
}

/// Legacy digital library (Fedora-backed) index.
#[derive(Debug, Clone, Copy, Default)]
pub struct DlLegacyProfile;

const DL_LEGACY_FIELDS: &[&str] = &[
    "PID",
    "fgs_label_s",
    "mods_titleInfo_title_s",
    "mods_title_ms",
    "mods_xml",
];

/// Prefix of the Dublin Core fields, all of which are kept.
const DUBLIN_CORE_PREFIX: &str = "dc.";

impl MappingProfile for DlLegacyProfile {
    fn name(&self) -> &'static str {
        "dl-legacy"
    }

    fn source_query(&self) -> Option<&str> {
        Some("*:*")
    }

    fn identifier(&self, record: &Record) -> Result<String, MappingError> {
        required_text(record, "PID")
    }

    fn normalize(&self, record: &Record) -> Result<Record, MappingError> {
        Ok(record
            .iter()
            .filter(|(key, _)| {
                DL_LEGACY_FIELDS.contains(&key.as_str()) || key.starts_with(DUBLIN_CORE_PREFIX)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
