use centralsearch_pipeline::{LoaderConfig, MappingProfile, SourceKind};
use centralsearch_repository::DestinationConfig;
use centralsearch_shared::{QueryParser, SourceQuery};

use crate::cli::CopyArgs;
use crate::AppError;

/// Query used when neither the command line nor the profile names one.
pub const DEFAULT_SOURCE_QUERY: &str = "*:*";

/// Validated settings for one `copy` run.
#[derive(Debug, Clone)]
pub struct CopySettings {
    pub source_kind: SourceKind,
    pub source_url: String,
    pub source_query: Option<String>,
    pub query_parser: Option<QueryParser>,
    pub profile: Option<String>,
    pub destination: DestinationConfig,
    pub index_name: String,
    pub page_size: usize,
    pub max_records: Option<u64>,
    pub batch_size: usize,
    pub show_progress: bool,
}

impl CopySettings {
    /// Validate parsed arguments.
    pub fn from_args(args: CopyArgs) -> Result<Self, AppError> {
        if args.source.page_size == 0 {
            return Err(AppError::config("--page-size must be greater than zero"));
        }
        if args.batch_size == 0 {
            return Err(AppError::config("--batch-size must be greater than zero"));
        }
        let index_name = args.destination_index.trim().to_string();
        if index_name.is_empty() {
            return Err(AppError::config("--destination-index must not be empty"));
        }

        Ok(Self {
            source_kind: args.source.source_type,
            source_url: args.source.source_url,
            source_query: args.source.source_query,
            query_parser: args.query_parser,
            profile: args.profile,
            destination: DestinationConfig::new(args.opensearch_url).with_api_key(args.api_key),
            index_name,
            page_size: args.source.page_size,
            max_records: args.max_records,
            batch_size: args.batch_size,
            show_progress: !args.no_progress,
        })
    }

    /// The source filter: the explicit query, then the profile's default,
    /// then everything.
    pub fn filter(&self, profile: &dyn MappingProfile) -> String {
        self.source_query
            .as_deref()
            .or_else(|| profile.source_query())
            .unwrap_or(DEFAULT_SOURCE_QUERY)
            .to_string()
    }

    pub fn source_query(&self, profile: &dyn MappingProfile) -> SourceQuery {
        SourceQuery::new(self.filter(profile))
            .with_page_size(self.page_size)
            .with_max_records(self.max_records)
            .with_query_parser(self.query_parser)
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::default().with_batch_size(self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SourceArgs;
    use centralsearch_pipeline::profiles::{IdentityProfile, UrsusProfile};

    fn args() -> CopyArgs {
        CopyArgs {
            source: SourceArgs {
                source_type: SourceKind::Solr,
                source_url: "http://localhost:8983/solr/ursus".to_string(),
                source_query: None,
                page_size: 100,
            },
            query_parser: None,
            profile: Some("ursus".to_string()),
            opensearch_url: "http://localhost:9200".to_string(),
            api_key: None,
            destination_index: "central".to_string(),
            max_records: Some(50),
            batch_size: 25,
            no_progress: true,
        }
    }

    #[test]
    fn test_query_precedence() {
        let settings = CopySettings::from_args(args()).unwrap();
        assert_eq!(settings.filter(&UrsusProfile), "ark_ssi:*");
        assert_eq!(settings.filter(&IdentityProfile), DEFAULT_SOURCE_QUERY);

        let mut explicit = args();
        explicit.source.source_query = Some("title_tesim:maps".to_string());
        let settings = CopySettings::from_args(explicit).unwrap();
        assert_eq!(settings.filter(&UrsusProfile), "title_tesim:maps");
    }

    #[test]
    fn test_source_query_carries_paging() {
        let settings = CopySettings::from_args(args()).unwrap();

        let query = settings.source_query(&UrsusProfile);

        assert_eq!(query.page_size, 100);
        assert_eq!(query.max_records, Some(50));
        assert_eq!(settings.loader_config().batch_size, 25);
        assert!(!settings.show_progress);
    }

    #[test]
    fn test_rejects_zero_sizes_and_blank_index() {
        let mut zero_page = args();
        zero_page.source.page_size = 0;
        assert!(matches!(CopySettings::from_args(zero_page), Err(AppError::ConfigError(_))));

        let mut zero_batch = args();
        zero_batch.batch_size = 0;
        assert!(CopySettings::from_args(zero_batch).is_err());

        let mut blank = args();
        blank.destination_index = "  ".to_string();
        assert!(CopySettings::from_args(blank).is_err());
    }
}
