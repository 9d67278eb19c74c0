//! Mapping profiles.
//!
//! A profile is a pure pair of functions over a borrowed record: one derives
//! the destination identifier, the other builds the normalized record.
//! Profiles are looked up by name in a [`ProfileRegistry`] at startup.

mod californica;
mod catalog;
pub mod fields;
mod ursus;

pub use californica::CalifornicaProfile;
pub use catalog::{
    DataverseProfile, DlLegacyProfile, FronteraProfile, IdentityProfile, OralHistoryProfile,
    PrlProfile, SheetMusicProfile, SinaiPalimpsestsProfile,
};
pub use ursus::UrsusProfile;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{MappingError, PipelineError};
use centralsearch_shared::{IndexDocument, Record};

/// Name of the profile used when none is configured.
pub const DEFAULT_PROFILE: &str = "identity";

/// Source-specific record mapping.
///
/// Implementations must not keep state between calls: the same record
/// always yields the same identifier and the same normalized record.
pub trait MappingProfile: Send + Sync {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Default source filter for this profile, if it has one.
    fn source_query(&self) -> Option<&str> {
        None
    }

    /// Derive the destination identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::MissingField`] if the identifying field is absent.
    fn identifier(&self, record: &Record) -> Result<String, MappingError>;

    /// Build the normalized record. The input is left untouched.
    fn normalize(&self, record: &Record) -> Result<Record, MappingError>;

    /// Identifier and normalized record together.
    fn to_document(&self, record: &Record) -> Result<IndexDocument, MappingError> {
        Ok(IndexDocument::new(
            self.identifier(record)?,
            self.normalize(record)?,
        ))
    }
}

/// Name-to-profile lookup table.
#[derive(Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<&'static str, Arc<dyn MappingProfile>>,
}

impl ProfileRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every shipped profile.
    pub fn builtin() -> Result<Self, PipelineError> {
        let californica = CalifornicaProfile::new()
            .map_err(|e| PipelineError::config(format!("invalid californica field pattern: {}", e)))?;

        let mut registry = Self::new();
        registry.register(Arc::new(IdentityProfile));
        registry.register(Arc::new(FronteraProfile));
        registry.register(Arc::new(DataverseProfile));
        registry.register(Arc::new(UrsusProfile));
        registry.register(Arc::new(OralHistoryProfile));
        registry.register(Arc::new(SinaiPalimpsestsProfile));
        registry.register(Arc::new(PrlProfile));
        registry.register(Arc::new(SheetMusicProfile));
        registry.register(Arc::new(DlLegacyProfile));
        registry.register(Arc::new(californica));
        Ok(registry)
    }

    /// Add or replace a profile under its own name.
    pub fn register(&mut self, profile: Arc<dyn MappingProfile>) {
        self.profiles.insert(profile.name(), profile);
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles.keys().copied()
    }

    /// Look up a profile. `None` selects the identity profile.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown names.
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn MappingProfile>, PipelineError> {
        let name = name.unwrap_or(DEFAULT_PROFILE);
        self.profiles.get(name).cloned().ok_or_else(|| {
            PipelineError::config(format!(
                "unknown profile '{}', available profiles: {}",
                name,
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}
