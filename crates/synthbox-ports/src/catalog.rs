use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no synth with id: {0}")]
    NotFound(SynthId),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub cc: Cc,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthDefinition {
    pub id: SynthId,
    #[serde(default)]
    pub slug: String,
    pub manufacturer: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub parameters: Vec<Parameter>,
}

impl SynthDefinition {
    pub fn display_title(&self) -> String {
        format!("{} {}", self.manufacturer, self.title)
    }

    pub fn parameter_by_cc(&self, cc: Cc) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.cc == cc)
    }
}

/// Read-only lookup of known synthesizers, keyed by id.
pub trait SynthCatalog: Send + Sync {
    fn get_by_id(&self, id: SynthId) -> Result<&SynthDefinition, CatalogError>;
    fn synths(&self) -> &[SynthDefinition];
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    synths: Vec<SynthDefinition>,
}

impl InMemoryCatalog {
    /// Builds a catalog after checking ids are unique and every parameter CC is in 1..=127.
    /// Synths are kept sorted by id.
    pub fn new(mut synths: Vec<SynthDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for synth in &synths {
            if !seen.insert(synth.id) {
                return Err(CatalogError::Invalid(format!("duplicate synth id {}", synth.id)));
            }
            if let Some(parameter) = synth
                .parameters
                .iter()
                .find(|parameter| !is_valid_cc(parameter.cc as u32))
            {
                return Err(CatalogError::Invalid(format!(
                    "synth {} parameter '{}' has cc {} outside 1..=127",
                    synth.id, parameter.title, parameter.cc
                )));
            }
        }
        synths.sort_by_key(|synth| synth.id);
        Ok(Self { synths })
    }
}

impl SynthCatalog for InMemoryCatalog {
    fn get_by_id(&self, id: SynthId) -> Result<&SynthDefinition, CatalogError> {
        self.synths
            .iter()
            .find(|synth| synth.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    fn synths(&self) -> &[SynthDefinition] {
        &self.synths
    }
}
