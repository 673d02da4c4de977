use log::info;
use std::fs;
use std::path::Path;
use synthbox_ports::catalog::{CatalogError, InMemoryCatalog, SynthDefinition};

const BUNDLED_SYNTHS: &str = include_str!("../data/synths.json");

pub fn parse_catalog(json: &str) -> Result<InMemoryCatalog, CatalogError> {
    let synths: Vec<SynthDefinition> =
        serde_json::from_str(json).map_err(|e| CatalogError::Invalid(e.to_string()))?;
    InMemoryCatalog::new(synths)
}

/// The synth definitions shipped with the application.
pub fn bundled_catalog() -> Result<InMemoryCatalog, CatalogError> {
    parse_catalog(BUNDLED_SYNTHS)
}

/// Reads a `synths.json` array from disk.
pub fn load_catalog(path: &Path) -> Result<InMemoryCatalog, CatalogError> {
    let json = fs::read_to_string(path)
        .map_err(|e| CatalogError::Invalid(format!("{}: {}", path.display(), e)))?;
    let catalog = parse_catalog(&json)?;
    info!("loaded synth catalog from {}", path.display());
    Ok(catalog)
}
