//! Catalog import from a JSON dump.

use std::path::Path;

use tracing::{info, instrument};

use crate::catalog::Creature;
use crate::catalog_service::{CatalogError, CatalogService};

/// Parses a JSON array of creatures.
#[instrument(skip(json))]
pub fn parse_creatures(json: &str) -> Result<Vec<Creature>, CatalogError> {
    serde_json::from_str(json)
        .map_err(|e| CatalogError::Invalid(format!("Unreadable catalog JSON: {}", e)))
}

/// Reads a JSON dump and writes every creature in it to the catalog.
#[instrument(skip(catalog, path), fields(path = %path.as_ref().display()))]
pub fn seed_from_file(catalog: &CatalogService, path: impl AsRef<Path>) -> Result<usize, CatalogError> {
    let json = std::fs::read_to_string(path.as_ref())
        .map_err(|e| CatalogError::Unreadable(format!("'{}': {}", path.as_ref().display(), e)))?;
    let creatures = parse_creatures(&json)?;
    info!(count = creatures.len(), "Catalog dump parsed");
    catalog.import(&creatures)
}
