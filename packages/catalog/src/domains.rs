//! Domain metadata from the SCF domains table.

use std::path::Path;

use tracing::debug;

use crate::config::{COL_DOMAIN, COL_PRINCIPLE_INTENT};
use crate::error::{CatalogError, Result};
use crate::table::{find_column, read_table, Table};
use crate::types::DomainMetadata;

/// Extract domain name to principle intent pairs from a loaded table.
///
/// Both columns must exist. Rows with an empty domain name are ignored; a
/// repeated domain keeps its first position and its last intent.
pub fn domain_metadata(table: &Table) -> Result<DomainMetadata> {
    let column = |name: &str| {
        find_column(&table.headers, name).ok_or_else(|| CatalogError::MissingColumn {
            column: name.to_string(),
            table: table.source.clone(),
        })
    };
    let domain = column(COL_DOMAIN)?;
    let intent = column(COL_PRINCIPLE_INTENT)?;

    let mut metadata = DomainMetadata::new();
    for record in &table.records {
        let name = record.get(domain).unwrap_or_default().trim();
        if name.is_empty() {
            continue;
        }
        let text = record.get(intent).unwrap_or_default().trim();
        metadata.insert(name.to_string(), text.to_string());
    }

    debug!(domains = metadata.len(), "Loaded domain metadata");
    Ok(metadata)
}

/// Load the domains table, if it exists.
///
/// A missing file is not an error: domain metadata is optional.
pub fn load_domains(path: &Path) -> Result<DomainMetadata> {
    if !path.exists() {
        debug!(path = %path.display(), "No domains table");
        return Ok(DomainMetadata::new());
    }
    domain_metadata(&read_table(path)?)
}
