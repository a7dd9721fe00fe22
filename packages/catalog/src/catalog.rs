//! Main catalog build that ties all components together.

use tracing::{info, warn};

use crate::builder::{BuildSummary, HierarchyBuilder};
use crate::config::{validate_hierarchy, BuildOptions};
use crate::domains::{domain_metadata, load_domains};
use crate::error::Result;
use crate::regime::parse_regime_headers;
use crate::table::{read_table, ColumnBinding, Table};
use crate::types::{CatalogDocument, DomainMetadata};

/// Default location of the domains table, used when none is given.
pub const DEFAULT_DOMAINS_PATH: &str = "data/scf_domains.csv";

/// Build a document from an already loaded controls table.
///
/// Every record is bound before the first one is folded into the tree, so a
/// schema problem anywhere in the table aborts before any work is done.
pub fn build_document(
    table: &Table,
    options: &BuildOptions,
    domains: DomainMetadata,
) -> Result<(CatalogDocument, BuildSummary)> {
    validate_hierarchy(&options.hierarchy)?;
    let binding = ColumnBinding::bind(table, &options.hierarchy, options.regime_start)?;

    let regimes = parse_regime_headers(table.headers_from(options.regime_start));
    if regimes.is_empty() {
        warn!(
            regime_start = options.regime_start,
            columns = table.headers.len(),
            "No regime columns found"
        );
    }
    info!(regimes = regimes.len(), categories = regimes.catalog.len(), "Parsed regime headers");

    let rows = table
        .records
        .iter()
        .map(|record| binding.read(record))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = HierarchyBuilder::new(regimes);
    for row in &rows {
        builder.add_row(row);
    }

    let summary = builder.summary();
    Ok((builder.finish(&options.catalog_name, domains), summary))
}

/// Load the inputs named by `options` and build the document.
///
/// Nothing is written; see [`crate::output::save_outputs`].
pub fn build_catalog(options: &BuildOptions) -> Result<(CatalogDocument, BuildSummary)> {
    let domains = match &options.domains_path {
        Some(path) => domain_metadata(&read_table(path)?)?,
        None => load_domains(std::path::Path::new(DEFAULT_DOMAINS_PATH))?,
    };

    let table = read_table(&options.controls_path)?;
    build_document(&table, options, domains)
}
