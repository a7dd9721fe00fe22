//! Error types for the catalog builder.
//!
//! Only schema drift and I/O problems are errors. Data anomalies such as an
//! unparsable weighting or an empty mapping cell are absorbed with a
//! documented default and never surface here.

use thiserror::Error;

/// Main error type for the catalog builder library.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A fail-fast column is absent from the controls table header.
    #[error("Required column '{}' not found in header of {table}", display_column(.column))]
    MissingColumn { column: String, table: String },

    /// A record is too short to contain a fail-fast field.
    #[error("Record at line {line} has no value for required column '{}'", display_column(.column))]
    MissingField { column: String, line: u64 },

    /// The hierarchy has no dimensions to group by.
    #[error("Hierarchy must name at least one column")]
    EmptyHierarchy,

    /// The same column was named twice in the hierarchy.
    #[error("Hierarchy column '{}' is listed more than once", display_column(.0))]
    DuplicateHierarchyColumn(String),

    /// No embedded JSON object was found in a script wrapper.
    #[error("No JSON object found in {0}")]
    MissingPayload(String),

    /// CSV parsing failed.
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization or parsing failed.
    #[error("JSON processing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column headers contain embedded newlines; show them on one line.
fn display_column(column: &str) -> String {
    column.replace('\n', "\\n")
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
