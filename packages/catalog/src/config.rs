//! Configuration constants and validation functions for the catalog builder.
//!
//! Column names are the exact header text of the SCF 2025.4 export, embedded
//! line breaks included.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{CatalogError, Result};

/// Label written as the root `name` of the output document.
pub const CATALOG_NAME: &str = "SCF 2025.4";

/// Position of the first regime column in the controls table.
///
/// Every column from here to the end of the header is one compliance regime.
pub const REGIME_START_INDEX: usize = 30;

/// Category used when a regime header has an empty first line.
pub const DEFAULT_REGIME_CATEGORY: &str = "General";

/// Weight assigned to controls whose weighting does not parse.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Control identifier column.
pub const COL_CONTROL_ID: &str = "SCF #";

/// Control title column.
pub const COL_CONTROL_NAME: &str = "SCF Control";

/// Control description column.
pub const COL_DESCRIPTION: &str = "Secure Controls Framework (SCF)\nControl Description";

/// Relative weighting column.
pub const COL_WEIGHTING: &str = "Relative Control Weighting";

/// Domain column (shared by the controls and domains tables).
pub const COL_DOMAIN: &str = "SCF Domain";

/// NIST CSF function grouping column.
pub const COL_FUNCTION_GROUPING: &str = "NIST CSF\nFunction Grouping";

/// PPTDF applicability column.
pub const COL_APPLICABILITY: &str = "PPTDF\nApplicability";

/// Domain intent column of the domains table.
pub const COL_PRINCIPLE_INTENT: &str = "Principle Intent";

/// Default hierarchy, outer to inner.
pub const DEFAULT_HIERARCHY: [&str; 3] = [COL_DOMAIN, COL_FUNCTION_GROUPING, COL_APPLICABILITY];

/// File name of the plain JSON document.
pub const JSON_OUTPUT_FILE: &str = "scf_data.json";

/// File name of the script-wrapped document.
pub const SCRIPT_OUTPUT_FILE: &str = "scf_data.js";

/// Variable the script wrapper binds the document to.
pub const SCRIPT_VARIABLE: &str = "scfData";

/// Options for a single catalog build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Controls table (CSV).
    pub controls_path: PathBuf,

    /// Optional domains table (CSV).
    pub domains_path: Option<PathBuf>,

    /// Directory receiving both output files.
    pub output_dir: PathBuf,

    /// Label of the document root.
    pub catalog_name: String,

    /// First regime column.
    pub regime_start: usize,

    /// Hierarchy dimension columns, outer to inner.
    pub hierarchy: Vec<String>,
}

impl BuildOptions {
    /// Create options with the SCF 2025.4 defaults for everything but the input.
    pub fn new(controls_path: impl Into<PathBuf>) -> Self {
        Self {
            controls_path: controls_path.into(),
            domains_path: None,
            output_dir: PathBuf::from("."),
            catalog_name: CATALOG_NAME.to_string(),
            regime_start: REGIME_START_INDEX,
            hierarchy: default_hierarchy(),
        }
    }

    #[must_use]
    pub fn with_domains(mut self, path: impl Into<PathBuf>) -> Self {
        self.domains_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_catalog_name(mut self, name: impl Into<String>) -> Self {
        self.catalog_name = name.into();
        self
    }

    #[must_use]
    pub fn with_regime_start(mut self, index: usize) -> Self {
        self.regime_start = index;
        self
    }

    #[must_use]
    pub fn with_hierarchy<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hierarchy = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Check the options before any file is read.
    pub fn validate(&self) -> Result<()> {
        validate_hierarchy(&self.hierarchy)?;
        validate_output_dir(&self.output_dir)
    }
}

/// The default hierarchy as owned column names.
#[must_use]
pub fn default_hierarchy() -> Vec<String> {
    DEFAULT_HIERARCHY.iter().map(|c| (*c).to_string()).collect()
}

/// Validate a hierarchy column list.
///
/// # Examples
/// ```
/// use scf_catalog::config::validate_hierarchy;
///
/// assert!(validate_hierarchy(&["SCF Domain".to_string()]).is_ok());
/// assert!(validate_hierarchy(&[]).is_err());
/// ```
pub fn validate_hierarchy(columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(CatalogError::EmptyHierarchy);
    }

    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(CatalogError::DuplicateHierarchyColumn(column.clone()));
        }
    }

    Ok(())
}

/// Validate that the output path exists and is a directory.
pub fn validate_output_dir(output_dir: &std::path::Path) -> Result<()> {
    if !output_dir.exists() {
        return Err(CatalogError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Output directory does not exist: {}", output_dir.display()),
        )));
    }
    if !output_dir.is_dir() {
        return Err(CatalogError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Output path is not a directory: {}", output_dir.display()),
        )));
    }
    Ok(())
}

/// Decode a column name given on the command line.
///
/// Shells make embedded newlines awkward, so a literal `\n` stands for one.
///
/// ```
/// use scf_catalog::config::unescape_column;
///
/// assert_eq!(unescape_column("PPTDF\\nApplicability"), "PPTDF\nApplicability");
/// ```
#[must_use]
pub fn unescape_column(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
