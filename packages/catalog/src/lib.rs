//! SCF Catalog - Convert a Secure Controls Framework export into a hierarchy.
//!
//! This crate reads the SCF controls table (one row per control, one column
//! per compliance regime) and produces a nested document grouping controls
//! by domain, function grouping and applicability, with each control's
//! regime mappings merged across rows.
//!
//! # Example
//!
//! ```
//! use scf_catalog::builder::{parse_identifiers, parse_weight};
//!
//! assert_eq!(parse_identifiers("x", "GOV-01"), vec!["GOV-01"]);
//! assert_eq!(parse_weight("abc").value, 1.0);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Column names, defaults and build options
//! - [`types`]: Output document types
//! - [`error`]: Error types and Result alias
//! - [`table`]: CSV loading and column binding
//! - [`regime`]: Regime header parsing
//! - [`builder`]: Hierarchy construction
//! - [`domains`]: Domain metadata
//! - [`output`]: JSON and script output
//! - [`report`]: Regime report over a generated document
//! - [`cli`]: Command-line interface
//! - [`catalog`]: Main build pipeline

pub mod builder;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod domains;
pub mod error;
pub mod output;
pub mod regime;
pub mod report;
pub mod table;
pub mod types;

// Re-export main functions
pub use catalog::{build_catalog, build_document};

// Re-export commonly used items
pub use builder::{BuildSummary, ControlRow, HierarchyBuilder};
pub use config::BuildOptions;
pub use error::{CatalogError, Result};
pub use types::{CatalogDocument, ControlNode, HierarchyNode, RegimeDescriptor};
