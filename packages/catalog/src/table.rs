//! Controls table loading and column binding.
//!
//! The header is bound to column positions once. Fail-fast columns must be
//! present in the header, and every row with a control id must reach them;
//! anything else that is missing reads as an empty cell.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::builder::ControlRow;
use crate::config::{COL_CONTROL_ID, COL_CONTROL_NAME, COL_DESCRIPTION, COL_WEIGHTING};
use crate::error::{CatalogError, Result};

/// A fully loaded CSV table.
#[derive(Debug, Clone)]
pub struct Table {
    /// Where the table came from, for error messages.
    pub source: String,
    pub headers: Vec<String>,
    pub records: Vec<StringRecord>,
}

impl Table {
    /// Cells from `start` to the end of the header.
    pub fn headers_from(&self, start: usize) -> &[String] {
        self.headers.get(start..).unwrap_or_default()
    }
}

/// Read a CSV file into memory.
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| {
        CatalogError::Io(std::io::Error::new(
            e.kind(),
            format!("Cannot open {}: {e}", path.display()),
        ))
    })?;
    read_table_from(file, &path.display().to_string())
}

/// Read CSV data from any reader.
///
/// Records may be shorter or longer than the header. A UTF-8 byte order mark
/// in front of the first header is dropped.
pub fn read_table_from<R: Read>(reader: R, source: &str) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    debug!(
        source,
        columns = headers.len(),
        records = records.len(),
        "Loaded table"
    );

    Ok(Table {
        source: source.to_string(),
        headers,
        records,
    })
}

/// Position of a column, by exact header text.
///
/// With duplicate headers the last one wins, like a dict built from the row.
pub fn find_column(headers: &[String], column: &str) -> Option<usize> {
    headers.iter().rposition(|h| h == column)
}

fn require_column(table: &Table, column: &str) -> Result<usize> {
    find_column(&table.headers, column).ok_or_else(|| CatalogError::MissingColumn {
        column: column.to_string(),
        table: table.source.clone(),
    })
}

/// Header positions of every field a [`ControlRow`] needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    id: usize,
    name: Option<usize>,
    description: usize,
    weighting: Option<usize>,
    /// Hierarchy columns with their names, outer to inner.
    path: Vec<(String, usize)>,
    regime_start: usize,
    regime_count: usize,
}

impl ColumnBinding {
    /// Bind a table's header, failing if a fail-fast column is missing.
    ///
    /// Fail-fast columns are the control id, the description and every
    /// hierarchy column. Title and weighting are optional.
    pub fn bind(table: &Table, hierarchy: &[String], regime_start: usize) -> Result<Self> {
        let id = require_column(table, COL_CONTROL_ID)?;
        let description = require_column(table, COL_DESCRIPTION)?;
        let path = hierarchy
            .iter()
            .map(|column| Ok((column.clone(), require_column(table, column)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id,
            name: find_column(&table.headers, COL_CONTROL_NAME),
            description,
            weighting: find_column(&table.headers, COL_WEIGHTING),
            path,
            regime_start,
            regime_count: table.headers.len().saturating_sub(regime_start),
        })
    }

    pub fn regime_count(&self) -> usize {
        self.regime_count
    }

    /// Read one record into a [`ControlRow`].
    ///
    /// Rows without a control id are returned with every other field empty,
    /// so they are skipped without being checked.
    pub fn read<'r>(&self, record: &'r StringRecord) -> Result<ControlRow<'r>> {
        let line = record.position().map_or(0, csv::Position::line);
        let required = |position: usize, column: &str| {
            record.get(position).ok_or_else(|| CatalogError::MissingField {
                column: column.to_string(),
                line,
            })
        };
        let optional = |position: Option<usize>| {
            position.and_then(|p| record.get(p)).unwrap_or_default()
        };

        let id = required(self.id, COL_CONTROL_ID)?;
        if id.trim().is_empty() {
            return Ok(ControlRow {
                id,
                ..ControlRow::default()
            });
        }

        let description = required(self.description, COL_DESCRIPTION)?;
        let path = self
            .path
            .iter()
            .map(|(column, position)| required(*position, column.as_str()))
            .collect::<Result<Vec<_>>>()?;

        let regime_cells = (0..self.regime_count)
            .map(|i| record.get(self.regime_start + i).unwrap_or_default())
            .collect();

        Ok(ControlRow {
            id,
            name: optional(self.name),
            description,
            weighting: optional(self.weighting),
            path,
            regime_cells,
        })
    }
}
