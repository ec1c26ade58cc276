//! Wide-to-long reshaping.
//!
//! The source sheets are rectangular: identifying columns first, then one
//! column per year with the year as the literal header ("1990".."2024").
//! [`reshape`] melts such a table into one [`Observation`] per (id-tuple,
//! year) pair. Consumers must not rely on output row order.

use crate::models::{Observation, TableSchema};
use thiserror::Error;

/// A parsed wide table: trimmed string headers plus string cells.
///
/// Headers are coerced to trimmed strings at load time, so a year column
/// survives whether the writer emitted it as text or as a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Structural problems detected before any aggregate runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table '{table}' is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("table '{table}' has no year columns")]
    NoYearColumns { table: &'static str },
}

/// Sole year-detection rule: a header that consists entirely of ASCII digits.
fn is_year_header(h: &str) -> bool {
    !h.is_empty() && h.bytes().all(|b| b.is_ascii_digit())
}

fn column_index(
    table: &WideTable,
    schema: &TableSchema,
    column: &'static str,
) -> Result<usize, SchemaError> {
    table
        .headers
        .iter()
        .position(|h| h == column)
        .ok_or(SchemaError::MissingColumn { table: schema.name, column })
}

/// Parse a cell into an observation value. Empty, non-numeric, and NaN cells
/// are "no observation", never zero.
fn parse_value(cell: &str) -> Option<f64> {
    let v = cell.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Melt a wide table into long form according to its schema.
///
/// Returns a [`SchemaError`] when an identifying column the schema names is
/// absent, or when no header looks like a year at all; either aborts this
/// dataset without touching the others. Cells in non-id, non-year columns are
/// passed through untouched (they are simply not part of the output).
pub fn reshape(table: &WideTable, schema: &TableSchema) -> Result<Vec<Observation>, SchemaError> {
    let entity_idx = column_index(table, schema, schema.entity_column)?;
    let sector_idx = schema
        .sector_column
        .map(|c| column_index(table, schema, c))
        .transpose()?;
    let region_idx = schema
        .region_column
        .map(|c| column_index(table, schema, c))
        .transpose()?;

    let year_cols: Vec<(usize, i32)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_year_header(h))
        .filter_map(|(i, h)| h.parse::<i32>().ok().map(|y| (i, y)))
        .collect();
    if year_cols.is_empty() {
        return Err(SchemaError::NoYearColumns { table: schema.name });
    }

    let cell = |row: &[String], idx: usize| row.get(idx).map(|s| s.trim().to_string());

    let mut out = Vec::with_capacity(table.rows.len() * year_cols.len());
    for row in &table.rows {
        let entity = cell(row, entity_idx).unwrap_or_default();
        let sector = sector_idx.and_then(|i| cell(row, i));
        let region = region_idx.and_then(|i| cell(row, i));
        for &(col, year) in &year_cols {
            out.push(Observation {
                entity: entity.clone(),
                sector: sector.clone(),
                region: region.clone(),
                year,
                value: row.get(col).and_then(|c| parse_value(c)),
            });
        }
    }
    Ok(out)
}
