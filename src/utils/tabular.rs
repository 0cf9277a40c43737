// src/utils/tabular.rs
//
// Loading of the two input lists from tab-delimited text with a header row.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::matching::normalize::coerce_query;

pub const REFERENCE_COLUMN: &str = "REFERENCIA";
pub const QUERY_COLUMN: &str = "CONSULTA";
pub const INPUT_DELIMITER: u8 = b'\t';

fn header_name(header: &str) -> &str {
    header.trim_start_matches('\u{feff}').trim()
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| header_name(h) == name)
}

/// Values of column `name` from delimited text with a header row, one per
/// record. Rows too short to hold the column yield `None`. Quoted fields may
/// contain the delimiter, quotes (`""`) and line breaks.
pub fn read_column<R: Read>(reader: R, delimiter: u8, name: &str) -> Result<Vec<Option<String>>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read header row")?.clone();
    let idx = column_index(&headers, name).with_context(|| {
        let found: Vec<&str> = headers.iter().map(header_name).collect();
        format!("missing required column '{}' (found columns: {:?})", name, found)
    })?;

    let mut values = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed record at data row {}", row + 1))?;
        values.push(record.get(idx).map(str::to_string));
    }
    debug!(
        "Read {} values from column '{}' ({} columns)",
        values.len(),
        name,
        headers.len()
    );
    Ok(values)
}

/// Reference names from the `REFERENCIA` column, trimmed. Blank cells are
/// dropped since an empty reference entry can never be a useful match.
pub fn reference_names_from_reader<R: Read>(reader: R) -> Result<Vec<String>> {
    let column = read_column(reader, INPUT_DELIMITER, REFERENCE_COLUMN)?;
    let total = column.len();
    let names: Vec<String> = column
        .into_iter()
        .map(|value| coerce_query(value).trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.len() < total {
        warn!(
            "Dropped {} blank {} cells",
            total - names.len(),
            REFERENCE_COLUMN
        );
    }
    Ok(names)
}

/// Queries from the `CONSULTA` column, one per row. Missing cells become
/// empty queries so the output keeps one row per input row.
pub fn queries_from_reader<R: Read>(reader: R) -> Result<Vec<String>> {
    Ok(read_column(reader, INPUT_DELIMITER, QUERY_COLUMN)?
        .into_iter()
        .map(coerce_query)
        .collect())
}

fn open_input(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to read input file {}", path.display()))
}

pub fn load_reference_names(path: &Path) -> Result<Vec<String>> {
    reference_names_from_reader(open_input(path)?)
        .with_context(|| format!("Invalid reference file {}", path.display()))
}

pub fn load_queries(path: &Path) -> Result<Vec<String>> {
    queries_from_reader(open_input(path)?)
        .with_context(|| format!("Invalid query file {}", path.display()))
}
