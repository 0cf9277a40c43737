// src/utils/export.rs

use anyhow::{bail, Context, Result};
use csv::WriterBuilder;
use log::info;
use rust_xlsxwriter::{Format, Workbook};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::matching::Resolution;
use crate::models::stats_models::RunSummary;

pub const QUERY_OUTPUT_COLUMN: &str = "entrada_consulta";
pub const MATCH_OUTPUT_COLUMN: &str = "correspondencia_encontrada";
pub const DEFAULT_OUTPUT_FILE: &str = "resultado_correspondencias.xlsx";

// Rows per worksheet in the xlsx format, header included
const XLSX_MAX_ROWS: usize = 1_048_576;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Tsv,
    Csv,
}

impl OutputFormat {
    /// `.xlsx` selects an Excel workbook, `.csv` comma-separated text and
    /// anything else tab-separated text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => OutputFormat::Xlsx,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Tsv,
        }
    }

    pub fn delimiter(&self) -> Option<u8> {
        match self {
            OutputFormat::Xlsx => None,
            OutputFormat::Tsv => Some(b'\t'),
            OutputFormat::Csv => Some(b','),
        }
    }
}

/// Writes one delimited row per resolution, in order, under the two output
/// columns. Unmatched queries get an empty match cell.
pub fn write_matches<W: Write>(
    writer: W,
    resolutions: &[Resolution],
    delimiter: u8,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    wtr.write_record([QUERY_OUTPUT_COLUMN, MATCH_OUTPUT_COLUMN])?;
    for resolution in resolutions {
        wtr.write_record([
            resolution.query.as_str(),
            resolution.result.matched().unwrap_or(""),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Single-sheet workbook with a bold header row. Unmatched queries leave the
/// match cell blank.
pub fn matches_workbook(resolutions: &[Resolution]) -> Result<Workbook> {
    if resolutions.len() >= XLSX_MAX_ROWS {
        bail!(
            "{} rows do not fit in one worksheet (limit {})",
            resolutions.len(),
            XLSX_MAX_ROWS - 1
        );
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string_with_format(0, 0, QUERY_OUTPUT_COLUMN, &header_format)?;
    worksheet.write_string_with_format(0, 1, MATCH_OUTPUT_COLUMN, &header_format)?;

    for (row, resolution) in (1u32..).zip(resolutions) {
        worksheet.write_string(row, 0, resolution.query.as_str())?;
        if let Some(reference) = resolution.result.matched() {
            worksheet.write_string(row, 1, reference)?;
        }
    }
    Ok(workbook)
}

pub fn export_matches(path: &Path, resolutions: &[Resolution]) -> Result<()> {
    let format = OutputFormat::from_path(path);
    match format.delimiter() {
        None => {
            let mut workbook = matches_workbook(resolutions)?;
            workbook
                .save(path)
                .with_context(|| format!("Failed to write workbook {}", path.display()))?;
        }
        Some(delimiter) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            write_matches(BufWriter::new(file), resolutions, delimiter)
                .with_context(|| format!("Failed to write results to {}", path.display()))?;
        }
    }
    info!(
        "💾 Wrote {} rows to {} ({:?})",
        resolutions.len(),
        path.display(),
        format
    );
    Ok(())
}

pub fn export_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("Failed to serialize run summary to {}", path.display()))?;
    info!("💾 Wrote run summary to {}", path.display());
    Ok(())
}
