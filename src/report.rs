//! End-to-end processing of an uploaded spreadsheet.
//!
//! Stores the upload, reads it into a [`Table`], aggregates it, and writes the
//! CSV report and SVG chart next to it.

use std::path::Path;

use thiserror::Error;

use crate::batch;
use crate::chart;
use crate::config::ChartConfig;
use crate::error::{BatchError, TableError};
use crate::export;
use crate::models::BatchResult;
use crate::storage::{self, Storage, StorageError};
use crate::table::{Table, TableFormat};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("failed to write report: {0}")]
    Export(#[from] csv::Error),
}

/// A processed upload and the files generated for it.
#[derive(Debug, Clone)]
pub struct Report {
    /// Sanitized name the upload was stored under.
    pub filename: String,
    pub result: BatchResult,
    pub report_filename: String,
    pub chart_filename: String,
}

/// Aggregate a table and produce its report and chart contents.
pub fn render(table: &Table, chart_config: &ChartConfig) -> Result<(BatchResult, Vec<u8>, String), ReportError> {
    let result = batch::aggregate(table)?;
    let csv = export::to_csv_bytes(&result.table)?;
    let svg = chart::render_svg(&chart::bars(&result.table), chart_config);
    Ok((result, csv, svg))
}

/// Store `bytes` as `filename`, process it, and write report and chart into
/// `storage`.
pub fn process_upload(
    storage: &Storage,
    chart_config: &ChartConfig,
    filename: &str,
    bytes: Vec<u8>,
) -> Result<Report, ReportError> {
    let stored = storage.save_upload(filename, &bytes)?;
    let format = TableFormat::from_path(Path::new(&stored))?;
    let table = Table::from_bytes(format, bytes)?;
    tracing::info!(file = %stored, rows = table.len(), "processing upload");

    let (result, csv, svg) = render(&table, chart_config)?;

    let report_filename = storage::report_filename(&stored);
    let chart_filename = storage::chart_filename(&stored);
    storage.write(&report_filename, &csv)?;
    storage.write(&chart_filename, svg.as_bytes())?;

    tracing::info!(
        file = %stored,
        trees = result.summary.tree_count,
        total_carbon = result.summary.total_carbon,
        "upload processed"
    );

    Ok(Report {
        filename: stored,
        result,
        report_filename,
        chart_filename,
    })
}
