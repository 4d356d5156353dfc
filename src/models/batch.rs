use serde::Serialize;

use super::{CarbonBreakdown, Cell};

/// Column holding trunk circumference in an uploaded table.
pub const CIRCUMFERENCE_COLUMN: &str = "Circumference";
/// Column holding tree height in an uploaded table.
pub const HEIGHT_COLUMN: &str = "Height";

/// Display label of the row at 0-based position `index`.
///
/// Charts and reports enumerate trees 1-based in input order.
pub fn tree_label(index: usize) -> String {
    format!("Tree number {}", index + 1)
}

/// A table row after its measurements have been validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementRow {
    /// 0-based position in the input table.
    pub index: usize,
    pub circumference: f64,
    pub height: f64,
}

/// One input row together with its derived breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub index: usize,
    /// The original cells, aligned with [`ResultTable::columns`].
    pub cells: Vec<Cell>,
    pub breakdown: CarbonBreakdown,
}

impl ResultRow {
    pub fn label(&self) -> String {
        tree_label(self.index)
    }
}

/// The input table enriched with one breakdown per row.
///
/// Rows are in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    /// Original column names, in their original order.
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Carbon storage of each row, in row order.
    pub fn carbon_storage(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.breakdown.carbon_storage).collect()
    }
}

/// Totals across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_carbon: f64,
    pub tree_count: usize,
}

/// Everything a successful aggregation produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub table: ResultTable,
    pub summary: BatchSummary,
}
