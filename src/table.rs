//! Generic table of named columns read from CSV files and workbooks.
//!
//! The first row of a sheet is the header. Trailing blank rows are dropped so
//! that the padding after the last tree in a spreadsheet does not become
//! trees; blank rows between trees are kept and fail validation later.

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Reader};
use serde::Serialize;

pub use crate::models::Cell;

use crate::error::TableError;

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Float(v) => Cell::Number(*v),
            Data::Int(v) => Cell::Number(*v as f64),
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Workbook,
}

impl TableFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Some(Self::Workbook),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| TableError::UnsupportedFormat(ext.to_string()))
    }
}

/// An ordered table of named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    /// Each row has exactly `columns.len()` cells.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, padding short rows with empty cells and dropping blank
    /// rows after the last non-blank one. Cells beyond the header width are
    /// discarded.
    pub fn new(columns: Vec<String>, rows: impl IntoIterator<Item = Vec<Cell>>) -> Self {
        let width = columns.len();
        let mut rows: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        let used = rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map_or(0, |last| last + 1);
        rows.truncate(used);

        Self { columns, rows }
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read a CSV document with a header row.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }

        Ok(Self::new(columns, rows))
    }

    /// Read the first worksheet of an xls/xlsx/ods workbook held in memory.
    pub fn from_workbook_bytes(bytes: Vec<u8>) -> Result<Self, TableError> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(TableError::NoWorksheet)??;

        let mut sheet_rows = range.rows();
        let columns = match sheet_rows.next() {
            Some(header) => header
                .iter()
                .map(|c| Cell::from(c).to_string().trim().to_string())
                .collect(),
            None => return Ok(Self::default()),
        };
        let rows: Vec<Vec<Cell>> = sheet_rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(Self::new(columns, rows))
    }

    /// Parse in-memory file contents in the given format.
    pub fn from_bytes(format: TableFormat, bytes: Vec<u8>) -> Result<Self, TableError> {
        match format {
            TableFormat::Csv => Self::from_csv(bytes.as_slice()),
            TableFormat::Workbook => Self::from_workbook_bytes(bytes),
        }
    }

    /// Read a file from disk, picking the format from its extension.
    pub fn read_path(path: &Path) -> Result<Self, TableError> {
        let format = TableFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        Self::from_bytes(format, bytes)
    }
}
