//! Error types for the estimator, the batch aggregator and the format layer.
//!
//! Every error carries the context needed to explain it to a user (field name,
//! offending text, row index) rather than a preformatted message.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A measurement string could not be read as a finite real number.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{field} value {input:?} is not a number")]
pub struct ParseError {
    pub field: String,
    pub input: String,
}

/// Parse a user-supplied measurement string.
///
/// Surrounding whitespace is ignored. `NaN` and infinities are rejected even
/// though `f64::from_str` accepts them.
pub fn parse_measurement(field: &str, input: &str) -> Result<f64, ParseError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError {
            field: field.to_string(),
            input: input.to_string(),
        })
}

/// The biomass power term has no real value for these inputs.
///
/// Raised when `diameter² * height` is negative (a fractional power of a
/// negative base) or when an input is not finite.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize)]
#[error(
    "no biomass for circumference {circumference} and height {height}: power base {base} is outside the model domain"
)]
pub struct DomainError {
    pub circumference: f64,
    pub height: f64,
    pub base: f64,
}

/// Why a batch row could not be mapped to a measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowProblem {
    /// The cell is empty.
    Missing,
    /// The cell holds something other than a finite real number.
    NotNumeric { value: String },
}

impl fmt::Display for RowProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "is missing"),
            Self::NotNumeric { value } => write!(f, "value {:?} is not a number", value),
        }
    }
}

/// A batch row is missing a required value or holds a non-numeric one.
///
/// `row` is the 0-based position of the row in the input table.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("row {row}: {field} {problem}")]
pub struct RowValidationError {
    pub row: usize,
    pub field: String,
    #[serde(flatten)]
    pub problem: RowProblem,
}

/// A single failed row in a batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error(transparent)]
    Invalid(#[from] RowValidationError),

    #[error("row {row}: {source}")]
    Domain { row: usize, source: DomainError },
}

impl RowError {
    /// 0-based index of the failing row.
    pub fn row(&self) -> usize {
        match self {
            Self::Invalid(e) => e.row,
            Self::Domain { row, .. } => *row,
        }
    }
}

/// A batch could not be aggregated. No partial results are produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    #[error("required column {field:?} not found")]
    MissingColumn { field: String },

    /// Every failed row, ordered by row index.
    #[error("{} row(s) could not be processed, first: {}", .0.len(), first_error(.0))]
    InvalidRows(Vec<RowError>),
}

fn first_error(errors: &[RowError]) -> String {
    errors
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// A spreadsheet or CSV file could not be read into a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("unsupported file type: {0:?}")]
    UnsupportedFormat(String),

    #[error("the workbook has no worksheets")]
    NoWorksheet,

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_measurement_accepts_padded_numbers() {
        assert_eq!(parse_measurement("height", " 12.5 "), Ok(12.5));
        assert_eq!(parse_measurement("height", "-3"), Ok(-3.0));
    }

    #[test]
    fn parse_measurement_rejects_text_and_non_finite() {
        for input in ["", "tall", "NaN", "inf", "-infinity", "1,5"] {
            let err = parse_measurement("circumference", input).unwrap_err();
            assert_eq!(err.field, "circumference");
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn row_error_reports_its_row() {
        let invalid = RowError::from(RowValidationError {
            row: 4,
            field: "Height".to_string(),
            problem: RowProblem::Missing,
        });
        assert_eq!(invalid.row(), 4);
        assert_eq!(invalid.to_string(), "row 4: Height is missing");

        let domain = RowError::Domain {
            row: 7,
            source: DomainError {
                circumference: 10.0,
                height: -1.0,
                base: -20.0,
            },
        };
        assert_eq!(domain.row(), 7);
    }

    #[test]
    fn batch_error_summarises_first_failure() {
        let err = BatchError::InvalidRows(vec![RowError::from(RowValidationError {
            row: 2,
            field: "Height".to_string(),
            problem: RowProblem::NotNumeric {
                value: "abc".to_string(),
            },
        })]);
        assert_eq!(
            err.to_string(),
            "1 row(s) could not be processed, first: row 2: Height value \"abc\" is not a number"
        );
    }
}
