//! Batch aggregation over a table of tree measurements.
//!
//! Rows are first mapped to typed [`MeasurementRow`]s, then the valid ones are
//! estimated in parallel. Any failing row aborts the batch; the error lists
//! every failing row, invalid or outside the model domain, so a spreadsheet
//! can be fixed in one pass.

use rayon::prelude::*;

use crate::error::{parse_measurement, BatchError, RowError, RowProblem, RowValidationError};
use crate::estimator;
use crate::models::*;
use crate::table::Table;

static EMPTY: Cell = Cell::Empty;

/// Read one measurement cell as a finite real number.
fn numeric_cell(row: usize, field: &str, cell: &Cell) -> Result<f64, RowValidationError> {
    let problem = match cell {
        Cell::Number(v) if v.is_finite() => return Ok(*v),
        Cell::Number(v) => RowProblem::NotNumeric {
            value: v.to_string(),
        },
        Cell::Empty => RowProblem::Missing,
        Cell::Text(text) => match parse_measurement(field, text) {
            Ok(v) => return Ok(v),
            Err(_) if text.trim().is_empty() => RowProblem::Missing,
            Err(e) => RowProblem::NotNumeric { value: e.input },
        },
    };

    Err(RowValidationError {
        row,
        field: field.to_string(),
        problem,
    })
}

/// Column positions of the two measurements.
#[derive(Debug, Clone, Copy)]
struct MeasurementColumns {
    circumference: usize,
    height: usize,
}

impl MeasurementColumns {
    fn resolve(table: &Table) -> Result<Self, BatchError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| BatchError::MissingColumn {
                    field: name.to_string(),
                })
        };
        Ok(Self {
            circumference: find(CIRCUMFERENCE_COLUMN)?,
            height: find(HEIGHT_COLUMN)?,
        })
    }

    /// Map an untyped row to a measurement, reporting the first bad field.
    fn measurement(&self, index: usize, cells: &[Cell]) -> Result<MeasurementRow, RowValidationError> {
        let cell = |i: usize| cells.get(i).unwrap_or(&EMPTY);
        let circumference = numeric_cell(index, CIRCUMFERENCE_COLUMN, cell(self.circumference))?;
        let height = numeric_cell(index, HEIGHT_COLUMN, cell(self.height))?;
        Ok(MeasurementRow {
            index,
            circumference,
            height,
        })
    }
}

/// Split the rows of `table` into valid measurements and validation failures,
/// both in row order.
fn validate_rows(table: &Table) -> Result<(Vec<MeasurementRow>, Vec<RowError>), BatchError> {
    let columns = MeasurementColumns::resolve(table)?;

    let mut rows = Vec::with_capacity(table.len());
    let mut errors = Vec::new();
    for (index, cells) in table.rows.iter().enumerate() {
        match columns.measurement(index, cells) {
            Ok(row) => rows.push(row),
            Err(e) => errors.push(RowError::Invalid(e)),
        }
    }
    Ok((rows, errors))
}

/// Validate every row of `table` into typed measurements.
///
/// Rows keep their input order. All invalid rows are reported, ordered by row
/// index.
pub fn measurement_rows(table: &Table) -> Result<Vec<MeasurementRow>, BatchError> {
    let (rows, errors) = validate_rows(table)?;
    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(BatchError::InvalidRows(errors))
    }
}

/// Estimate every tree in `table`.
///
/// Produces a [`ResultTable`] row-aligned with the input and the total carbon
/// storage across all rows (0 for an empty table). Fails without partial
/// results if a measurement column is missing or any row is invalid or
/// outside the model domain; the error then names every such row.
pub fn aggregate(table: &Table) -> Result<BatchResult, BatchError> {
    let (measurements, mut errors) = validate_rows(table)?;

    // Indexed parallel collect keeps input order.
    let estimates: Vec<Result<CarbonBreakdown, RowError>> = measurements
        .par_iter()
        .map(|m| {
            estimator::estimate(m.circumference, m.height).map_err(|source| RowError::Domain {
                row: m.index,
                source,
            })
        })
        .collect();

    let mut rows = Vec::with_capacity(estimates.len());
    for (m, estimate) in measurements.iter().zip(estimates) {
        match estimate {
            Ok(breakdown) => rows.push(ResultRow {
                index: m.index,
                cells: table.rows[m.index].clone(),
                breakdown,
            }),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        errors.sort_by_key(RowError::row);
        tracing::warn!(failed = errors.len(), "batch rejected: invalid rows");
        return Err(BatchError::InvalidRows(errors));
    }

    let total_carbon: f64 = rows.iter().map(|r| r.breakdown.carbon_storage).sum();
    let summary = BatchSummary {
        total_carbon,
        tree_count: rows.len(),
    };
    tracing::debug!(trees = summary.tree_count, total_carbon, "batch aggregated");

    Ok(BatchResult {
        table: ResultTable {
            columns: table.columns.clone(),
            rows,
        },
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<Cell>>) -> Table {
        Table::new(vec!["Circumference".to_string(), "Height".to_string()], rows)
    }

    #[test]
    fn numeric_cell_accepts_numbers_and_numeric_text() {
        assert_eq!(numeric_cell(0, "Height", &Cell::Number(3.0)), Ok(3.0));
        assert_eq!(
            numeric_cell(0, "Height", &Cell::Text(" 4.5 ".to_string())),
            Ok(4.5)
        );
    }

    #[test]
    fn numeric_cell_never_coerces_to_zero() {
        let err = numeric_cell(3, "Height", &Cell::Empty).unwrap_err();
        assert_eq!(err.row, 3);
        assert_eq!(err.problem, RowProblem::Missing);

        let err = numeric_cell(1, "Height", &Cell::Text("n/a".to_string())).unwrap_err();
        assert_eq!(
            err.problem,
            RowProblem::NotNumeric {
                value: "n/a".to_string()
            }
        );
    }

    #[test]
    fn empty_table_has_zero_total() {
        let result = aggregate(&table(vec![])).unwrap();
        assert!(result.table.is_empty());
        assert_eq!(result.summary.total_carbon, 0.0);
        assert_eq!(result.summary.tree_count, 0);
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let t = Table::new(vec!["Circumference".to_string()], vec![vec![Cell::Number(1.0)]]);
        assert_eq!(
            aggregate(&t).unwrap_err(),
            BatchError::MissingColumn {
                field: "Height".to_string()
            }
        );
    }

    #[test]
    fn negative_height_row_is_a_domain_failure() {
        let t = table(vec![
            vec![Cell::Number(50.0), Cell::Number(10.0)],
            vec![Cell::Number(50.0), Cell::Number(-2.0)],
        ]);
        match aggregate(&t).unwrap_err() {
            BatchError::InvalidRows(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(matches!(errors[0], RowError::Domain { row: 1, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn domain_failures_are_reported_alongside_invalid_rows() {
        let t = table(vec![
            vec![Cell::Text("abc".to_string()), Cell::Number(10.0)],
            vec![Cell::Number(50.0), Cell::Number(10.0)],
            vec![Cell::Number(70.0), Cell::Number(-1.0)],
            vec![Cell::Number(60.0), Cell::Empty],
        ]);
        match aggregate(&t).unwrap_err() {
            BatchError::InvalidRows(errors) => {
                let rows: Vec<usize> = errors.iter().map(RowError::row).collect();
                assert_eq!(rows, vec![0, 2, 3]);
                assert!(matches!(errors[0], RowError::Invalid(_)));
                assert!(matches!(errors[1], RowError::Domain { row: 2, .. }));
                assert!(matches!(errors[2], RowError::Invalid(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn measurement_rows_ignores_the_model_domain() {
        let t = table(vec![vec![Cell::Number(70.0), Cell::Number(-1.0)]]);
        let rows = measurement_rows(&t).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].height, -1.0);
    }
}
