//! CSV report of a processed batch.

use std::io::Write;

use crate::models::{ResultTable, DERIVED_COLUMNS};

/// Header of the exported report: the original columns in their original
/// order, then the derived columns in the order they are computed.
pub fn report_header(table: &ResultTable) -> Vec<String> {
    table
        .columns
        .iter()
        .cloned()
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// Write `table` as CSV, one record per tree in row order.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(report_header(table))?;

    for row in &table.rows {
        let record = row
            .cells
            .iter()
            .map(ToString::to_string)
            .chain(row.breakdown.derived_values().into_iter().map(|v| v.to_string()));
        out.write_record(record)?;
    }

    out.flush()?;
    Ok(())
}

/// Render `table` as an in-memory CSV document.
pub fn to_csv_bytes(table: &ResultTable) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}
