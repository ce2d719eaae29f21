//! Excel writing operations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{Column, DataType};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::debug;

use crate::{Report, Table};

/// File name of the workbook report for an input file:
/// `geospatial_report_<input stem>.xlsx`, spaces replaced by underscores.
pub fn report_file_name(input: &Path) -> String {
    let stem = input.file_stem()
        .map(|stem| stem.to_string_lossy().replace(' ', "_"))
        .unwrap_or_else(|| "parcels".into());
    format!("geospatial_report_{stem}.xlsx")
}

/// Write the whole report as one workbook, one sheet per table. Sheets are
/// named by [`Table::label`], e.g. `valid (42)`.
pub fn write_report_xlsx(report: &Report, path: &Path) -> Result<PathBuf> {
    let mut workbook = Workbook::new();
    for table in report.tables() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(table.label())
            .with_context(|| format!("[io::xlsx::write] Invalid sheet name: {}", table.label()))?;
        write_table(sheet, table)
            .with_context(|| format!("[io::xlsx::write] Failed to write sheet {}", table.name()))?;
    }

    workbook.save(path)
        .with_context(|| format!("[io::xlsx::write] Failed to save workbook: {}", path.display()))?;
    debug!(path = %path.display(), sheets = report.tables().len(), "wrote workbook report");
    Ok(path.to_path_buf())
}

/// Header row, then one row per record. Numeric columns are written as
/// numbers, everything else as text; nulls are left blank.
fn write_table(sheet: &mut Worksheet, table: &Table) -> Result<()> {
    for (col, column) in table.frame().get_columns().iter().enumerate() {
        let col = u16::try_from(col).context("too many columns for a worksheet")?;
        sheet.write_string(0, col, column.name().as_str())?;

        if is_numeric(column) {
            let values = column.cast(&DataType::Float64)?;
            for (row, value) in values.f64()?.into_iter().enumerate() {
                if let Some(value) = value { sheet.write_number(sheet_row(row)?, col, value)?; }
            }
        } else {
            let values = column.cast(&DataType::String)?;
            for (row, value) in values.str()?.into_iter().enumerate() {
                if let Some(value) = value { sheet.write_string(sheet_row(row)?, col, value)?; }
            }
        }
    }
    Ok(())
}

fn is_numeric(column: &Column) -> bool {
    matches!(
        column.dtype(),
        DataType::Float32 | DataType::Float64
            | DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
            | DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
    )
}

/// Worksheet row of a record; row 0 is the header.
fn sheet_row(record: usize) -> Result<u32> {
    u32::try_from(record + 1).context("too many rows for a worksheet")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_name_from_input_stem() {
        assert_eq!(report_file_name(Path::new("data/Cocoa Farms 2024.csv")), "geospatial_report_Cocoa_Farms_2024.xlsx");
        assert_eq!(report_file_name(Path::new("parcels.geojson")), "geospatial_report_parcels.xlsx");
    }
}
