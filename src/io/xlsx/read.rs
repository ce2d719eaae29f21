//! Excel reading operations.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use polars::{frame::DataFrame, prelude::{NamedFrom, Series}};
use tracing::debug;

use crate::{io::{records::{assemble_parcels, parse_wkt_column}, InputOptions}, ParcelSet};

/// Reads the first worksheet into a DataFrame of text columns. The first row
/// holds the column names; empty cells are null.
fn read_first_sheet(path: &Path) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("[io::xlsx::read] Failed to open workbook: {}", path.display()))?;
    let range = workbook.worksheet_range_at(0)
        .ok_or_else(|| anyhow!("[io::xlsx::read] Workbook has no worksheets: {}", path.display()))?
        .with_context(|| format!("[io::xlsx::read] Failed to read first worksheet of {}", path.display()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else { return Ok(DataFrame::empty()) };
    let body = rows.collect::<Vec<_>>();

    let columns = header.iter().enumerate()
        .map(|(col, name)| {
            let name = match cell_text(name) {
                Some(name) => name,
                None => format!("column_{col}"),
            };
            let values = body.iter()
                .map(|row| row.get(col).and_then(cell_text))
                .collect::<Vec<_>>();
            Series::new(name.into(), values).into()
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

/// Cell value as text; empty cells are null. Whole numbers print without a
/// fractional part so numeric codes keep their spreadsheet look.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}

/// Read parcels from the first worksheet of an `.xlsx` workbook holding a WKT
/// geometry column. The WKT text is kept verbatim as the geometry-duplicate key.
pub fn read_xlsx_parcels(path: &Path, options: &InputOptions) -> Result<ParcelSet> {
    let df = read_first_sheet(path)?;
    let (geoms, keys) = parse_wkt_column(&df, &options.wkt_column)?;
    debug!(rows = df.height(), columns = df.width(), path = %path.display(), "read xlsx parcels");

    assemble_parcels(df, geoms, Some(keys), options.source_epsg, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    use crate::ParcelError;

    fn write_sheet(rows: &[&[&str]], numbers: &[(u32, u16, f64)]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                if !text.is_empty() {
                    sheet.write_string(r as u32, c as u16, *text).unwrap();
                }
            }
        }
        for &(r, c, value) in numbers {
            sheet.write_number(r, c, value).unwrap();
        }
        workbook.save(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_wkt_and_passthrough_columns() {
        let (_dir, path) = write_sheet(
            &[
                &["Plantation Code", "Farmer", "Hectares", "wkt_geom"],
                &["P001", "Ama", "", "POLYGON ((0 0, 0.001 0, 0.001 0.001, 0 0.001, 0 0))"],
                &["P002", "", "", "POLYGON ((1 1, 1.001 1, 1.001 1.001, 1 1))"],
            ],
            &[(1, 2, 1.25), (2, 2, 3.0)],
        );
        let parcels = read_xlsx_parcels(&path, &InputOptions::default()).unwrap();

        assert_eq!(parcels.codes(), ["P001", "P002"]);
        assert_eq!(parcels.keys()[1], "POLYGON ((1 1, 1.001 1, 1.001 1.001, 1 1))");
        let hectares = parcels.data().column("Hectares").unwrap().str().unwrap()
            .into_iter().collect::<Vec<_>>();
        assert_eq!(hectares, [Some("1.25"), Some("3")]);
        assert_eq!(parcels.data().column("Farmer").unwrap().str().unwrap().get(1), None);
    }

    #[test]
    fn missing_wkt_column_is_reported() {
        let (_dir, path) = write_sheet(&[&["Plantation Code", "geom"], &["P001", "x"]], &[]);
        let err = read_xlsx_parcels(&path, &InputOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParcelError>(),
            Some(ParcelError::MissingColumn { column }) if column == "wkt_geom"
        ));
    }
}
