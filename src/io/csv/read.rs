//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::CsvReadOptions};
use tracing::debug;

use crate::{io::{records::{assemble_parcels, parse_wkt_column}, InputOptions}, ParcelSet};

/// Reads a CSV file from `path` into a Polars DataFrame with every column as text.
fn read_csv_as_text(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Read parcels from a CSV file holding a WKT geometry column.
///
/// The WKT text is kept verbatim as the geometry-duplicate key.
pub fn read_csv_parcels(path: &Path, options: &InputOptions) -> Result<ParcelSet> {
    let df = read_csv_as_text(path)?;
    let (geoms, keys) = parse_wkt_column(&df, &options.wkt_column)?;
    debug!(rows = df.height(), columns = df.width(), path = %path.display(), "read CSV parcels");

    assemble_parcels(df, geoms, Some(keys), options.source_epsg, options)
}
