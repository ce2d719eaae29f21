//! CSV writing operations.

use std::{fs::File, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use polars::{io::SerWriter, prelude::CsvWriter};
use tracing::debug;

use crate::{io::ensure_dir_exists, Report, Table};

/// Write one table to `<dir>/<name>.csv`, returning the file path.
pub fn write_table_csv(table: &Table, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.csv", table.name()));
    let file = File::create(&path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(&mut table.frame().clone())
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))?;
    debug!(table = table.name(), rows = table.len(), path = %path.display(), "wrote table");
    Ok(path)
}

/// Write every report table into `dir` (created if absent), in report order.
pub fn write_report_csv(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir_exists(dir)?;
    report.tables().into_iter()
        .map(|table| write_table_csv(table, dir))
        .collect()
}
