//! IO module for reading parcel files and writing report tables.
//!
//! These are the collaborators around the validation core: they turn files
//! into a [`ParcelSet`](crate::ParcelSet) and report tables back into files.
//!
//! # Format Modules
//!
//! - `csv` - CSV with a WKT geometry column, and per-table CSV export
//! - `xlsx` - Excel workbooks with a WKT geometry column, and the one-workbook report
//! - `geojson` - GeoJSON feature collections (honours a declared `crs`)
//! - `kml` - KML placemarks
//! - `proj` - reprojection between source, geographic and metric CRSs
//! - `fs` - directory helpers

mod csv;
mod fs;
mod geojson;
mod kml;
mod proj;
mod records;
mod xlsx;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{ParcelSet, Report};

pub use csv::{read_csv_parcels, write_report_csv, write_table_csv};
pub use fs::ensure_dir_exists;
pub use geojson::read_geojson_parcels;
pub use kml::read_kml_parcels;
pub use proj::{project_to_metric, to_geographic, utm_zone, MetricProjection, WGS84_EPSG};
pub use xlsx::{read_xlsx_parcels, report_file_name, write_report_xlsx};

/// How input files are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputOptions {
    /// Column holding the attribute (plantation) code.
    pub code_column: String,

    /// Column holding the WKT geometry text.
    pub wkt_column: String,

    /// EPSG code of the input coordinates.
    pub source_epsg: u32,

    /// Metric projection used for area measurement.
    pub projection: MetricProjection,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            code_column: "Plantation Code".into(),
            wkt_column: "wkt_geom".into(),
            source_epsg: 4326,
            projection: MetricProjection::WebMercator,
        }
    }
}

/// Read a parcel file, choosing the reader by file extension.
pub fn read_parcels(path: &Path, options: &InputOptions) -> Result<ParcelSet> {
    let extension = path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv_parcels(path, options),
        "xlsx" => read_xlsx_parcels(path, options),
        "geojson" | "json" => read_geojson_parcels(path, options),
        "kml" => read_kml_parcels(path, options),
        _ => bail!("[io] Unsupported file format: {}", path.display()),
    }
}

/// How a report is written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// One workbook with a sheet per table.
    #[default]
    Xlsx,
    /// One CSV file per table.
    Csv,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Write `report` into `dir` (created if absent) and return the files written.
/// The workbook is named after `input`, see [`report_file_name`].
pub fn write_report(report: &Report, format: ReportFormat, dir: &Path, input: &Path) -> Result<Vec<PathBuf>> {
    match format {
        ReportFormat::Xlsx => {
            ensure_dir_exists(dir)?;
            Ok(vec![write_report_xlsx(report, &dir.join(report_file_name(input)))?])
        }
        ReportFormat::Csv => write_report_csv(report, dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_rejected() {
        let err = read_parcels(Path::new("parcels.shp"), &InputOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }

    #[test]
    fn default_columns() {
        let options = InputOptions::default();
        assert_eq!(options.code_column, "Plantation Code");
        assert_eq!(options.wkt_column, "wkt_geom");
        assert_eq!(options.source_epsg, 4326);
    }

    #[test]
    fn report_format_spellings() {
        assert_eq!("XLSX".parse::<ReportFormat>(), Ok(ReportFormat::Xlsx));
        assert_eq!("csv".parse::<ReportFormat>(), Ok(ReportFormat::Csv));
        assert!("parquet".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::default(), ReportFormat::Xlsx);
    }
}
