use std::path::PathBuf;

use parcelcheck::{io::{MetricProjection, ReportFormat}, ResolutionPolicy};

/// Land-parcel validation CLI
#[derive(clap::Parser, Debug)]
#[command(name = "parcelcheck", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Validate a parcel file and write the nine report tables
    Validate(ValidateArgs),

    /// List overlapping parcel pairs without resolving them
    Overlaps(OverlapsArgs),
}

#[derive(clap::Args, Debug)]
pub struct InputArgs {
    /// Input parcel file (.csv or .xlsx with a WKT column, .geojson, .kml)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Attribute code column, defaults to "Plantation Code"
    #[arg(long)]
    pub code_column: Option<String>,

    /// WKT geometry column, defaults to "wkt_geom"
    #[arg(long)]
    pub wkt_column: Option<String>,

    /// EPSG code of the input coordinates, defaults to 4326
    #[arg(long)]
    pub epsg: Option<u32>,

    /// Metric projection for areas: webmercator or utm
    #[arg(long)]
    pub projection: Option<MetricProjection>,
}

#[derive(clap::Args, Debug)]
pub struct TuningArgs {
    /// JSON file with validation options
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Overlap threshold in percent, defaults to 15
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Minimum vertex count, defaults to 12
    #[arg(long)]
    pub min_vertices: Option<usize>,

    /// Conflict resolution policy: single_pass or greedy_graph
    #[arg(long)]
    pub policy: Option<ResolutionPolicy>,

    /// Disable parallel overlap detection
    #[arg(long)]
    pub sequential: bool,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Output report directory, defaults to "./report"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Report format: xlsx (one workbook) or csv (one file per table)
    #[arg(long, default_value = "xlsx")]
    pub format: ReportFormat,
}

#[derive(clap::Args, Debug)]
pub struct OverlapsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Print pairs as JSON lines instead of a text table
    #[arg(long)]
    pub json: bool,
}
