use anyhow::Result;
use parcelcheck::io::{read_parcels, write_report};
use tracing::info;

use super::{input_options, validation_options};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ValidateArgs) -> Result<()> {
    let in_path = &args.input.input;
    let out_dir = &args.output.clone().unwrap_or("./report".into());
    let input = input_options(&args.input);
    let options = validation_options(&args.tuning)?;

    info!(path = %in_path.display(), "loading parcels");
    let parcels = read_parcels(in_path, &input)?;

    info!(
        records = parcels.len(),
        threshold_pct = options.overlap_threshold_pct,
        min_vertices = options.min_vertices,
        "validating parcels"
    );
    let report = parcelcheck::validate(&parcels, &options)?;

    for table in report.tables() {
        println!("{}", table.label());
    }

    let written = write_report(&report, args.format, out_dir, in_path)?;
    for path in &written {
        info!(path = %path.display(), "wrote report");
    }

    Ok(())
}
