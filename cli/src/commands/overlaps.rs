use anyhow::Result;
use parcelcheck::{detect_overlaps, io::read_parcels, partition_by_geometry};
use tracing::info;

use super::{input_options, validation_options};

/// Print the over-threshold pairs among geometry-unique records.
pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::OverlapsArgs) -> Result<()> {
    let input = input_options(&args.input);
    let options = validation_options(&args.tuning)?;
    let parcels = read_parcels(&args.input.input, &input)?;

    let unique = partition_by_geometry(parcels.keys()).unique;
    info!(records = parcels.len(), geo_unique = unique.len(), "scanning for overlaps");
    let pairs = detect_overlaps(&parcels, &unique, options.overlap_threshold_pct, options.parallel);

    if args.json {
        for pair in &pairs { println!("{}", serde_json::to_string(pair)?) }
        return Ok(());
    }

    println!("{:<20} {:>10} {:<20} {:>10} {:>8}", "code_1", "area_ha_1", "code_2", "area_ha_2", "overlap%");
    for pair in &pairs {
        println!("{:<20} {:>10.3} {:<20} {:>10.3} {:>8.2}",
            pair.code_1, pair.area_ha_1, pair.code_2, pair.area_ha_2, pair.overlap_pct);
    }
    info!(pairs = pairs.len(), threshold_pct = options.overlap_threshold_pct, "overlap scan complete");

    Ok(())
}
