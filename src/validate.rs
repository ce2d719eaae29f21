use polars::prelude::{NamedFrom, Series};
use tracing::{debug, info};

use crate::{
    dedup::{partition_by_attribute, partition_by_geometry},
    error::Result,
    geom::{area_m2, m2_to_ha, round_to, ShapeMetrics},
    options::ValidationOptions,
    overlap::detect_overlaps,
    parcel::ParcelSet,
    report::{code_frame, overlap_frame, Report, Table},
    resolve::resolve_conflicts,
};

/// Run the full validation over a parcel set and derive the nine report tables.
///
/// The run is deterministic and leaves `parcels` untouched.
pub fn validate(parcels: &ParcelSet, options: &ValidationOptions) -> Result<Report> {
    let code_column = parcels.code_column();
    let metrics = parcels.shapes().iter().map(ShapeMetrics::of).collect::<Vec<_>>();

    let geo = partition_by_geometry(parcels.keys());
    let attr = partition_by_attribute(parcels.codes());
    debug!(
        records = parcels.len(),
        geo_unique = geo.unique.len(),
        geo_duplicates = geo.duplicates.len(),
        codes = attr.unique_codes.len(),
        duplicate_codes = attr.duplicate_codes.len(),
        "partitioned records"
    );

    let overlaps = detect_overlaps(parcels, &geo.unique, options.overlap_threshold_pct, options.parallel);
    let valid = resolve_conflicts(parcels, &geo.unique, &overlaps, options.policy);
    info!(records = parcels.len(), overlaps = overlaps.len(), valid = valid.len(), "validation complete");

    // geo_unique carries its own vertex counts.
    let mut geo_unique = parcels.take_rows(&geo.unique)?;
    geo_unique.with_column(Series::new(
        "num_points".into(),
        geo.unique.iter().map(|&row| metrics[row].num_points as u32).collect::<Vec<_>>(),
    ))?;

    let few_points = (0..parcels.len())
        .filter(|&row| metrics[row].num_points < options.min_vertices)
        .collect::<Vec<_>>();
    let mut num_point = parcels.take_rows(&few_points)?.select([code_column])?;
    num_point.with_column(Series::new(
        "num_points".into(),
        few_points.iter().map(|&row| metrics[row].num_points as u32).collect::<Vec<_>>(),
    ))?;

    let outside = (0..parcels.len())
        .filter(|&row| metrics[row].centroid_outside)
        .collect::<Vec<_>>();

    let mut valid_frame = parcels.take_rows(&valid)?;
    valid_frame.with_column(Series::new(
        "area_ha".into(),
        valid.iter()
            .map(|&row| round_to(m2_to_ha(area_m2(parcels.projected(row))), 3))
            .collect::<Vec<_>>(),
    ))?;
    valid_frame.with_column(Series::new(
        "longitude".into(),
        valid.iter()
            .map(|&row| metrics[row].centroid.map(|c| round_to(c.x(), 8)))
            .collect::<Vec<_>>(),
    ))?;
    valid_frame.with_column(Series::new(
        "latitude".into(),
        valid.iter()
            .map(|&row| metrics[row].centroid.map(|c| round_to(c.y(), 8)))
            .collect::<Vec<_>>(),
    ))?;

    Ok(Report {
        all_data: Table::new("all_data", parcels.data().clone()),
        geo_unique: Table::new("geo_unique", geo_unique),
        geo_duplicates: Table::new("geo_duplicates", parcels.take_rows(&geo.duplicates)?),
        attr_duplicates: Table::new("attr_duplicates", code_frame(code_column, &attr.duplicate_codes)?),
        attr_unique: Table::new("attr_unique", code_frame(code_column, &attr.unique_codes)?),
        num_point: Table::new("num_point", num_point),
        centroid: Table::new("centroid", parcels.take_rows(&outside)?),
        ovlp15: Table::new("ovlp15", overlap_frame(code_column, &overlaps)?),
        valid: Table::new("valid", valid_frame),
        overlaps,
    })
}
