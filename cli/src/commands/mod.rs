pub mod overlaps;
pub mod validate;

use anyhow::{Context, Result};
use parcelcheck::{io::InputOptions, ValidationOptions};

use crate::cli::{InputArgs, TuningArgs};

/// Build reader options from the shared input flags.
pub(crate) fn input_options(args: &InputArgs) -> InputOptions {
    let defaults = InputOptions::default();
    InputOptions {
        code_column: args.code_column.clone().unwrap_or(defaults.code_column),
        wkt_column: args.wkt_column.clone().unwrap_or(defaults.wkt_column),
        source_epsg: args.epsg.unwrap_or(defaults.source_epsg),
        projection: args.projection.unwrap_or(defaults.projection),
    }
}

/// Load validation options from `--config` (if any), then apply flag overrides.
pub(crate) fn validation_options(args: &TuningArgs) -> Result<ValidationOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("[config] Failed to read {}", path.display()))?;
            serde_json::from_str::<ValidationOptions>(&text)
                .with_context(|| format!("[config] Invalid options in {}", path.display()))?
        }
        None => ValidationOptions::default(),
    };

    if let Some(threshold) = args.threshold { options.overlap_threshold_pct = threshold }
    if let Some(min_vertices) = args.min_vertices { options.min_vertices = min_vertices }
    if let Some(policy) = args.policy { options.policy = policy }
    if args.sequential { options.parallel = false }

    Ok(options)
}
