mod index;
mod metrics;
mod shape;

pub(crate) use index::ShapeIndex;
pub(crate) use metrics::round_to;
pub use metrics::ShapeMetrics;
pub use shape::{area_m2, m2_to_ha, Shape};
