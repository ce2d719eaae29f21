#![doc = "Parcelcheck public API"]
mod dedup;
mod error;
mod geom;
pub mod io;
mod options;
mod overlap;
mod parcel;
mod report;
mod resolve;
mod validate;

#[doc(inline)]
pub use dedup::{keep_first, partition_by_attribute, partition_by_geometry, AttributePartition, GeometryPartition};

#[doc(inline)]
pub use error::{ParcelError, Result};

#[doc(inline)]
pub use geom::{area_m2, m2_to_ha, Shape, ShapeMetrics};

#[doc(inline)]
pub use options::{ResolutionPolicy, ValidationOptions};

#[doc(inline)]
pub use overlap::{detect_overlaps, OverlapDetector, OverlapPair};

#[doc(inline)]
pub use parcel::ParcelSet;

#[doc(inline)]
pub use report::{Report, Table};

#[doc(inline)]
pub use resolve::resolve_conflicts;

#[doc(inline)]
pub use validate::validate;
