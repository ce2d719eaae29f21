use geo::{BooleanOps, Intersects, MultiPolygon};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    geom::{area_m2, m2_to_ha, round_to, ShapeIndex},
    parcel::ParcelSet,
};

/// Two parcels whose overall overlap exceeds the conflict threshold.
///
/// `first` and `second` are row positions in the parcel set, with `first`
/// listed before `second` in the candidate order. Areas are hectares rounded
/// to 3 decimals, percentages rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapPair {
    pub first: usize,
    pub second: usize,
    pub code_1: String,
    pub area_ha_1: f64,
    pub code_2: String,
    pub area_ha_2: f64,
    /// Intersection area over the smaller of the two areas.
    pub overlap_pct: f64,
    /// Intersection area over the first parcel's area.
    pub overlap_pct_1: f64,
    /// Intersection area over the second parcel's area.
    pub overlap_pct_2: f64,
}

/// Geometry of one candidate, prepared for the pairwise scan.
struct Candidate<'a> {
    row: usize,
    geographic: MultiPolygon<f64>,
    projected: &'a MultiPolygon<f64>,
    area_m2: f64,
}

/// Pairwise overlap scan over a set of candidate rows (normally the
/// geometry-unique rows).
///
/// Pairs are discovered in candidate order: all partners of the first
/// candidate (ascending), then of the second, and so on. The R-tree only
/// prunes pairs whose boxes are disjoint; every reported pair has passed an
/// exact intersection test in geographic space, with areas measured on the
/// projected counterparts.
pub struct OverlapDetector<'a> {
    parcels: &'a ParcelSet,
    candidates: Vec<Candidate<'a>>,
    index: ShapeIndex,
    threshold_pct: f64,
}

impl<'a> OverlapDetector<'a> {
    pub fn new(parcels: &'a ParcelSet, rows: &[usize], threshold_pct: f64) -> Self {
        let candidates = rows.iter()
            .map(|&row| {
                let projected = parcels.projected(row);
                Candidate {
                    row,
                    geographic: parcels.shape(row).to_multi_polygon(),
                    projected,
                    area_m2: area_m2(projected),
                }
            })
            .collect::<Vec<_>>();

        Self {
            index: ShapeIndex::new(rows.iter().map(|&row| parcels.shape(row))),
            parcels,
            candidates,
            threshold_pct,
        }
    }

    /// Run the scan, optionally spreading the outer loop over the rayon pool.
    /// Discovery order is the same either way.
    pub fn detect(&self, parallel: bool) -> Vec<OverlapPair> {
        let per_slot: Vec<Vec<OverlapPair>> = if parallel {
            (0..self.index.len()).into_par_iter().map(|slot| self.pairs_from(slot)).collect()
        } else {
            (0..self.index.len()).map(|slot| self.pairs_from(slot)).collect()
        };

        let pairs = per_slot.into_iter().flatten().collect::<Vec<_>>();
        debug!(candidates = self.candidates.len(), pairs = pairs.len(), "overlap scan complete");
        pairs
    }

    /// All conflicting pairs (slot, later) for one slot, in ascending order of the partner.
    fn pairs_from(&self, slot: usize) -> Vec<OverlapPair> {
        let Some(rect) = self.parcels.shape(self.candidates[slot].row).bounding_rect() else {
            return Vec::new();
        };

        self.index.later_candidates(slot, &rect).into_iter()
            .filter_map(|other| self.compare(slot, other))
            .collect()
    }

    /// Exact test for one candidate pair.
    fn compare(&self, i: usize, j: usize) -> Option<OverlapPair> {
        let (a, b) = (&self.candidates[i], &self.candidates[j]);

        // Cheap topological test before any boolean overlay.
        if !a.geographic.intersects(&b.geographic) { return None }

        let smaller = a.area_m2.min(b.area_m2);
        if smaller <= 0.0 {
            warn!(
                code_1 = self.parcels.code(a.row),
                code_2 = self.parcels.code(b.row),
                "skipping overlap with a zero-area parcel"
            );
            return None;
        }

        let intersection = area_m2(&a.projected.intersection(b.projected));
        let overall = intersection / smaller * 100.0;
        if !overall.is_finite() || overall <= self.threshold_pct { return None }

        Some(OverlapPair {
            first: a.row,
            second: b.row,
            code_1: self.parcels.code(a.row).to_string(),
            area_ha_1: round_to(m2_to_ha(a.area_m2), 3),
            code_2: self.parcels.code(b.row).to_string(),
            area_ha_2: round_to(m2_to_ha(b.area_m2), 3),
            overlap_pct: round_to(overall, 2),
            overlap_pct_1: round_to(intersection / a.area_m2 * 100.0, 2),
            overlap_pct_2: round_to(intersection / b.area_m2 * 100.0, 2),
        })
    }
}

/// Convenience wrapper: detect conflicting pairs among `rows`.
pub fn detect_overlaps(
    parcels: &ParcelSet,
    rows: &[usize],
    threshold_pct: f64,
    parallel: bool,
) -> Vec<OverlapPair> {
    OverlapDetector::new(parcels, rows, threshold_pct).detect(parallel)
}
