//! Reduce the geometry-unique rows to a conflict-free, code-unique valid set.

use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use crate::{dedup::keep_first, options::ResolutionPolicy, overlap::OverlapPair, parcel::ParcelSet};

/// Resolve overlap conflicts among `rows` and return the surviving rows in
/// their original order.
///
/// 1. Keep the first row per attribute code.
/// 2. Visit the conflicting pairs (in discovery order, or by decreasing
///    overlap for [`ResolutionPolicy::GreedyGraph`]). A pair is resolved only
///    if both of its rows are still present; the row with the strictly
///    smaller rounded area is dropped, the second row on a tie.
/// 3. Re-apply geometry-key and attribute-code deduplication (keep first).
pub fn resolve_conflicts(
    parcels: &ParcelSet,
    rows: &[usize],
    pairs: &[OverlapPair],
    policy: ResolutionPolicy,
) -> Vec<usize> {
    let working = keep_first(rows.iter().copied(), |row| parcels.code(row));

    // Attribute code -> surviving row. A pair endpoint is present only if its
    // own row is the one its code resolves to.
    let lookup = working.iter()
        .map(|&row| (parcels.code(row), row))
        .collect::<AHashMap<_, _>>();
    let present = |code: &str, row: usize| lookup.get(code) == Some(&row);

    let order: Vec<&OverlapPair> = match policy {
        ResolutionPolicy::SinglePass => pairs.iter().collect(),
        ResolutionPolicy::GreedyGraph => {
            let mut sorted = pairs.iter().collect::<Vec<_>>();
            // Stable sort keeps discovery order among equal overlaps.
            sorted.sort_by(|a, b| b.overlap_pct.partial_cmp(&a.overlap_pct).unwrap_or(Ordering::Equal));
            sorted
        }
    };

    let mut removed = AHashSet::new();
    for pair in order {
        let alive = |code: &str, row: usize| present(code, row) && !removed.contains(&row);
        if !alive(&pair.code_1, pair.first) || !alive(&pair.code_2, pair.second) { continue }

        let loser = if pair.area_ha_1 < pair.area_ha_2 { pair.first } else { pair.second };
        debug!(
            removed = parcels.code(loser),
            kept = parcels.code(if loser == pair.first { pair.second } else { pair.first }),
            overlap_pct = pair.overlap_pct,
            "resolved overlap"
        );
        removed.insert(loser);
    }

    let survivors = working.into_iter().filter(|row| !removed.contains(row));
    let survivors = keep_first(survivors, |row| parcels.keys()[row].as_str());
    keep_first(survivors, |row| parcels.code(row))
}
