//! Duplicate detection over geometry keys and attribute codes.
//!
//! Everything here works on row positions and plain string keys; no geometry
//! is inspected. Results always preserve original row order.

use ahash::{AHashMap, AHashSet};

/// Split of the rows by geometry key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryPartition {
    /// First row of each distinct key, in original order.
    pub unique: Vec<usize>,
    /// Every row whose key is shared with at least one other row (all copies kept).
    pub duplicates: Vec<usize>,
}

/// Split of the attribute codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributePartition {
    /// Distinct codes in first-seen order.
    pub unique_codes: Vec<String>,
    /// Distinct codes occurring two or more times, in first-seen order.
    pub duplicate_codes: Vec<String>,
}

/// Count occurrences of each key.
fn key_counts<'a>(keys: impl Iterator<Item = &'a str>) -> AHashMap<&'a str, usize> {
    let mut counts = AHashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Partition rows by geometry key (exact, byte-for-byte string equality).
pub fn partition_by_geometry<S: AsRef<str>>(keys: &[S]) -> GeometryPartition {
    let counts = key_counts(keys.iter().map(AsRef::as_ref));

    GeometryPartition {
        unique: keep_first(0..keys.len(), |row| keys[row].as_ref()),
        duplicates: (0..keys.len())
            .filter(|&row| counts[keys[row].as_ref()] >= 2)
            .collect(),
    }
}

/// Partition attribute codes into distinct and repeated codes.
pub fn partition_by_attribute<S: AsRef<str>>(codes: &[S]) -> AttributePartition {
    let counts = key_counts(codes.iter().map(AsRef::as_ref));

    let unique_codes = keep_first(0..codes.len(), |row| codes[row].as_ref())
        .into_iter()
        .map(|row| codes[row].as_ref().to_string())
        .collect::<Vec<_>>();

    AttributePartition {
        duplicate_codes: unique_codes.iter()
            .filter(|code| counts[code.as_str()] >= 2)
            .cloned()
            .collect(),
        unique_codes,
    }
}

/// Keep the first row for each key, preserving the order of `rows`.
pub fn keep_first<'a, I, F>(rows: I, key: F) -> Vec<usize>
where
    I: IntoIterator<Item = usize>,
    F: Fn(usize) -> &'a str,
{
    let mut seen = AHashSet::new();
    rows.into_iter()
        .filter(|&row| seen.insert(key(row)))
        .collect()
}
