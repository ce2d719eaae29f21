use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::{error::Result, overlap::OverlapPair};

/// A named output table together with its row count.
#[derive(Debug, Clone)]
pub struct Table {
    name: &'static str,
    frame: DataFrame,
}

impl Table {
    pub(crate) fn new(name: &'static str, frame: DataFrame) -> Self {
        Self { name, frame }
    }

    #[inline] pub fn name(&self) -> &'static str { self.name }

    #[inline] pub fn frame(&self) -> &DataFrame { &self.frame }

    #[inline] pub fn into_frame(self) -> DataFrame { self.frame }

    /// Number of rows.
    #[inline] pub fn len(&self) -> usize { self.frame.height() }

    #[inline] pub fn is_empty(&self) -> bool { self.frame.height() == 0 }

    /// Name with the row count appended, e.g. `valid (42)`.
    pub fn label(&self) -> String { format!("{} ({})", self.name, self.len()) }
}

/// The nine derived tables of one validation run, plus the raw overlap pairs.
///
/// Every table is an independent copy; none shares columns with another.
#[derive(Debug, Clone)]
pub struct Report {
    pub all_data: Table,
    pub geo_unique: Table,
    pub geo_duplicates: Table,
    pub attr_duplicates: Table,
    pub attr_unique: Table,
    pub num_point: Table,
    pub centroid: Table,
    pub ovlp15: Table,
    pub valid: Table,
    pub overlaps: Vec<OverlapPair>,
}

impl Report {
    /// All tables in report order.
    pub fn tables(&self) -> [&Table; 9] {
        [
            &self.all_data,
            &self.geo_unique,
            &self.geo_duplicates,
            &self.attr_duplicates,
            &self.attr_unique,
            &self.num_point,
            &self.centroid,
            &self.ovlp15,
            &self.valid,
        ]
    }

    /// `(name, row count)` for every table, in report order.
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        self.tables().iter().map(|table| (table.name(), table.len())).collect()
    }

    /// Look a table up by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables().into_iter().find(|table| table.name() == name)
    }
}

/// Single-column table of attribute codes.
pub(crate) fn code_frame(code_column: &str, codes: &[String]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![Series::new(code_column.into(), codes).into()])?)
}

/// The `ovlp15` table: one row per conflicting pair, in discovery order.
pub(crate) fn overlap_frame(code_column: &str, pairs: &[OverlapPair]) -> Result<DataFrame> {
    fn column<T>(pairs: &[OverlapPair], f: impl Fn(&OverlapPair) -> T) -> Vec<T> {
        pairs.iter().map(f).collect()
    }

    Ok(DataFrame::new(vec![
        Series::new(format!("{code_column}_1").into(), column(pairs, |p| p.code_1.clone())).into(),
        Series::new("area_ha_1".into(), column(pairs, |p| p.area_ha_1)).into(),
        Series::new(format!("{code_column}_2").into(), column(pairs, |p| p.code_2.clone())).into(),
        Series::new("area_ha_2".into(), column(pairs, |p| p.area_ha_2)).into(),
        Series::new("overlap_pct_overall".into(), column(pairs, |p| p.overlap_pct)).into(),
        Series::new("overlap_pct_1".into(), column(pairs, |p| p.overlap_pct_1)).into(),
        Series::new("overlap_pct_2".into(), column(pairs, |p| p.overlap_pct_2)).into(),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(code_1: &str, code_2: &str) -> OverlapPair {
        OverlapPair {
            first: 0,
            second: 1,
            code_1: code_1.into(),
            area_ha_1: 1.0,
            code_2: code_2.into(),
            area_ha_2: 2.0,
            overlap_pct: 20.0,
            overlap_pct_1: 20.0,
            overlap_pct_2: 10.0,
        }
    }

    #[test]
    fn overlap_frame_columns_follow_code_column() {
        let frame = overlap_frame("Plantation Code", &[pair("A", "B"), pair("C", "D")]).unwrap();
        let names = frame.get_column_names().into_iter().map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec![
            "Plantation Code_1", "area_ha_1", "Plantation Code_2", "area_ha_2",
            "overlap_pct_overall", "overlap_pct_1", "overlap_pct_2",
        ]);
        assert_eq!(frame.height(), 2);
    }

    #[test]
    fn empty_overlap_frame_keeps_schema() {
        let frame = overlap_frame("code", &[]).unwrap();
        assert_eq!(frame.width(), 7);
        assert_eq!(frame.height(), 0);
    }

    #[test]
    fn table_label_includes_count() {
        let table = Table::new("attr_unique", code_frame("code", &["a".into(), "b".into()]).unwrap());
        assert_eq!(table.len(), 2);
        assert_eq!(table.label(), "attr_unique (2)");
    }
}
