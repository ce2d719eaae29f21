use geo::{Geometry, MultiPolygon};
use polars::prelude::{DataFrame, DataType, IdxCa, IdxSize};
use tracing::warn;

use crate::{error::{ParcelError, Result}, geom::Shape};

/// The input record collection: one row per parcel.
///
/// Attribute columns (including the attribute-code column) live in `data`;
/// geometry is held alongside in two parallel vectors, one in geographic
/// coordinates for topology tests and one in a planar metric projection for
/// area measurement. Row positions are stable and shared by all vectors.
#[derive(Debug, Clone)]
pub struct ParcelSet {
    data: DataFrame,
    code_column: String,
    codes: Vec<String>,
    keys: Vec<String>,
    shapes: Vec<Shape>,
    projected: Vec<MultiPolygon<f64>>,
}

impl ParcelSet {
    /// Assemble a parcel set, checking that the attribute-code column exists,
    /// holds no nulls, and that both geometry vectors match the table height.
    /// Geometry-duplicate keys default to the canonical WKT of each shape.
    pub fn new(
        data: DataFrame,
        code_column: &str,
        geometries: Vec<Geometry<f64>>,
        projected: Vec<Geometry<f64>>,
    ) -> Result<Self> {
        let codes = read_codes(&data, code_column)?;

        check_len("geometries", data.height(), geometries.len())?;
        check_len("projected geometries", data.height(), projected.len())?;

        let shapes = geometries.into_iter().map(Shape::from).collect::<Vec<_>>();
        for (row, shape) in shapes.iter().enumerate() {
            if !shape.is_supported() {
                warn!(row, kind = shape.kind(), "unsupported geometry type; counted as 0 vertices");
            }
        }

        let projected = projected.into_iter()
            .map(|geometry| Shape::from(geometry).to_multi_polygon())
            .collect();

        Ok(Self {
            keys: shapes.iter().map(Shape::wkt_key).collect(),
            code_column: code_column.to_string(),
            data,
            codes,
            shapes,
            projected,
        })
    }

    /// Replace the geometry-duplicate keys, typically with the raw WKT text
    /// read from the input so that equality is byte-for-byte on the source.
    pub fn with_geometry_keys(mut self, keys: Vec<String>) -> Result<Self> {
        check_len("geometry keys", self.len(), keys.len())?;
        self.keys = keys;
        Ok(self)
    }

    #[inline] pub fn len(&self) -> usize { self.codes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.codes.is_empty() }

    /// Attribute table (all original columns, geometry excluded).
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Name of the attribute-code column.
    #[inline] pub fn code_column(&self) -> &str { &self.code_column }

    #[inline] pub fn codes(&self) -> &[String] { &self.codes }

    #[inline] pub fn code(&self, row: usize) -> &str { &self.codes[row] }

    /// Geometry-duplicate keys, one per row.
    #[inline] pub fn keys(&self) -> &[String] { &self.keys }

    #[inline] pub fn shapes(&self) -> &[Shape] { &self.shapes }

    #[inline] pub fn shape(&self, row: usize) -> &Shape { &self.shapes[row] }

    /// Planar (metric) counterpart of a row's geometry.
    #[inline] pub fn projected(&self, row: usize) -> &MultiPolygon<f64> { &self.projected[row] }

    /// Copy of the attribute rows at `rows`, in the given order.
    pub(crate) fn take_rows(&self, rows: &[usize]) -> Result<DataFrame> {
        let idx = IdxCa::from_vec(
            "idx".into(),
            rows.iter().map(|&row| row as IdxSize).collect(),
        );
        Ok(self.data.take(&idx)?)
    }
}

fn check_len(what: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ParcelError::LengthMismatch { what, expected, found });
    }
    Ok(())
}

/// Read the attribute-code column as text, failing fast on absence or nulls.
fn read_codes(data: &DataFrame, code_column: &str) -> Result<Vec<String>> {
    let column = data.column(code_column)
        .map_err(|_| ParcelError::MissingColumn { column: code_column.to_string() })?
        .cast(&DataType::String)?;

    column.str()?.into_iter().enumerate()
        .map(|(row, code)| {
            code.map(str::to_string)
                .ok_or_else(|| ParcelError::NullValue { column: code_column.to_string(), row })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};
    use polars::prelude::{NamedFrom, Series};

    fn frame(codes: Vec<Option<&str>>) -> DataFrame {
        DataFrame::new(vec![Series::new("Plantation Code".into(), codes).into()]).unwrap()
    }

    fn square() -> Geometry<f64> {
        Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)])
    }

    #[test]
    fn builds_with_derived_keys() {
        let parcels = ParcelSet::new(
            frame(vec![Some("A"), Some("B")]),
            "Plantation Code",
            vec![square(), square()],
            vec![square(), square()],
        ).unwrap();

        assert_eq!(parcels.len(), 2);
        assert_eq!(parcels.codes(), ["A", "B"]);
        assert_eq!(parcels.keys()[0], parcels.keys()[1]);
        assert_eq!(parcels.projected(1).0.len(), 1);
    }

    #[test]
    fn missing_code_column_is_rejected() {
        let err = ParcelSet::new(frame(vec![Some("A")]), "code", vec![square()], vec![square()])
            .unwrap_err();
        assert!(matches!(err, ParcelError::MissingColumn { column } if column == "code"));
    }

    #[test]
    fn null_code_is_rejected() {
        let err = ParcelSet::new(
            frame(vec![Some("A"), None]),
            "Plantation Code",
            vec![square(), square()],
            vec![square(), square()],
        ).unwrap_err();
        assert!(matches!(err, ParcelError::NullValue { row: 1, .. }));
    }

    #[test]
    fn mismatched_geometry_count_is_rejected() {
        let err = ParcelSet::new(frame(vec![Some("A")]), "Plantation Code", vec![], vec![square()])
            .unwrap_err();
        assert!(matches!(err, ParcelError::LengthMismatch { expected: 1, found: 0, .. }));
    }

    #[test]
    fn unsupported_geometry_is_kept() {
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        let parcels = ParcelSet::new(
            frame(vec![Some("A")]),
            "Plantation Code",
            vec![line.clone()],
            vec![line],
        ).unwrap();
        assert!(!parcels.shape(0).is_supported());
        assert!(parcels.projected(0).0.is_empty());
    }

    #[test]
    fn explicit_keys_override_wkt() {
        let parcels = ParcelSet::new(
            frame(vec![Some("A"), Some("B")]),
            "Plantation Code",
            vec![square(), square()],
            vec![square(), square()],
        ).unwrap()
            .with_geometry_keys(vec!["k1".into(), "k2".into()])
            .unwrap();
        assert_eq!(parcels.keys(), ["k1", "k2"]);
    }

    #[test]
    fn take_rows_preserves_requested_order() {
        let parcels = ParcelSet::new(
            frame(vec![Some("A"), Some("B"), Some("C")]),
            "Plantation Code",
            vec![square(), square(), square()],
            vec![square(), square(), square()],
        ).unwrap();
        let rows = parcels.take_rows(&[2, 0]).unwrap();
        let codes = rows.column("Plantation Code").unwrap().str().unwrap()
            .into_no_null_iter().collect::<Vec<_>>();
        assert_eq!(codes, vec!["C", "A"]);
    }
}
