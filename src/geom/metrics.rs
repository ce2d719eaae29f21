use geo::Point;

use super::Shape;

/// Per-shape diagnostics, derived once and never written back onto the records.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMetrics {
    pub num_points: usize,
    pub centroid: Option<Point<f64>>,
    /// The outline does not contain its own centroid (non-convex or
    /// self-intersecting). Only polygonal shapes are checked; an empty polygon
    /// has no centroid and counts as outside.
    pub centroid_outside: bool,
}

impl ShapeMetrics {
    pub fn of(shape: &Shape) -> Self {
        let centroid = shape.centroid();
        let centroid_outside = shape.is_supported()
            && centroid.is_none_or(|c| !shape.contains(&c));

        Self { num_points: shape.vertex_count(), centroid, centroid_outside }
    }
}

/// Round half away from zero to `decimals` places.
///
/// Ties go away from zero (`0.125 -> 0.13`), unlike the half-to-even rule of
/// numpy's `round`; the two only differ on exact binary ties.
#[inline]
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon, Geometry, MultiPolygon};

    #[test]
    fn metrics_for_triangle() {
        let triangle = Shape::from(polygon![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 0.0, y: 3.0)]);
        let metrics = ShapeMetrics::of(&triangle);
        assert_eq!(metrics.num_points, 3);
        assert!(!metrics.centroid_outside);
        let centroid = metrics.centroid.unwrap();
        assert!((centroid.x() - 1.0).abs() < 1e-12);
        assert!((centroid.y() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn u_shape_centroid_falls_in_notch() {
        let u = Shape::from(polygon![
            (x: 0.0, y: 0.0), (x: 0.0, y: 10.0), (x: 10.0, y: 10.0), (x: 10.0, y: 0.0),
            (x: 8.0, y: 0.0), (x: 8.0, y: 8.0), (x: 2.0, y: 8.0), (x: 2.0, y: 0.0),
        ]);
        assert!(ShapeMetrics::of(&u).centroid_outside);
    }

    #[test]
    fn bowtie_centroid_is_outside() {
        let bowtie = Shape::from(polygon![
            (x: 0.0, y: 0.0), (x: 10.0, y: 10.0), (x: 10.0, y: 0.0), (x: 0.0, y: 9.0),
        ]);
        let metrics = ShapeMetrics::of(&bowtie);
        assert_eq!(metrics.num_points, 4);
        assert!(metrics.centroid_outside);
    }

    #[test]
    fn unsupported_geometry_is_never_outside() {
        let point = ShapeMetrics::of(&Shape::from(Geometry::Point(point!(x: 1.0, y: 1.0))));
        assert_eq!(point.num_points, 0);
        assert_eq!(point.centroid, Some(point!(x: 1.0, y: 1.0)));
        assert!(!point.centroid_outside);

        let line = ShapeMetrics::of(&Shape::from(Geometry::LineString(
            line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0)],
        )));
        assert_eq!(line.num_points, 0);
        assert!(!line.centroid_outside);
    }

    #[test]
    fn empty_polygon_counts_as_outside() {
        let empty = ShapeMetrics::of(&Shape::from(MultiPolygon::<f64>(vec![])));
        assert_eq!(empty.centroid, None);
        assert!(empty.centroid_outside);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(20.0, 2), 20.0);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_eq!(round_to(12.345678912, 8), 12.34567891);
    }
}
