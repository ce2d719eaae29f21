use geo::{Area, BoundingRect, Centroid, Contains, Geometry, MultiPolygon, Point, Polygon, Rect};
use wkt::ToWkt;

/// A parcel outline: a simple polygon or a multi-polygon.
///
/// Any other geometry kind is kept as `Unsupported` so the record still
/// shows up in the diagnostic tables; it counts zero vertices and zero area.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Unsupported(Geometry<f64>),
}

impl From<Geometry<f64>> for Shape {
    fn from(geometry: Geometry<f64>) -> Self {
        match geometry {
            Geometry::Polygon(polygon) => Shape::Polygon(polygon),
            Geometry::MultiPolygon(multi) => Shape::MultiPolygon(multi),
            other => Shape::Unsupported(other),
        }
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(polygon: Polygon<f64>) -> Self { Shape::Polygon(polygon) }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(multi: MultiPolygon<f64>) -> Self { Shape::MultiPolygon(multi) }
}

impl Shape {
    /// Short name of the geometry kind, for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Polygon(_) => "Polygon",
            Shape::MultiPolygon(_) => "MultiPolygon",
            Shape::Unsupported(geometry) => match geometry {
                Geometry::Point(_) => "Point",
                Geometry::Line(_) => "Line",
                Geometry::LineString(_) => "LineString",
                Geometry::MultiPoint(_) => "MultiPoint",
                Geometry::MultiLineString(_) => "MultiLineString",
                Geometry::GeometryCollection(_) => "GeometryCollection",
                Geometry::Rect(_) => "Rect",
                Geometry::Triangle(_) => "Triangle",
                Geometry::Polygon(_) | Geometry::MultiPolygon(_) => "Polygon",
            },
        }
    }

    #[inline]
    pub fn is_supported(&self) -> bool { !matches!(self, Shape::Unsupported(_)) }

    /// Number of distinct exterior-ring vertices (the closing vertex is not
    /// counted). Multi-polygons sum over their members; unsupported kinds count 0.
    pub fn vertex_count(&self) -> usize {
        fn ring_vertices(polygon: &Polygon<f64>) -> usize {
            polygon.exterior().0.len().saturating_sub(1)
        }

        match self {
            Shape::Polygon(polygon) => ring_vertices(polygon),
            Shape::MultiPolygon(multi) => multi.0.iter().map(ring_vertices).sum(),
            Shape::Unsupported(_) => 0,
        }
    }

    /// Area-weighted centroid, or `None` for empty geometry.
    pub fn centroid(&self) -> Option<Point<f64>> {
        match self {
            Shape::Polygon(polygon) => polygon.centroid(),
            Shape::MultiPolygon(multi) => multi.centroid(),
            Shape::Unsupported(geometry) => geometry.centroid(),
        }
    }

    /// Whether the point lies in the interior of the shape (boundary excluded).
    /// Unsupported kinds have no areal interior and contain nothing.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        match self {
            Shape::Polygon(polygon) => polygon.contains(point),
            Shape::MultiPolygon(multi) => multi.contains(point),
            Shape::Unsupported(_) => false,
        }
    }

    /// Bounding rectangle, or `None` for empty geometry.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Shape::Polygon(polygon) => polygon.bounding_rect(),
            Shape::MultiPolygon(multi) => multi.bounding_rect(),
            Shape::Unsupported(geometry) => geometry.bounding_rect(),
        }
    }

    /// Areal view of the shape; unsupported kinds become an empty multi-polygon.
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            Shape::Polygon(polygon) => MultiPolygon(vec![polygon.clone()]),
            Shape::MultiPolygon(multi) => multi.clone(),
            Shape::Unsupported(_) => MultiPolygon(vec![]),
        }
    }

    /// Canonical WKT text, used as the geometry-duplicate key when the input
    /// did not carry its own WKT string.
    pub fn wkt_key(&self) -> String {
        match self {
            Shape::Polygon(polygon) => polygon.wkt_string(),
            Shape::MultiPolygon(multi) => multi.wkt_string(),
            Shape::Unsupported(geometry) => geometry.wkt_string(),
        }
    }
}

/// Planar area in square metres of an already-projected shape.
///
/// The caller is responsible for passing a metric (projected) geometry; areas
/// measured in geographic degrees are meaningless and are never computed here.
#[inline]
pub fn area_m2(projected: &MultiPolygon<f64>) -> f64 {
    projected.unsigned_area()
}

/// Convert square metres to hectares.
#[inline]
pub fn m2_to_ha(area_m2: f64) -> f64 { area_m2 / 10_000.0 }
