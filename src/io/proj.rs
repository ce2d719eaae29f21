use anyhow::{anyhow, bail, Context, Result};
use geo::{BoundingRect, Coord, Geometry, MapCoords, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};
use serde::{Deserialize, Serialize};

/// Metric CRS used for area and intersection measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricProjection {
    /// Spherical Web Mercator (EPSG:3857).
    #[default]
    WebMercator,
    /// UTM zone chosen from the centre of the data.
    Utm,
}

impl std::str::FromStr for MetricProjection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webmercator" | "web-mercator" | "web_mercator" | "3857" => Ok(Self::WebMercator),
            "utm" => Ok(Self::Utm),
            other => Err(format!("unknown projection: {other}")),
        }
    }
}

/// EPSG code of WGS 84 longitude/latitude.
pub const WGS84_EPSG: u32 = 4326;

const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";
const WEB_MERCATOR_PROJ4: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs";

/// PROJ.4 string for a geographic source CRS (degrees → radians handled in code).
fn source_geog_proj4(epsg: u32) -> Result<&'static str> {
    match epsg {
        4326 => Ok(WGS84_PROJ4),
        4269 | 4937 => Ok("+proj=longlat +datum=NAD83 +no_defs +type=crs"),
        other => bail!("[io::proj] Unsupported source EPSG:{other}; expected a geographic CRS (4326, 4269)"),
    }
}

/// PROJ.4 string for a projected source CRS that can be brought back to lon/lat.
fn source_projected_proj4(epsg: u32) -> Result<String> {
    match epsg {
        3857 | 900913 => Ok(WEB_MERCATOR_PROJ4.into()),
        32601..=32660 => Ok(format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs +type=crs", epsg - 32600)),
        32701..=32760 => Ok(format!("+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs +type=crs", epsg - 32700)),
        other => bail!("[io::proj] Unsupported source EPSG:{other}; expected 4326, 4269, 3857 or a WGS 84 UTM zone"),
    }
}

/// Bring geometries into geographic coordinates.
///
/// Geographic inputs pass through unchanged; Web Mercator and WGS 84 UTM
/// inputs are unprojected to WGS 84 degrees. Returns the geometries and the
/// EPSG code of their geographic CRS.
pub fn to_geographic(geoms: Vec<Geometry<f64>>, source_epsg: u32) -> Result<(Vec<Geometry<f64>>, u32)> {
    if source_geog_proj4(source_epsg).is_ok() {
        return Ok((geoms, source_epsg));
    }

    let from = {
        let proj_string = source_projected_proj4(source_epsg)?;
        Proj4::from_proj_string(&proj_string)
            .with_context(|| anyhow!("[io::proj] failed to build source PROJ.4: {proj_string}"))?
    };
    let to = Proj4::from_proj_string(WGS84_PROJ4)
        .with_context(|| anyhow!("[io::proj] failed to build target PROJ.4: {WGS84_PROJ4}"))?;

    // Meters in, radians out.
    let geoms = geoms.iter().enumerate()
        .map(|(row, geom)| {
            geom.try_map_coords(|coord: Coord<f64>| -> Result<Coord<f64>, proj4rs::errors::Error> {
                let mut point = (coord.x, coord.y, 0.0);
                transform(&from, &to, &mut point)?;
                Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
            })
            .with_context(|| format!("[io::proj] CRS transform from EPSG:{source_epsg} failed for row {row}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((geoms, WGS84_EPSG))
}

/// UTM zone number (1–60) and hemisphere for a lon/lat centre.
pub fn utm_zone(center: Coord<f64>) -> (u32, bool) {
    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    (zone, center.y >= 0.0)
}

/// PROJ.4 string for the metric target CRS.
fn target_proj4(projection: MetricProjection, center: Coord<f64>) -> String {
    match projection {
        MetricProjection::WebMercator => WEB_MERCATOR_PROJ4.into(),
        MetricProjection::Utm => {
            let (zone, north) = utm_zone(center);
            let south = if north { "" } else { " +south" };
            format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
        }
    }
}

/// Bounding rectangle of all geometries.
fn bounds(geoms: &[Geometry<f64>]) -> Option<Rect<f64>> {
    geoms.iter()
        .filter_map(|geom| geom.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}

/// Reproject lon/lat geometries into a metric CRS for area measurement.
pub fn project_to_metric(
    geoms: &[Geometry<f64>],
    source_epsg: u32,
    projection: MetricProjection,
) -> Result<Vec<Geometry<f64>>> {
    let from = {
        let proj_string = source_geog_proj4(source_epsg)?;
        Proj4::from_proj_string(proj_string)
            .with_context(|| anyhow!("[io::proj] failed to build source PROJ.4: {proj_string}"))?
    };

    let to = {
        let center = bounds(geoms).map(|rect| rect.center()).unwrap_or(Coord { x: 0.0, y: 0.0 });
        let proj_string = target_proj4(projection, center);
        Proj4::from_proj_string(&proj_string)
            .with_context(|| anyhow!("[io::proj] failed to build target PROJ.4: {proj_string}"))?
    };

    // Map coords → radians in, meters out.
    geoms.iter().enumerate()
        .map(|(row, geom)| {
            geom.try_map_coords(|coord: Coord<f64>| -> Result<Coord<f64>, proj4rs::errors::Error> {
                let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
                transform(&from, &to, &mut point)?;
                Ok(Coord { x: point.0, y: point.1 })
            })
            .with_context(|| format!("[io::proj] CRS transform failed for row {row}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, Area};

    #[test]
    fn web_mercator_at_equator() {
        let geoms = vec![Geometry::Point(point!(x: 1.0, y: 0.0))];
        let projected = project_to_metric(&geoms, 4326, MetricProjection::WebMercator).unwrap();
        let Geometry::Point(p) = projected[0] else { panic!("expected a point") };
        assert!((p.x() - 111_319.490_793).abs() < 0.01, "x = {}", p.x());
        assert!(p.y().abs() < 1e-6);
    }

    #[test]
    fn projected_area_is_in_square_metres() {
        // ~0.001° square at the equator is roughly 111 m × 111 m.
        let geoms = vec![Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0), (x: 0.001, y: 0.0), (x: 0.001, y: 0.001), (x: 0.0, y: 0.001),
        ])];
        let projected = project_to_metric(&geoms, 4326, MetricProjection::WebMercator).unwrap();
        let area = projected[0].unsigned_area();
        assert!((area - 12_392.0).abs() < 10.0, "area = {area}");
    }

    #[test]
    fn utm_zone_from_center() {
        assert_eq!(utm_zone(Coord { x: -104.0, y: 45.0 }), (13, true));
        assert_eq!(utm_zone(Coord { x: 3.5, y: 6.2 }), (31, true));
        assert_eq!(utm_zone(Coord { x: -5.0, y: -2.0 }), (30, false));
        assert_eq!(utm_zone(Coord { x: 180.0, y: 0.0 }), (60, true));
    }

    #[test]
    fn unsupported_source_crs_is_rejected() {
        let geoms = vec![Geometry::Point(point!(x: 0.0, y: 0.0))];
        assert!(project_to_metric(&geoms, 3857, MetricProjection::WebMercator).is_err());
    }

    #[test]
    fn web_mercator_source_is_unprojected() {
        let geoms = vec![Geometry::Point(point!(x: 111_319.490_793, y: 0.0))];
        let (geographic, epsg) = to_geographic(geoms, 3857).unwrap();
        assert_eq!(epsg, WGS84_EPSG);
        let Geometry::Point(p) = geographic[0] else { panic!("expected a point") };
        assert!((p.x() - 1.0).abs() < 1e-6, "lon = {}", p.x());
        assert!(p.y().abs() < 1e-9);
    }

    #[test]
    fn geographic_source_passes_through() {
        let geoms = vec![Geometry::Point(point!(x: 3.5, y: 6.25))];
        let (geographic, epsg) = to_geographic(geoms.clone(), 4269).unwrap();
        assert_eq!(epsg, 4269);
        assert_eq!(geographic, geoms);
    }

    #[test]
    fn unknown_projected_source_is_rejected() {
        let geoms = vec![Geometry::Point(point!(x: 0.0, y: 0.0))];
        let err = to_geographic(geoms, 27700).unwrap_err();
        assert!(err.to_string().contains("EPSG:27700"), "{err}");
    }

    #[test]
    fn projection_parses_cli_spelling() {
        assert_eq!("utm".parse::<MetricProjection>(), Ok(MetricProjection::Utm));
        assert_eq!("WebMercator".parse::<MetricProjection>(), Ok(MetricProjection::WebMercator));
    }
}
