use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiPolygon, Point, Polygon};
use serde_json::Value;
use tracing::debug;

use crate::{io::{records::{assemble_parcels, FeatureTable}, InputOptions}, ParcelError, ParcelSet};

/// Read parcels from a GeoJSON FeatureCollection.
///
/// Feature properties become attribute columns. If the properties carry the
/// WKT column its text is the geometry-duplicate key; otherwise the column is
/// synthesized from the feature geometry. A `crs` member, when present,
/// overrides the configured source EPSG.
pub fn read_geojson_parcels(path: &Path, options: &InputOptions) -> Result<ParcelSet> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes).context("[io::geojson] Failed to parse GeoJSON bytes")?;

    let source_epsg = declared_epsg(&value)?.unwrap_or(options.source_epsg);
    let features = read_features(&value)?;
    debug!(rows = features.len(), source_epsg, path = %path.display(), "read GeoJSON parcels");

    let (df, geoms) = features.into_parts()?;
    assemble_parcels(df, geoms, None, source_epsg, options)
}

/// EPSG code named by the legacy `crs` member, if any.
fn declared_epsg(value: &Value) -> Result<Option<u32>> {
    let Some(name) = value["crs"]["properties"]["name"].as_str() else { return Ok(None) };
    parse_crs_name(name)
        .map(Some)
        .ok_or_else(|| anyhow!("[io::geojson] Unrecognised CRS name: {name}"))
}

/// `EPSG:32631`, `urn:ogc:def:crs:EPSG::32631` and the CRS84 URN.
fn parse_crs_name(name: &str) -> Option<u32> {
    let upper = name.to_ascii_uppercase();
    if upper.ends_with("CRS84") { return Some(4326) }
    if !upper.contains("EPSG") { return None }
    upper.rsplit(':').next()?.parse().ok()
}

/// Collect features as text properties plus geometry.
fn read_features(value: &Value) -> Result<FeatureTable> {
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Expected a FeatureCollection with a 'features' array"))?;

    let mut table = FeatureTable::default();
    for (row, feature) in features.iter().enumerate() {
        if feature["geometry"].is_null() {
            return Err(ParcelError::NullValue { column: "geometry".into(), row }.into());
        }
        let geometry = parse_geometry(&feature["geometry"])
            .with_context(|| format!("[io::geojson] Invalid geometry in feature {row}"))?;

        let properties = feature["properties"].as_object()
            .map(|properties| properties.iter()
                .filter_map(|(name, value)| property_text(value).map(|text| (name.clone(), text)))
                .collect())
            .unwrap_or_default();
        table.push(properties, geometry);
    }
    Ok(table)
}

/// Property value as text; null or missing values stay null.
fn property_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse a GeoJSON geometry object. Polygonal types are parsed fully; points
/// and line strings are kept so they can be flagged as unsupported, and any
/// other type becomes an empty collection.
fn parse_geometry(geometry: &Value) -> Result<Geometry<f64>> {
    let coords = &geometry["coordinates"];
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(Geometry::Polygon(parse_polygon_coords(as_array(coords)?)?)),
        Some("MultiPolygon") => Ok(Geometry::MultiPolygon(MultiPolygon(
            as_array(coords)?.iter()
                .map(|polygon| parse_polygon_coords(as_array(polygon)?))
                .collect::<Result<_>>()?
        ))),
        Some("Point") => Ok(Geometry::Point(Point::from(parse_coord(coords)?))),
        Some("LineString") => Ok(Geometry::LineString(parse_line_coords(as_array(coords)?)?)),
        Some(_) => Ok(Geometry::GeometryCollection(GeometryCollection(vec![]))),
        None => bail!("Geometry is missing its 'type'"),
    }
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("Expected a coordinate array"))
}

/// Parse polygon rings: the first is the exterior, the rest are holes.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| parse_line_coords(as_array(ring)?));
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    // Polygon::new closes any open ring.
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a list of positions: [[x, y], [x, y], ...]
fn parse_line_coords(coords: &[Value]) -> Result<LineString<f64>> {
    Ok(LineString(coords.iter().map(parse_coord).collect::<Result<_>>()?))
}

fn parse_coord(position: &Value) -> Result<Coord<f64>> {
    let x = position[0].as_f64()
        .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
    let y = position[1].as_f64()
        .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
    Ok(Coord { x, y })
}
