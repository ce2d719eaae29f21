use std::path::Path;

use anyhow::{anyhow, Context, Result};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiPolygon, Point, Polygon};
use roxmltree::{Document, Node};
use tracing::debug;

use crate::{io::{records::{assemble_parcels, FeatureTable}, proj::WGS84_EPSG, InputOptions}, ParcelError, ParcelSet};

/// Read parcels from a KML document.
///
/// Every `Placemark` is one record. Its `name` and `description` become the
/// `Name` and `Description` columns, and `ExtendedData` fields (`Data` or
/// `SimpleData`) become columns of their own. KML coordinates are always
/// WGS 84 longitude/latitude, whatever source EPSG is configured.
pub fn read_kml_parcels(path: &Path, options: &InputOptions) -> Result<ParcelSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("[io::kml] Failed to read {}", path.display()))?;
    let features = read_placemarks(&text)?;
    debug!(rows = features.len(), path = %path.display(), "read KML parcels");

    let (df, geoms) = features.into_parts()?;
    assemble_parcels(df, geoms, None, WGS84_EPSG, options)
}

fn read_placemarks(text: &str) -> Result<FeatureTable> {
    let doc = Document::parse(text).context("[io::kml] Failed to parse KML document")?;

    let mut table = FeatureTable::default();
    let placemarks = doc.descendants().filter(|node| node.has_tag_name("Placemark"));
    for (row, placemark) in placemarks.enumerate() {
        let geometry = placemark.children()
            .find(|node| is_geometry(node))
            .ok_or(ParcelError::NullValue { column: "geometry".into(), row })?;
        let geometry = parse_geometry(geometry)
            .with_context(|| format!("[io::kml] Invalid geometry in placemark {row}"))?;

        table.push(placemark_properties(placemark), geometry);
    }
    Ok(table)
}

fn placemark_properties(placemark: Node) -> Vec<(String, String)> {
    let mut properties = Vec::new();
    for (tag, column) in [("name", "Name"), ("description", "Description")] {
        if let Some(text) = child(placemark, tag).and_then(|node| node.text()) {
            properties.push((column.to_string(), text.trim().to_string()));
        }
    }

    let Some(extended) = child(placemark, "ExtendedData") else { return properties };
    for field in extended.descendants() {
        let Some(name) = field.attribute("name") else { continue };
        let value = if field.has_tag_name("Data") {
            child(field, "value").and_then(|node| node.text())
        } else if field.has_tag_name("SimpleData") {
            field.text()
        } else {
            continue;
        };
        if let Some(value) = value {
            properties.push((name.to_string(), value.trim().to_string()));
        }
    }
    properties
}

fn is_geometry(node: &Node) -> bool {
    ["Polygon", "MultiGeometry", "Point", "LineString"].iter().any(|tag| node.has_tag_name(*tag))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

/// Polygons and multi-geometries of polygons are parsed fully. Points and
/// line strings are kept so they can be flagged as unsupported; a
/// multi-geometry without polygons becomes an empty collection.
fn parse_geometry(node: Node) -> Result<Geometry<f64>> {
    if node.has_tag_name("Polygon") {
        return Ok(Geometry::Polygon(parse_polygon(node)?));
    }
    if node.has_tag_name("MultiGeometry") {
        let polygons = node.children()
            .filter(|child| child.has_tag_name("Polygon"))
            .map(parse_polygon)
            .collect::<Result<Vec<_>>>()?;
        return Ok(match polygons.len() {
            0 => Geometry::GeometryCollection(GeometryCollection(vec![])),
            _ => Geometry::MultiPolygon(MultiPolygon(polygons)),
        });
    }

    let coords = parse_coordinates(node)?;
    if node.has_tag_name("Point") {
        let coord = coords.first().copied().ok_or_else(|| anyhow!("Point has no coordinates"))?;
        return Ok(Geometry::Point(Point::from(coord)));
    }
    Ok(Geometry::LineString(LineString(coords)))
}

fn parse_polygon(node: Node) -> Result<Polygon<f64>> {
    let ring = |boundary: Node| -> Result<LineString<f64>> {
        let ring = child(boundary, "LinearRing").ok_or_else(|| anyhow!("Boundary has no LinearRing"))?;
        Ok(LineString(parse_coordinates(ring)?))
    };

    let exterior = child(node, "outerBoundaryIs")
        .ok_or_else(|| anyhow!("Invalid Polygon: missing outerBoundaryIs"))?;
    let interiors = node.children()
        .filter(|child| child.has_tag_name("innerBoundaryIs"))
        .map(ring)
        .collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(ring(exterior)?, interiors))
}

/// Parse a `<coordinates>` child: whitespace-separated `lon,lat[,alt]` tuples.
fn parse_coordinates(node: Node) -> Result<Vec<Coord<f64>>> {
    let text = child(node, "coordinates")
        .and_then(|coordinates| coordinates.text())
        .unwrap_or_default();

    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',').map(str::parse::<f64>);
            match (parts.next(), parts.next()) {
                (Some(Ok(x)), Some(Ok(y))) => Ok(Coord { x, y }),
                _ => Err(anyhow!("Invalid coordinate tuple: {tuple}")),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Folder>
      <Placemark>
        <name>Block A</name>
        <ExtendedData>
          <Data name="Plantation Code"><value>P001</value></Data>
          <Data name="Farmer"><value>Ama</value></Data>
        </ExtendedData>
        <Polygon>
          <outerBoundaryIs><LinearRing><coordinates>
            0,0,0 0.001,0,0 0.001,0.001,0 0,0.001,0 0,0,0
          </coordinates></LinearRing></outerBoundaryIs>
          <innerBoundaryIs><LinearRing><coordinates>
            0.0002,0.0002 0.0004,0.0002 0.0004,0.0004 0.0002,0.0002
          </coordinates></LinearRing></innerBoundaryIs>
        </Polygon>
      </Placemark>
      <Placemark>
        <ExtendedData>
          <SchemaData schemaUrl="#parcels">
            <SimpleData name="Plantation Code">P002</SimpleData>
          </SchemaData>
        </ExtendedData>
        <MultiGeometry>
          <Polygon><outerBoundaryIs><LinearRing><coordinates>
            1,1 1.001,1 1.001,1.001 1,1
          </coordinates></LinearRing></outerBoundaryIs></Polygon>
          <Polygon><outerBoundaryIs><LinearRing><coordinates>
            2,2 2.001,2 2.001,2.001 2,2
          </coordinates></LinearRing></outerBoundaryIs></Polygon>
        </MultiGeometry>
      </Placemark>
      <Placemark>
        <ExtendedData><Data name="Plantation Code"><value>P003</value></Data></ExtendedData>
        <Point><coordinates>5,5</coordinates></Point>
      </Placemark>
    </Folder>
  </Document>
</kml>"##;

    #[test]
    fn placemarks_become_records() {
        let (df, geoms) = read_placemarks(DOCUMENT).unwrap().into_parts().unwrap();

        let names = df.get_column_names().into_iter().map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(names, ["Name", "Plantation Code", "Farmer"]);
        let codes = df.column("Plantation Code").unwrap().str().unwrap()
            .into_iter().collect::<Vec<_>>();
        assert_eq!(codes, [Some("P001"), Some("P002"), Some("P003")]);
        assert_eq!(df.column("Name").unwrap().str().unwrap().get(1), None);

        let Geometry::Polygon(polygon) = &geoms[0] else { panic!("expected a polygon") };
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.interiors().len(), 1);
        let Geometry::MultiPolygon(multi) = &geoms[1] else { panic!("expected a multi-polygon") };
        assert_eq!(multi.0.len(), 2);
        assert!(matches!(geoms[2], Geometry::Point(_)));
    }

    #[test]
    fn placemark_without_geometry_is_rejected() {
        let text = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Placemark><name>x</name></Placemark></kml>"#;
        let err = read_placemarks(text).unwrap_err();
        assert!(matches!(err.downcast_ref::<ParcelError>(), Some(ParcelError::NullValue { row: 0, .. })));
    }

    #[test]
    fn bad_coordinates_are_reported() {
        let text = r#"<kml><Placemark><Point><coordinates>east,north</coordinates></Point></Placemark></kml>"#;
        let err = read_placemarks(text).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid coordinate tuple"), "{err:#}");
    }

    #[test]
    fn reads_file_into_parcels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcels.kml");
        std::fs::write(&path, DOCUMENT).unwrap();

        let parcels = read_kml_parcels(&path, &InputOptions::default()).unwrap();
        assert_eq!(parcels.codes(), ["P001", "P002", "P003"]);
        assert_eq!(parcels.shape(1).vertex_count(), 6);
        assert!(parcels.keys()[0].starts_with("POLYGON"));
        assert!(!parcels.shape(2).is_supported());
    }
}
