//! Shared assembly of parsed files into a [`ParcelSet`].

use anyhow::{anyhow, Result};
use geo::Geometry;
use polars::{frame::DataFrame, prelude::{DataType, NamedFrom, Series}};
use wkt::{ToWkt, TryFromWkt};

use crate::{io::{project_to_metric, to_geographic, InputOptions}, ParcelError, ParcelSet};

/// Parse the WKT column, returning the geometries and the raw text of each row.
pub(super) fn parse_wkt_column(df: &DataFrame, column: &str) -> Result<(Vec<Geometry<f64>>, Vec<String>)> {
    let texts = df.column(column)
        .map_err(|_| ParcelError::MissingColumn { column: column.to_string() })?
        .cast(&DataType::String)?;

    texts.str()?.into_iter().enumerate()
        .map(|(row, text)| {
            let text = text.ok_or_else(|| ParcelError::NullValue { column: column.to_string(), row })?;
            let geometry = Geometry::<f64>::try_from_wkt_str(text)
                .map_err(|e| anyhow!("[io] Invalid WKT in '{column}' at row {row}: {e}"))?;
            Ok((geometry, text.to_string()))
        })
        .collect::<Result<Vec<_>>>()
        .map(|rows| rows.into_iter().unzip())
}

/// Features collected from a GeoJSON or KML file: named text properties and
/// one geometry each. Columns appear in first-seen order; a property a
/// feature lacks is null.
#[derive(Debug, Default)]
pub(super) struct FeatureTable {
    names: Vec<String>,
    rows: Vec<Vec<(String, String)>>,
    geoms: Vec<Geometry<f64>>,
}

impl FeatureTable {
    pub(super) fn push(&mut self, properties: Vec<(String, String)>, geometry: Geometry<f64>) {
        for (name, _) in &properties {
            if !self.names.contains(name) { self.names.push(name.clone()) }
        }
        self.rows.push(properties);
        self.geoms.push(geometry);
    }

    #[inline] pub(super) fn len(&self) -> usize { self.geoms.len() }

    /// Split into the attribute table and the geometries.
    pub(super) fn into_parts(self) -> Result<(DataFrame, Vec<Geometry<f64>>)> {
        let columns = self.names.iter()
            .map(|name| {
                let values = self.rows.iter()
                    .map(|properties| properties.iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| value.clone()))
                    .collect::<Vec<_>>();
                Series::new(name.as_str().into(), values).into()
            })
            .collect::<Vec<_>>();

        Ok((DataFrame::new(columns)?, self.geoms))
    }
}

/// Bring geometries to geographic coordinates, measure them in the metric
/// projection and build the parcel set.
///
/// `wkt_keys` is the raw WKT text when the file carried it (CSV, xlsx). For
/// feature files the WKT column is taken from the properties if present, or
/// synthesized from the geographic geometry.
pub(super) fn assemble_parcels(
    mut df: DataFrame,
    geoms: Vec<Geometry<f64>>,
    wkt_keys: Option<Vec<String>>,
    source_epsg: u32,
    options: &InputOptions,
) -> Result<ParcelSet> {
    let (geoms, geographic_epsg) = to_geographic(geoms, source_epsg)?;
    let keys = match wkt_keys {
        Some(keys) => keys,
        None => feature_keys(&mut df, &geoms, &options.wkt_column)?,
    };

    let projected = project_to_metric(&geoms, geographic_epsg, options.projection)?;
    let parcels = ParcelSet::new(df, &options.code_column, geoms, projected)?
        .with_geometry_keys(keys)?;
    Ok(parcels)
}

fn feature_keys(df: &mut DataFrame, geoms: &[Geometry<f64>], wkt_column: &str) -> Result<Vec<String>> {
    if df.get_column_index(wkt_column).is_some() {
        return Ok(df.column(wkt_column)?.str()?.into_iter().zip(geoms)
            .map(|(text, geom)| text.map(str::to_string).unwrap_or_else(|| geom.wkt_string()))
            .collect());
    }

    let keys = geoms.iter().map(|geom| geom.wkt_string()).collect::<Vec<_>>();
    df.with_column(Series::new(wkt_column.into(), keys.clone()))?;
    Ok(keys)
}
