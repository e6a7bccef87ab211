//! GeoJSON parcel reader.
//!
//! Accepts a `FeatureCollection` document, a single `Feature`, or a stream of
//! newline-delimited features (the layout produced by `ogr2ogr -f GeoJSONSeq`),
//! all through one streaming [`serde_json::Deserializer`]. `Polygon` and
//! `MultiPolygon` features become parcels; everything else is skipped with a
//! warning. Parcel ids are assigned densely in feature order over the usable
//! features.

use std::path::Path;

use enclave_types::{Parcel, ParcelId, Point, Polygon};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::GeometryLoadError;

/// Options controlling how features become parcels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Feature property used as the parcel label. When unset, the feature's
    /// top-level `id` is used instead.
    pub id_property: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Raw coordinate position: `[x, y]` or `[x, y, z, ...]`.
type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJsonObject {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read parcels from a GeoJSON file.
///
/// # Errors
///
/// Returns [`GeometryLoadError::Io`] if the file cannot be read, and any error
/// documented on [`parse_parcels`].
pub fn load_parcels(path: &Path, options: &LoadOptions) -> Result<Vec<Parcel>, GeometryLoadError> {
    let contents = std::fs::read_to_string(path)?;
    let parcels = parse_parcels(&contents, options)?;
    info!(
        path = %path.display(),
        parcel_count = parcels.len(),
        "Parcels loaded"
    );
    Ok(parcels)
}

/// Parse parcels from GeoJSON text.
///
/// # Errors
///
/// Returns [`GeometryLoadError::Json`] for malformed JSON or unknown
/// top-level objects, [`GeometryLoadError::InvalidPosition`] for short or
/// non-finite positions, and [`GeometryLoadError::NoUsableParcels`] when no
/// polygon feature survives.
pub fn parse_parcels(text: &str, options: &LoadOptions) -> Result<Vec<Parcel>, GeometryLoadError> {
    let mut features = Vec::new();
    for object in serde_json::Deserializer::from_str(text).into_iter::<GeoJsonObject>() {
        match object? {
            GeoJsonObject::FeatureCollection { features: batch } => features.extend(batch),
            GeoJsonObject::Feature(feature) => features.push(feature),
        }
    }

    let mut parcels = Vec::with_capacity(features.len());
    for (index, feature) in features.into_iter().enumerate() {
        let label = feature_label(&feature, options);
        let Some(polygons) = feature_polygons(index, feature.geometry)? else {
            warn!(feature = index, "Skipping feature without polygon geometry");
            continue;
        };
        let raw = u32::try_from(parcels.len()).map_err(|_err| {
            GeometryLoadError::TooManyParcels {
                count: parcels.len(),
            }
        })?;
        parcels.push(Parcel {
            id: ParcelId::new(raw),
            label,
            polygons,
        });
    }

    if parcels.is_empty() {
        return Err(GeometryLoadError::NoUsableParcels);
    }
    Ok(parcels)
}

/// Pick the parcel label from the configured property or the feature id.
fn feature_label(feature: &Feature, options: &LoadOptions) -> Option<String> {
    let value = match &options.id_property {
        Some(key) => feature.properties.as_ref().and_then(|props| props.get(key)),
        None => feature.id.as_ref(),
    }?;
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Convert a feature geometry into polygons, or `None` if it has no usable
/// polygon part.
fn feature_polygons(
    feature: usize,
    geometry: Option<Geometry>,
) -> Result<Option<Vec<Polygon>>, GeometryLoadError> {
    let parts = match geometry {
        Some(Geometry::Polygon { coordinates }) => vec![coordinates],
        Some(Geometry::MultiPolygon { coordinates }) => coordinates,
        Some(Geometry::Unsupported) | None => return Ok(None),
    };

    let mut polygons = Vec::with_capacity(parts.len());
    for rings in parts {
        if let Some(polygon) = build_polygon(feature, rings)? {
            polygons.push(polygon);
        }
    }
    Ok((!polygons.is_empty()).then_some(polygons))
}

/// Build one polygon; a polygon whose exterior is degenerate is dropped.
fn build_polygon(
    feature: usize,
    rings: Vec<Vec<Position>>,
) -> Result<Option<Polygon>, GeometryLoadError> {
    let mut rings = rings.into_iter();
    let Some(exterior) = rings.next() else {
        return Ok(None);
    };
    let Some(exterior) = build_ring(feature, exterior)? else {
        return Ok(None);
    };
    let mut holes = Vec::new();
    for ring in rings {
        if let Some(hole) = build_ring(feature, ring)? {
            holes.push(hole);
        }
    }
    Ok(Some(Polygon { exterior, holes }))
}

/// Convert positions into an open ring with at least three distinct vertices.
fn build_ring(
    feature: usize,
    positions: Vec<Position>,
) -> Result<Option<Vec<Point>>, GeometryLoadError> {
    let mut ring: Vec<Point> = Vec::with_capacity(positions.len());
    for position in positions {
        let point = match position.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Point::new(*x, *y),
            _ => return Err(GeometryLoadError::InvalidPosition { feature }),
        };
        // Consecutive duplicates add nothing to the boundary.
        if ring.last().is_some_and(|last| *last == point) {
            continue;
        }
        ring.push(point);
    }
    // Drop the closing vertex that repeats the first.
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    Ok((ring.len() >= 3).then_some(ring))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "B-1",
                "properties": {"BLOCK": 101},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "id": 7,
                "properties": {"BLOCK": 102},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[1,0],[2,0],[2,1],[1,1],[1,0]]],
                        [[[5,5],[6,5],[6,6],[5,5]]]
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn feature_collection_yields_parcels_in_order() {
        let parcels = parse_parcels(COLLECTION, &LoadOptions::default()).unwrap();
        assert_eq!(parcels.len(), 2);
        assert_eq!(parcels.first().map(|p| p.id), Some(ParcelId::new(0)));
        assert_eq!(parcels.get(1).map(|p| p.id), Some(ParcelId::new(1)));
        assert_eq!(
            parcels.first().and_then(|p| p.label.clone()),
            Some("B-1".to_owned())
        );
        assert_eq!(
            parcels.get(1).and_then(|p| p.label.clone()),
            Some("7".to_owned())
        );
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let parcels = parse_parcels(COLLECTION, &LoadOptions::default()).unwrap();
        let exterior_len = parcels
            .first()
            .and_then(|p| p.polygons.first())
            .map(|poly| poly.exterior.len());
        assert_eq!(exterior_len, Some(4));
    }

    #[test]
    fn multipolygon_keeps_all_parts() {
        let parcels = parse_parcels(COLLECTION, &LoadOptions::default()).unwrap();
        assert_eq!(parcels.get(1).map(|p| p.polygons.len()), Some(2));
    }

    #[test]
    fn id_property_overrides_feature_id() {
        let options = LoadOptions {
            id_property: Some("BLOCK".to_owned()),
        };
        let parcels = parse_parcels(COLLECTION, &options).unwrap();
        let labels: Vec<Option<String>> = parcels.iter().map(|p| p.label.clone()).collect();
        assert_eq!(labels, vec![Some("101".to_owned()), Some("102".to_owned())]);
    }

    #[test]
    fn line_delimited_features_are_accepted() {
        let text = concat!(
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}"#,
            "\n",
            r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[1,0],[2,0],[2,1],[1,0]]]}}"#,
            "\n",
        );
        let parcels = parse_parcels(text, &LoadOptions::default()).unwrap();
        assert_eq!(parcels.len(), 2);
    }

    #[test]
    fn non_polygon_features_are_skipped() {
        let text = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0,0]}},
            {"type":"Feature","properties":{},"geometry":null},
            {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}
        ]}"#;
        let parcels = parse_parcels(text, &LoadOptions::default()).unwrap();
        assert_eq!(parcels.len(), 1);
        assert_eq!(parcels.first().map(|p| p.id), Some(ParcelId::new(0)));
    }

    #[test]
    fn degenerate_ring_is_dropped() {
        let text = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[0,0]]]}}"#;
        let result = parse_parcels(text, &LoadOptions::default());
        assert!(matches!(result, Err(GeometryLoadError::NoUsableParcels)));
    }

    #[test]
    fn empty_collection_is_an_error() {
        let text = r#"{"type":"FeatureCollection","features":[]}"#;
        let result = parse_parcels(text, &LoadOptions::default());
        assert!(matches!(result, Err(GeometryLoadError::NoUsableParcels)));
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = parse_parcels("   \n", &LoadOptions::default());
        assert!(matches!(result, Err(GeometryLoadError::NoUsableParcels)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result = parse_parcels(r#"{"type":"FeatureCollection","features":["#, &LoadOptions::default());
        assert!(matches!(result, Err(GeometryLoadError::Json { .. })));
    }

    #[test]
    fn short_position_is_an_error() {
        let text = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0],[1,0],[1,1],[0,0]]]}}"#;
        let result = parse_parcels(text, &LoadOptions::default());
        assert!(matches!(
            result,
            Err(GeometryLoadError::InvalidPosition { feature: 0 })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_parcels(
            Path::new("/nonexistent/enclave/blocks.geojson"),
            &LoadOptions::default(),
        );
        assert!(matches!(result, Err(GeometryLoadError::Io { .. })));
    }
}
