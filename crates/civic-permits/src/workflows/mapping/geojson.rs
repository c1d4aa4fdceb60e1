//! GeoJSON export of persisted zones and import of polygons for offline measuring.

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::domain::{Zone, ZoneType};
use super::geometry::{geodesic_area, normalize_ring, GeometryError, LatLng};
use crate::records::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum GeoJsonError {
    #[error("failed to read GeoJSON: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid GeoJSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feature {feature} has an invalid ring: {source}")]
    Geometry {
        feature: usize,
        #[source]
        source: GeometryError,
    },
    #[error("feature {feature} has a position with fewer than two coordinates")]
    Position { feature: usize },
}

/// Render zones as a `FeatureCollection` with closed `[lng, lat]` rings.
pub fn feature_collection(zones: &[Zone], zone_types: &[ZoneType]) -> Value {
    let types: HashMap<RecordId, &ZoneType> = zone_types.iter().map(|t| (t.id, t)).collect();
    let features: Vec<Value> = zones
        .iter()
        .map(|zone| {
            let zone_type = types.get(&zone.zone_type_id);
            json!({
                "type": "Feature",
                "id": zone.id,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [closed_ring(&zone.boundary)],
                },
                "properties": {
                    "id": zone.id,
                    "name": zone.name,
                    "zone_type_id": zone.zone_type_id,
                    "zone_type_code": zone_type.map(|t| t.code.as_str()),
                    "color": zone_type.map(|t| t.color.as_str()),
                    "region_id": zone.region_id,
                    "area_sqm": zone.area_sqm,
                    "description": zone.description,
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

fn closed_ring(ring: &[LatLng]) -> Vec<[f64; 2]> {
    let mut coordinates: Vec<[f64; 2]> = ring.iter().map(|p| [p.lng, p.lat]).collect();
    if let Some(first) = coordinates.first().copied() {
        coordinates.push(first);
    }
    coordinates
}

/// Area of one polygon feature read from a GeoJSON file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredFeature {
    pub name: String,
    pub area_sqm: f64,
}

#[derive(Deserialize)]
struct FeatureCollectionDoc {
    features: Vec<FeatureDoc>,
}

#[derive(Deserialize)]
struct FeatureDoc {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    geometry: Option<GeometryDoc>,
}

type Position = Vec<f64>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum GeometryDoc {
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Measure every polygon feature; holes are subtracted and other geometries skipped.
pub fn measure_features<R: Read>(reader: R) -> Result<Vec<MeasuredFeature>, GeoJsonError> {
    let doc: FeatureCollectionDoc = serde_json::from_reader(reader)?;
    let mut measured = Vec::new();

    for (index, feature) in doc.features.into_iter().enumerate() {
        let polygons = match feature.geometry {
            Some(GeometryDoc::Polygon { coordinates }) => vec![coordinates],
            Some(GeometryDoc::MultiPolygon { coordinates }) => coordinates,
            Some(GeometryDoc::Unsupported) | None => continue,
        };

        let mut area_sqm = 0.0;
        for rings in &polygons {
            for (ring_index, ring) in rings.iter().enumerate() {
                let area = ring_area(index, ring)?;
                if ring_index == 0 {
                    area_sqm += area;
                } else {
                    area_sqm -= area;
                }
            }
        }

        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("feature {}", index + 1));
        measured.push(MeasuredFeature { name, area_sqm });
    }

    Ok(measured)
}

fn ring_area(feature: usize, ring: &[Position]) -> Result<f64, GeoJsonError> {
    let points = ring
        .iter()
        .map(|position| match position.as_slice() {
            [lng, lat, ..] => Ok(LatLng::new(*lat, *lng)),
            _ => Err(GeoJsonError::Position { feature }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let ring =
        normalize_ring(&points).map_err(|source| GeoJsonError::Geometry { feature, source })?;
    Ok(geodesic_area(&ring))
}
