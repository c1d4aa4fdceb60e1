//! Polygon math for the zoning map editor.
//!
//! Areas use the spherical-excess approximation the browser drawing layer
//! reports while a polygon is being drawn, so figures shown during editing
//! match what the server persists.

use serde::{Deserialize, Serialize};

/// Equatorial radius in meters, as used by the web map.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

const SQM_PER_HECTARE: f64 = 10_000.0;

/// A vertex in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("vertex {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("vertex {index} latitude {lat} is outside -90..=90")]
    LatitudeOutOfRange { index: usize, lat: f64 },
    #[error("vertex {index} longitude {lng} is outside -180..=180")]
    LongitudeOutOfRange { index: usize, lng: f64 },
    #[error("a polygon needs at least 3 distinct vertices, found {found}")]
    TooFewVertices { found: usize },
}

/// Validate a ring and strip the closing vertex and consecutive duplicates.
pub fn normalize_ring(ring: &[LatLng]) -> Result<Vec<LatLng>, GeometryError> {
    for (index, point) in ring.iter().enumerate() {
        if !point.lat.is_finite() || !point.lng.is_finite() {
            return Err(GeometryError::NonFinite { index });
        }
        if !(-90.0..=90.0).contains(&point.lat) {
            return Err(GeometryError::LatitudeOutOfRange {
                index,
                lat: point.lat,
            });
        }
        if !(-180.0..=180.0).contains(&point.lng) {
            return Err(GeometryError::LongitudeOutOfRange {
                index,
                lng: point.lng,
            });
        }
    }

    let mut cleaned: Vec<LatLng> = Vec::with_capacity(ring.len());
    for point in ring {
        if cleaned.last() != Some(point) {
            cleaned.push(*point);
        }
    }
    while cleaned.len() > 1 && cleaned.first() == cleaned.last() {
        cleaned.pop();
    }

    if cleaned.len() < 3 {
        return Err(GeometryError::TooFewVertices {
            found: cleaned.len(),
        });
    }
    Ok(cleaned)
}

/// Spherical-excess area of a ring in square meters; orientation does not matter.
pub fn geodesic_area(ring: &[LatLng]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let sum: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(p1, p2)| {
            let (lat1, lat2) = (p1.lat.to_radians(), p2.lat.to_radians());
            (p2.lng - p1.lng).to_radians() * (2.0 + lat1.sin() + lat2.sin())
        })
        .sum();

    (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

pub fn bounding_box(ring: &[LatLng]) -> Option<Bounds> {
    let first = ring.first()?;
    let seed = Bounds {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    Some(ring.iter().fold(seed, |bounds, point| Bounds {
        south: bounds.south.min(point.lat),
        west: bounds.west.min(point.lng),
        north: bounds.north.max(point.lat),
        east: bounds.east.max(point.lng),
    }))
}

/// Vertex mean, used to place zone labels.
pub fn centroid(ring: &[LatLng]) -> Option<LatLng> {
    if ring.is_empty() {
        return None;
    }
    let count = ring.len() as f64;
    let (lat, lng) = ring
        .iter()
        .fold((0.0, 0.0), |(lat, lng), point| (lat + point.lat, lng + point.lng));
    Some(LatLng::new(lat / count, lng / count))
}

pub fn to_hectares(area_sqm: f64) -> f64 {
    area_sqm / SQM_PER_HECTARE
}

/// Human readable area, switching to hectares for large parcels.
pub fn format_area(area_sqm: f64) -> String {
    if area_sqm >= SQM_PER_HECTARE {
        format!("{:.2} ha", to_hectares(area_sqm))
    } else {
        format!("{area_sqm:.2} m²")
    }
}
