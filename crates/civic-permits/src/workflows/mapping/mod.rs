//! Zoning map: zone types, regions and the polygons drawn for them.

pub mod domain;
pub mod geojson;
pub mod geometry;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    MeasureRequest, Measurement, NewRegion, NewZoneType, Region, SyncFeature, SyncReport,
    SyncRequest, Zone, ZoneFilter, ZoneInput, ZoneType,
};
pub use geojson::{measure_features, GeoJsonError, MeasuredFeature};
pub use geometry::{geodesic_area, LatLng};
pub use router::map_router;
pub use service::{MapService, MapStores};
