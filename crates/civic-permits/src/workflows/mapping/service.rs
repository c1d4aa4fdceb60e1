use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::domain::{
    MeasureRequest, Measurement, NewRegion, NewZoneType, Region, SyncReport, SyncRequest, Zone,
    ZoneFilter, ZoneInput, ZoneShape, ZoneType,
};
use super::geojson::feature_collection;
use super::geometry::{
    bounding_box, centroid, format_area, geodesic_area, normalize_ring, to_hectares,
};
use crate::records::{ApiError, InMemoryStore, RecordId, RecordStore, StoreError, ValidationErrors};
use crate::workflows::dashboard::{sum_amounts, MapStats, ModuleSummary, StatsSource};

const RESOURCE: &str = "zone";

/// Backing stores for the map; each may be swapped independently in tests.
#[derive(Clone)]
pub struct MapStores {
    pub zone_types: Arc<dyn RecordStore<ZoneType>>,
    pub regions: Arc<dyn RecordStore<Region>>,
    pub zones: Arc<dyn RecordStore<Zone>>,
}

impl MapStores {
    pub fn in_memory() -> Self {
        Self {
            zone_types: Arc::new(InMemoryStore::<ZoneType>::default()),
            regions: Arc::new(InMemoryStore::<Region>::default()),
            zones: Arc::new(InMemoryStore::<Zone>::default()),
        }
    }
}

/// Ids that zone payloads may reference, loaded once per request.
struct References {
    zone_types: HashSet<RecordId>,
    regions: HashSet<RecordId>,
}

impl References {
    fn check(&self, shape: &ZoneShape, errors: &mut ValidationErrors) {
        if !self.zone_types.contains(&shape.zone_type_id) {
            errors.add("zone_type_id", "The selected zone type is invalid.");
        }
        if let Some(region_id) = shape.region_id {
            if !self.regions.contains(&region_id) {
                errors.add("region_id", "The selected region is invalid.");
            }
        }
    }
}

pub struct MapService {
    stores: MapStores,
    // Serializes zone, region and zone type writes so code checks and syncs see a stable map.
    writes: Mutex<()>,
}

impl MapService {
    pub fn new(stores: MapStores) -> Self {
        Self {
            stores,
            writes: Mutex::new(()),
        }
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.writes
            .lock()
            .map_err(|_| StoreError::Unavailable("map write lock poisoned".to_string()))
    }

    fn references(&self) -> Result<References, StoreError> {
        Ok(References {
            zone_types: self.stores.zone_types.list()?.iter().map(|t| t.id).collect(),
            regions: self.stores.regions.list()?.iter().map(|r| r.id).collect(),
        })
    }

    pub fn zone_types(&self) -> Result<Vec<ZoneType>, ApiError> {
        let mut zone_types = self.stores.zone_types.list()?;
        zone_types.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(zone_types)
    }

    pub fn create_zone_type(&self, payload: NewZoneType) -> Result<ZoneType, ApiError> {
        let zone_type = payload.into_record(Utc::now())?;
        let _guard = self.write_lock()?;
        if self
            .stores
            .zone_types
            .list()?
            .iter()
            .any(|existing| existing.code == zone_type.code)
        {
            return Err(ApiError::Conflict(format!(
                "Zone type code {} is already in use.",
                zone_type.code
            )));
        }
        let stored = self.stores.zone_types.insert(zone_type)?;
        info!(id = stored.id, code = %stored.code, "zone type created");
        Ok(stored)
    }

    pub fn regions(&self) -> Result<Vec<Region>, ApiError> {
        let mut regions = self.stores.regions.list()?;
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(regions)
    }

    pub fn create_region(&self, payload: NewRegion) -> Result<Region, ApiError> {
        let region = payload.into_record(Utc::now())?;
        let _guard = self.write_lock()?;
        if self
            .stores
            .regions
            .list()?
            .iter()
            .any(|existing| existing.code == region.code)
        {
            return Err(ApiError::Conflict(format!(
                "Region code {} is already in use.",
                region.code
            )));
        }
        let stored = self.stores.regions.insert(region)?;
        info!(id = stored.id, code = %stored.code, "region created");
        Ok(stored)
    }

    pub fn zones(&self, filter: &ZoneFilter) -> Result<Vec<Zone>, ApiError> {
        let mut zones: Vec<Zone> = self
            .stores
            .zones
            .list()?
            .into_iter()
            .filter(|zone| filter.zone_type_id.map_or(true, |id| zone.zone_type_id == id))
            .filter(|zone| filter.region_id.map_or(true, |id| zone.region_id == Some(id)))
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(zones)
    }

    pub fn get_zone(&self, id: RecordId) -> Result<Zone, ApiError> {
        self.stores
            .zones
            .fetch(id)?
            .ok_or_else(|| ApiError::not_found(RESOURCE, id))
    }

    fn resolve(&self, input: ZoneInput) -> Result<ZoneShape, ApiError> {
        let shape = input.validate()?;
        let mut errors = ValidationErrors::new();
        self.references()?.check(&shape, &mut errors);
        errors.into_result()?;
        Ok(shape)
    }

    pub fn create_zone(&self, input: ZoneInput) -> Result<Zone, ApiError> {
        let _guard = self.write_lock()?;
        let shape = self.resolve(input)?;
        let stored = self.stores.zones.insert(shape.into_zone(Utc::now()))?;
        info!(id = stored.id, area_sqm = stored.area_sqm, "zone created");
        Ok(stored)
    }

    pub fn update_zone(&self, id: RecordId, input: ZoneInput) -> Result<Zone, ApiError> {
        let _guard = self.write_lock()?;
        let mut zone = self.get_zone(id)?;
        self.resolve(input)?.apply_to(&mut zone, Utc::now());
        let stored = self.stores.zones.update(zone)?;
        info!(id, area_sqm = stored.area_sqm, "zone updated");
        Ok(stored)
    }

    pub fn delete_zone(&self, id: RecordId) -> Result<Zone, ApiError> {
        let _guard = self.write_lock()?;
        let removed = self.stores.zones.remove(id).map_err(|err| match err {
            StoreError::NotFound => ApiError::not_found(RESOURCE, id),
            other => ApiError::Store(other),
        })?;
        info!(id, "zone deleted");
        Ok(removed)
    }

    /// Measure a drawn boundary without persisting it.
    pub fn measure(&self, request: MeasureRequest) -> Result<Measurement, ApiError> {
        let ring = normalize_ring(&request.boundary)
            .map_err(|err| ValidationErrors::single("boundary", err.to_string()))?;
        let area_sqm = geodesic_area(&ring);
        let (Some(center), Some(bounds)) = (centroid(&ring), bounding_box(&ring)) else {
            return Err(ValidationErrors::single("boundary", "The boundary is empty.").into());
        };

        Ok(Measurement {
            area_sqm,
            area_hectares: to_hectares(area_sqm),
            area_label: format_area(area_sqm),
            vertices: ring.len(),
            centroid: center,
            bounds,
        })
    }

    /// Replace the zones in scope with the drawing layer's features.
    ///
    /// Every feature is validated before anything is written, so a rejected
    /// payload leaves the map untouched.
    pub fn sync(&self, request: SyncRequest) -> Result<SyncReport, ApiError> {
        let _guard = self.write_lock()?;
        let references = self.references()?;
        if let Some(region_id) = request.region_id {
            if !references.regions.contains(&region_id) {
                return Err(
                    ValidationErrors::single("region_id", "The selected region is invalid.").into(),
                );
            }
        }

        let mut in_scope: BTreeMap<RecordId, Zone> = self
            .stores
            .zones
            .list()?
            .into_iter()
            .filter(|zone| request.region_id.map_or(true, |id| zone.region_id == Some(id)))
            .map(|zone| (zone.id, zone))
            .collect();

        let mut errors = ValidationErrors::new();
        let mut seen = HashSet::new();
        let mut plan: Vec<(Option<RecordId>, ZoneShape)> = Vec::new();
        for (index, feature) in request.features.into_iter().enumerate() {
            let prefix = format!("features.{index}");
            let mut feature_errors = ValidationErrors::new();
            if let Some(id) = feature.id {
                if !in_scope.contains_key(&id) {
                    feature_errors.add("id", format!("Zone {id} is not part of this map."));
                } else if !seen.insert(id) {
                    feature_errors.add("id", format!("Zone {id} appears more than once."));
                }
            }

            let mut input = feature.zone;
            if input.region_id.is_none() {
                input.region_id = request.region_id;
            }
            if let (Some(scope), Some(region_id)) = (request.region_id, input.region_id) {
                if scope != region_id {
                    feature_errors.add(
                        "region_id",
                        "The region must match the region being synchronized.",
                    );
                }
            }

            match input.validate() {
                Ok(shape) => {
                    references.check(&shape, &mut feature_errors);
                    if feature_errors.is_empty() {
                        plan.push((feature.id, shape));
                    }
                }
                Err(shape_errors) => errors.extend_prefixed(&prefix, shape_errors),
            }
            errors.extend_prefixed(&prefix, feature_errors);
        }
        if !errors.is_empty() {
            warn!(region_id = ?request.region_id, %errors, "rejected zone sync");
            return Err(errors.into());
        }

        let now = Utc::now();
        let mut report = SyncReport::default();
        let stale: Vec<RecordId> = in_scope
            .keys()
            .copied()
            .filter(|id| !seen.contains(id))
            .collect();
        for id in stale {
            self.stores.zones.remove(id)?;
            in_scope.remove(&id);
            report.deleted.push(id);
        }
        for (id, shape) in plan {
            match id.and_then(|id| in_scope.remove(&id)) {
                Some(mut zone) => {
                    shape.apply_to(&mut zone, now);
                    report.updated.push(self.stores.zones.update(zone)?.id);
                }
                None => {
                    report
                        .created
                        .push(self.stores.zones.insert(shape.into_zone(now))?.id);
                }
            }
        }

        info!(
            region_id = ?request.region_id,
            created = report.created.len(),
            updated = report.updated.len(),
            deleted = report.deleted.len(),
            "zones synchronized"
        );
        Ok(report)
    }

    pub fn geojson(&self, filter: &ZoneFilter) -> Result<Value, ApiError> {
        let zones = self.zones(filter)?;
        let zone_types = self.stores.zone_types.list()?;
        Ok(feature_collection(&zones, &zone_types))
    }
}

impl StatsSource for MapService {
    fn module(&self) -> &'static str {
        "zoning_map"
    }

    fn stats(&self) -> Result<ModuleSummary, StoreError> {
        let zones = self.stores.zones.list()?;
        Ok(MapStats {
            zones: zones.len(),
            total_area_sqm: sum_amounts(zones.iter().map(|zone| zone.area_sqm)),
        }
        .into())
    }
}
