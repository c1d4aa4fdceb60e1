//! Occupancy monitoring records for inspected buildings and units.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    NewOccupancyRecord, OccupancyFilter, OccupancyRecord, OccupancyRecordPatch,
    OccupancyRecordView, OccupancyStatus, OccupancyType,
};
pub use router::occupancy_router;
pub use service::OccupancyService;
