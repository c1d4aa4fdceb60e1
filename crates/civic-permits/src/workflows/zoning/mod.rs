//! Zoning clearance applications: intake, review workflow, listing and export.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    LandUse, NewZoningApplication, ZoningApplication, ZoningApplicationPatch,
    ZoningFilter, ZoningStatus,
};
pub use router::zoning_router;
pub use service::ZoningService;
