//! Housing assistance applications and their household rosters.

pub mod domain;
pub mod router;
pub mod service;


pub use domain::{
    HouseholdMember, HousingApplication, HousingApplicationPatch, HousingApplicationView,
    HousingFilter, HousingProgram, HousingStatus, NewHouseholdMember, NewHousingApplication,
};
pub use router::housing_router;
pub use service::HousingService;
