pub mod catalog;
pub mod dashboard;
pub mod documents;
pub mod housing;
pub mod mapping;
pub mod occupancy;
pub mod zoning;
