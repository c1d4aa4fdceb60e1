//! Permitting and records workflows backing the civic permits admin API.
//!
//! Each workflow module owns its domain types, validation rules, service and
//! axum router. Shared plumbing (record storage, pagination, response
//! envelopes and CSV export) lives in [`records`].

pub mod config;
pub mod error;
pub mod records;
pub mod telemetry;
pub mod workflows;
