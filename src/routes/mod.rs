//! Router construction

pub mod api;
pub mod relay;
