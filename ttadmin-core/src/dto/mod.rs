//! Data Transfer Objects for the admin backend
//!
//! DTOs mirror the JSON the backend sends back. Most fields are optional
//! and DTOs are converted into domain types before the rest of the
//! workspace sees them.

pub mod job;
pub mod settings;
