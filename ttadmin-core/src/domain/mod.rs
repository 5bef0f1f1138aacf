//! Core domain types
//!
//! This module contains the structures an operator works with: maintenance
//! jobs and their status, the snapshot and storage selectors, and the
//! editable system settings.

pub mod job;
pub mod settings;
pub mod snapshot;
