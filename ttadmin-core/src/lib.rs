//! ttadmin Core
//!
//! Core types shared by the timetable admin client and CLI.
//!
//! This crate contains:
//! - Domain types: jobs, snapshot/storage enumerations, settings state
//! - DTOs: wire representations of the admin backend's JSON replies

pub mod domain;
pub mod dto;
