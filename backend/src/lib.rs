//! # EVV Backend
//!
//! Electronic Visit Verification core for home-care shifts.
//!
//! A caregiver works through [`models::Schedule`]s. Checking in creates a
//! geolocated [`models::Visit`], checking out completes it, and each care
//! [`models::Task`] of the shift is recorded as completed or, with a reason,
//! as not completed.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`models`]: Entities, identifiers, status enums and analytics views
//! - [`validation`]: Pure input checks shared by services
//! - [`db`]: Repository traits, the unit of work and the in-memory store
//! - [`services`]: Business rules spanning schedules, visits and tasks
//! - [`config`]: TOML and environment configuration
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod validation;

#[cfg(feature = "http-server")]
pub mod http;
