//! Core library exports for the lunch record service.
//!
//! This crate exposes the domain model, the Diesel-backed record store and the
//! aggregation services that keep per-(restaurant, menu) average grades
//! consistent with the stored ratings.

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
mod error_conversions;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "data")]
pub mod services;
