//! Core library exports for the barter service.
//!
//! Users post `have` and `need` listings; whenever a listing is saved the
//! matching engine scores it against every opposite-type listing and stores
//! the pairs above the threshold, notifying both owners.
//!
//! The `data` feature exposes the domain, persistence and matching layers;
//! `server` adds the service functions and the JSON HTTP API.

#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod matching;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Role required to use any endpoint of the service.
pub const SERVICE_ACCESS_ROLE: &str = "barter";
