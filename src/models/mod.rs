//! Diesel row types and their conversions into domain entities.

pub mod config;
pub mod listing;
pub mod matches;
pub mod notification;
