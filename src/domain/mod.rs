//! Domain entities independent from persistence and HTTP representations.

pub mod listing;
pub mod matches;
pub mod notification;
pub mod types;
