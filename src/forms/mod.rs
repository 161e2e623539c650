//! Request bodies and their conversion into validated domain payloads.

pub mod listings;
