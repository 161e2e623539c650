//! Response shapes returned by the service layer.

pub mod listings;
