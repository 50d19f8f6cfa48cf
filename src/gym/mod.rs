pub mod synthetic_service;

pub use synthetic_service::{SyntheticService, SyntheticServiceConfig};
