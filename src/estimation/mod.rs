pub mod config;
mod mapping;

pub use config::EstimationConfig;
pub use mapping::{estimate, estimate_with, roughness_correction};
