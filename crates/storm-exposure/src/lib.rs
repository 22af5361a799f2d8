pub mod config;
pub mod error;
pub mod exposure;
pub mod telemetry;
