//! ruuvi-epaper: RuuviTag readings from MQTT on a tri-color e-paper panel
//!
//! The binary wires these pieces together:
//! - `config`: JSON configuration with built-in defaults
//! - `core`: the ingestion task and the refresh scheduler

pub mod config;
pub mod core;

pub use config::AppConfig;
pub use core::{run_ingestion, RefreshScheduler};
