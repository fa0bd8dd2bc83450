//! ruuvi-epaper-types: Shared data types for the ruuvi-epaper status display.
//!
//! This crate contains pure data types (readings, node descriptions and
//! configuration sections) shared across all ruuvi-epaper crates. Nothing
//! here touches the network or the panel, making it the foundation layer.

pub mod display_configs;
pub mod sensor;
pub mod source_configs;

// Re-export commonly used types at the crate root for convenience
pub use display_configs::{EpaperConfig, FontChoice, LayoutConfig, Rotation};
pub use sensor::{
    capitalize, default_nodes, Metric, NodeConfig, NodeValues, SensorReading, UnknownMetricName,
    INITIAL_VALUE,
};
pub use source_configs::MqttSourceConfig;
