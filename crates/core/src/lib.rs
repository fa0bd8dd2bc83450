//! ruuvi-epaper-core: Sensor state for the ruuvi-epaper status display.
//!
//! This crate contains the sensor registry shared by the ingestion and render
//! paths, routing key decoding, and the handler that turns bus messages into
//! registry updates.

pub mod constants;
mod message_handler;
mod registry;
pub mod topic;

pub use constants::{DEFAULT_REFRESH_INTERVAL, NO_NETWORK};
pub use message_handler::{AppliedUpdate, IngestError, MessageHandler};
pub use registry::{RegistryError, RegistrySnapshot, SensorRegistry};
pub use topic::{decode, Topic, TopicError};

// Re-export types used in public signatures for convenience
pub use ruuvi_epaper_types::{Metric, NodeValues, SensorReading};
