//! Source configuration types for the message bus.

pub mod mqtt;

pub use mqtt::MqttSourceConfig;
