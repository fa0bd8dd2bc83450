//! ruuvi-epaper-sources: Message bus implementations feeding the sensor registry.

mod bus;
mod mqtt;

pub use bus::{BusError, BusMessage, ChannelBus, MessageBus};
pub use mqtt::MqttBus;
