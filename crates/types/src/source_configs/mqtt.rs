//! MQTT source configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::sensor::Metric;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "RuuviTagPaper".to_string()
}

fn default_gateway_prefix() -> String {
    "bt-mqtt-gateway".to_string()
}

fn default_device_prefix() -> String {
    "ruuvitag".to_string()
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_reconnect_delay_ms() -> u64 {
    5000
}

fn default_channel_capacity() -> usize {
    10
}

/// Broker connection and topic settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MqttSourceConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// First routing key segment, published by the gateway
    #[serde(default = "default_gateway_prefix")]
    pub gateway_prefix: String,
    /// Second routing key segment, naming the device family
    #[serde(default = "default_device_prefix")]
    pub device_prefix: String,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    /// Pause after a connection error before polling again
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Capacity of the client request channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for MqttSourceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_id: default_client_id(),
            gateway_prefix: default_gateway_prefix(),
            device_prefix: default_device_prefix(),
            keep_alive_secs: default_keep_alive_secs(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl MqttSourceConfig {
    /// Wildcard subscription for one metric, e.g. `bt-mqtt-gateway/ruuvitag/+/temperature`
    pub fn topic_filter(&self, metric: Metric) -> String {
        [
            self.gateway_prefix.as_str(),
            self.device_prefix.as_str(),
            "+",
            metric.as_str(),
        ]
        .join("/")
    }

    /// Subscriptions for every metric
    pub fn topic_filters(&self) -> Vec<String> {
        Metric::ALL.iter().map(|m| self.topic_filter(*m)).collect()
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}
