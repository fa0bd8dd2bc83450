//! Sensor reading types shared by the ingestion and render paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default value of every metric before a node has reported
pub const INITIAL_VALUE: f64 = 0.0;

/// A measured quantity reported by a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Metric {
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
}

impl Metric {
    /// All metrics, in display order
    pub const ALL: [Metric; 2] = [Metric::Temperature, Metric::Humidity];

    /// Name used as the last routing key segment
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a metric name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric '{0}'")]
pub struct UnknownMetricName(pub String);

impl FromStr for Metric {
    type Err = UnknownMetricName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            other => Err(UnknownMetricName(other.to_string())),
        }
    }
}

/// A single decoded value for one metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub metric: Metric,
    pub value: f64,
}

impl SensorReading {
    pub fn new(metric: Metric, value: f64) -> Self {
        Self { metric, value }
    }
}

/// Latest known values of one node
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NodeValues {
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for NodeValues {
    fn default() -> Self {
        Self {
            temperature: INITIAL_VALUE,
            humidity: INITIAL_VALUE,
        }
    }
}

impl NodeValues {
    /// Overwrite a single metric
    pub fn set(&mut self, metric: Metric, value: f64) {
        match metric {
            Metric::Temperature => self.temperature = value,
            Metric::Humidity => self.humidity = value,
        }
    }

    pub fn apply(&mut self, reading: SensorReading) {
        self.set(reading.metric, reading.value);
    }
}

/// A node known at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    /// Identifier as it appears in the routing key (e.g., "tag1")
    pub id: String,
    /// Label shown on the display; defaults to the capitalized id
    #[serde(default)]
    pub label: Option<String>,
}

impl NodeConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Label to render for this node
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => capitalize(&self.id),
        }
    }
}

/// Upper-case the first character and lower-case the rest ("tag1" -> "Tag1")
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// The nodes displayed when no configuration overrides them
pub fn default_nodes() -> Vec<NodeConfig> {
    ["tag1", "tag2", "tag3", "tag4"]
        .into_iter()
        .map(NodeConfig::new)
        .collect()
}
