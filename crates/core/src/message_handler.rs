//! Applies inbound bus messages to the sensor registry

use crate::registry::{RegistryError, SensorRegistry};
use crate::topic::{self, TopicError};
use ruuvi_epaper_types::SensorReading;
use thiserror::Error;

/// Reasons a message is dropped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("payload {payload:?} on '{routing_key}' is not a number")]
    PayloadParse { routing_key: String, payload: String },
}

/// A reading that was stored in the registry
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedUpdate {
    pub node: String,
    pub reading: SensorReading,
}

/// Decodes messages and writes them into the registry
#[derive(Clone)]
pub struct MessageHandler {
    registry: SensorRegistry,
}

impl MessageHandler {
    pub fn new(registry: SensorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Decode one message and store its value
    ///
    /// Nothing is written unless the key, metric, node and payload are all valid.
    pub fn handle(&self, routing_key: &str, payload: &[u8]) -> Result<AppliedUpdate, IngestError> {
        let topic = topic::decode(routing_key)?;
        let metric = topic.metric()?;
        let value = parse_payload(payload).ok_or_else(|| IngestError::PayloadParse {
            routing_key: routing_key.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
        })?;

        self.registry.update(topic.node_id, metric, value)?;

        Ok(AppliedUpdate {
            node: topic.node_id.to_string(),
            reading: SensorReading::new(metric, value),
        })
    }
}

/// UTF-8 decimal string, surrounding whitespace allowed
fn parse_payload(payload: &[u8]) -> Option<f64> {
    std::str::from_utf8(payload).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruuvi_epaper_types::{Metric, NodeValues};

    fn handler() -> MessageHandler {
        MessageHandler::new(SensorRegistry::new(["tag1", "tag2", "tag3", "tag4"]))
    }

    #[test]
    fn test_temperature_message_updates_only_its_node() {
        let handler = handler();
        let applied = handler
            .handle("bt-mqtt-gateway/ruuvitag/tag2/temperature", b"21.5")
            .unwrap();
        assert_eq!(applied.node, "tag2");
        assert_eq!(applied.reading, SensorReading::new(Metric::Temperature, 21.5));

        let snapshot = handler.registry().snapshot();
        assert_eq!(snapshot.get("tag2").unwrap().temperature, 21.5);
        for node in ["tag1", "tag3", "tag4"] {
            assert_eq!(*snapshot.get(node).unwrap(), NodeValues::default());
        }
    }

    #[test]
    fn test_non_numeric_payload_is_dropped() {
        let handler = handler();
        handler
            .handle("bt-mqtt-gateway/ruuvitag/tag1/humidity", b"40.0")
            .unwrap();

        let err = handler
            .handle("bt-mqtt-gateway/ruuvitag/tag1/humidity", b"abc")
            .unwrap_err();
        assert!(matches!(err, IngestError::PayloadParse { .. }));
        assert_eq!(handler.registry().get("tag1").unwrap().humidity, 40.0);
    }

    #[test]
    fn test_invalid_utf8_payload_is_dropped() {
        let err = handler()
            .handle("bt-mqtt-gateway/ruuvitag/tag1/humidity", &[0xff, 0xfe])
            .unwrap_err();
        assert!(matches!(err, IngestError::PayloadParse { .. }));
    }

    #[test]
    fn test_payload_whitespace_is_accepted() {
        let applied = handler()
            .handle("bt-mqtt-gateway/ruuvitag/tag4/humidity", b" 63.2\n")
            .unwrap();
        assert_eq!(applied.reading.value, 63.2);
    }

    #[test]
    fn test_error_kinds() {
        let handler = handler();
        assert!(matches!(
            handler.handle("bt-mqtt-gateway/tag1", b"1.0"),
            Err(IngestError::Topic(TopicError::MalformedKey(_)))
        ));
        assert!(matches!(
            handler.handle("bt-mqtt-gateway/ruuvitag/tag1/pressure", b"1.0"),
            Err(IngestError::Topic(TopicError::UnknownMetric(_)))
        ));
        assert!(matches!(
            handler.handle("bt-mqtt-gateway/ruuvitag/tag7/temperature", b"1.0"),
            Err(IngestError::Registry(RegistryError::UnknownNode(_)))
        ));
        assert!(!handler.registry().contains("tag7"));
    }
}
