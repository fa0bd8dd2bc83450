//! Routing key decoding
//!
//! Keys have the shape `<gateway>/<device>/<node>/<metric>`. The node and
//! metric are taken by position; anything matching the subscribed wildcard
//! filters is trusted to have this shape.

use ruuvi_epaper_types::Metric;
use thiserror::Error;

/// Number of segments a routing key needs
pub const MIN_SEGMENTS: usize = 4;

const NODE_SEGMENT: usize = 2;
const METRIC_SEGMENT: usize = 3;

/// Errors from routing key decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("malformed routing key '{0}': expected at least 4 segments")]
    MalformedKey(String),
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
}

/// The node and metric segments of a routing key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic<'a> {
    pub node_id: &'a str,
    pub metric_id: &'a str,
}

impl Topic<'_> {
    /// Interpret the metric segment
    pub fn metric(&self) -> Result<Metric, TopicError> {
        self.metric_id
            .parse()
            .map_err(|_| TopicError::UnknownMetric(self.metric_id.to_string()))
    }
}

/// Split a routing key into its node and metric segments
pub fn decode(routing_key: &str) -> Result<Topic<'_>, TopicError> {
    let segments: Vec<&str> = routing_key.split('/').collect();
    if segments.len() < MIN_SEGMENTS {
        return Err(TopicError::MalformedKey(routing_key.to_string()));
    }

    Ok(Topic {
        node_id: segments[NODE_SEGMENT],
        metric_id: segments[METRIC_SEGMENT],
    })
}
