//! Message bus abstraction

use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

/// One message as delivered by the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub routing_key: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(routing_key: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            routing_key: routing_key.into(),
            payload: payload.into(),
        }
    }
}

/// Errors from the bus
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The broker connection failed; polling again reconnects
    #[error("connection error: {0}")]
    Connection(String),
    /// A request could not be queued for the broker
    #[error("request error: {0}")]
    Request(String),
}

/// Source of routing-key/payload messages
pub trait MessageBus: Send {
    /// Wait for the next message
    ///
    /// `Ok(None)` means the bus is closed for good. Errors are transient: the
    /// caller may poll again after a pause.
    fn next_message(&mut self) -> impl Future<Output = Result<Option<BusMessage>, BusError>> + Send;
}

/// In-process bus fed through a channel
///
/// Used for replaying captured traffic and for exercising the ingestion path
/// without a broker.
pub struct ChannelBus {
    receiver: mpsc::Receiver<Result<BusMessage, BusError>>,
}

impl ChannelBus {
    pub fn new(receiver: mpsc::Receiver<Result<BusMessage, BusError>>) -> Self {
        Self { receiver }
    }

    /// Create a bus and the sender feeding it
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<BusMessage, BusError>>, Self) {
        let (sender, receiver) = mpsc::channel(capacity);
        (sender, Self::new(receiver))
    }
}

impl MessageBus for ChannelBus {
    async fn next_message(&mut self) -> Result<Option<BusMessage>, BusError> {
        match self.receiver.recv().await {
            Some(Ok(message)) => Ok(Some(message)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_bus_delivers_in_order_then_closes() {
        let (sender, mut bus) = ChannelBus::channel(4);
        sender.send(Ok(BusMessage::new("a/b/c/d", "1"))).await.unwrap();
        sender
            .send(Err(BusError::Connection("reset".to_string())))
            .await
            .unwrap();
        sender.send(Ok(BusMessage::new("a/b/c/e", "2"))).await.unwrap();
        drop(sender);

        assert_eq!(
            bus.next_message().await,
            Ok(Some(BusMessage::new("a/b/c/d", "1")))
        );
        assert!(bus.next_message().await.is_err());
        assert_eq!(
            bus.next_message().await,
            Ok(Some(BusMessage::new("a/b/c/e", "2")))
        );
        assert_eq!(bus.next_message().await, Ok(None));
    }
}
