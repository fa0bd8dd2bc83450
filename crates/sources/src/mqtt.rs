//! MQTT message bus
//!
//! Subscribes to the temperature and humidity wildcard topics of the gateway
//! and yields every publish as a `BusMessage`. Subscriptions are sent on each
//! ConnAck so they survive reconnects with a clean session. A subscription
//! that cannot be queued stays pending and is retried on the next poll.

use crate::bus::{BusError, BusMessage, MessageBus};
use log::{debug, info, warn};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, SubscribeFilter};
use ruuvi_epaper_types::MqttSourceConfig;

/// Broker connection delivering sensor messages
pub struct MqttBus {
    client: AsyncClient,
    eventloop: EventLoop,
    filters: Vec<String>,
    /// Set on ConnAck until the subscribe request is queued
    needs_subscribe: bool,
}

impl MqttBus {
    /// Set up the client; the connection is made on the first poll
    pub fn new(config: &MqttSourceConfig) -> Self {
        let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);

        let (client, eventloop) = AsyncClient::new(options, config.channel_capacity.max(1));
        info!(
            "MQTT client '{}' targeting {}:{}",
            config.client_id, config.host, config.port
        );

        Self {
            client,
            eventloop,
            filters: config.topic_filters(),
            needs_subscribe: false,
        }
    }

    fn subscribe(&self) -> Result<(), BusError> {
        let filters = self
            .filters
            .iter()
            .map(|topic| SubscribeFilter::new(topic.clone(), QoS::AtMostOnce));
        // Non-blocking: the request is flushed by the event loop we are polling
        self.client
            .try_subscribe_many(filters)
            .map_err(|e| BusError::Request(e.to_string()))?;
        info!("Subscribing to {}", self.filters.join(", "));
        Ok(())
    }

    fn resubscribe(&mut self) {
        if !self.needs_subscribe {
            return;
        }
        match self.subscribe() {
            Ok(()) => self.needs_subscribe = false,
            Err(e) => warn!("Subscription pending, retrying on next poll: {}", e),
        }
    }
}

impl MessageBus for MqttBus {
    async fn next_message(&mut self) -> Result<Option<BusMessage>, BusError> {
        loop {
            self.resubscribe();
            let event = self
                .eventloop
                .poll()
                .await
                .map_err(|e| BusError::Connection(e.to_string()))?;

            match event {
                Event::Incoming(Packet::Publish(publish)) => {
                    return Ok(Some(BusMessage {
                        routing_key: publish.topic,
                        payload: publish.payload.to_vec(),
                    }));
                }
                Event::Incoming(Packet::ConnAck(ack)) => {
                    info!("Connected with result code {:?}", ack.code);
                    self.needs_subscribe = true;
                    self.resubscribe();
                }
                Event::Incoming(Packet::SubAck(ack)) => {
                    debug!("Subscription acknowledged: {:?}", ack.return_codes);
                }
                other => {
                    log::trace!("MQTT event: {:?}", other);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_subscription_is_kept_until_queued() {
        let mut bus = MqttBus::new(&MqttSourceConfig {
            channel_capacity: 1,
            ..MqttSourceConfig::default()
        });
        bus.resubscribe();
        assert!(!bus.needs_subscribe);

        bus.needs_subscribe = true;
        bus.resubscribe();
        assert!(!bus.needs_subscribe);

        // The event loop is never polled, so the request channel stays full
        bus.needs_subscribe = true;
        bus.resubscribe();
        assert!(bus.needs_subscribe);
        bus.resubscribe();
        assert!(bus.needs_subscribe);
    }
}
