//! Ingestion task: moves bus messages into the sensor registry

use log::{debug, info, warn};
use ruuvi_epaper_core::MessageHandler;
use ruuvi_epaper_sources::MessageBus;
use std::time::Duration;
use tokio::sync::watch;

/// Drive `bus` until it closes or the gate sender is dropped
///
/// Messages are only pulled while `gate` is `true`; while it is `false` they
/// wait at the broker. Invalid messages are logged and skipped, bus errors
/// pause for `reconnect_delay` before polling again.
pub async fn run_ingestion<B: MessageBus>(
    mut bus: B,
    handler: MessageHandler,
    mut gate: watch::Receiver<bool>,
    reconnect_delay: Duration,
) {
    loop {
        if !*gate.borrow_and_update() {
            if gate.changed().await.is_err() {
                info!("Reception gate closed for good, stopping ingestion");
                return;
            }
            continue;
        }

        let message = tokio::select! {
            changed = gate.changed() => {
                if changed.is_err() {
                    info!("Reception gate closed for good, stopping ingestion");
                    return;
                }
                continue;
            }
            message = bus.next_message() => message,
        };

        match message {
            Ok(Some(message)) => match handler.handle(&message.routing_key, &message.payload) {
                Ok(update) => debug!(
                    "Message received: {}/{} = {}",
                    update.node, update.reading.metric, update.reading.value
                ),
                Err(e) => warn!("Dropping message on '{}': {}", message.routing_key, e),
            },
            Ok(None) => {
                info!("Message bus closed, stopping ingestion");
                return;
            }
            Err(e) => {
                warn!("Message bus error: {}; retrying in {:?}", e, reconnect_delay);
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}
