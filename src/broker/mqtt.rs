//! MQTT publisher
//!
//! Wraps a `rumqttc::AsyncClient`. rumqttc only makes progress while its event
//! loop is polled, so `connect` spawns a task that drives it for the lifetime
//! of the process. Connection errors are logged and the loop keeps polling,
//! which makes rumqttc reconnect on its own.

use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, Outgoing, QoS};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};
use uuid::Uuid;

use super::{PublishError, Publisher};
use crate::config::MqttSettings;

/// Capacity of the request channel between the client and its event loop.
const REQUEST_CAPACITY: usize = 32;

/// Pause after an event loop error before polling again.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Build the client and start driving its event loop in the background.
    pub fn connect(settings: &MqttSettings) -> (Self, JoinHandle<()>) {
        let client_id = format!("{}-{}", settings.client_id_prefix, Uuid::new_v4());
        info!(
            "mqtt -> {}:{} as {client_id}",
            settings.host, settings.port
        );

        let mut opts = MqttOptions::new(client_id, settings.host.clone(), settings.port);
        opts.set_keep_alive(Duration::from_secs(settings.keep_alive_secs));

        let (client, eventloop) = AsyncClient::new(opts, REQUEST_CAPACITY);
        let handle = tokio::spawn(drive_event_loop(eventloop));

        (Self { client }, handle)
    }

    pub fn from_client(client: AsyncClient) -> Self {
        Self { client }
    }
}

async fn drive_event_loop(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                info!("Connected to MQTT broker: {ack:?}")
            }
            Ok(Event::Incoming(other)) => trace!("mqtt incoming: {other:?}"),
            Ok(Event::Outgoing(Outgoing::Publish(pkid))) => {
                debug!("mqtt publish -> pkid={pkid}")
            }
            Ok(Event::Outgoing(other)) => trace!("mqtt outgoing: {other:?}"),
            Err(e) => {
                error!("mqtt eventloop error: {e}; retrying in {RECONNECT_DELAY:?}");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        // QoS 0, not retained: the device only cares about commands sent while it is online.
        // try_publish never waits: with the broker down the event loop stops draining
        // the request queue, and a full queue must fail the request instead of hanging it.
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| PublishError::Rejected(e.to_string()))
    }
}

impl std::fmt::Debug for MqttPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttPublisher")
            .field("client", &"rumqttc::AsyncClient")
            .finish()
    }
}
