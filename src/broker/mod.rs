//! The `broker` module covers the outbound side of the gateway: turning
//! dashboard commands into wire messages and publishing them to the MQTT
//! broker the device listens on.
//!
//! Publishing is fire-and-forget. `Publisher::publish` succeeds once the
//! client has accepted the message for sending; nothing waits for the broker
//! or the device to confirm delivery.

pub mod message;
pub mod mqtt;

use async_trait::async_trait;
use thiserror::Error;

pub use message::{Command, CommandMessage, CommandRequest};
pub use mqtt::MqttPublisher;

#[derive(Error, Debug)]
pub enum PublishError {
    /// The client's request queue is full or its event loop is gone.
    #[error("publish rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError>;
}
