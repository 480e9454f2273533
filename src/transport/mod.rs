//! The `transport` module is responsible for the HTTP surface of the gateway.
//!
//! It defines the request and response bodies exchanged with the device and
//! the dashboard, and the axum router that forwards them to the document
//! store and the MQTT publisher.

pub mod http;
pub mod message;

pub use http::{AppState, build_router, serve};
