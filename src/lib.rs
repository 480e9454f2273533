//! # HydroChill Gateway
//!
//! `hydrochill-gateway` bridges a smart water cooler to its dashboard. The
//! cooler posts telemetry over HTTP, the gateway merges it into a single
//! persistent record, and commands from the dashboard are forwarded to the
//! cooler over MQTT.
//!
//! ## Core Modules
//!
//! - `broker`: command translation and the MQTT publisher.
//! - `config`: loading settings from file, environment and defaults.
//! - `persistence`: the document store telemetry is merged into (backed by `sled`).
//! - `transport`: the HTTP routes and the embedded dashboard.
//! - `utils`: error handling and logging setup.

pub mod broker;
pub mod config;
pub mod persistence;
pub mod transport;
pub mod utils;
