//! The `utils` module provides a collection of utility functions and common
//! definitions used across the gateway.
//!
//! It holds the top-level error type (and its mapping onto HTTP responses)
//! and the tracing setup shared by the binary and the tests.

pub mod error;
pub mod logging;

pub use error::GatewayError;
