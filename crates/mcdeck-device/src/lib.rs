//! # mcdeck-device - Appliance Control
//!
//! Talks to a single MusicCast receiver over its local HTTP control API:
//! query power, set power and toggle power.
//!
//! Depends on [`mcdeck_core`] for error handling and the power types.
//!
//! ## Public API
//!
//! - [`PowerControl`] - The three power verbs, as an async trait
//! - [`MusicCastClient`] - `reqwest`-backed implementation with a bounded timeout
//! - [`ClientOptions`] - Timeout and API path
//! - [`parse_status()`], [`ApplianceStatus`] - `getStatus` body parsing
//!
//! With the `test-helpers` feature, [`test_utils::FakeAppliance`] provides an
//! in-memory appliance for handler and poller tests.

pub mod client;
pub mod status;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use client::{
    ClientOptions, MusicCastClient, PowerControl, DEFAULT_API_PATH, DEFAULT_REQUEST_TIMEOUT,
};
pub use status::{parse_status, ApplianceStatus};
