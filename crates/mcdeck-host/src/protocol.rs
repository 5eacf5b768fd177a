//! Discriminator-first parsing of host frames.
//!
//! A frame is first read for its `event` string only. Unknown discriminators
//! are reported as [`HostMessage::Unknown`] so the caller can skip them; known
//! ones are deserialized in full into a [`HostEvent`].

use serde::Deserialize;

use mcdeck_core::prelude::*;
use mcdeck_core::HostEvent;

/// Result of parsing one host text frame
#[derive(Debug, Clone)]
pub enum HostMessage {
    Event(HostEvent),
    /// Discriminator this plugin does not handle.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct Discriminator {
    event: String,
}

/// Parse a host text frame.
///
/// # Errors
///
/// [`Error::Json`] when the frame is not JSON, has no `event` string, or a
/// known event's body does not match its shape. The host's payload shapes
/// are fixed, so the caller treats this as a desynchronized connection.
pub fn parse_host_message(text: &str) -> Result<HostMessage> {
    let Discriminator { event } = serde_json::from_str(text)?;

    if !HostEvent::is_known(&event) {
        return Ok(HostMessage::Unknown(event));
    }

    let event: HostEvent = serde_json::from_str(text)?;
    Ok(HostMessage::Event(event))
}
