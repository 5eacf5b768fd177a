//! Per-instance plugin settings exchanged with the host and the inspector

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Inspector message type asking the plugin to echo the current settings.
pub const INSPECTOR_STARTUP: &str = "startup";

/// Settings of one placed action.
///
/// An empty `ip` is valid and means no appliance has been configured yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Network address (IP or host name) of the receiver.
    #[serde(rename = "IP", alias = "ip", default)]
    pub ip: String,
}

impl Settings {
    /// Parse settings from a host-supplied JSON payload.
    ///
    /// `null` (absent payload) yields the default settings.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        if payload.is_null() {
            return Ok(Self::default());
        }
        Ok(Settings::deserialize(payload)?)
    }

    pub fn to_payload(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn is_configured(&self) -> bool {
        !self.ip.trim().is_empty()
    }
}

/// Discriminator of a `sendToPlugin` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectorMessage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl InspectorMessage {
    pub fn from_payload(payload: &Value) -> Result<Self> {
        if payload.is_null() {
            return Ok(Self::default());
        }
        Ok(InspectorMessage::deserialize(payload)?)
    }

    pub fn is_startup(&self) -> bool {
        self.kind.as_deref() == Some(INSPECTOR_STARTUP)
    }
}
