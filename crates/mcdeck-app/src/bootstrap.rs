//! Launch parameters handed over by the host

use serde::Deserialize;

use mcdeck_core::prelude::*;
use mcdeck_core::Registration;

/// Everything the host passes on the command line
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub port: u16,
    pub plugin_uuid: String,
    pub register_event: String,
    /// Raw `-info` JSON, if supplied.
    pub info: Option<String>,
}

impl Bootstrap {
    pub fn registration(&self) -> Registration {
        Registration {
            event: self.register_event.clone(),
            uuid: self.plugin_uuid.clone(),
        }
    }

    /// Parse `-info`. Absent or unparseable info yields `None` (logged).
    pub fn host_info(&self) -> Option<HostInfo> {
        let raw = self.info.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Could not parse host info: {}", e);
                None
            }
        }
    }
}

/// Host environment description from `-info`.
///
/// Only used for logging, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostInfo {
    pub application: ApplicationInfo,
    pub plugin: PluginInfo,
    pub devices: Vec<HostDevice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationInfo {
    pub language: String,
    pub platform: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostDevice {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u32,
    pub size: mcdeck_core::DeviceSize,
}

impl HostInfo {
    pub fn log_summary(&self) {
        info!(
            "Host {} on {} ({}), plugin {}",
            self.application.version,
            self.application.platform,
            self.application.language,
            self.plugin.version
        );
        for device in &self.devices {
            debug!(
                "Device {} {:?}: {}x{}",
                device.id, device.name, device.size.columns, device.size.rows
            );
        }
    }
}
