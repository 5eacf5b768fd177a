//! Inbound host event definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every `event` discriminator the plugin knows how to deserialize.
///
/// Frames carrying any other discriminator are skipped by the router.
pub const KNOWN_EVENTS: &[&str] = &[
    "keyDown",
    "keyUp",
    "willAppear",
    "willDisappear",
    "sendToPlugin",
    "titleParametersDidChange",
    "deviceDidConnect",
    "deviceDidDisconnect",
    "applicationDidLaunch",
    "applicationDidTerminate",
];

// ─────────────────────────────────────────────────────────
// Shared payload pieces
// ─────────────────────────────────────────────────────────

/// Position of a key on the physical device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Coordinates {
    pub column: u32,
    pub row: u32,
}

// ─────────────────────────────────────────────────────────
// Per-instance events
// ─────────────────────────────────────────────────────────

/// `keyDown` / `keyUp`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyEvent {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub device: String,
    pub payload: KeyPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    /// Opaque settings blob stored by the host for this instance.
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub state: u32,
    #[serde(default)]
    pub user_desired_state: Option<u32>,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// `willAppear` / `willDisappear`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppearanceEvent {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub device: String,
    pub payload: AppearancePayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearancePayload {
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub state: u32,
    #[serde(default)]
    pub is_in_multi_action: bool,
}

/// `sendToPlugin`: a message from the property inspector.
///
/// The payload is whatever JSON the inspector page posted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendToPluginEvent {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub payload: Value,
}

/// `titleParametersDidChange`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TitleParametersDidChangeEvent {
    pub action: String,
    pub context: String,
    #[serde(default)]
    pub device: String,
    pub payload: TitleParametersPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleParametersPayload {
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub settings: Value,
    #[serde(default)]
    pub state: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_parameters: TitleParameters,
}

/// Font and layout of a key title
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleParameters {
    pub font_family: String,
    pub font_size: u32,
    pub font_style: String,
    pub font_underline: bool,
    pub show_title: bool,
    pub title_alignment: String,
    pub title_color: String,
}

// ─────────────────────────────────────────────────────────
// Global events
// ─────────────────────────────────────────────────────────

/// `deviceDidConnect`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDidConnectEvent {
    pub device: String,
    #[serde(default)]
    pub device_info: DeviceInfo,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceInfo {
    #[serde(rename = "type", default)]
    pub kind: u32,
    #[serde(default)]
    pub size: DeviceSize,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct DeviceSize {
    pub columns: u32,
    pub rows: u32,
}

/// `deviceDidDisconnect`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceDidDisconnectEvent {
    pub device: String,
}

/// `applicationDidLaunch` / `applicationDidTerminate`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplicationEvent {
    pub payload: ApplicationPayload,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplicationPayload {
    pub application: String,
}

// ─────────────────────────────────────────────────────────
// HostEvent Enum
// ─────────────────────────────────────────────────────────

/// Fully typed host event, discriminated by the frame's `event` field
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum HostEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    WillAppear(AppearanceEvent),
    WillDisappear(AppearanceEvent),
    SendToPlugin(SendToPluginEvent),
    TitleParametersDidChange(TitleParametersDidChangeEvent),
    DeviceDidConnect(DeviceDidConnectEvent),
    DeviceDidDisconnect(DeviceDidDisconnectEvent),
    ApplicationDidLaunch(ApplicationEvent),
    ApplicationDidTerminate(ApplicationEvent),
}

impl HostEvent {
    /// Whether `name` is a discriminator this enum can deserialize
    pub fn is_known(name: &str) -> bool {
        KNOWN_EVENTS.contains(&name)
    }

    /// The wire discriminator of this event
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::KeyDown(_) => "keyDown",
            HostEvent::KeyUp(_) => "keyUp",
            HostEvent::WillAppear(_) => "willAppear",
            HostEvent::WillDisappear(_) => "willDisappear",
            HostEvent::SendToPlugin(_) => "sendToPlugin",
            HostEvent::TitleParametersDidChange(_) => "titleParametersDidChange",
            HostEvent::DeviceDidConnect(_) => "deviceDidConnect",
            HostEvent::DeviceDidDisconnect(_) => "deviceDidDisconnect",
            HostEvent::ApplicationDidLaunch(_) => "applicationDidLaunch",
            HostEvent::ApplicationDidTerminate(_) => "applicationDidTerminate",
        }
    }

    /// Instance identifier, for events scoped to one placed action
    pub fn context(&self) -> Option<&str> {
        match self {
            HostEvent::KeyDown(e) | HostEvent::KeyUp(e) => Some(&e.context),
            HostEvent::WillAppear(e) | HostEvent::WillDisappear(e) => Some(&e.context),
            HostEvent::SendToPlugin(e) => Some(&e.context),
            HostEvent::TitleParametersDidChange(e) => Some(&e.context),
            _ => None,
        }
    }
}
