//! # mcdeck-core - Core Domain Types
//!
//! Foundation crate for the MusicCast deck plugin. Provides the error taxonomy,
//! logging setup, the typed host protocol (inbound events and outbound
//! commands), plugin settings and the power/button-state mapping.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Host Events (`events`)
//! - [`HostEvent`] - Tagged union of every event the host delivers
//! - [`KeyEvent`], [`AppearanceEvent`], [`SendToPluginEvent`] - Per-instance event shapes
//! - [`KNOWN_EVENTS`] - Discriminators this plugin understands
//!
//! ### Outbound Commands (`commands`)
//! - [`OutboundCommand`] - Commands the plugin writes back to the host
//! - [`Registration`] - The first frame sent after connecting
//! - [`Target`] - Where a title/image is shown (software, hardware, both)
//!
//! ### Settings and Power (`settings`, `power`)
//! - [`Settings`] - Per-instance settings (appliance address)
//! - [`PowerState`], [`button_state_for`] - Appliance power and its button index
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Transport / protocol / device / deserialization taxonomy
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use mcdeck_core::prelude::*;
//! ```

pub mod commands;
pub mod error;
pub mod events;
pub mod logging;
pub mod power;
pub mod settings;

/// Prelude for common imports used throughout all plugin crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use commands::{
    ImagePayload, OutboundCommand, ProfilePayload, Registration, StatePayload, Target,
    TitlePayload, UrlPayload,
};
pub use error::{Error, Result, ResultExt};
pub use events::{
    AppearanceEvent, AppearancePayload, ApplicationEvent, ApplicationPayload, Coordinates,
    DeviceDidConnectEvent, DeviceDidDisconnectEvent, DeviceInfo, DeviceSize, HostEvent,
    KeyEvent, KeyPayload, SendToPluginEvent, TitleParameters, TitleParametersDidChangeEvent,
    TitleParametersPayload, KNOWN_EVENTS,
};
pub use power::{button_state_for, PowerState, BUTTON_STATE_OFF, BUTTON_STATE_ON};
pub use settings::{InspectorMessage, Settings, INSPECTOR_STARTUP};
