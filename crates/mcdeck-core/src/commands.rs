//! Outbound commands written by the plugin to the host connection

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a title or image is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Only in the host's software UI
    Software,
    /// Only on the physical device
    Hardware,
    #[default]
    Both,
}

/// First frame after connecting; the event name is chosen by the host at launch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Registration {
    pub event: String,
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatePayload {
    pub state: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TitlePayload {
    pub title: String,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImagePayload {
    /// Base64 data URI of the image.
    pub image: String,
    pub target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfilePayload {
    pub profile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UrlPayload {
    pub url: String,
}

/// A command the plugin may send to the host.
///
/// Each variant serializes to one JSON frame with its own `event` field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum OutboundCommand {
    SetState {
        context: String,
        payload: StatePayload,
    },
    ShowAlert {
        context: String,
    },
    ShowOk {
        context: String,
    },
    SetSettings {
        context: String,
        payload: Value,
    },
    SendToPropertyInspector {
        action: String,
        context: String,
        payload: Value,
    },
    SetTitle {
        context: String,
        payload: TitlePayload,
    },
    SetImage {
        context: String,
        payload: ImagePayload,
    },
    SwitchToProfile {
        context: String,
        device: String,
        payload: ProfilePayload,
    },
    OpenUrl {
        payload: UrlPayload,
    },
}

impl OutboundCommand {
    pub fn set_state(context: impl Into<String>, state: u32) -> Self {
        Self::SetState {
            context: context.into(),
            payload: StatePayload { state },
        }
    }

    pub fn show_alert(context: impl Into<String>) -> Self {
        Self::ShowAlert {
            context: context.into(),
        }
    }

    pub fn show_ok(context: impl Into<String>) -> Self {
        Self::ShowOk {
            context: context.into(),
        }
    }

    pub fn set_title(context: impl Into<String>, title: impl Into<String>, target: Target) -> Self {
        Self::SetTitle {
            context: context.into(),
            payload: TitlePayload {
                title: title.into(),
                target,
            },
        }
    }

    pub fn set_image(context: impl Into<String>, image: impl Into<String>, target: Target) -> Self {
        Self::SetImage {
            context: context.into(),
            payload: ImagePayload {
                image: image.into(),
                target,
            },
        }
    }

    pub fn switch_to_profile(
        context: impl Into<String>,
        device: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        Self::SwitchToProfile {
            context: context.into(),
            device: device.into(),
            payload: ProfilePayload {
                profile: profile.into(),
            },
        }
    }

    pub fn open_url(url: impl Into<String>) -> Self {
        Self::OpenUrl {
            payload: UrlPayload { url: url.into() },
        }
    }

    /// Instance the command is addressed to (`openUrl` is global)
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::SetState { context, .. }
            | Self::ShowAlert { context }
            | Self::ShowOk { context }
            | Self::SetSettings { context, .. }
            | Self::SendToPropertyInspector { context, .. }
            | Self::SetTitle { context, .. }
            | Self::SetImage { context, .. }
            | Self::SwitchToProfile { context, .. } => Some(context),
            Self::OpenUrl { .. } => None,
        }
    }
}
