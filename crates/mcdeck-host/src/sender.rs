//! Outbound command sender shared by every handler and poller.
//!
//! All writes go through one `tokio::sync::Mutex` around the connection's
//! write half, so each command is written as one complete frame even when
//! many tasks send at once. Sends are fire-and-forget: the host never
//! acknowledges them.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Sink, SinkExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

use mcdeck_core::prelude::*;
use mcdeck_core::{OutboundCommand, Registration, Target};

/// Type-erased write half of the host connection.
pub type FrameSink = Pin<Box<dyn Sink<WsMessage, Error = Error> + Send>>;

/// Clonable handle for writing commands to the host.
#[derive(Clone)]
pub struct HostSender {
    sink: Arc<Mutex<FrameSink>>,
}

impl std::fmt::Debug for HostSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostSender")
            .field("sink", &"<websocket>")
            .finish()
    }
}

impl HostSender {
    /// Wrap any frame sink. The WebSocket write half is adapted by
    /// [`crate::connection::connect`].
    pub fn new<S>(sink: S) -> Self
    where
        S: Sink<WsMessage, Error = Error> + Send + 'static,
    {
        Self {
            sink: Arc::new(Mutex::new(Box::pin(sink))),
        }
    }

    /// Serialize `command` and write it as one text frame.
    pub async fn send(&self, command: &OutboundCommand) -> Result<()> {
        let json = serde_json::to_string(command)?;
        trace!("Sending to host: {}", json);
        self.write_text(json).await
    }

    /// Write the registration frame. Must be the first frame on a connection.
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        let json = serde_json::to_string(registration)?;
        self.write_text(json).await
    }

    async fn write_text(&self, json: String) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(WsMessage::Text(json.into())).await
    }

    /// Send a close frame, ignoring errors (the host may already be gone).
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        let _ = sink.send(WsMessage::Close(None)).await;
        let _ = sink.close().await;
    }

    // ─────────────────────────────────────────────────────────
    // Command helpers
    // ─────────────────────────────────────────────────────────

    pub async fn set_state(&self, context: &str, state: u32) -> Result<()> {
        self.send(&OutboundCommand::set_state(context, state)).await
    }

    pub async fn show_alert(&self, context: &str) -> Result<()> {
        self.send(&OutboundCommand::show_alert(context)).await
    }

    pub async fn show_ok(&self, context: &str) -> Result<()> {
        self.send(&OutboundCommand::show_ok(context)).await
    }

    /// Persist settings for an instance in the host's own storage.
    pub async fn set_settings<T: Serialize>(&self, context: &str, settings: &T) -> Result<()> {
        self.send(&OutboundCommand::SetSettings {
            context: context.to_string(),
            payload: serde_json::to_value(settings)?,
        })
        .await
    }

    /// Forward a payload to the instance's property inspector.
    pub async fn send_to_property_inspector<T: Serialize>(
        &self,
        context: &str,
        action: &str,
        payload: &T,
    ) -> Result<()> {
        self.send(&OutboundCommand::SendToPropertyInspector {
            action: action.to_string(),
            context: context.to_string(),
            payload: serde_json::to_value(payload)?,
        })
        .await
    }

    pub async fn set_title(&self, context: &str, title: &str, target: Target) -> Result<()> {
        self.send(&OutboundCommand::set_title(context, title, target))
            .await
    }

    /// `image` is a base64 data URI.
    pub async fn set_image(&self, context: &str, image: &str, target: Target) -> Result<()> {
        self.send(&OutboundCommand::set_image(context, image, target))
            .await
    }

    pub async fn switch_to_profile(&self, context: &str, device: &str, profile: &str) -> Result<()> {
        self.send(&OutboundCommand::switch_to_profile(context, device, profile))
            .await
    }

    pub async fn open_url(&self, url: &str) -> Result<()> {
        self.send(&OutboundCommand::open_url(url)).await
    }
}

// ─────────────────────────────────────────────────────────
// Test support
// ─────────────────────────────────────────────────────────

/// Frames captured by a [`HostSender::new_for_test`] sender.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug)]
pub struct SentFrames {
    rx: tokio::sync::mpsc::UnboundedReceiver<String>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl SentFrames {
    /// Wait for the next frame, parsed as JSON.
    ///
    /// Returns `None` once every sender clone has been dropped.
    pub async fn next(&mut self) -> Option<serde_json::Value> {
        let text = self.rx.recv().await?;
        Some(serde_json::from_str(&text).expect("sent frame is not valid JSON"))
    }

    /// Every frame written so far, parsed as JSON.
    pub fn drain(&mut self) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Ok(text) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&text).expect("sent frame is not valid JSON"));
        }
        frames
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl HostSender {
    /// Create a sender that records text frames instead of writing to a
    /// socket.
    pub fn new_for_test() -> (Self, SentFrames) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        let sink = futures_util::sink::unfold(tx, |tx, frame: WsMessage| async move {
            if let WsMessage::Text(text) = frame {
                tx.send(text.as_str().to_string())
                    .map_err(|_| Error::ChannelClosed)?;
            }
            Ok::<_, Error>(tx)
        });
        (Self::new(sink), SentFrames { rx })
    }
}
