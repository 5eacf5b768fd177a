//! Per-event handlers
//!
//! Each handler runs in its own task, spawned by the router. Handlers touch
//! shared state only through [`SessionStore`] and write to the host only
//! through [`HostSender`].

use std::sync::Arc;
use std::time::Duration;

use mcdeck_core::prelude::*;
use mcdeck_core::{
    button_state_for, AppearanceEvent, HostEvent, InspectorMessage, KeyEvent, SendToPluginEvent,
    Settings,
};
use mcdeck_device::PowerControl;
use mcdeck_host::HostSender;

use crate::config::PluginConfig;
use crate::poller::spawn_power_poller;
use crate::session::SessionStore;

/// Timing knobs used by the handlers
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub poll_interval: Duration,
    pub key_down_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self::from(&PluginConfig::default())
    }
}

impl From<&PluginConfig> for Timing {
    fn from(config: &PluginConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            key_down_delay: config.key_down_delay(),
        }
    }
}

/// Dispatches host events to their handlers.
pub struct EventHandler<C> {
    sessions: SessionStore,
    appliance: Arc<C>,
    sender: HostSender,
    timing: Timing,
}

impl<C> EventHandler<C>
where
    C: PowerControl + Send + 'static,
{
    pub fn new(sender: HostSender, appliance: Arc<C>, timing: Timing) -> Self {
        Self {
            sessions: SessionStore::new(),
            appliance,
            sender,
            timing,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one event.
    pub async fn handle(&self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::KeyDown(event) => self.on_key_down(event).await,
            HostEvent::WillAppear(event) => self.will_appear(event),
            HostEvent::WillDisappear(event) => {
                self.will_disappear(&event);
                Ok(())
            }
            HostEvent::SendToPlugin(event) => self.on_send_to_plugin(event).await,
            HostEvent::KeyUp(event) => {
                trace!("keyUp on {}", event.context);
                Ok(())
            }
            HostEvent::TitleParametersDidChange(event) => {
                debug!(
                    "Title of {} changed to {:?}",
                    event.context, event.payload.title
                );
                Ok(())
            }
            HostEvent::DeviceDidConnect(event) => {
                info!(
                    "Device {} connected ({}x{})",
                    event.device, event.device_info.size.columns, event.device_info.size.rows
                );
                Ok(())
            }
            HostEvent::DeviceDidDisconnect(event) => {
                info!("Device {} disconnected", event.device);
                Ok(())
            }
            HostEvent::ApplicationDidLaunch(event) => {
                debug!("Application launched: {}", event.payload.application);
                Ok(())
            }
            HostEvent::ApplicationDidTerminate(event) => {
                debug!("Application terminated: {}", event.payload.application);
                Ok(())
            }
        }
    }

    /// Toggle the appliance, then push the new state after the feedback delay.
    ///
    /// A failed toggle shows an alert on the key. A failed follow-up query
    /// sends nothing; the next poll corrects the button.
    async fn on_key_down(&self, event: KeyEvent) -> Result<()> {
        let settings = Settings::from_payload(&event.payload.settings)?;
        let context = event.context;

        if let Err(e) = self.appliance.toggle_power(&settings.ip).await {
            warn!("Toggle on {} failed: {}", settings.ip, e);
            if let Err(alert_err) = self.sender.show_alert(&context).await {
                warn!("Failed to show alert on {}: {}", context, alert_err);
            }
            return Err(e);
        }

        let on = self.appliance.query_power(&settings.ip).await?;
        let state = button_state_for(on);

        let sender = self.sender.clone();
        let delay = self.timing.key_down_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = sender.set_state(&context, state).await {
                warn!("Failed to push state for {}: {}", context, e);
            }
        });
        Ok(())
    }

    /// Store the session and start its poller.
    ///
    /// Synchronous so the read loop can apply appear and disappear in frame
    /// order.
    pub fn will_appear(&self, event: AppearanceEvent) -> Result<()> {
        let settings = Settings::from_payload(&event.payload.settings)?;
        let context = event.context;
        debug!("{} appeared (address {:?})", context, settings.ip);

        self.sessions.put(&context, settings);

        let handle = spawn_power_poller(
            context.clone(),
            self.sessions.clone(),
            Arc::clone(&self.appliance),
            self.sender.clone(),
            self.timing.poll_interval,
        );
        if let Some(stale) = self.sessions.set_cancel(&context, handle) {
            stale.cancel();
        }
        Ok(())
    }

    /// Remove the session and stop its poller.
    pub fn will_disappear(&self, event: &AppearanceEvent) {
        debug!("{} disappeared", event.context);
        if let Some(handle) = self.sessions.remove(&event.context) {
            handle.cancel();
        }
    }

    async fn on_send_to_plugin(&self, event: SendToPluginEvent) -> Result<()> {
        let message = InspectorMessage::from_payload(&event.payload)?;

        if message.is_startup() {
            match self.sessions.get(&event.context) {
                Some(settings) => {
                    self.sender
                        .send_to_property_inspector(&event.context, &event.action, &settings)
                        .await?;
                }
                None => trace!("Inspector startup for unknown {}", event.context),
            }
            return Ok(());
        }

        let settings = Settings::from_payload(&event.payload)?;
        self.sender.set_settings(&event.context, &settings).await?;
        if !self.sessions.update_settings(&event.context, settings) {
            debug!("Settings for {} persisted without a session", event.context);
        }
        Ok(())
    }

    /// Stop every poller and forget every session.
    pub fn shutdown(&self) {
        let handles = self.sessions.clear();
        debug!("Stopping {} poller(s)", handles.len());
        for handle in handles {
            handle.cancel();
        }
    }
}
