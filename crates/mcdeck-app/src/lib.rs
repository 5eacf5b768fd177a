//! # mcdeck-app - Plugin Runtime
//!
//! Ties the host connection and the appliance client together: the session
//! store, one background poller per visible instance, the per-event handlers
//! and the read loop that feeds them.
//!
//! ## Public API
//!
//! - [`run()`] - Connect to the host and serve until it disconnects
//! - [`run_with_appliance()`] - Same, with a caller-supplied [`PowerControl`]
//! - [`SessionStore`] - Per-instance settings and poller handles
//! - [`EventHandler`] - Handlers for every host event
//! - [`PluginConfig`], [`load_config()`] - Runtime tunables

pub mod bootstrap;
pub mod config;
pub mod handler;
pub mod poller;
pub mod router;
pub mod session;

use std::sync::Arc;

use mcdeck_core::prelude::*;
use mcdeck_device::{MusicCastClient, PowerControl};

pub use bootstrap::{Bootstrap, HostInfo};
pub use config::{default_config_path, load_config, PluginConfig};
pub use handler::{EventHandler, Timing};
pub use poller::{poll_once, spawn_power_poller, PollOutcome};
pub use router::run_event_loop;
pub use session::{PollerHandle, PollerState, Session, SessionStore};

/// Connect to the host and serve events with a real receiver client.
pub async fn run(bootstrap: Bootstrap, config: PluginConfig) -> Result<()> {
    let client = MusicCastClient::new(config.client_options())
        .context("Failed to build appliance client")?;
    run_with_appliance(bootstrap, config, Arc::new(client)).await
}

/// Connect to the host and serve events until the connection ends.
///
/// Every poller is stopped before returning, whether the loop ended cleanly
/// or with an error.
pub async fn run_with_appliance<C>(
    bootstrap: Bootstrap,
    config: PluginConfig,
    appliance: Arc<C>,
) -> Result<()>
where
    C: PowerControl + Send + 'static,
{
    if let Some(info) = bootstrap.host_info() {
        info.log_summary();
    }

    let registration = bootstrap.registration();
    let (sender, mut frames) = mcdeck_host::connect(bootstrap.port, &registration).await?;

    let handler = Arc::new(EventHandler::new(
        sender.clone(),
        appliance,
        Timing::from(&config),
    ));

    let result = run_event_loop(&mut frames, Arc::clone(&handler)).await;

    handler.shutdown();
    sender.close().await;

    match &result {
        Ok(()) => info!("Plugin finished"),
        Err(e) => error!("Plugin stopped: {}", e),
    }
    result
}
