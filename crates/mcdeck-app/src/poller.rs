//! Background power poller
//!
//! One poller runs per visible instance. Every interval it reads the
//! instance's current address from the [`SessionStore`], asks the appliance
//! for its power state, and pushes the matching button state to the host.
//! Failures are logged and retried on the next tick; only cancellation ends
//! the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use mcdeck_core::button_state_for;
use mcdeck_core::prelude::*;
use mcdeck_device::PowerControl;
use mcdeck_host::HostSender;

use crate::session::{PollerHandle, SessionStore};

/// What a single poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The session is gone; nothing to do.
    NoSession,
    /// No address configured yet.
    Unconfigured,
    /// The appliance query failed.
    Failed,
    /// Cancelled between query and send.
    Cancelled,
    /// Button state was sent.
    Updated(u32),
}

/// Spawn a poller for `context` and return its handle.
///
/// The first poll happens one full `interval` after spawning; the key press
/// and appear paths push their own initial state.
pub fn spawn_power_poller<C>(
    context: String,
    sessions: SessionStore,
    appliance: Arc<C>,
    sender: HostSender,
    interval: Duration,
) -> PollerHandle
where
    C: PowerControl + Send + 'static,
{
    let (handle, shutdown_rx) = PollerHandle::channel();
    let task = tokio::spawn(run_poller(
        context,
        sessions,
        appliance,
        sender,
        interval,
        shutdown_rx,
    ));
    handle.with_task(task)
}

async fn run_poller<C>(
    context: String,
    sessions: SessionStore,
    appliance: Arc<C>,
    sender: HostSender,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    C: PowerControl + Send + 'static,
{
    debug!("Power poller started for {} (every {:?})", context, interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval() fires immediately; skip that tick.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                let outcome =
                    poll_once(&context, &sessions, appliance.as_ref(), &sender, &shutdown_rx).await;
                trace!("Poll for {}: {:?}", context, outcome);
            }
        }
    }

    debug!("Power poller stopped for {}", context);
}

/// Run one poll for `context`.
pub async fn poll_once<C>(
    context: &str,
    sessions: &SessionStore,
    appliance: &C,
    sender: &HostSender,
    shutdown_rx: &watch::Receiver<bool>,
) -> PollOutcome
where
    C: PowerControl,
{
    let Some(settings) = sessions.get(context) else {
        return PollOutcome::NoSession;
    };

    if !settings.is_configured() {
        debug!("No address configured for {}, skipping poll", context);
        return PollOutcome::Unconfigured;
    }

    let on = match appliance.query_power(&settings.ip).await {
        Ok(on) => on,
        Err(e) => {
            warn!("Power query to {} failed: {}", settings.ip, e);
            return PollOutcome::Failed;
        }
    };

    if *shutdown_rx.borrow() {
        return PollOutcome::Cancelled;
    }

    let state = button_state_for(on);
    if let Err(e) = sender.set_state(context, state).await {
        warn!("Failed to push state for {}: {}", context, e);
        return PollOutcome::Failed;
    }
    PollOutcome::Updated(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PollerState;
    use mcdeck_core::{Settings, BUTTON_STATE_OFF, BUTTON_STATE_ON};
    use mcdeck_device::test_utils::FakeAppliance;
    use serde_json::json;

    fn store_with(context: &str, ip: &str) -> SessionStore {
        let store = SessionStore::new();
        store.put(context, Settings { ip: ip.to_string() });
        store
    }

    #[tokio::test]
    async fn test_poll_once_on_sends_zero() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = FakeAppliance::new(true);
        let (sender, mut frames) = HostSender::new_for_test();
        let (_handle, rx) = PollerHandle::channel();

        let outcome = poll_once("ctx", &sessions, &appliance, &sender, &rx).await;
        assert_eq!(outcome, PollOutcome::Updated(BUTTON_STATE_ON));
        assert_eq!(
            frames.next().await.unwrap(),
            json!({"event": "setState", "context": "ctx", "payload": {"state": 0}})
        );
        assert_eq!(appliance.addresses(), vec!["10.0.0.5"]);
    }

    #[tokio::test]
    async fn test_poll_once_standby_sends_one() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = FakeAppliance::new(false);
        let (sender, _frames) = HostSender::new_for_test();
        let (_handle, rx) = PollerHandle::channel();

        let outcome = poll_once("ctx", &sessions, &appliance, &sender, &rx).await;
        assert_eq!(outcome, PollOutcome::Updated(BUTTON_STATE_OFF));
    }

    #[tokio::test]
    async fn test_poll_once_without_session() {
        let sessions = SessionStore::new();
        let appliance = FakeAppliance::new(true);
        let (sender, mut frames) = HostSender::new_for_test();
        let (_handle, rx) = PollerHandle::channel();

        let outcome = poll_once("ctx", &sessions, &appliance, &sender, &rx).await;
        assert_eq!(outcome, PollOutcome::NoSession);
        assert_eq!(appliance.query_count(), 0);
        assert!(frames.drain().is_empty());
    }

    #[tokio::test]
    async fn test_poll_once_unconfigured_skips_query() {
        let sessions = store_with("ctx", "");
        let appliance = FakeAppliance::new(true);
        let (sender, _frames) = HostSender::new_for_test();
        let (_handle, rx) = PollerHandle::channel();

        let outcome = poll_once("ctx", &sessions, &appliance, &sender, &rx).await;
        assert_eq!(outcome, PollOutcome::Unconfigured);
        assert_eq!(appliance.query_count(), 0);
    }

    #[tokio::test]
    async fn test_poll_once_failure_sends_nothing() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = FakeAppliance::unreachable();
        let (sender, mut frames) = HostSender::new_for_test();
        let (_handle, rx) = PollerHandle::channel();

        let outcome = poll_once("ctx", &sessions, &appliance, &sender, &rx).await;
        assert_eq!(outcome, PollOutcome::Failed);
        assert!(frames.drain().is_empty());
    }

    #[tokio::test]
    async fn test_poll_once_device_error_sends_nothing() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = FakeAppliance::new(true);
        appliance.set_device_code(5);
        let (sender, mut frames) = HostSender::new_for_test();
        let (_handle, rx) = PollerHandle::channel();

        let outcome = poll_once("ctx", &sessions, &appliance, &sender, &rx).await;
        assert_eq!(outcome, PollOutcome::Failed);
        assert_eq!(appliance.query_count(), 1);
        assert!(frames.drain().is_empty());
    }

    #[tokio::test]
    async fn test_poll_once_after_cancel_sends_nothing() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = FakeAppliance::new(true);
        let (sender, mut frames) = HostSender::new_for_test();
        let (handle, rx) = PollerHandle::channel();
        handle.cancel();

        let outcome = poll_once("ctx", &sessions, &appliance, &sender, &rx).await;
        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(frames.drain().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_ticks_each_interval() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = Arc::new(FakeAppliance::new(true));
        let (sender, mut frames) = HostSender::new_for_test();

        let handle = spawn_power_poller(
            "ctx".to_string(),
            sessions.clone(),
            appliance.clone(),
            sender,
            Duration::from_secs(10),
        );

        // Nothing before the first full interval.
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(frames.drain().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(frames.drain().len(), 1);

        appliance.set_on(false);
        tokio::time::sleep(Duration::from_secs(10)).await;
        let sent = frames.drain();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["payload"]["state"], 1);

        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_follows_address_changes() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = Arc::new(FakeAppliance::new(true));
        let (sender, _frames) = HostSender::new_for_test();

        let handle = spawn_power_poller(
            "ctx".to_string(),
            sessions.clone(),
            appliance.clone(),
            sender,
            Duration::from_secs(10),
        );

        tokio::time::sleep(Duration::from_secs(11)).await;
        sessions.update_settings("ctx", Settings { ip: "10.0.0.9".to_string() });
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(appliance.addresses(), vec!["10.0.0.5", "10.0.0.9"]);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_survives_failures() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = Arc::new(FakeAppliance::unreachable());
        let (sender, mut frames) = HostSender::new_for_test();

        let handle = spawn_power_poller(
            "ctx".to_string(),
            sessions,
            appliance.clone(),
            sender,
            Duration::from_secs(10),
        );

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(appliance.addresses().len(), 3);
        assert!(frames.drain().is_empty());
        assert_eq!(handle.state(), PollerState::Running);

        appliance.set_reachable(true);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(frames.drain().len(), 1);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_survives_device_errors() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = Arc::new(FakeAppliance::new(true));
        appliance.set_device_code(5);
        let (sender, mut frames) = HostSender::new_for_test();

        let handle = spawn_power_poller(
            "ctx".to_string(),
            sessions,
            appliance.clone(),
            sender,
            Duration::from_secs(10),
        );

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(appliance.query_count(), 3);
        assert!(frames.drain().is_empty());
        assert_eq!(handle.state(), PollerState::Running);

        appliance.set_device_code(0);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(frames.drain().len(), 1);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_poller() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = Arc::new(FakeAppliance::new(true));
        let (sender, mut frames) = HostSender::new_for_test();

        let handle = spawn_power_poller(
            "ctx".to_string(),
            sessions,
            appliance.clone(),
            sender,
            Duration::from_secs(10),
        );

        tokio::time::sleep(Duration::from_secs(5)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(appliance.query_count(), 0);
        assert!(frames.drain().is_empty());
        assert_eq!(handle.state(), PollerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_poller() {
        let sessions = store_with("ctx", "10.0.0.5");
        let appliance = Arc::new(FakeAppliance::new(true));
        let (sender, _frames) = HostSender::new_for_test();

        let handle = spawn_power_poller(
            "ctx".to_string(),
            sessions,
            appliance.clone(),
            sender,
            Duration::from_secs(10),
        );
        drop(handle);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(appliance.query_count(), 0);
    }
}
