//! Session store - per-instance settings and poller ownership
//!
//! One session exists for every action instance currently visible on the
//! deck, keyed by the host's opaque context string. The store is shared by
//! every handler task and every poller, so all access goes through one
//! mutex and no lock is held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use mcdeck_core::Settings;

/// Lifecycle of a background poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Running,
    Stopped,
}

/// Cancellation handle for one background poller.
///
/// Dropping the handle also stops the poller: its shutdown receiver sees the
/// sender go away on the next `changed()`.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Create a handle and the receiver the poller task listens on.
    pub fn channel() -> (Self, watch::Receiver<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        (
            Self {
                shutdown_tx,
                task: None,
            },
            shutdown_rx,
        )
    }

    /// Attach the spawned task so [`PollerHandle::state`] can report on it.
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// Ask the poller to stop. Idempotent.
    pub fn cancel(&self) {
        // Err only means the poller already exited.
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    pub fn state(&self) -> PollerState {
        match &self.task {
            Some(task) if !task.is_finished() => PollerState::Running,
            Some(_) => PollerState::Stopped,
            None if self.shutdown_tx.is_closed() => PollerState::Stopped,
            None => PollerState::Running,
        }
    }
}

/// State of one visible action instance
#[derive(Debug)]
pub struct Session {
    pub settings: Settings,
    poller: Option<PollerHandle>,
}

/// Thread-safe map of context → [`Session`]
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert or replace the settings of `context`.
    ///
    /// An existing session keeps its poller; only the settings change.
    pub fn put(&self, context: &str, settings: Settings) {
        let mut sessions = self.lock();
        match sessions.get_mut(context) {
            Some(session) => session.settings = settings,
            None => {
                sessions.insert(
                    context.to_string(),
                    Session {
                        settings,
                        poller: None,
                    },
                );
            }
        }
    }

    /// Replace the settings of an existing session.
    ///
    /// Returns `false` (and stores nothing) when `context` has no session.
    pub fn update_settings(&self, context: &str, settings: Settings) -> bool {
        match self.lock().get_mut(context) {
            Some(session) => {
                session.settings = settings;
                true
            }
            None => false,
        }
    }

    /// Snapshot of the settings of `context`.
    pub fn get(&self, context: &str) -> Option<Settings> {
        self.lock().get(context).map(|s| s.settings.clone())
    }

    /// Attach a poller to `context`.
    ///
    /// Returns the handle the caller must cancel: the previous poller when
    /// one is replaced, or `handle` itself when the session no longer exists
    /// (it disappeared while the poller was being started).
    #[must_use = "the returned poller must be cancelled"]
    pub fn set_cancel(&self, context: &str, handle: PollerHandle) -> Option<PollerHandle> {
        match self.lock().get_mut(context) {
            Some(session) => session.poller.replace(handle),
            None => Some(handle),
        }
    }

    /// Remove `context`, returning its poller handle if it had one.
    pub fn remove(&self, context: &str) -> Option<PollerHandle> {
        self.lock().remove(context).and_then(|s| s.poller)
    }

    /// Remove every session, returning their poller handles.
    pub fn clear(&self) -> Vec<PollerHandle> {
        self.lock()
            .drain()
            .filter_map(|(_, session)| session.poller)
            .collect()
    }

    pub fn contains(&self, context: &str) -> bool {
        self.lock().contains_key(context)
    }

    pub fn has_poller(&self, context: &str) -> bool {
        self.lock()
            .get(context)
            .is_some_and(|session| session.poller.is_some())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
