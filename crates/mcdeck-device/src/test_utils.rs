//! Test utilities for appliance-dependent code
//!
//! Provides [`FakeAppliance`], an in-memory [`PowerControl`] whose
//! reachability and error behaviour can be flipped at runtime.

use std::sync::Mutex;

use mcdeck_core::prelude::*;
use mcdeck_core::PowerState;

use crate::client::PowerControl;

#[derive(Debug, Default)]
struct FakeState {
    on: bool,
    unreachable: bool,
    device_code: i64,
    queries: usize,
    toggles: usize,
    sets: Vec<PowerState>,
    addresses: Vec<String>,
}

/// In-memory appliance that records every call.
#[derive(Debug, Default)]
pub struct FakeAppliance {
    state: Mutex<FakeState>,
}

impl FakeAppliance {
    /// A reachable appliance in the given power state.
    pub fn new(on: bool) -> Self {
        Self {
            state: Mutex::new(FakeState {
                on,
                ..Default::default()
            }),
        }
    }

    /// An appliance whose every call fails with [`Error::Transport`].
    pub fn unreachable() -> Self {
        let fake = Self::default();
        fake.set_reachable(false);
        fake
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.lock().unreachable = !reachable;
    }

    /// Make status queries report this application-level code (0 = success).
    pub fn set_device_code(&self, code: i64) {
        self.lock().device_code = code;
    }

    pub fn set_on(&self, on: bool) {
        self.lock().on = on;
    }

    pub fn is_on(&self) -> bool {
        self.lock().on
    }

    pub fn query_count(&self) -> usize {
        self.lock().queries
    }

    pub fn toggle_count(&self) -> usize {
        self.lock().toggles
    }

    pub fn set_calls(&self) -> Vec<PowerState> {
        self.lock().sets.clone()
    }

    /// Every address passed to any call, in call order.
    pub fn addresses(&self) -> Vec<String> {
        self.lock().addresses.clone()
    }

    fn record(&self, address: &str) -> Result<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.lock();
        state.addresses.push(address.to_string());
        if state.unreachable {
            return Err(Error::transport(format!("{address} is unreachable")));
        }
        Ok(state)
    }
}

impl PowerControl for FakeAppliance {
    async fn query_power(&self, address: &str) -> Result<bool> {
        let mut state = self.record(address)?;
        state.queries += 1;
        if state.device_code != 0 {
            return Err(Error::device(state.device_code));
        }
        Ok(state.on)
    }

    async fn set_power(&self, address: &str, desired: PowerState) -> Result<()> {
        let mut state = self.record(address)?;
        state.sets.push(desired);
        match desired {
            PowerState::On => state.on = true,
            PowerState::Standby => state.on = false,
            PowerState::Toggle => state.on = !state.on,
        }
        Ok(())
    }

    async fn toggle_power(&self, address: &str) -> Result<()> {
        let mut state = self.record(address)?;
        state.toggles += 1;
        state.on = !state.on;
        Ok(())
    }
}
