//! Appliance power state and its mapping onto the host's button states

/// Button state index shown while the appliance is on.
///
/// The action's state list has the "on" artwork first, so the index is the
/// inverse of a naive `on => 1` mapping.
pub const BUTTON_STATE_ON: u32 = 0;

/// Button state index shown while the appliance is in standby.
pub const BUTTON_STATE_OFF: u32 = 1;

/// Desired appliance power, as accepted by `setPower`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Standby,
    Toggle,
}

impl PowerState {
    /// Value of the `power` query parameter
    pub fn as_query(self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Standby => "standby",
            PowerState::Toggle => "toggle",
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on {
            PowerState::On
        } else {
            PowerState::Standby
        }
    }
}

/// Button state the host should display for the given appliance power
pub fn button_state_for(on: bool) -> u32 {
    if on {
        BUTTON_STATE_ON
    } else {
        BUTTON_STATE_OFF
    }
}
