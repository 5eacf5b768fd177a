//! `getStatus` response parsing

use serde::Deserialize;

use mcdeck_core::prelude::*;

/// Power value the receiver reports while switched off.
pub const POWER_STANDBY: &str = "standby";

/// Subset of the receiver's `main/getStatus` response.
///
/// `response_code` is the application-level result; anything but `0` means the
/// receiver rejected the request even though HTTP succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplianceStatus {
    pub response_code: i64,
    #[serde(default)]
    pub power: String,
}

impl ApplianceStatus {
    /// Whether the receiver is on.
    ///
    /// # Errors
    ///
    /// [`Error::Device`] when `response_code` is non-zero.
    pub fn is_on(&self) -> Result<bool> {
        if self.response_code != 0 {
            return Err(Error::device(self.response_code));
        }
        Ok(self.power != POWER_STANDBY)
    }
}

/// Parse a `getStatus` body.
///
/// # Errors
///
/// [`Error::Protocol`] when the body is not the expected JSON object.
pub fn parse_status(body: &str) -> Result<ApplianceStatus> {
    serde_json::from_str(body)
        .map_err(|e| Error::protocol(format!("Malformed getStatus body: {e}")))
}
