//! Wall-clock timestamps with millisecond precision.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// Serialized as a bare integer so records stay readable by other clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp at the current time.
    ///
    /// A clock set before the epoch yields the epoch itself.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Creates a timestamp from milliseconds since the epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Creates a timestamp from whole seconds since the epoch.
    pub fn from_secs(secs: i64) -> Result<Self> {
        secs.checked_mul(1000)
            .map(Self)
            .ok_or_else(|| Error::InvalidTimestamp(format!("{secs}s overflows")))
    }

    /// Returns milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Returns whole seconds since the epoch.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        self.0.div_euclid(1000)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}
