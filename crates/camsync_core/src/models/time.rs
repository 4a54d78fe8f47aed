//! Playback timestamps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in a camera's media, in seconds from the start.
///
/// Players report and accept fractional seconds, so this wraps an `f64`.
/// Seek targets produced by the link graph are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    /// Start of the media.
    pub const ZERO: Timestamp = Timestamp(0.0);

    /// Create a timestamp from seconds.
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds from the start of the media.
    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// Whether the value is a usable number (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Shift by a signed number of seconds.
    pub fn offset_by(self, delta_secs: f64) -> Self {
        Self(self.0 + delta_secs)
    }

    /// Signed distance in seconds from `earlier` to `self`.
    pub fn secs_since(self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    /// Clamp to the start of the media. Players cannot seek before zero.
    pub fn clamp_to_start(self) -> Self {
        if self.0 < 0.0 {
            Self::ZERO
        } else {
            self
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

impl From<f64> for Timestamp {
    fn from(secs: f64) -> Self {
        Self(secs)
    }
}
