//! Link data: hotspot placement and time-offset rules.

use serde::{Deserialize, Serialize};

use super::camera_name::CameraName;
use super::time::Timestamp;

/// Position of a link's clickable overlay, as percentages of the player area.
///
/// Purely a UI concern; the swap logic never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hotspot {
    /// Horizontal offset from the left edge (percent).
    pub x: f64,
    /// Vertical offset from the top edge (percent).
    pub y: f64,
}

impl Hotspot {
    /// Create a hotspot at `(x, y)` percent.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Calibration point for a link: the moment `source` in the outgoing camera
/// shows the same instant of the event as `destination` in the incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Timestamp in the source camera.
    pub source: Timestamp,
    /// Matching timestamp in the destination camera.
    pub destination: Timestamp,
}

impl Calibration {
    /// Create a calibration from source and destination seconds.
    pub fn new(source_secs: f64, destination_secs: f64) -> Self {
        Self {
            source: Timestamp::from_secs(source_secs),
            destination: Timestamp::from_secs(destination_secs),
        }
    }

    /// Whether both timestamps are finite and not before the start.
    pub fn is_valid(&self) -> bool {
        self.source.is_finite()
            && self.destination.is_finite()
            && self.source.as_secs() >= 0.0
            && self.destination.as_secs() >= 0.0
    }
}

/// How a link maps elapsed time in the source camera to a seek target.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OffsetRule {
    /// No calibration declared: the elapsed time is carried over unchanged.
    #[default]
    CarryOver,
    /// Affine mapping through a calibration point.
    Calibrated(Calibration),
}

impl OffsetRule {
    /// Build a rule from an optional calibration.
    pub fn from_calibration(calibration: Option<Calibration>) -> Self {
        calibration.map_or(Self::CarryOver, Self::Calibrated)
    }

    /// Map `elapsed` in the source camera to a seek target in the destination.
    ///
    /// `seek = destination + (elapsed - source)`, clamped to zero.
    pub fn apply(&self, elapsed: Timestamp) -> Timestamp {
        match self {
            OffsetRule::CarryOver => elapsed.clamp_to_start(),
            OffsetRule::Calibrated(cal) => cal
                .destination
                .offset_by(elapsed.secs_since(cal.source))
                .clamp_to_start(),
        }
    }

    /// Whether a calibration point is attached.
    pub fn is_calibrated(&self) -> bool {
        matches!(self, OffsetRule::Calibrated(_))
    }
}

/// A directed link declared on a camera.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDefinition {
    /// Camera the viewer lands on.
    pub destination: CameraName,
    /// Where the link's overlay is drawn on the source camera.
    pub hotspot: Hotspot,
    /// Optional time calibration; `None` means straight carry-over.
    pub calibration: Option<Calibration>,
}

impl LinkDefinition {
    /// Create an uncalibrated link.
    pub fn new(destination: impl Into<CameraName>, hotspot: Hotspot) -> Self {
        Self {
            destination: destination.into(),
            hotspot,
            calibration: None,
        }
    }

    /// Attach a calibration point.
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Offset rule derived from the calibration.
    pub fn offset_rule(&self) -> OffsetRule {
        OffsetRule::from_calibration(self.calibration)
    }
}
