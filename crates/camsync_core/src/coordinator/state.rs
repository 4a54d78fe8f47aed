//! Swap state and the values transitions report back.

use std::fmt;

use serde::Serialize;

use crate::models::{CameraName, Timestamp};

/// The single piece of mutable swap state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "camera", rename_all = "snake_case")]
pub enum SwapState {
    /// No camera has been activated yet.
    #[default]
    Inactive,
    /// `camera` is the active camera.
    ActiveOn(CameraName),
}

impl SwapState {
    /// The active camera, if any.
    pub fn active(&self) -> Option<&CameraName> {
        match self {
            SwapState::Inactive => None,
            SwapState::ActiveOn(camera) => Some(camera),
        }
    }

    /// Whether `camera` is the active camera.
    pub fn is_active(&self, camera: &CameraName) -> bool {
        self.active() == Some(camera)
    }
}

impl fmt::Display for SwapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapState::Inactive => write!(f, "inactive"),
            SwapState::ActiveOn(camera) => write!(f, "active on '{}'", camera),
        }
    }
}

/// Notification sent to listeners whenever the active camera changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationChange {
    /// Camera that lost the active designation.
    pub previous: Option<CameraName>,
    /// Camera that holds it now.
    pub current: Option<CameraName>,
}

/// Callback used by hosts to restyle affordances when the active camera changes.
pub type ActivationListener = Box<dyn Fn(&ActivationChange) + Send + Sync>;

/// A completed swap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapRecord {
    /// Outgoing camera.
    pub from: CameraName,
    /// Incoming camera.
    pub to: CameraName,
    /// Elapsed time read from the outgoing camera after pausing it.
    pub elapsed: Timestamp,
    /// Position the incoming camera was seeked to.
    pub seek_target: Timestamp,
    /// Whether the link carried a calibration point.
    pub calibrated: bool,
}

/// Why a request left the state untouched without issuing player calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A swap was requested before any camera was activated.
    NoActiveCamera,
    /// The request targets the camera that is already active.
    AlreadyActive { camera: CameraName },
    /// The request came from an affordance of a camera that is no longer active.
    StaleSource {
        requested: CameraName,
        active: CameraName,
    },
    /// A readiness notification arrived with no default activation pending.
    NoPendingActivation { camera: CameraName },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NoActiveCamera => write!(f, "no camera is active"),
            IgnoreReason::AlreadyActive { camera } => {
                write!(f, "camera '{}' is already active", camera)
            }
            IgnoreReason::StaleSource { requested, active } => write!(
                f,
                "request from '{}' but '{}' is active",
                requested, active
            ),
            IgnoreReason::NoPendingActivation { camera } => {
                write!(f, "no activation pending for '{}'", camera)
            }
        }
    }
}

/// Result of an activation or swap request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SwapOutcome {
    /// The first camera was activated.
    Activated(CameraName),
    /// A swap completed.
    Swapped(SwapRecord),
    /// Nothing happened.
    Ignored(IgnoreReason),
}

impl SwapOutcome {
    /// Whether the request was ignored.
    pub fn is_ignored(&self) -> bool {
        matches!(self, SwapOutcome::Ignored(_))
    }

    /// The swap record, if a swap completed.
    pub fn record(&self) -> Option<&SwapRecord> {
        match self {
            SwapOutcome::Swapped(record) => Some(record),
            _ => None,
        }
    }
}
