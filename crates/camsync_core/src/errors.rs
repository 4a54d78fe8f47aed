//! Error types for building camera setups and running swaps.
//!
//! Errors are local to the operation that raised them: a failed swap
//! leaves the previously active camera in place and nothing else changes.

use thiserror::Error;

use crate::models::CameraName;

/// Player operation names used in error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerOp {
    Play,
    Pause,
    Seek,
    Elapsed,
}

impl std::fmt::Display for PlayerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerOp::Play => write!(f, "play"),
            PlayerOp::Pause => write!(f, "pause"),
            PlayerOp::Seek => write!(f, "seek"),
            PlayerOp::Elapsed => write!(f, "elapsed"),
        }
    }
}

/// Failure reported by a player adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The backing player has not signalled readiness yet.
    #[error("Player for camera '{camera}' is not ready")]
    NotReady { camera: CameraName },

    /// The backing player rejected or failed an operation.
    #[error("Player for camera '{camera}' failed to {operation}: {message}")]
    Operation {
        camera: CameraName,
        operation: PlayerOp,
        message: String,
    },
}

impl PlayerError {
    /// Create a not-ready error.
    pub fn not_ready(camera: impl Into<CameraName>) -> Self {
        Self::NotReady {
            camera: camera.into(),
        }
    }

    /// Create an operation error.
    pub fn operation(
        camera: impl Into<CameraName>,
        operation: PlayerOp,
        message: impl Into<String>,
    ) -> Self {
        Self::Operation {
            camera: camera.into(),
            operation,
            message: message.into(),
        }
    }

    /// Camera whose player failed.
    pub fn camera(&self) -> &CameraName {
        match self {
            Self::NotReady { camera } | Self::Operation { camera, .. } => camera,
        }
    }

    /// Whether the failure is a readiness problem.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}

/// Errors raised while building or driving a camera setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Malformed or ambiguous camera/link declarations.
    #[error("Invalid camera configuration: {0}")]
    Configuration(String),

    /// A swap was requested along a link that was never declared.
    #[error("No link from camera '{from}' to '{to}'")]
    UnknownDestination { from: CameraName, to: CameraName },

    /// A camera name that is not in the registry.
    #[error("Unknown camera '{0}'")]
    UnknownCamera(CameraName),

    /// The player surface failed during a transition.
    #[error(transparent)]
    Player(#[from] PlayerError),
}

impl SyncError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an unknown destination error.
    pub fn unknown_destination(from: impl Into<CameraName>, to: impl Into<CameraName>) -> Self {
        Self::UnknownDestination {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an unknown camera error.
    pub fn unknown_camera(name: impl Into<CameraName>) -> Self {
        Self::UnknownCamera(name.into())
    }
}

/// Result type for player operations.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Result type for registry and swap operations.
pub type SyncResult<T> = Result<T, SyncError>;
