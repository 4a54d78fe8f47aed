//! Player adapter boundary.
//!
//! The swap coordinator only needs four capabilities from a video player:
//! play, pause, seek and reading the elapsed time. [`PlayerAdapter`] is that
//! surface; concrete implementations forward to whatever player backs a
//! camera. Adapters hold no swap state of their own.
//!
//! Calls made before the backing player signals readiness are rejected
//! with [`PlayerError::NotReady`](crate::errors::PlayerError::NotReady).
//! They are never queued.

mod simulated;

pub use simulated::{PlayerCall, SimulatedPlayer, SimulatedPlayerFactory};

use serde::{Deserialize, Serialize};

use crate::errors::PlayerResult;
use crate::models::{CameraName, Timestamp};

/// Default player width in pixels.
pub const DEFAULT_WIDTH: u32 = 640;

/// Default player height in pixels.
pub const DEFAULT_HEIGHT: u32 = 390;

/// Options forwarded verbatim to every player at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOptions {
    /// Player width in pixels.
    pub width: u32,
    /// Player height in pixels.
    pub height: u32,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Control surface of one camera's backing player.
///
/// Methods take `&self`: implementations wrap a handle to an external
/// player and use interior mutability where they keep local state.
pub trait PlayerAdapter: Send + Sync {
    /// Camera this player is bound to.
    fn camera(&self) -> &CameraName;

    /// Whether the backing player has signalled readiness.
    fn is_ready(&self) -> bool;

    /// Start or resume playback.
    fn play(&self) -> PlayerResult<()>;

    /// Pause playback.
    fn pause(&self) -> PlayerResult<()>;

    /// Move the playhead to `to`.
    fn seek(&self, to: Timestamp) -> PlayerResult<()>;

    /// Current playhead position.
    fn elapsed(&self) -> PlayerResult<Timestamp>;
}

/// Creates one player per camera at registry build time.
pub trait PlayerFactory {
    /// Create the player for `camera`, bound to `media_id`.
    fn create(
        &mut self,
        camera: &CameraName,
        media_id: &str,
        options: &PlayerOptions,
    ) -> PlayerResult<Box<dyn PlayerAdapter>>;
}
