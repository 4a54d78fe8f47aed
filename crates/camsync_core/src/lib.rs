//! camsync core - multi-camera playback swapping
//!
//! Several synchronized cameras of one recorded event, each bound to its own
//! player. Cameras are linked by directed, time-offsetting edges; swapping
//! along a link pauses the outgoing camera, maps its position through the
//! link and resumes the incoming camera at the matching moment.
//!
//! This crate contains all swap logic with zero UI dependencies. Hosts
//! supply a [`player::PlayerFactory`] for their player of choice and render
//! [`registry::LinkAffordance`]s however they like.

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod models;
pub mod player;
pub mod registry;
pub mod sync;

pub use errors::{PlayerError, SyncError, SyncResult};
pub use sync::CameraSync;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
