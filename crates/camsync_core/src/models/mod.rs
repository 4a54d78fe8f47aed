//! Data models for camsync.
//!
//! - Camera names and definitions
//! - Link hotspots, calibration points and offset rules
//! - Playback timestamps

mod camera;
mod camera_name;
mod link;
mod time;

pub use camera::CameraDefinition;
pub use camera_name::CameraName;
pub use link::{Calibration, Hotspot, LinkDefinition, OffsetRule};
pub use time::Timestamp;
