//! Camera setup configuration.
//!
//! This module provides:
//! - The declarative setup document (`options` + `cameras`)
//! - TOML and JSON loading, chosen by file extension
//! - Atomic saves (write to temp, then rename)
//!
//! # Example
//!
//! ```no_run
//! use camsync_core::config::ConfigManager;
//!
//! let mut manager = ConfigManager::new("cameras.toml").unwrap();
//! manager.load().unwrap();
//!
//! for def in manager.config().definitions() {
//!     println!("{} -> {}", def.name, def.media_id);
//! }
//! ```

mod manager;
mod settings;

pub use manager::{load_config, ConfigError, ConfigFormat, ConfigManager, ConfigResult};
pub use settings::{CameraConfig, CameraDecl, DefaultCameraPolicy, LinkDecl, SyncOptions};
