//! Config manager for loading and saving camera setup documents.
//!
//! - TOML or JSON, picked by file extension
//! - Atomic writes (write to temp file, then rename)

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::settings::CameraConfig;
use crate::errors::SyncError;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to process JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported config format (expected .toml or .json): {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// A document that cannot be loaded is a configuration error of the setup.
impl From<ConfigError> for SyncError {
    fn from(err: ConfigError) -> Self {
        SyncError::configuration(err.to_string())
    }
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }

    /// Parse a document in this format.
    pub fn parse(self, content: &str) -> ConfigResult<CameraConfig> {
        match self {
            ConfigFormat::Toml => Ok(toml::from_str(content)?),
            ConfigFormat::Json => Ok(serde_json::from_str(content)?),
        }
    }

    /// Serialize a document in this format.
    pub fn render(self, config: &CameraConfig) -> ConfigResult<String> {
        match self {
            ConfigFormat::Toml => Ok(toml::to_string_pretty(config)?),
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        }
    }
}

/// Loads and saves one camera setup document.
pub struct ConfigManager {
    /// Path to the document.
    config_path: PathBuf,
    /// Format derived from the path.
    format: ConfigFormat,
    /// Document currently held in memory.
    config: CameraConfig,
}

impl ConfigManager {
    /// Create a manager for the document at `config_path`.
    ///
    /// Does not read the file - call `load()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_path = config_path.into();
        let format = ConfigFormat::from_path(&config_path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(config_path.clone()))?;

        Ok(Self {
            config_path,
            format,
            config: CameraConfig::default(),
        })
    }

    /// Get the document path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get the document format.
    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Get the document held in memory.
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Get a mutable reference to the document.
    ///
    /// Changes stay in memory until `save()` is called.
    pub fn config_mut(&mut self) -> &mut CameraConfig {
        &mut self.config
    }

    /// Take the loaded document out of the manager.
    pub fn into_config(self) -> CameraConfig {
        self.config
    }

    /// Load the document from disk.
    ///
    /// Returns error if the file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.config = self.format.parse(&content)?;
        tracing::debug!(
            "Loaded {} camera(s) from {}",
            self.config.cameras.len(),
            self.config_path.display()
        );
        Ok(())
    }

    /// Save the document atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.format.render(&self.config)?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Write content to the document path atomically.
    ///
    /// Writes to a temp file first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

/// Load a camera setup document in one call.
pub fn load_config(path: impl Into<PathBuf>) -> ConfigResult<CameraConfig> {
    let mut manager = ConfigManager::new(path)?;
    manager.load()?;
    Ok(manager.into_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraDecl, LinkDecl};
    use tempfile::tempdir;

    fn sample() -> CameraConfig {
        let mut config = CameraConfig::default();
        let mut front = CameraDecl {
            id: "H5jERhB0RbA".to_string(),
            is_default: true,
            links: Default::default(),
        };
        front
            .links
            .insert("2".to_string(), LinkDecl::Hotspot([20.0, 40.0]));
        config.cameras.insert("1".to_string(), front);
        config.cameras.insert(
            "2".to_string(),
            CameraDecl {
                id: "UDhJeS_l6UU".to_string(),
                is_default: false,
                links: Default::default(),
            },
        );
        config
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = ConfigManager::new("cameras.yaml").err().unwrap();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("missing.toml")).unwrap();
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn saved_toml_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("setup").join("cameras.toml");

        let mut manager = ConfigManager::new(&path).unwrap();
        *manager.config_mut() = sample();
        manager.save().unwrap();

        assert!(!path.with_extension("tmp").exists());
        assert_eq!(load_config(&path).unwrap(), sample());
    }

    #[test]
    fn loads_json_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cameras.json");
        fs::write(
            &path,
            r#"{
                "options": {"width": 1280, "height": 720},
                "cameras": {
                    "1": {"id": "a", "links": {"2": [20, 40]}, "isDefault": true},
                    "2": {"id": "b", "links": {"1": {"at": [40, 70], "calibration": [5, 0]}}}
                }
            }"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.options.height, 720);
        assert!(config.cameras["1"].is_default);
        assert_eq!(config.cameras["2"].links["1"].calibration(), Some([5.0, 0.0]));
    }

    #[test]
    fn repeated_json_camera_is_configuration_error() {
        let doc = r#"{"cameras": {
            "A": {"id": "first", "links": {"B": [1, 1]}},
            "B": {"id": "b"},
            "A": {"id": "second"}
        }}"#;
        let err = ConfigFormat::Json.parse(doc).err().unwrap();
        assert!(matches!(err, ConfigError::JsonError(_)));

        match SyncError::from(err) {
            SyncError::Configuration(message) => {
                assert!(message.contains("duplicate camera 'A'"), "{}", message)
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cameras.toml");
        fs::write(&path, "[cameras.1\nid = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
    }
}
