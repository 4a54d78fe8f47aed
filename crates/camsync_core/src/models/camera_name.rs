//! Camera name newtype used as the stable key for every camera.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix for element identifiers handed to the host UI.
const ELEMENT_ID_PREFIX: &str = "camsync__";

/// Separator between source and destination in link element ids.
const ELEMENT_ID_SEPARATOR: &str = "__";

/// Unique, stable name of a camera.
///
/// Names come straight from configuration keys and are also the basis of
/// the element identifiers a host uses to render cameras and link hotspots.
///
/// # Examples
///
/// ```
/// use camsync_core::models::CameraName;
///
/// let name = CameraName::new("stage-left");
/// assert_eq!(name.as_str(), "stage-left");
/// assert_eq!(name.element_id(), "camsync__stage-left");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraName(String);

impl CameraName {
    /// Create a camera name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty (never valid in a built registry).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether element ids built from this name stay unambiguous.
    ///
    /// A name must not contain the separator, nor start or end with `_`,
    /// otherwise `a` + `_b` and `a_` + `b` would share a link id.
    pub fn is_element_safe(&self) -> bool {
        !self.0.contains(ELEMENT_ID_SEPARATOR)
            && !self.0.starts_with('_')
            && !self.0.ends_with('_')
    }

    /// Identifier of the element that hosts this camera's player.
    pub fn element_id(&self) -> String {
        format!("{}{}", ELEMENT_ID_PREFIX, self.0)
    }

    /// Identifier of the hotspot linking this camera to `destination`.
    pub fn link_element_id(&self, destination: &CameraName) -> String {
        format!(
            "{}{}{}{}",
            ELEMENT_ID_PREFIX, self.0, ELEMENT_ID_SEPARATOR, destination.0
        )
    }
}

impl fmt::Display for CameraName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CameraName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CameraName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CameraName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
