//! Camera definitions as handed to the registry.

use super::camera_name::CameraName;
use super::link::LinkDefinition;

/// Declaration of one camera: its media, default flag and outgoing links.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDefinition {
    /// Unique camera name.
    pub name: CameraName,
    /// Reference to the playable media (e.g. a video id).
    pub media_id: String,
    /// Whether this camera is activated once its player is ready.
    pub is_default: bool,
    /// Outgoing links, in declaration order.
    pub links: Vec<LinkDefinition>,
}

impl CameraDefinition {
    /// Create a non-default camera without links.
    pub fn new(name: impl Into<CameraName>, media_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_id: media_id.into(),
            is_default: false,
            links: Vec::new(),
        }
    }

    /// Mark this camera as the default.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Add an outgoing link.
    pub fn with_link(mut self, link: LinkDefinition) -> Self {
        self.links.push(link);
        self
    }
}
