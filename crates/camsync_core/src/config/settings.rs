//! Declarative camera setup document.
//!
//! The document has two sections: `options`, forwarded to every player and
//! steering build-time policy, and `cameras`, keyed by camera name in
//! declaration order.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Calibration, CameraDefinition, Hotspot, LinkDefinition};
use crate::player::{PlayerOptions, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Root of a camera setup document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Player and build options.
    #[serde(default)]
    pub options: SyncOptions,

    /// Camera declarations keyed by name.
    #[serde(default, deserialize_with = "unique_cameras")]
    pub cameras: IndexMap<String, CameraDecl>,
}

impl CameraConfig {
    /// Convert the declarations into registry input, keeping declaration order.
    pub fn definitions(&self) -> Vec<CameraDefinition> {
        self.cameras
            .iter()
            .map(|(name, decl)| decl.to_definition(name))
            .collect()
    }
}

/// Map visitor that fails on a repeated key instead of keeping the last value.
///
/// TOML parsers already reject duplicate keys, JSON ones do not.
struct UniqueKeys<V> {
    kind: &'static str,
    marker: PhantomData<V>,
}

impl<V> UniqueKeys<V> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            marker: PhantomData,
        }
    }
}

impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
    type Value = IndexMap<String, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map keyed by {} name", self.kind)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!(
                    "duplicate {} '{}'",
                    self.kind, key
                )));
            }
            map.insert(key, value);
        }
        Ok(map)
    }
}

fn unique_cameras<'de, D>(deserializer: D) -> Result<IndexMap<String, CameraDecl>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(UniqueKeys::new("camera"))
}

fn unique_links<'de, D>(deserializer: D) -> Result<IndexMap<String, LinkDecl>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_map(UniqueKeys::new("link"))
}

/// What to do when more than one camera is marked as default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultCameraPolicy {
    /// Fail the build with a configuration error.
    #[default]
    Reject,
    /// The last default camera in declaration order wins.
    LastWins,
}

/// The `options` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Player width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Player height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Tie-break for multiple default cameras.
    #[serde(default)]
    pub default_policy: DefaultCameraPolicy,

    /// Extra seek attempts when the incoming player fails a seek.
    #[serde(default)]
    pub seek_retries: u32,
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            default_policy: DefaultCameraPolicy::default(),
            seek_retries: 0,
        }
    }
}

impl SyncOptions {
    /// The subset forwarded to each player.
    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions {
            width: self.width,
            height: self.height,
        }
    }
}

/// One entry of the `cameras` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDecl {
    /// Media reference played by this camera.
    pub id: String,

    /// Activate this camera once its player is ready.
    #[serde(default, alias = "isDefault", skip_serializing_if = "is_false")]
    pub is_default: bool,

    /// Outgoing links keyed by destination camera name.
    #[serde(default, deserialize_with = "unique_links")]
    pub links: IndexMap<String, LinkDecl>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CameraDecl {
    fn to_definition(&self, name: &str) -> CameraDefinition {
        CameraDefinition {
            name: name.into(),
            media_id: self.id.clone(),
            is_default: self.is_default,
            links: self
                .links
                .iter()
                .map(|(destination, link)| link.to_definition(destination))
                .collect(),
        }
    }
}

/// A link value: either a bare `[x, y]` hotspot, or a table that can also
/// carry a `(source, destination)` calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkDecl {
    /// Hotspot only; elapsed time is carried over unchanged.
    Hotspot([f64; 2]),
    /// Hotspot with optional calibration.
    Detailed {
        at: [f64; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        calibration: Option<[f64; 2]>,
    },
}

impl LinkDecl {
    /// Hotspot coordinates `[x, y]` in percent.
    pub fn hotspot(&self) -> [f64; 2] {
        match self {
            LinkDecl::Hotspot(at) | LinkDecl::Detailed { at, .. } => *at,
        }
    }

    /// Calibration `[source, destination]` in seconds, if declared.
    pub fn calibration(&self) -> Option<[f64; 2]> {
        match self {
            LinkDecl::Hotspot(_) => None,
            LinkDecl::Detailed { calibration, .. } => *calibration,
        }
    }

    fn to_definition(&self, destination: &str) -> LinkDefinition {
        let [x, y] = self.hotspot();
        LinkDefinition {
            destination: destination.into(),
            hotspot: Hotspot::new(x, y),
            calibration: self
                .calibration()
                .map(|[source, destination]| Calibration::new(source, destination)),
        }
    }
}
