//! Link graph: directed, time-offsetting edges between cameras.
//!
//! Each ordered pair of cameras has at most one link. Links are never
//! implied in reverse; a symmetric pair must be declared twice.
//!
//! ```text
//! seek = max(0, destination_ts + (elapsed - source_ts))   calibrated link
//! seek = elapsed                                           uncalibrated link
//! ```

use indexmap::IndexMap;

use crate::errors::{SyncError, SyncResult};
use crate::models::{CameraDefinition, CameraName, Hotspot, OffsetRule, Timestamp};

/// One directed edge of the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkRule {
    /// Where the link's overlay sits on the source camera.
    pub hotspot: Hotspot,
    /// Time mapping applied when the link is followed.
    pub offset: OffsetRule,
}

/// Outgoing links per source camera.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    edges: IndexMap<CameraName, IndexMap<CameraName, LinkRule>>,
}

impl LinkGraph {
    /// Build the graph from camera definitions.
    ///
    /// Fails if a link points at an undeclared camera, points back at its
    /// own camera, repeats an ordered pair, or carries invalid numbers.
    pub fn from_definitions(definitions: &[CameraDefinition]) -> SyncResult<Self> {
        let mut edges: IndexMap<CameraName, IndexMap<CameraName, LinkRule>> = definitions
            .iter()
            .map(|def| (def.name.clone(), IndexMap::new()))
            .collect();

        for def in definitions {
            for link in &def.links {
                let destination = &link.destination;

                if !edges.contains_key(destination) {
                    return Err(SyncError::configuration(format!(
                        "camera '{}' links to undeclared camera '{}'",
                        def.name, destination
                    )));
                }
                if *destination == def.name {
                    return Err(SyncError::configuration(format!(
                        "camera '{}' links to itself",
                        def.name
                    )));
                }
                if !link.hotspot.is_finite() {
                    return Err(SyncError::configuration(format!(
                        "link '{}' -> '{}' has a non-finite hotspot",
                        def.name, destination
                    )));
                }
                if let Some(cal) = &link.calibration {
                    if !cal.is_valid() {
                        return Err(SyncError::configuration(format!(
                            "link '{}' -> '{}' has an invalid calibration ({}, {})",
                            def.name, destination, cal.source, cal.destination
                        )));
                    }
                }

                let rule = LinkRule {
                    hotspot: link.hotspot,
                    offset: link.offset_rule(),
                };
                let outgoing = edges
                    .get_mut(&def.name)
                    .ok_or_else(|| SyncError::unknown_camera(def.name.clone()))?;
                if outgoing.insert(destination.clone(), rule).is_some() {
                    return Err(SyncError::configuration(format!(
                        "link '{}' -> '{}' is declared more than once",
                        def.name, destination
                    )));
                }
            }
        }

        Ok(Self { edges })
    }

    /// The link from `source` to `destination`, if declared.
    pub fn link(&self, source: &CameraName, destination: &CameraName) -> Option<&LinkRule> {
        self.edges.get(source)?.get(destination)
    }

    /// Whether a link from `source` to `destination` exists.
    pub fn has_link(&self, source: &CameraName, destination: &CameraName) -> bool {
        self.link(source, destination).is_some()
    }

    /// Destinations reachable in one swap from `source`, in declaration order.
    pub fn destinations<'a>(
        &'a self,
        source: &CameraName,
    ) -> impl Iterator<Item = (&'a CameraName, &'a LinkRule)> + 'a {
        self.edges.get(source).into_iter().flat_map(|out| out.iter())
    }

    /// Total number of links.
    pub fn link_count(&self) -> usize {
        self.edges.values().map(IndexMap::len).sum()
    }

    /// Seek target for leaving `source` at `elapsed` towards `destination`.
    ///
    /// Negative results are clamped to zero.
    pub fn resolve_offset(
        &self,
        source: &CameraName,
        destination: &CameraName,
        elapsed: Timestamp,
    ) -> SyncResult<Timestamp> {
        let rule = self
            .link(source, destination)
            .ok_or_else(|| SyncError::unknown_destination(source.clone(), destination.clone()))?;
        Ok(rule.offset.apply(elapsed))
    }
}
