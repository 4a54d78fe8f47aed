//! Camera registry: validated camera set with one player per camera.
//!
//! Building the registry validates every declaration before any player is
//! created, so a rejected configuration never leaves half-built players
//! behind. Players are created once and never recreated.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::{DefaultCameraPolicy, SyncOptions};
use crate::errors::{SyncError, SyncResult};
use crate::graph::LinkGraph;
use crate::models::{CameraDefinition, CameraName, Hotspot};
use crate::player::{PlayerAdapter, PlayerFactory};

/// A clickable link overlay rendered on a camera.
///
/// Carries its own source camera so a stale affordance (one rendered for a
/// camera that is no longer active) can be recognised and ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkAffordance {
    /// Camera the overlay is drawn on.
    pub source: CameraName,
    /// Camera the overlay swaps to.
    pub destination: CameraName,
    /// Overlay position in percent.
    pub hotspot: Hotspot,
    /// Stable element identifier for the host UI.
    pub element_id: String,
}

/// A built camera: its player and outgoing link affordances.
pub struct CameraHandle {
    name: CameraName,
    media_id: String,
    is_default: bool,
    element_id: String,
    player: Box<dyn PlayerAdapter>,
    links: Vec<LinkAffordance>,
}

impl CameraHandle {
    /// Camera name.
    pub fn name(&self) -> &CameraName {
        &self.name
    }

    /// Media reference the player is bound to.
    pub fn media_id(&self) -> &str {
        &self.media_id
    }

    /// Whether the camera was declared as default.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Element identifier of the camera's player container.
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// The camera's player.
    pub fn player(&self) -> &dyn PlayerAdapter {
        self.player.as_ref()
    }

    /// Outgoing link affordances, in declaration order.
    pub fn links(&self) -> &[LinkAffordance] {
        &self.links
    }

    /// Affordance leading to `destination`, if any.
    pub fn link_to(&self, destination: &str) -> Option<&LinkAffordance> {
        self.links
            .iter()
            .find(|link| link.destination.as_str() == destination)
    }
}

impl fmt::Debug for CameraHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraHandle")
            .field("name", &self.name)
            .field("media_id", &self.media_id)
            .field("is_default", &self.is_default)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

/// All cameras of one setup, keyed by name in declaration order.
#[derive(Debug)]
pub struct CameraRegistry {
    cameras: IndexMap<CameraName, CameraHandle>,
    graph: LinkGraph,
    default_camera: Option<CameraName>,
}

impl CameraRegistry {
    /// Validate `definitions`, build the link graph and create one player
    /// per camera through `factory`.
    pub fn build(
        options: &SyncOptions,
        definitions: Vec<CameraDefinition>,
        factory: &mut dyn PlayerFactory,
    ) -> SyncResult<Self> {
        validate_options(options)?;
        validate_cameras(&definitions)?;
        let default_camera = resolve_default(&definitions, options.default_policy)?;
        let graph = LinkGraph::from_definitions(&definitions)?;

        let player_options = options.player_options();
        let mut cameras = IndexMap::with_capacity(definitions.len());

        for def in definitions {
            let player = factory.create(&def.name, &def.media_id, &player_options)?;

            let links = graph
                .destinations(&def.name)
                .map(|(destination, rule)| LinkAffordance {
                    source: def.name.clone(),
                    destination: destination.clone(),
                    hotspot: rule.hotspot,
                    element_id: def.name.link_element_id(destination),
                })
                .collect();

            tracing::debug!(
                "Built camera '{}' (media {}, {} link(s))",
                def.name,
                def.media_id,
                def.links.len()
            );

            let handle = CameraHandle {
                element_id: def.name.element_id(),
                name: def.name.clone(),
                media_id: def.media_id,
                is_default: default_camera.as_ref() == Some(&def.name),
                player,
                links,
            };
            cameras.insert(def.name, handle);
        }

        tracing::info!(
            "Camera registry ready: {} camera(s), {} link(s), default {}",
            cameras.len(),
            graph.link_count(),
            default_camera.as_ref().map_or("<none>", CameraName::as_str)
        );

        Ok(Self {
            cameras,
            graph,
            default_camera,
        })
    }

    /// Look up a camera.
    pub fn get(&self, name: &str) -> Option<&CameraHandle> {
        self.cameras.get(name)
    }

    /// Look up a camera, failing with `UnknownCamera`.
    pub fn handle(&self, name: &CameraName) -> SyncResult<&CameraHandle> {
        self.cameras
            .get(name)
            .ok_or_else(|| SyncError::unknown_camera(name.clone()))
    }

    /// Player of a camera, failing with `UnknownCamera`.
    pub fn player(&self, name: &CameraName) -> SyncResult<&dyn PlayerAdapter> {
        self.handle(name).map(CameraHandle::player)
    }

    /// All cameras in declaration order.
    pub fn cameras(&self) -> impl Iterator<Item = &CameraHandle> {
        self.cameras.values()
    }

    /// Camera names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &CameraName> {
        self.cameras.keys()
    }

    /// Number of cameras.
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Whether the registry has no cameras (never true once built).
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// The link graph between cameras.
    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    /// The camera activated once its player is ready, if any.
    pub fn default_camera(&self) -> Option<&CameraName> {
        self.default_camera.as_ref()
    }
}

fn validate_options(options: &SyncOptions) -> SyncResult<()> {
    if options.width == 0 || options.height == 0 {
        return Err(SyncError::configuration(format!(
            "player size must be non-zero, got {}x{}",
            options.width, options.height
        )));
    }
    Ok(())
}

fn validate_cameras(definitions: &[CameraDefinition]) -> SyncResult<()> {
    if definitions.is_empty() {
        return Err(SyncError::configuration("no cameras declared"));
    }

    let mut seen = HashSet::with_capacity(definitions.len());
    for def in definitions {
        if def.name.is_empty() {
            return Err(SyncError::configuration("camera name must not be empty"));
        }
        if def.media_id.trim().is_empty() {
            return Err(SyncError::configuration(format!(
                "camera '{}' has no media id",
                def.name
            )));
        }
        if !def.name.is_element_safe() {
            return Err(SyncError::configuration(format!(
                "camera name '{}' must not contain '__' or start or end with '_'",
                def.name
            )));
        }
        if !seen.insert(&def.name) {
            return Err(SyncError::configuration(format!(
                "camera name '{}' is used more than once",
                def.name
            )));
        }
    }
    Ok(())
}

/// Pick the default camera according to `policy`.
fn resolve_default(
    definitions: &[CameraDefinition],
    policy: DefaultCameraPolicy,
) -> SyncResult<Option<CameraName>> {
    let defaults: Vec<&CameraName> = definitions
        .iter()
        .filter(|def| def.is_default)
        .map(|def| &def.name)
        .collect();

    match (defaults.as_slice(), policy) {
        ([], _) => Ok(None),
        ([only], _) => Ok(Some((*only).clone())),
        (many, DefaultCameraPolicy::Reject) => Err(SyncError::configuration(format!(
            "more than one default camera: {}",
            many.iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
        (many, DefaultCameraPolicy::LastWins) => {
            let last = many[many.len() - 1];
            tracing::warn!(
                "{} cameras marked default, using the last one: '{}'",
                many.len(),
                last
            );
            Ok(Some(last.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkDefinition;
    use crate::player::SimulatedPlayerFactory;

    fn defs() -> Vec<CameraDefinition> {
        vec![
            CameraDefinition::new("1", "H5jERhB0RbA")
                .as_default()
                .with_link(LinkDefinition::new("2", Hotspot::new(20.0, 40.0))),
            CameraDefinition::new("2", "UDhJeS_l6UU")
                .with_link(LinkDefinition::new("1", Hotspot::new(40.0, 70.0))),
        ]
    }

    #[test]
    fn builds_one_player_per_camera() {
        let mut factory = SimulatedPlayerFactory::new();
        let options = SyncOptions {
            width: 1280,
            height: 720,
            ..SyncOptions::default()
        };
        let registry = CameraRegistry::build(&options, defs(), &mut factory).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(factory.players().count(), 2);
        let player = factory.player("2").unwrap();
        assert_eq!(player.media_id(), "UDhJeS_l6UU");
        assert_eq!(player.options().width, 1280);
        assert_eq!(registry.default_camera().map(CameraName::as_str), Some("1"));
    }

    #[test]
    fn affordances_mirror_links() {
        let mut factory = SimulatedPlayerFactory::new();
        let registry = CameraRegistry::build(&SyncOptions::default(), defs(), &mut factory).unwrap();

        let cam = registry.get("1").unwrap();
        assert_eq!(cam.element_id(), "camsync__1");
        let link = cam.link_to("2").unwrap();
        assert_eq!(link.source.as_str(), "1");
        assert_eq!(link.hotspot, Hotspot::new(20.0, 40.0));
        assert_eq!(link.element_id, "camsync__1__2");
        assert!(cam.link_to("3").is_none());
    }

    #[test]
    fn rejects_duplicate_names_before_creating_players() {
        let mut factory = SimulatedPlayerFactory::new();
        let defs = vec![
            CameraDefinition::new("1", "a"),
            CameraDefinition::new("1", "b"),
        ];
        let err = CameraRegistry::build(&SyncOptions::default(), defs, &mut factory).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert_eq!(factory.players().count(), 0);
    }

    #[test]
    fn rejects_undeclared_link_target() {
        let mut factory = SimulatedPlayerFactory::new();
        let defs = vec![CameraDefinition::new("1", "a")
            .with_link(LinkDefinition::new("9", Hotspot::default()))];
        assert!(CameraRegistry::build(&SyncOptions::default(), defs, &mut factory).is_err());
        assert_eq!(factory.players().count(), 0);
    }

    #[test]
    fn rejects_empty_inputs() {
        let mut factory = SimulatedPlayerFactory::new();
        let options = SyncOptions::default();
        assert!(CameraRegistry::build(&options, Vec::new(), &mut factory).is_err());
        assert!(
            CameraRegistry::build(&options, vec![CameraDefinition::new("", "a")], &mut factory)
                .is_err()
        );
        assert!(
            CameraRegistry::build(&options, vec![CameraDefinition::new("1", " ")], &mut factory)
                .is_err()
        );

        let zero = SyncOptions {
            width: 0,
            ..SyncOptions::default()
        };
        assert!(CameraRegistry::build(&zero, defs(), &mut factory).is_err());
    }

    #[test]
    fn no_default_declared() {
        let mut factory = SimulatedPlayerFactory::new();
        let defs = vec![CameraDefinition::new("1", "a"), CameraDefinition::new("2", "b")];
        let registry = CameraRegistry::build(&SyncOptions::default(), defs, &mut factory).unwrap();
        assert!(registry.default_camera().is_none());
        assert!(registry.cameras().all(|cam| !cam.is_default()));
    }

    #[test]
    fn multiple_defaults_follow_policy() {
        let both = || {
            vec![
                CameraDefinition::new("1", "a").as_default(),
                CameraDefinition::new("2", "b").as_default(),
            ]
        };

        let mut factory = SimulatedPlayerFactory::new();
        let err = CameraRegistry::build(&SyncOptions::default(), both(), &mut factory).unwrap_err();
        assert!(err.to_string().contains("more than one default"));

        let last_wins = SyncOptions {
            default_policy: DefaultCameraPolicy::LastWins,
            ..SyncOptions::default()
        };
        let registry = CameraRegistry::build(&last_wins, both(), &mut factory).unwrap();
        assert_eq!(registry.default_camera().map(CameraName::as_str), Some("2"));
        assert!(!registry.get("1").unwrap().is_default());
        assert!(registry.get("2").unwrap().is_default());
    }

    #[test]
    fn rejects_names_that_break_element_ids() {
        for bad in ["a__b", "a_", "_b"] {
            let mut factory = SimulatedPlayerFactory::new();
            let defs = vec![CameraDefinition::new("a", "x"), CameraDefinition::new(bad, "y")];
            let err = CameraRegistry::build(&SyncOptions::default(), defs, &mut factory)
                .err()
                .unwrap();
            assert!(matches!(err, SyncError::Configuration(_)), "{}", bad);
            assert_eq!(factory.players().count(), 0);
        }
    }

    #[test]
    fn element_ids_are_distinct() {
        let mut factory = SimulatedPlayerFactory::new();
        let defs = vec![
            CameraDefinition::new("a", "x")
                .with_link(LinkDefinition::new("b", Hotspot::default()))
                .with_link(LinkDefinition::new("b_c", Hotspot::default())),
            CameraDefinition::new("b", "y")
                .with_link(LinkDefinition::new("a", Hotspot::default())),
            CameraDefinition::new("b_c", "z")
                .with_link(LinkDefinition::new("a", Hotspot::default())),
        ];
        let registry = CameraRegistry::build(&SyncOptions::default(), defs, &mut factory).unwrap();

        let mut ids = HashSet::new();
        for cam in registry.cameras() {
            assert!(ids.insert(cam.element_id().to_string()));
            for link in cam.links() {
                assert!(ids.insert(link.element_id.clone()), "{}", link.element_id);
            }
        }
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn unknown_camera_lookup_fails() {
        let mut factory = SimulatedPlayerFactory::new();
        let registry = CameraRegistry::build(&SyncOptions::default(), defs(), &mut factory).unwrap();
        let err = registry.player(&CameraName::new("7")).err();
        assert_eq!(err, Some(SyncError::unknown_camera("7")));
    }
}
