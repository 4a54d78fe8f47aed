//! Assembled camera-sync widget.
//!
//! [`CameraSync`] ties the registry, link graph and swap coordinator
//! together and handles default-camera activation. The default camera is
//! activated right after the build when its player is already ready,
//! otherwise on the player's ready notification.
//!
//! # Example
//!
//! ```
//! use camsync_core::models::{CameraDefinition, Calibration, Hotspot, LinkDefinition};
//! use camsync_core::config::SyncOptions;
//! use camsync_core::player::SimulatedPlayerFactory;
//! use camsync_core::sync::CameraSync;
//!
//! let defs = vec![
//!     CameraDefinition::new("A", "video-a").as_default().with_link(
//!         LinkDefinition::new("B", Hotspot::new(20.0, 40.0))
//!             .with_calibration(Calibration::new(20.0, 40.0)),
//!     ),
//!     CameraDefinition::new("B", "video-b"),
//! ];
//!
//! let mut factory = SimulatedPlayerFactory::ready();
//! let mut sync = CameraSync::from_definitions(&SyncOptions::default(), defs, &mut factory).unwrap();
//! assert_eq!(sync.active().map(|c| c.as_str()), Some("A"));
//!
//! factory.advance_all(25.0);
//! let outcome = sync.swap_to("B").unwrap();
//! assert_eq!(outcome.record().unwrap().seek_target.as_secs(), 45.0);
//! ```

use crate::config::{CameraConfig, SyncOptions};
use crate::coordinator::{
    ActivationListener, IgnoreReason, SwapCoordinator, SwapOutcome, SwapRecord, SwapState,
};
use crate::errors::SyncResult;
use crate::graph::LinkGraph;
use crate::models::{CameraDefinition, CameraName};
use crate::player::PlayerFactory;
use crate::registry::{CameraHandle, CameraRegistry, LinkAffordance};

/// One independent set of synchronized cameras.
pub struct CameraSync {
    registry: CameraRegistry,
    coordinator: SwapCoordinator,
    /// Default camera still waiting for its player to become ready.
    pending_default: Option<CameraName>,
}

impl CameraSync {
    /// Build from a parsed setup document.
    pub fn build(config: &CameraConfig, factory: &mut dyn PlayerFactory) -> SyncResult<Self> {
        Self::from_definitions(&config.options, config.definitions(), factory)
    }

    /// Build from a parsed setup document, registering `listeners` before
    /// the default camera can activate.
    pub fn build_with_listeners(
        config: &CameraConfig,
        factory: &mut dyn PlayerFactory,
        listeners: Vec<ActivationListener>,
    ) -> SyncResult<Self> {
        Self::from_definitions_with_listeners(
            &config.options,
            config.definitions(),
            factory,
            listeners,
        )
    }

    /// Build from camera definitions.
    ///
    /// Listeners added afterwards are not told about an activation that
    /// happened during the build; use
    /// [`from_definitions_with_listeners`](Self::from_definitions_with_listeners)
    /// to observe it.
    pub fn from_definitions(
        options: &SyncOptions,
        definitions: Vec<CameraDefinition>,
        factory: &mut dyn PlayerFactory,
    ) -> SyncResult<Self> {
        Self::from_definitions_with_listeners(options, definitions, factory, Vec::new())
    }

    /// Build from camera definitions with activation listeners in place.
    pub fn from_definitions_with_listeners(
        options: &SyncOptions,
        definitions: Vec<CameraDefinition>,
        factory: &mut dyn PlayerFactory,
        listeners: Vec<ActivationListener>,
    ) -> SyncResult<Self> {
        let registry = CameraRegistry::build(options, definitions, factory)?;
        let pending_default = registry.default_camera().cloned();

        let mut coordinator = SwapCoordinator::new().with_seek_retries(options.seek_retries);
        for listener in listeners {
            coordinator.add_listener(listener);
        }

        let mut sync = Self {
            registry,
            coordinator,
            pending_default,
        };

        if let Some(camera) = sync.pending_default.clone() {
            let ready = sync.registry.player(&camera)?.is_ready();
            if ready {
                if let Err(e) = sync.activate_pending(&camera) {
                    tracing::warn!("Default camera '{}' not activated yet: {}", camera, e);
                }
            } else {
                tracing::debug!("Default camera '{}' waits for its player", camera);
            }
        }

        Ok(sync)
    }

    /// Forward a player's ready notification.
    ///
    /// Activates the default camera if `camera` is it and it is still
    /// pending. Anything else is ignored, including repeats.
    pub fn notify_ready(&mut self, camera: &str) -> SyncResult<SwapOutcome> {
        let camera = self.registry.handle(&CameraName::new(camera))?.name().clone();

        if self.pending_default.as_ref() != Some(&camera) {
            tracing::trace!("Ready notification from '{}' ignored", camera);
            return Ok(SwapOutcome::Ignored(IgnoreReason::NoPendingActivation {
                camera,
            }));
        }

        self.activate_pending(&camera)
    }

    fn activate_pending(&mut self, camera: &CameraName) -> SyncResult<SwapOutcome> {
        let outcome = self.coordinator.activate_default(&self.registry, camera)?;
        self.pending_default = None;
        Ok(outcome)
    }

    /// Swap from the active camera to `destination`.
    pub fn swap_to(&mut self, destination: &str) -> SyncResult<SwapOutcome> {
        self.coordinator
            .swap_to(&self.registry, &CameraName::new(destination))
    }

    /// Fire a link affordance.
    ///
    /// Affordances belonging to a camera that is no longer active are
    /// ignored.
    pub fn fire(&mut self, affordance: &LinkAffordance) -> SyncResult<SwapOutcome> {
        self.coordinator
            .swap_to_from(&self.registry, &affordance.source, &affordance.destination)
    }

    /// Register a listener for active-state changes.
    pub fn add_listener(&mut self, listener: ActivationListener) {
        self.coordinator.add_listener(listener);
    }

    /// Current swap state.
    pub fn state(&self) -> &SwapState {
        self.coordinator.state()
    }

    /// The active camera, if any.
    pub fn active(&self) -> Option<&CameraName> {
        self.coordinator.active()
    }

    /// The active camera's handle, if any.
    pub fn active_camera(&self) -> Option<&CameraHandle> {
        self.active().and_then(|name| self.registry.get(name.as_str()))
    }

    /// Default camera still waiting for readiness.
    pub fn pending_default(&self) -> Option<&CameraName> {
        self.pending_default.as_ref()
    }

    /// Look up a camera.
    pub fn camera(&self, name: &str) -> Option<&CameraHandle> {
        self.registry.get(name)
    }

    /// All cameras in declaration order.
    pub fn cameras(&self) -> impl Iterator<Item = &CameraHandle> {
        self.registry.cameras()
    }

    /// The camera registry.
    pub fn registry(&self) -> &CameraRegistry {
        &self.registry
    }

    /// The link graph.
    pub fn graph(&self) -> &LinkGraph {
        self.registry.graph()
    }

    /// Completed swaps, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &SwapRecord> {
        self.coordinator.history()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::coordinator::ActivationChange;
    use crate::errors::{PlayerOp, SyncError};
    use crate::models::{Hotspot, LinkDefinition};
    use crate::player::SimulatedPlayerFactory;

    fn defs() -> Vec<CameraDefinition> {
        vec![
            CameraDefinition::new("1", "a")
                .with_link(LinkDefinition::new("2", Hotspot::new(20.0, 40.0))),
            CameraDefinition::new("2", "b")
                .as_default()
                .with_link(LinkDefinition::new("1", Hotspot::new(40.0, 70.0))),
        ]
    }

    #[test]
    fn activates_immediately_when_ready() {
        let mut factory = SimulatedPlayerFactory::ready();
        let sync =
            CameraSync::from_definitions(&SyncOptions::default(), defs(), &mut factory).unwrap();
        assert_eq!(sync.active().map(CameraName::as_str), Some("2"));
        assert!(sync.pending_default().is_none());
        assert!(factory.player("2").unwrap().is_playing());
    }

    #[test]
    fn listeners_given_at_build_see_initial_activation() {
        let mut factory = SimulatedPlayerFactory::ready();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: ActivationListener = Box::new(move |change: &ActivationChange| {
            sink.lock().push(change.clone())
        });

        let sync = CameraSync::from_definitions_with_listeners(
            &SyncOptions::default(),
            defs(),
            &mut factory,
            vec![listener],
        )
        .unwrap();

        assert_eq!(sync.active().map(CameraName::as_str), Some("2"));
        assert_eq!(
            *seen.lock(),
            vec![ActivationChange {
                previous: None,
                current: Some(CameraName::new("2")),
            }]
        );
    }

    #[test]
    fn waits_for_default_readiness() {
        let mut factory = SimulatedPlayerFactory::new();
        let mut sync =
            CameraSync::from_definitions(&SyncOptions::default(), defs(), &mut factory).unwrap();
        assert_eq!(sync.state(), &SwapState::Inactive);
        assert!(factory.player("2").unwrap().calls().is_empty());

        factory.player("1").unwrap().set_ready(true);
        let outcome = sync.notify_ready("1").unwrap();
        assert!(outcome.is_ignored());
        assert_eq!(sync.state(), &SwapState::Inactive);

        factory.player("2").unwrap().set_ready(true);
        let outcome = sync.notify_ready("2").unwrap();
        assert_eq!(outcome, SwapOutcome::Activated(CameraName::new("2")));

        let again = sync.notify_ready("2").unwrap();
        assert!(again.is_ignored());
        assert_eq!(factory.player("2").unwrap().calls().len(), 1);
    }

    #[test]
    fn failed_activation_stays_pending() {
        let mut factory = SimulatedPlayerFactory::new();
        let mut sync = CameraSync::from_definitions(
            &SyncOptions::default(),
            vec![CameraDefinition::new("solo", "x").as_default()],
            &mut factory,
        )
        .unwrap();

        let player = factory.player("solo").unwrap();
        player.set_ready(true);
        player.fail_next(PlayerOp::Play, "autoplay blocked");

        assert!(sync.notify_ready("solo").is_err());
        assert_eq!(sync.pending_default().map(CameraName::as_str), Some("solo"));
        assert!(sync.active().is_none());

        assert!(sync.notify_ready("solo").is_ok());
        assert_eq!(sync.active().map(CameraName::as_str), Some("solo"));
        assert!(sync.swap_to("solo").unwrap().is_ignored());
    }

    #[test]
    fn no_default_means_nothing_active() {
        let mut factory = SimulatedPlayerFactory::ready();
        let defs = vec![CameraDefinition::new("1", "a"), CameraDefinition::new("2", "b")];
        let sync =
            CameraSync::from_definitions(&SyncOptions::default(), defs, &mut factory).unwrap();
        assert!(sync.active().is_none());
        assert!(sync.pending_default().is_none());
    }

    #[test]
    fn notify_ready_for_unknown_camera_fails() {
        let mut factory = SimulatedPlayerFactory::new();
        let mut sync =
            CameraSync::from_definitions(&SyncOptions::default(), defs(), &mut factory).unwrap();
        assert_eq!(
            sync.notify_ready("9").unwrap_err(),
            SyncError::unknown_camera("9")
        );
    }

    #[test]
    fn stale_affordance_is_ignored() {
        let mut factory = SimulatedPlayerFactory::ready();
        let mut sync =
            CameraSync::from_definitions(&SyncOptions::default(), defs(), &mut factory).unwrap();

        let to_one = sync.camera("2").unwrap().link_to("1").unwrap().clone();
        sync.fire(&to_one).unwrap();
        assert_eq!(sync.active().map(CameraName::as_str), Some("1"));

        // Same affordance clicked again after the swap already happened.
        let outcome = sync.fire(&to_one).unwrap();
        assert!(outcome.is_ignored());
        assert_eq!(sync.active().map(CameraName::as_str), Some("1"));
        assert_eq!(sync.active_camera().unwrap().media_id(), "a");
        assert_eq!(sync.history().count(), 1);
    }
}
