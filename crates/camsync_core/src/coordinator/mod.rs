//! Swap coordinator: the active-camera state machine.
//!
//! ```text
//! Inactive --activate_default(c)--> ActiveOn(c)
//! ActiveOn(s) --swap_to(d), link s->d--> ActiveOn(d)
//! ```
//!
//! A swap runs these steps in order:
//!
//! 1. pause the outgoing player
//! 2. read its elapsed time
//! 3. map it through the link's offset rule
//! 4. seek the incoming player
//! 5. move the active designation (listeners are notified)
//! 6. play the incoming player
//!
//! Any player failure aborts the swap with `ActiveOn(source)` still in
//! place. Step 5 is undone if step 6 fails. Player-side effects of steps
//! that already ran (a paused source, a seeked destination) are not rolled
//! back.

mod state;

pub use state::{
    ActivationChange, ActivationListener, IgnoreReason, SwapOutcome, SwapRecord, SwapState,
};

use std::collections::VecDeque;

use crate::errors::{PlayerError, PlayerOp, PlayerResult, SyncError, SyncResult};
use crate::models::{CameraName, Timestamp};
use crate::player::PlayerAdapter;
use crate::registry::CameraRegistry;

/// Number of completed swaps kept in the history.
pub const HISTORY_LEN: usize = 64;

/// Owns the active-camera state and runs transitions against a registry.
pub struct SwapCoordinator {
    /// Current state. Only changed through `transition`.
    state: SwapState,
    /// Active-state listeners, called in registration order.
    listeners: Vec<ActivationListener>,
    /// Most recent completed swaps, oldest first.
    history: VecDeque<SwapRecord>,
    /// Extra seek attempts on operation failures.
    seek_retries: u32,
}

impl SwapCoordinator {
    /// Create an inactive coordinator.
    pub fn new() -> Self {
        Self {
            state: SwapState::Inactive,
            listeners: Vec::new(),
            history: VecDeque::with_capacity(HISTORY_LEN),
            seek_retries: 0,
        }
    }

    /// Retry a failed seek up to `retries` extra times (builder pattern).
    pub fn with_seek_retries(mut self, retries: u32) -> Self {
        self.seek_retries = retries;
        self
    }

    /// Current state.
    pub fn state(&self) -> &SwapState {
        &self.state
    }

    /// The active camera, if any.
    pub fn active(&self) -> Option<&CameraName> {
        self.state.active()
    }

    /// Register a listener for active-state changes.
    pub fn add_listener(&mut self, listener: ActivationListener) {
        self.listeners.push(listener);
    }

    /// Completed swaps, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &SwapRecord> {
        self.history.iter()
    }

    /// The most recent completed swap.
    pub fn last_swap(&self) -> Option<&SwapRecord> {
        self.history.back()
    }

    /// Activate `camera` as the first active camera.
    ///
    /// Plays the camera's player with no pause or seek. Ignored once any
    /// camera is active, so repeated readiness notifications are harmless.
    pub fn activate_default(
        &mut self,
        registry: &CameraRegistry,
        camera: &CameraName,
    ) -> SyncResult<SwapOutcome> {
        if let Some(active) = self.state.active() {
            tracing::debug!(
                "Default activation of '{}' ignored: '{}' is active",
                camera,
                active
            );
            return Ok(SwapOutcome::Ignored(IgnoreReason::AlreadyActive {
                camera: active.clone(),
            }));
        }

        let player = registry.player(camera)?;
        if let Err(e) = player.play() {
            tracing::warn!("Default activation of '{}' failed: {}", camera, e);
            return Err(e.into());
        }

        self.transition(SwapState::ActiveOn(camera.clone()));
        tracing::info!("Activated default camera '{}'", camera);
        Ok(SwapOutcome::Activated(camera.clone()))
    }

    /// Swap from the active camera to `destination`.
    pub fn swap_to(
        &mut self,
        registry: &CameraRegistry,
        destination: &CameraName,
    ) -> SyncResult<SwapOutcome> {
        match self.state.active().cloned() {
            Some(source) => self.swap_to_from(registry, &source, destination),
            None => {
                tracing::debug!("Swap to '{}' ignored: no active camera", destination);
                Ok(SwapOutcome::Ignored(IgnoreReason::NoActiveCamera))
            }
        }
    }

    /// Swap from `source` to `destination`, as fired by a link affordance.
    ///
    /// Ignored (no player calls) when nothing is active, when `source` is
    /// not the active camera, or when `destination` already is.
    pub fn swap_to_from(
        &mut self,
        registry: &CameraRegistry,
        source: &CameraName,
        destination: &CameraName,
    ) -> SyncResult<SwapOutcome> {
        let active = match self.state.active() {
            Some(active) => active.clone(),
            None => return Ok(SwapOutcome::Ignored(IgnoreReason::NoActiveCamera)),
        };

        if *source != active {
            tracing::debug!(
                "Stale swap request from '{}' ignored ('{}' is active)",
                source,
                active
            );
            return Ok(SwapOutcome::Ignored(IgnoreReason::StaleSource {
                requested: source.clone(),
                active,
            }));
        }
        if *destination == active {
            return Ok(SwapOutcome::Ignored(IgnoreReason::AlreadyActive { camera: active }));
        }

        let graph = registry.graph();
        let rule = graph
            .link(source, destination)
            .ok_or_else(|| SyncError::unknown_destination(source.clone(), destination.clone()))?;
        let outgoing = registry.player(source)?;
        let incoming = registry.player(destination)?;

        tracing::debug!("Swap '{}' -> '{}': pausing outgoing", source, destination);
        outgoing
            .pause()
            .map_err(|e| aborted(source, destination, e))?;

        let elapsed = outgoing
            .elapsed()
            .and_then(|t| {
                if t.is_finite() {
                    Ok(t)
                } else {
                    Err(PlayerError::operation(
                        source.clone(),
                        PlayerOp::Elapsed,
                        "reported a non-finite position",
                    ))
                }
            })
            .map_err(|e| aborted(source, destination, e))?;

        let seek_target = graph.resolve_offset(source, destination, elapsed)?;
        tracing::debug!(
            "Swap '{}' -> '{}': elapsed {}, seeking to {}",
            source,
            destination,
            elapsed,
            seek_target
        );
        self.seek_with_retry(incoming, seek_target)
            .map_err(|e| aborted(source, destination, e))?;

        self.transition(SwapState::ActiveOn(destination.clone()));

        if let Err(e) = incoming.play() {
            self.transition(SwapState::ActiveOn(source.clone()));
            return Err(aborted(source, destination, e));
        }

        let record = SwapRecord {
            from: source.clone(),
            to: destination.clone(),
            elapsed,
            seek_target,
            calibrated: rule.offset.is_calibrated(),
        };
        tracing::info!(
            "Swapped '{}' -> '{}' at {} (seek {})",
            record.from,
            record.to,
            record.elapsed,
            record.seek_target
        );

        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(record.clone());

        Ok(SwapOutcome::Swapped(record))
    }

    /// Seek, retrying operation failures up to `seek_retries` times.
    fn seek_with_retry(&self, player: &dyn PlayerAdapter, target: Timestamp) -> PlayerResult<()> {
        let mut attempt = 0;
        loop {
            match player.seek(target) {
                Ok(()) => return Ok(()),
                Err(e) if !e.is_not_ready() && attempt < self.seek_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Seek on '{}' failed ({}), retry {}",
                        player.camera(),
                        e,
                        attempt
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Replace the state and notify listeners.
    fn transition(&mut self, next: SwapState) {
        let change = ActivationChange {
            previous: self.state.active().cloned(),
            current: next.active().cloned(),
        };
        self.state = next;
        for listener in &self.listeners {
            listener(&change);
        }
    }
}

impl Default for SwapCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn aborted(source: &CameraName, destination: &CameraName, err: PlayerError) -> SyncError {
    tracing::warn!("Swap '{}' -> '{}' aborted: {}", source, destination, err);
    err.into()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::config::SyncOptions;
    use crate::models::{Calibration, CameraDefinition, Hotspot, LinkDefinition};
    use crate::player::{PlayerCall, SimulatedPlayer, SimulatedPlayerFactory};

    struct Fixture {
        registry: CameraRegistry,
        factory: SimulatedPlayerFactory,
        coordinator: SwapCoordinator,
    }

    impl Fixture {
        fn new() -> Self {
            let defs = vec![
                CameraDefinition::new("A", "a").as_default().with_link(
                    LinkDefinition::new("B", Hotspot::new(20.0, 40.0))
                        .with_calibration(Calibration::new(20.0, 40.0)),
                ),
                CameraDefinition::new("B", "b")
                    .with_link(LinkDefinition::new("A", Hotspot::new(40.0, 70.0))),
            ];
            let mut factory = SimulatedPlayerFactory::ready();
            let registry =
                CameraRegistry::build(&SyncOptions::default(), defs, &mut factory).unwrap();
            Self {
                registry,
                factory,
                coordinator: SwapCoordinator::new(),
            }
        }

        fn player(&self, name: &str) -> SimulatedPlayer {
            self.factory.player(name).unwrap()
        }

        fn activate(&mut self, name: &str) {
            self.coordinator
                .activate_default(&self.registry, &CameraName::new(name))
                .unwrap();
        }

        fn swap(&mut self, name: &str) -> SyncResult<SwapOutcome> {
            self.coordinator.swap_to(&self.registry, &CameraName::new(name))
        }
    }

    fn name(s: &str) -> CameraName {
        CameraName::new(s)
    }

    #[test]
    fn activate_default_plays_without_seeking() {
        let mut fx = Fixture::new();
        fx.activate("A");

        assert_eq!(fx.coordinator.active(), Some(&name("A")));
        assert_eq!(fx.player("A").calls(), vec![PlayerCall::Play]);
    }

    #[test]
    fn activate_default_is_idempotent() {
        let mut fx = Fixture::new();
        fx.activate("A");
        let outcome = fx
            .coordinator
            .activate_default(&fx.registry, &name("B"))
            .unwrap();

        assert!(outcome.is_ignored());
        assert_eq!(fx.coordinator.active(), Some(&name("A")));
        assert!(fx.player("B").calls().is_empty());
    }

    #[test]
    fn swap_follows_protocol_order() {
        let mut fx = Fixture::new();
        fx.activate("A");
        fx.player("A").advance(25.0);

        let outcome = fx.swap("B").unwrap();
        let record = outcome.record().unwrap();
        assert_eq!(record.seek_target.as_secs(), 45.0);
        assert!(record.calibrated);

        assert_eq!(
            fx.player("A").calls(),
            vec![PlayerCall::Play, PlayerCall::Pause, PlayerCall::Elapsed]
        );
        assert_eq!(
            fx.player("B").calls(),
            vec![PlayerCall::Seek(Timestamp::from_secs(45.0)), PlayerCall::Play]
        );
        assert_eq!(fx.coordinator.active(), Some(&name("B")));
        assert!(!fx.player("A").is_playing());
        assert!(fx.player("B").is_playing());
    }

    #[test]
    fn swap_without_active_camera_is_noop() {
        let mut fx = Fixture::new();
        let outcome = fx.swap("B").unwrap();
        assert_eq!(outcome, SwapOutcome::Ignored(IgnoreReason::NoActiveCamera));
        assert!(fx.player("A").calls().is_empty());
        assert!(fx.player("B").calls().is_empty());
    }

    #[test]
    fn swap_to_self_issues_no_calls() {
        let mut fx = Fixture::new();
        fx.activate("A");
        fx.player("A").clear_calls();

        let outcome = fx.swap("A").unwrap();
        assert_eq!(
            outcome,
            SwapOutcome::Ignored(IgnoreReason::AlreadyActive { camera: name("A") })
        );
        assert!(fx.player("A").calls().is_empty());
    }

    #[test]
    fn stale_source_is_ignored() {
        let mut fx = Fixture::new();
        fx.activate("A");
        fx.swap("B").unwrap();
        fx.player("A").clear_calls();
        fx.player("B").clear_calls();

        let outcome = fx
            .coordinator
            .swap_to_from(&fx.registry, &name("A"), &name("B"))
            .unwrap();
        assert!(matches!(
            outcome,
            SwapOutcome::Ignored(IgnoreReason::StaleSource { .. })
        ));
        assert!(fx.player("A").calls().is_empty());
        assert!(fx.player("B").calls().is_empty());
        assert_eq!(fx.coordinator.active(), Some(&name("B")));
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let mut fx = Fixture::new();
        fx.activate("A");
        fx.player("A").clear_calls();

        let err = fx.swap("C").unwrap_err();
        assert_eq!(err, SyncError::unknown_destination("A", "C"));
        assert!(fx.player("A").calls().is_empty());
        assert_eq!(fx.coordinator.active(), Some(&name("A")));
    }

    #[test]
    fn seek_failure_aborts_and_keeps_source_active() {
        let mut fx = Fixture::new();
        fx.activate("A");
        fx.player("B").fail_next(PlayerOp::Seek, "network stall");

        let err = fx.swap("B").unwrap_err();
        assert!(matches!(err, SyncError::Player(PlayerError::Operation { .. })));
        assert_eq!(fx.coordinator.active(), Some(&name("A")));
        assert!(fx.coordinator.last_swap().is_none());
    }

    #[test]
    fn play_failure_restores_source_and_notifies() {
        let mut fx = Fixture::new();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        fx.coordinator
            .add_listener(Box::new(move |change: &ActivationChange| {
                sink.lock().push(change.clone())
            }));

        fx.activate("A");
        fx.player("B").fail_next(PlayerOp::Play, "blocked");
        assert!(fx.swap("B").is_err());

        assert_eq!(fx.coordinator.active(), Some(&name("A")));
        let changes = changes.lock();
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[1].current, Some(name("B")));
        assert_eq!(changes[2].previous, Some(name("B")));
        assert_eq!(changes[2].current, Some(name("A")));
    }

    #[test]
    fn seek_retries_recover_from_transient_failures() {
        let mut fx = Fixture::new();
        fx.coordinator = SwapCoordinator::new().with_seek_retries(1);
        fx.activate("A");
        fx.player("B").fail_next(PlayerOp::Seek, "stall");

        fx.swap("B").unwrap();
        assert_eq!(fx.coordinator.active(), Some(&name("B")));
        assert_eq!(
            fx.player("B").count_calls(|c| matches!(c, PlayerCall::Seek(_))),
            2
        );
    }

    #[test]
    fn not_ready_is_never_retried() {
        let mut fx = Fixture::new();
        fx.coordinator = SwapCoordinator::new().with_seek_retries(3);
        fx.activate("A");
        fx.player("B").set_ready(false);

        let err = fx.swap("B").unwrap_err();
        assert!(matches!(err, SyncError::Player(PlayerError::NotReady { .. })));
        assert_eq!(
            fx.player("B").count_calls(|c| matches!(c, PlayerCall::Seek(_))),
            1
        );
    }

    #[test]
    fn non_finite_elapsed_aborts() {
        let mut fx = Fixture::new();
        fx.activate("A");
        fx.player("A").set_position(Timestamp::from_secs(f64::NAN));

        assert!(fx.swap("B").is_err());
        assert_eq!(fx.coordinator.active(), Some(&name("A")));
        assert!(fx.player("B").calls().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let mut fx = Fixture::new();
        fx.activate("A");
        for i in 0..(HISTORY_LEN + 6) {
            let target = if i % 2 == 0 { "B" } else { "A" };
            fx.swap(target).unwrap();
        }
        assert_eq!(fx.coordinator.history().count(), HISTORY_LEN);
    }
}
