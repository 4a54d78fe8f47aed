//! In-memory player with a manual clock.
//!
//! Stands in for a real embedded player in the CLI simulator and in tests.
//! Handles are cheap clones sharing the same state, so the factory can keep
//! one for inspection while the registry owns another.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

use super::{PlayerAdapter, PlayerFactory, PlayerOptions};
use crate::errors::{PlayerError, PlayerOp, PlayerResult};
use crate::models::{CameraName, Timestamp};

/// A call received by a simulated player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "call", content = "at", rename_all = "snake_case")]
pub enum PlayerCall {
    Play,
    Pause,
    Seek(Timestamp),
    Elapsed,
}

#[derive(Debug, Default)]
struct SimState {
    ready: bool,
    playing: bool,
    position: Timestamp,
    calls: Vec<PlayerCall>,
    failures: HashMap<PlayerOp, VecDeque<String>>,
}

impl SimState {
    /// Record the call, then check readiness and injected failures.
    fn begin(&mut self, camera: &CameraName, op: PlayerOp, call: PlayerCall) -> PlayerResult<()> {
        self.calls.push(call);

        if !self.ready {
            return Err(PlayerError::not_ready(camera.clone()));
        }

        if let Some(message) = self.failures.get_mut(&op).and_then(|q| q.pop_front()) {
            return Err(PlayerError::operation(camera.clone(), op, message));
        }

        Ok(())
    }
}

/// Simulated player bound to one camera.
#[derive(Debug, Clone)]
pub struct SimulatedPlayer {
    camera: CameraName,
    media_id: String,
    options: PlayerOptions,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedPlayer {
    /// Create a paused, not-yet-ready player at position zero.
    pub fn new(
        camera: impl Into<CameraName>,
        media_id: impl Into<String>,
        options: PlayerOptions,
    ) -> Self {
        Self {
            camera: camera.into(),
            media_id: media_id.into(),
            options,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    /// Media reference the player was created with.
    pub fn media_id(&self) -> &str {
        &self.media_id
    }

    /// Options the player was created with.
    pub fn options(&self) -> PlayerOptions {
        self.options
    }

    /// Mark the player ready (or not).
    pub fn set_ready(&self, ready: bool) {
        self.state.lock().ready = ready;
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Current position, without recording a call.
    pub fn position(&self) -> Timestamp {
        self.state.lock().position
    }

    /// Force the playhead position, without recording a call.
    pub fn set_position(&self, position: Timestamp) {
        self.state.lock().position = position;
    }

    /// Advance the clock by `secs`. Only moves the playhead while playing.
    pub fn advance(&self, secs: f64) {
        let mut state = self.state.lock();
        if state.playing {
            state.position = state.position.offset_by(secs);
        }
    }

    /// Make the next `op` call fail with `message`. Failures queue up.
    pub fn fail_next(&self, op: PlayerOp, message: impl Into<String>) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(message.into());
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.state.lock().calls.clone()
    }

    /// Number of received calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&PlayerCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(*c)).count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

impl PlayerAdapter for SimulatedPlayer {
    fn camera(&self) -> &CameraName {
        &self.camera
    }

    fn is_ready(&self) -> bool {
        self.state.lock().ready
    }

    fn play(&self) -> PlayerResult<()> {
        let mut state = self.state.lock();
        state.begin(&self.camera, PlayerOp::Play, PlayerCall::Play)?;
        state.playing = true;
        Ok(())
    }

    fn pause(&self) -> PlayerResult<()> {
        let mut state = self.state.lock();
        state.begin(&self.camera, PlayerOp::Pause, PlayerCall::Pause)?;
        state.playing = false;
        Ok(())
    }

    fn seek(&self, to: Timestamp) -> PlayerResult<()> {
        let mut state = self.state.lock();
        state.begin(&self.camera, PlayerOp::Seek, PlayerCall::Seek(to))?;
        state.position = to;
        Ok(())
    }

    fn elapsed(&self) -> PlayerResult<Timestamp> {
        let mut state = self.state.lock();
        state.begin(&self.camera, PlayerOp::Elapsed, PlayerCall::Elapsed)?;
        Ok(state.position)
    }
}

/// Factory producing [`SimulatedPlayer`]s and keeping a handle to each.
#[derive(Debug, Default)]
pub struct SimulatedPlayerFactory {
    players: IndexMap<CameraName, SimulatedPlayer>,
    start_ready: bool,
}

impl SimulatedPlayerFactory {
    /// Factory whose players start out not ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose players are ready as soon as they are created.
    pub fn ready() -> Self {
        Self {
            players: IndexMap::new(),
            start_ready: true,
        }
    }

    /// Handle to the player created for `camera`.
    pub fn player(&self, camera: &str) -> Option<SimulatedPlayer> {
        self.players.get(camera).cloned()
    }

    /// All created players, in creation order.
    pub fn players(&self) -> impl Iterator<Item = &SimulatedPlayer> {
        self.players.values()
    }

    /// Advance every playing player's clock by `secs`.
    pub fn advance_all(&self, secs: f64) {
        for player in self.players.values() {
            player.advance(secs);
        }
    }
}

impl PlayerFactory for SimulatedPlayerFactory {
    fn create(
        &mut self,
        camera: &CameraName,
        media_id: &str,
        options: &PlayerOptions,
    ) -> PlayerResult<Box<dyn PlayerAdapter>> {
        let player = SimulatedPlayer::new(camera.clone(), media_id, *options);
        player.set_ready(self.start_ready);
        self.players.insert(camera.clone(), player.clone());
        Ok(Box::new(player))
    }
}
