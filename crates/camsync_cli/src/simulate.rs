//! Scripted swaps over simulated players.

use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;

use camsync_core::config::CameraConfig;
use camsync_core::coordinator::SwapOutcome;
use camsync_core::player::SimulatedPlayerFactory;
use camsync_core::CameraSync;

/// One scripted step: play for `play_secs`, then swap to `destination`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub destination: String,
    pub play_secs: f64,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (destination, play_secs) = match s.split_once('@') {
            Some((dest, secs)) => {
                let secs: f64 = secs
                    .parse()
                    .map_err(|_| format!("invalid seconds in step '{}'", s))?;
                if !secs.is_finite() || secs < 0.0 {
                    return Err(format!("seconds must be non-negative in step '{}'", s));
                }
                (dest, secs)
            }
            None => (s, 0.0),
        };

        if destination.is_empty() {
            return Err(format!("missing destination in step '{}'", s));
        }

        Ok(Self {
            destination: destination.to_string(),
            play_secs,
        })
    }
}

/// One line of simulator output.
#[derive(Debug, Serialize)]
struct StepReport<'a> {
    step: usize,
    destination: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<SwapOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    active: Option<&'a str>,
}

/// Run `steps` against `config` and return one JSON line per step.
///
/// Swap failures are reported in the output and do not stop the run.
pub fn run(config: &CameraConfig, steps: &[Step], late_ready: bool) -> Result<Vec<String>> {
    let mut factory = if late_ready {
        SimulatedPlayerFactory::new()
    } else {
        SimulatedPlayerFactory::ready()
    };
    let mut sync = CameraSync::build(config, &mut factory)?;

    if late_ready {
        let names: Vec<String> = sync.cameras().map(|c| c.name().to_string()).collect();
        for name in names {
            if let Some(player) = factory.player(&name) {
                player.set_ready(true);
            }
            sync.notify_ready(&name)?;
        }
    }

    let mut lines = Vec::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        factory.advance_all(step.play_secs);

        let (outcome, error) = match sync.swap_to(&step.destination) {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => {
                tracing::warn!("Step {} failed: {}", i + 1, e);
                (None, Some(e.to_string()))
            }
        };

        let report = StepReport {
            step: i + 1,
            destination: &step.destination,
            outcome,
            error,
            active: sync.active().map(|c| c.as_str()),
        };
        lines.push(serde_json::to_string(&report)?);
    }

    Ok(lines)
}
