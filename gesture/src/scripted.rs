//! Replays a fixed list of observations, for camera-less runs and tests.
//!
//! Scripts are JSON arrays of steps:
//!
//! ```json
//! [
//!   { "kind": "pose", "gesture": "scissor", "frames": 4 },
//!   { "kind": "no_hand", "frames": 2 },
//!   { "kind": "no_frame" },
//!   { "kind": "landmarks", "points": [{ "id": 0, "x": 320, "y": 420 }] }
//! ]
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classifier::RawGesture;
use crate::landmarks::LandmarkSet;
use crate::poses;
use crate::source::{LandmarkSource, Observation};

fn one_frame() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptStep {
    /// A synthetic hand classifying as `gesture`; `"None"` means no hand.
    Pose {
        gesture: RawGesture,
        #[serde(default = "one_frame")]
        frames: u32,
    },
    Landmarks {
        points: LandmarkSet,
        #[serde(default = "one_frame")]
        frames: u32,
    },
    NoHand {
        #[serde(default = "one_frame")]
        frames: u32,
    },
    NoFrame {
        #[serde(default = "one_frame")]
        frames: u32,
    },
}

impl ScriptStep {
    fn expand(self, out: &mut Vec<Observation>) {
        let (observation, frames) = match self {
            ScriptStep::Pose { gesture, frames } => (
                poses::for_gesture(gesture).map_or(Observation::NoHand, Observation::Hand),
                frames,
            ),
            ScriptStep::Landmarks { points, frames } => (Observation::Hand(points), frames),
            ScriptStep::NoHand { frames } => (Observation::NoHand, frames),
            ScriptStep::NoFrame { frames } => (Observation::NoFrame, frames),
        };
        out.extend(std::iter::repeat_n(observation, frames as usize));
    }
}

#[derive(Debug, Clone)]
pub struct ScriptedSource {
    observations: Vec<Observation>,
    cursor: usize,
    looping: bool,
}

impl ScriptedSource {
    /// Cycles through `observations` forever.
    pub fn looping(observations: Vec<Observation>) -> Self {
        Self {
            observations,
            cursor: 0,
            looping: true,
        }
    }

    /// Plays `observations` once, then reports `Exhausted`.
    pub fn once(observations: Vec<Observation>) -> Self {
        Self {
            looping: false,
            ..Self::looping(observations)
        }
    }

    pub fn from_steps(steps: Vec<ScriptStep>, looping: bool) -> Self {
        let mut observations = Vec::new();
        for step in steps {
            step.expand(&mut observations);
        }
        if looping {
            Self::looping(observations)
        } else {
            Self::once(observations)
        }
    }

    pub fn from_json_str(json: &str, looping: bool) -> Result<Self> {
        let steps: Vec<ScriptStep> = serde_json::from_str(json).context("parsing gesture script")?;
        Ok(Self::from_steps(steps, looping))
    }

    pub fn load_json_file(path: impl AsRef<Path>, looping: bool) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading gesture script {}", path.display()))?;
        Self::from_json_str(&json, looping)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl LandmarkSource for ScriptedSource {
    fn poll(&mut self) -> Result<Observation> {
        if self.cursor >= self.observations.len() {
            if !self.looping || self.observations.is_empty() {
                return Ok(Observation::Exhausted);
            }
            self.cursor = 0;
        }
        let observation = self.observations[self.cursor].clone();
        self.cursor += 1;
        Ok(observation)
    }
}
