//! Determinism checks for headless runs.
//!
//! A run is rendered frame by frame into an RGBA buffer and each frame is reduced to a SHA-256
//! hex digest. Recording the `TimeMachine` to JSON, loading it back and re-rendering must give
//! the same digests.

use std::{io, path::Path};

use serde::{Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};

use crate::{
    GameLogic, HeadlessRunner, TimeMachine,
    graphics::{CpuRenderer, Renderer2d},
    surface::SurfaceSize,
};

pub fn rgba_sha256_hex(rgba: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rgba);
    hex::encode(hasher.finalize())
}

/// Renders `state` into a fresh buffer of `size` and hashes it.
pub fn render_hash<S, Render>(state: &S, size: SurfaceSize, render: &mut Render) -> String
where
    Render: FnMut(&S, &mut dyn Renderer2d),
{
    let mut buf = vec![0u8; size.rgba_len()];
    let mut gfx = CpuRenderer::new(&mut buf, size);
    gfx.begin_frame(size);
    render(state, &mut gfx);
    rgba_sha256_hex(&buf)
}

/// One hash per state in the runner's history.
pub fn history_hashes<G, Render>(
    runner: &HeadlessRunner<G>,
    size: SurfaceSize,
    mut render: Render,
) -> Vec<String>
where
    G: GameLogic,
    Render: FnMut(&G::State, &mut dyn Renderer2d),
{
    runner
        .history()
        .iter()
        .map(|state| render_hash(state, size, &mut render))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayComparison {
    pub live: Vec<String>,
    pub replay: Vec<String>,
}

impl ReplayComparison {
    pub fn matches(&self) -> bool {
        self.live == self.replay
    }

    /// First frame whose hashes differ, if any.
    pub fn first_mismatch(&self) -> Option<usize> {
        if self.live.len() != self.replay.len() {
            return Some(self.live.len().min(self.replay.len()));
        }
        self.live.iter().zip(&self.replay).position(|(a, b)| a != b)
    }
}

/// Runs `inputs` live, saves the history to `recording`, reloads it and hashes both.
pub fn record_then_replay<G, Render>(
    game: G,
    inputs: impl IntoIterator<Item = G::Input>,
    recording: impl AsRef<Path>,
    size: SurfaceSize,
    mut render: Render,
) -> io::Result<ReplayComparison>
where
    G: GameLogic + Clone,
    G::State: Serialize + DeserializeOwned,
    Render: FnMut(&G::State, &mut dyn Renderer2d),
{
    let recording = recording.as_ref();

    let mut live = HeadlessRunner::new(game.clone());
    live.run(inputs);
    let live_hashes = history_hashes(&live, size, &mut render);
    live.timemachine().save_json_file(recording)?;

    let tm = TimeMachine::<G::State>::load_json_file(recording)?;
    let replay = HeadlessRunner::from_timemachine(game, tm);
    let replay_hashes = history_hashes(&replay, size, &mut render);

    Ok(ReplayComparison {
        live: live_hashes,
        replay: replay_hashes,
    })
}
