use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use engine::{
    GameLogic, HeadlessRunner,
    graphics::Renderer2d,
    regression::{history_hashes, record_then_replay},
    surface::SurfaceSize,
    ui::Rect,
};

fn temp_recording() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("engine_regression_harness_{nanos}.json"))
}

/// A dot that walks across a small grid.
#[derive(Debug, Clone)]
struct Walker;

#[derive(Debug, Clone, Copy)]
enum Dir {
    Right,
    Down,
}

impl GameLogic for Walker {
    type State = (u32, u32);
    type Input = Dir;

    fn initial_state(&self) -> Self::State {
        (0, 0)
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        match input {
            Dir::Right => ((state.0 + 1) % 8, state.1),
            Dir::Down => (state.0, (state.1 + 1) % 8),
        }
    }
}

fn draw(state: &(u32, u32), gfx: &mut dyn Renderer2d) {
    gfx.clear([0, 0, 0, 255]);
    gfx.fill_rect(Rect::new(state.0 * 2, state.1 * 2, 2, 2), [255, 0, 0, 255]);
}

const SIZE: SurfaceSize = SurfaceSize::new(16, 16);

#[test]
fn recorded_history_replays_to_identical_frames() {
    let out = temp_recording();
    let inputs = [Dir::Right, Dir::Right, Dir::Down, Dir::Right, Dir::Down];
    let comparison = record_then_replay(Walker, inputs, &out, SIZE, draw).expect("replay");

    assert_eq!(comparison.live.len(), 6);
    assert!(comparison.matches());
    assert_eq!(comparison.first_mismatch(), None);

    let _ = fs::remove_file(out);
}

#[test]
fn each_distinct_position_hashes_differently() {
    let mut runner = HeadlessRunner::new(Walker);
    runner.run([Dir::Right, Dir::Down]);
    let hashes = history_hashes(&runner, SIZE, draw);
    assert_eq!(hashes.len(), 3);
    assert_ne!(hashes[0], hashes[1]);
    assert_ne!(hashes[1], hashes[2]);
}

#[test]
fn history_after_rewind_ends_at_the_branch() {
    let mut runner = HeadlessRunner::new(Walker);
    runner.run([Dir::Right, Dir::Right, Dir::Right]);
    runner.rewind(2);
    runner.step(Dir::Down);
    assert_eq!(runner.history(), &[(0, 0), (1, 0), (1, 1)]);
}
