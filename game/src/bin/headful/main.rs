use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use engine::HeadlessRunner;
use engine::profiling::SlowStepLogger;
use engine::app::{AppConfig, AppContext, GameApp, InputFrame, run_game};
use engine::graphics::Renderer2d;
use engine::view_tree::ViewTree;
use gesture::scripted::ScriptedSource;
use gesture::stream::spawn_detector;
use gesture::{GestureFeed, GestureTracker, RawGesture};
use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::VirtualKeyCode;

use reaction_game::level::LevelBook;
use reaction_game::logic::{GameInput, ReactionLogic};
use reaction_game::settings::{SettingsStore, TrackingSettings};
use reaction_game::sfx::Cue;
use reaction_game::ui::{self, UiAction, WINDOW_HEIGHT, WINDOW_WIDTH, hovered_level};

/// Frames kept for `--record`; about a minute at 60 fps.
const HISTORY_LIMIT: usize = 3600;

const STEP_BUDGET: Duration = Duration::from_millis(4);

/// How often `--track-only` looks for a new label.
const TRACK_ONLY_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Parser)]
#[command(name = "reaction-game")]
#[command(about = "Reaction game played with hand gestures in front of a webcam")]
struct Cli {
    /// Landmark detector to run, printing one JSON line per frame. Overrides the settings file.
    #[arg(long)]
    detector_cmd: Option<String>,
    /// Replay a gesture script in a loop instead of running a detector.
    #[arg(long, conflicts_with = "detector_cmd")]
    script: Option<PathBuf>,
    /// Level definitions to use instead of the built-in ones.
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Write the recent session history as JSON on exit.
    #[arg(long)]
    record: Option<PathBuf>,
    /// Only run the hand tracker and log each recognised gesture. Opens no window.
    #[arg(long)]
    track_only: bool,
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn is_running_in_wsl() -> bool {
    std::env::var_os("WSL_INTEROP").is_some() || std::env::var_os("WSL_DISTRO_NAME").is_some()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = SettingsStore::from_env();
    let settings = store.load();
    info!(path = %store.path().display(), "settings loaded");

    if cli.track_only {
        let Some(mut tracker) = start_tracker(&cli, &settings.tracking)? else {
            bail!("--track-only needs --detector-cmd, --script or a detector in the settings file");
        };
        run_track_only(&mut tracker, TRACK_ONLY_POLL);
        return Ok(());
    }

    let book = match cli.levels.as_ref() {
        Some(path) => LevelBook::load_json_file(path)?,
        None => LevelBook::builtin()?,
    };
    let logic = ReactionLogic::new(book).with_debounce_threshold(settings.tracking.debounce_threshold);
    let tracker = start_tracker(&cli, &settings.tracking)?;

    let config = AppConfig {
        title: "Reaction Game".to_string(),
        desired_size: PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT),
        clamp_to_monitor: true,
        resizable: false,
        vsync: env_bool("REACTION_HEADFUL_VSYNC").or(Some(settings.video.vsync)),
    };
    let app = HeadfulApp::new(
        logic,
        tracker,
        settings.audio.effective_sfx_gain(),
        cli.record,
    );
    run_game(config, app).map_err(|err| anyhow!("window loop failed: {err}"))
}

fn start_tracker(cli: &Cli, tracking: &TrackingSettings) -> anyhow::Result<Option<GestureTracker>> {
    let config = tracking.tracker_config();
    if let Some(path) = cli.script.as_ref() {
        let source = ScriptedSource::load_json_file(path, true)?;
        info!(path = %path.display(), frames = source.len(), "replaying gesture script");
        return GestureTracker::spawn(source, config).map(Some);
    }

    let command = cli
        .detector_cmd
        .clone()
        .or_else(|| tracking.detector_command.clone());
    let Some(command) = command else {
        info!("no hand detector configured, use the keyboard overrides");
        return Ok(None);
    };
    let detector = spawn_detector(&command, &tracking.detector_config())
        .with_context(|| format!("starting detector `{command}`"))?;
    GestureTracker::spawn(detector, config).map(Some)
}

/// Logs each gesture label change until the tracker ends, then stops it.
///
/// Returns the labels in the order they were logged.
fn run_track_only(tracker: &mut GestureTracker, poll: Duration) -> Vec<RawGesture> {
    let mut feed = tracker.feed();
    let mut logged = Vec::new();
    while tracker.is_running() {
        if feed.has_changed() {
            let gesture = feed.mark_seen();
            info!(%gesture, "gesture");
            logged.push(gesture);
        }
        thread::sleep(poll);
    }

    // The channel is closed now; a label published last is only visible by value.
    let last = feed.latest();
    if logged.last().copied().unwrap_or(RawGesture::None) != last {
        info!(gesture = %last, "gesture");
        logged.push(last);
    }

    let status = tracker.status();
    info!(
        frames = status.frames,
        hands = status.hands,
        errors = status.errors,
        "tracker finished"
    );
    tracker.stop();
    logged
}

/// Keys the levels may bind to gestures.
fn key_char(key: VirtualKeyCode) -> Option<char> {
    match key {
        VirtualKeyCode::S => Some('s'),
        VirtualKeyCode::F => Some('f'),
        VirtualKeyCode::H => Some('h'),
        VirtualKeyCode::O => Some('o'),
        VirtualKeyCode::B => Some('b'),
        _ => None,
    }
}

struct Sfx {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    gain: f32,
}

impl Sfx {
    fn new(gain: f32) -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            gain,
        })
    }

    fn play(&self, cue: Cue) {
        if self.gain <= 0.0 {
            return;
        }
        let Ok(sink) = Sink::try_new(&self.handle) else {
            return;
        };
        for tone in cue.tones() {
            sink.append(
                SineWave::new(tone.frequency_hz)
                    .take_duration(tone.duration)
                    .amplify(tone.volume * self.gain),
            );
        }
        sink.detach();
    }
}

struct HeadfulApp {
    logic: ReactionLogic,
    tracker: Option<GestureTracker>,
    feed: Option<GestureFeed>,
    sfx: Option<Sfx>,
    record_path: Option<PathBuf>,
    step_log: SlowStepLogger,
    exit_requested: bool,
}

impl HeadfulApp {
    fn new(
        logic: ReactionLogic,
        tracker: Option<GestureTracker>,
        sfx_gain: f32,
        record_path: Option<PathBuf>,
    ) -> Self {
        let sfx = match Sfx::new(sfx_gain) {
            Ok(sfx) => Some(sfx),
            Err(err) => {
                warn!("audio disabled: {err}");
                if is_running_in_wsl() {
                    warn!(
                        "in WSL install `libasound2-plugins pulseaudio-utils alsa-utils` so ALSA can route to WSLg PulseAudio"
                    );
                }
                None
            }
        };
        let feed = tracker.as_ref().map(GestureTracker::feed);
        Self {
            logic,
            tracker,
            feed,
            sfx,
            record_path,
            step_log: SlowStepLogger {
                budget: STEP_BUDGET,
            },
            exit_requested: false,
        }
    }

    fn latest_gesture(&self) -> RawGesture {
        self.feed
            .as_ref()
            .map(GestureFeed::latest)
            .unwrap_or(RawGesture::None)
    }
}

impl GameApp for HeadfulApp {
    type State = HeadlessRunner<ReactionLogic>;
    type Action = UiAction;
    type Effect = Cue;

    fn init_state(&mut self, _ctx: &mut AppContext) -> Self::State {
        HeadlessRunner::new(self.logic.clone()).with_history_limit(HISTORY_LIMIT)
    }

    fn build_view(&self, state: &Self::State, _ctx: &AppContext) -> ViewTree<Self::Action> {
        ui::build_view_tree(state.state())
    }

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        actions: &[Self::Action],
        _ctx: &mut AppContext,
    ) -> Vec<Self::Effect> {
        let mut effects = Vec::new();

        let view = state.state().view;
        if input.mouse_moved && !view.is_level() {
            let hovered = input.mouse_pos.and_then(hovered_level);
            if hovered != view.hovered() {
                state.step(GameInput::Hover(hovered));
            }
        }

        for action in actions {
            match *action {
                UiAction::SelectLevel(number) => {
                    state.step(GameInput::SelectLevel(number));
                    effects.push(Cue::Click);
                }
                UiAction::BackToMenu => {
                    state.step(GameInput::Back);
                }
            }
        }

        if input.pressed(VirtualKeyCode::Escape) {
            if state.state().view.is_level() {
                state.step(GameInput::Back);
            } else {
                self.exit_requested = true;
            }
        }

        let key = input.keys_pressed.iter().copied().find_map(key_char);
        state.step_profiled(
            GameInput::Tick {
                dt,
                gesture: self.latest_gesture(),
                key,
            },
            &mut self.step_log,
        );
        effects.extend(state.state().events.iter().filter_map(Cue::for_event));
        effects
    }

    fn render(
        &mut self,
        state: &Self::State,
        view: &ViewTree<Self::Action>,
        renderer: &mut dyn Renderer2d,
    ) {
        ui::render(state.state(), view, renderer);
    }

    fn handle_effects(&mut self, effects: Vec<Self::Effect>, _ctx: &mut AppContext) {
        let Some(sfx) = self.sfx.as_ref() else {
            return;
        };
        for cue in effects {
            sfx.play(cue);
        }
    }

    fn wants_exit(&self, _state: &Self::State) -> bool {
        self.exit_requested
    }

    fn on_exit(&mut self, state: &mut Self::State) {
        if let Some(tracker) = self.tracker.as_mut() {
            let status = tracker.status();
            info!(
                frames = status.frames,
                hands = status.hands,
                skipped = status.skipped,
                errors = status.errors,
                "stopping gesture tracker"
            );
            tracker.stop();
        }

        if let Some(path) = self.record_path.as_ref() {
            match state.timemachine().save_json_file(path) {
                Ok(()) => info!(path = %path.display(), frames = state.history().len(), "session recorded"),
                Err(err) => warn!(path = %path.display(), "failed to save recording: {err}"),
            }
        }
    }
}
