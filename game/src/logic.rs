use std::sync::Arc;
use std::time::Duration;

use engine::GameLogic;
use gesture::RawGesture;
use gesture::debounce::DEFAULT_STABILITY_THRESHOLD;
use tracing::{info, warn};

use crate::level::LevelBook;
use crate::round::{LevelRound, RoundInput};
use crate::state::{FinishedRound, GameState};
use crate::view::{GameViewEffect, GameViewEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameInput {
    Noop,
    /// One frame of play: elapsed time, the tracker's latest label and a pressed key.
    Tick {
        dt: Duration,
        gesture: RawGesture,
        key: Option<char>,
    },
    Hover(Option<u8>),
    SelectLevel(u8),
    Back,
}

impl GameInput {
    pub fn tick(dt: Duration, gesture: RawGesture) -> Self {
        GameInput::Tick {
            dt,
            gesture,
            key: None,
        }
    }
}

/// The whole session as a deterministic state machine.
#[derive(Debug, Clone)]
pub struct ReactionLogic {
    book: Arc<LevelBook>,
    debounce_threshold: u32,
}

impl ReactionLogic {
    pub fn new(book: LevelBook) -> Self {
        Self {
            book: Arc::new(book),
            debounce_threshold: DEFAULT_STABILITY_THRESHOLD,
        }
    }

    pub fn with_debounce_threshold(mut self, threshold: u32) -> Self {
        self.debounce_threshold = threshold.max(1);
        self
    }

    pub fn book(&self) -> &LevelBook {
        &self.book
    }

    fn select_level(&self, state: &mut GameState, number: u8) {
        let Some(level) = self.book.get(number) else {
            warn!(level = number, "no such level");
            return;
        };
        if !level.is_playable() {
            info!(level = number, "level has no recipe yet");
            return;
        }
        let (view, effect) = state.view.handle(GameViewEvent::SelectLevel(number));
        state.view = view;
        if effect == GameViewEffect::StartRound(number) {
            state.round = Some(LevelRound::new(level.clone(), self.debounce_threshold));
            state.last_outcome = None;
        }
    }

    fn end_round(state: &mut GameState, event: GameViewEvent) {
        let (view, effect) = state.view.handle(event);
        state.view = view;
        if effect == GameViewEffect::EndRound {
            state.round = None;
        }
    }
}

impl GameLogic for ReactionLogic {
    type State = GameState;
    type Input = GameInput;

    fn initial_state(&self) -> Self::State {
        GameState::default()
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        next.events.clear();

        match input {
            GameInput::Noop => {}
            GameInput::Hover(hovered) => {
                next.view = next.view.handle(GameViewEvent::Hover(hovered)).0;
            }
            GameInput::SelectLevel(number) => self.select_level(&mut next, number),
            GameInput::Back => Self::end_round(&mut next, GameViewEvent::Back),
            GameInput::Tick { dt, gesture, key } => {
                let Some(round) = next.round.as_mut() else {
                    return next;
                };
                next.events = round.update(RoundInput {
                    dt,
                    raw_gesture: gesture,
                    key_override: key,
                });
                if let Some(outcome) = round.outcome() {
                    let level = round.level().number;
                    next.progress.record(outcome);
                    next.last_outcome = Some(FinishedRound { level, outcome });
                    Self::end_round(&mut next, GameViewEvent::RoundOver);
                }
            }
        }
        next
    }
}
