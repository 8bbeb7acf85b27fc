use serde::{Deserialize, Serialize};

use crate::round::{LevelRound, RoundEvent, RoundOutcome};
use crate::view::GameView;

/// Rewards unlocked across levels in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub sword: bool,
    pub amulet: bool,
    pub shield: bool,
    pub eyeball: bool,
}

impl Default for SessionProgress {
    fn default() -> Self {
        Self {
            sword: true,
            amulet: false,
            shield: false,
            eyeball: false,
        }
    }
}

impl SessionProgress {
    pub fn record(&mut self, outcome: RoundOutcome) {
        if outcome == RoundOutcome::Won {
            self.amulet = true;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedRound {
    pub level: u8,
    pub outcome: RoundOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub view: GameView,
    pub progress: SessionProgress,
    /// Present exactly while `view` is a level.
    pub round: Option<LevelRound>,
    pub last_outcome: Option<FinishedRound>,
    /// What the round reported during the latest step.
    #[serde(default)]
    pub events: Vec<RoundEvent>,
}

impl GameState {
    pub fn round(&self) -> Option<&LevelRound> {
        self.round.as_ref()
    }
}
