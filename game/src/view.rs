use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameView {
    /// Level select. `hovered` is the level under the pointer.
    Preparation { hovered: Option<u8> },
    Level(u8),
}

impl Default for GameView {
    fn default() -> Self {
        Self::Preparation { hovered: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEvent {
    Hover(Option<u8>),
    SelectLevel(u8),
    RoundOver,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEffect {
    None,
    StartRound(u8),
    EndRound,
}

impl GameView {
    /// Pure transition function for the scene state machine.
    ///
    /// Starting and dropping the round itself is left to the caller through `GameViewEffect`.
    pub fn handle(self, event: GameViewEvent) -> (GameView, GameViewEffect) {
        match (self, event) {
            (GameView::Preparation { .. }, GameViewEvent::Hover(hovered)) => {
                (GameView::Preparation { hovered }, GameViewEffect::None)
            }
            (GameView::Preparation { .. }, GameViewEvent::SelectLevel(n)) => {
                (GameView::Level(n), GameViewEffect::StartRound(n))
            }

            (GameView::Level(_), GameViewEvent::RoundOver | GameViewEvent::Back) => {
                (GameView::default(), GameViewEffect::EndRound)
            }

            (state, _) => (state, GameViewEffect::None),
        }
    }

    pub fn is_level(self) -> bool {
        matches!(self, GameView::Level(_))
    }

    pub fn hovered(self) -> Option<u8> {
        match self {
            GameView::Preparation { hovered } => hovered,
            GameView::Level(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_view_is_preparation_without_hover() {
        assert_eq!(GameView::default(), GameView::Preparation { hovered: None });
    }

    #[test]
    fn hover_updates_preparation_only() {
        assert_eq!(
            GameView::default().handle(GameViewEvent::Hover(Some(2))),
            (
                GameView::Preparation { hovered: Some(2) },
                GameViewEffect::None
            )
        );
        assert_eq!(
            GameView::Level(1).handle(GameViewEvent::Hover(Some(2))),
            (GameView::Level(1), GameViewEffect::None)
        );
    }

    #[test]
    fn select_level_starts_round() {
        assert_eq!(
            GameView::Preparation { hovered: Some(1) }.handle(GameViewEvent::SelectLevel(1)),
            (GameView::Level(1), GameViewEffect::StartRound(1))
        );
    }

    #[test]
    fn select_inside_level_is_ignored() {
        assert_eq!(
            GameView::Level(1).handle(GameViewEvent::SelectLevel(2)),
            (GameView::Level(1), GameViewEffect::None)
        );
    }

    #[test]
    fn round_over_and_back_return_to_preparation() {
        for event in [GameViewEvent::RoundOver, GameViewEvent::Back] {
            assert_eq!(
                GameView::Level(2).handle(event),
                (GameView::default(), GameViewEffect::EndRound)
            );
        }
    }

    #[test]
    fn back_in_preparation_is_ignored() {
        assert_eq!(
            GameView::default().handle(GameViewEvent::Back),
            (GameView::default(), GameViewEffect::None)
        );
    }
}
