use std::time::Duration;

use engine::HeadlessRunner;
use gesture::{ActiveGesture, RawGesture};
use reaction_game::level::{LevelBook, LevelConfig, ObjectKind, SpawnEntry};
use reaction_game::logic::{GameInput, ReactionLogic};
use reaction_game::round::{RoundEvent, RoundOutcome};
use reaction_game::state::FinishedRound;
use reaction_game::view::GameView;

fn builtin_session() -> HeadlessRunner<ReactionLogic> {
    HeadlessRunner::new(ReactionLogic::new(LevelBook::builtin().unwrap()))
}

/// One level with a single sword that lands on the third tick.
fn duel(player_health: i32, enemy_health: i32) -> HeadlessRunner<ReactionLogic> {
    let mut level = LevelConfig::new(
        1,
        vec![SpawnEntry {
            kind: ObjectKind::Sword,
            at_secs: 0.0,
        }],
        Duration::from_millis(30),
    );
    level.bottom_threshold = 20;
    level.player_health = player_health;
    level.enemy_health = enemy_health;
    level.keys.insert('s', ActiveGesture::Sword);
    HeadlessRunner::new(ReactionLogic::new(LevelBook::new(vec![level]).unwrap()))
}

fn tick(ms: u64) -> GameInput {
    GameInput::tick(Duration::from_millis(ms), RawGesture::None)
}

/// A tick with the player holding up two fingers.
fn scissor_tick(ms: u64) -> GameInput {
    GameInput::tick(Duration::from_millis(ms), RawGesture::Scissor)
}

#[test]
fn builtin_book_lists_four_levels() {
    let book = LevelBook::builtin().unwrap();
    let numbers: Vec<u8> = book.levels().iter().map(|l| l.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert!(book.get(1).unwrap().is_playable());
    assert!(book.get(2).unwrap().allow_ok);
    assert!(!book.get(3).unwrap().is_playable());
}

#[test]
fn hover_and_selection_drive_the_view() {
    let mut game = builtin_session();
    game.step(GameInput::Hover(Some(2)));
    assert_eq!(game.state().view, GameView::Preparation { hovered: Some(2) });

    game.step(GameInput::SelectLevel(1));
    assert_eq!(game.state().view, GameView::Level(1));
    assert_eq!(game.state().round().map(|r| r.level().number), Some(1));

    game.step(GameInput::Hover(Some(3)));
    assert_eq!(game.state().view, GameView::Level(1));

    game.step(GameInput::Back);
    assert_eq!(game.state().view, GameView::default());
    assert!(game.state().round().is_none());
    assert!(game.state().last_outcome.is_none());
}

#[test]
fn placeholder_and_missing_levels_stay_in_the_menu() {
    let mut game = builtin_session();
    game.step(GameInput::SelectLevel(3));
    game.step(GameInput::SelectLevel(9));
    assert_eq!(game.state().view, GameView::default());
    assert!(game.state().round().is_none());
}

#[test]
fn ticks_in_the_menu_do_nothing() {
    let mut game = builtin_session();
    let before = game.state().clone();
    game.run([tick(500), tick(500), GameInput::Noop]);
    assert_eq!(game.state(), &before);
    assert_eq!(game.frame(), 3);
}

#[test]
fn winning_returns_to_the_menu_and_unlocks_the_amulet() {
    let mut game = duel(5, 1);
    assert!(!game.state().progress.amulet);

    game.step(GameInput::SelectLevel(1));
    game.step(GameInput::Tick {
        dt: Duration::ZERO,
        gesture: RawGesture::Scissor,
        key: Some('s'),
    });
    game.run([scissor_tick(31), scissor_tick(31), scissor_tick(31)]);

    let state = game.state();
    assert_eq!(state.view, GameView::default());
    assert!(state.round().is_none());
    assert!(state.progress.amulet);
    assert!(state.progress.sword);
    assert_eq!(
        state.last_outcome,
        Some(FinishedRound {
            level: 1,
            outcome: RoundOutcome::Won
        })
    );
    assert_eq!(
        state.events.last(),
        Some(&RoundEvent::Finished(RoundOutcome::Won))
    );

    // The next step starts with a clean event list.
    game.step(GameInput::Noop);
    assert!(game.state().events.is_empty());
}

#[test]
fn losing_keeps_the_amulet_locked() {
    let mut game = duel(1, 10);
    game.step(GameInput::SelectLevel(1));
    game.run([tick(0), tick(31), tick(31), tick(31)]);

    let state = game.state();
    assert!(!state.progress.amulet);
    assert_eq!(
        state.last_outcome.map(|f| f.outcome),
        Some(RoundOutcome::Lost)
    );

    game.step(GameInput::SelectLevel(1));
    assert!(game.state().last_outcome.is_none());
    assert_eq!(game.state().round().map(|r| r.player_health()), Some(1));
}

#[test]
fn camera_gestures_reach_the_round_through_the_debouncer() {
    let mut game = builtin_session();
    game.step(GameInput::SelectLevel(1));
    for _ in 0..4 {
        game.step(GameInput::tick(Duration::from_millis(5), RawGesture::Paper));
    }
    let round = game.state().round().unwrap();
    assert_eq!(round.active_gesture(), ActiveGesture::Shield);
}

#[test]
fn rewinding_restores_an_earlier_round() {
    let mut game = duel(5, 1);
    game.step(GameInput::SelectLevel(1));
    game.step(GameInput::Tick {
        dt: Duration::ZERO,
        gesture: RawGesture::Scissor,
        key: Some('s'),
    });
    game.step(scissor_tick(31));
    let mid_round = game.state().clone();
    game.run([scissor_tick(31), scissor_tick(31)]);
    assert!(game.state().round().is_none());

    game.rewind(2);
    assert_eq!(game.state(), &mid_round);
}

#[test]
fn key_press_lasts_until_the_camera_reading_is_stable_again() {
    let mut game = builtin_session();
    game.step(GameInput::SelectLevel(1));
    for _ in 0..5 {
        game.step(GameInput::tick(Duration::from_millis(5), RawGesture::Fist));
    }
    game.step(GameInput::Tick {
        dt: Duration::from_millis(5),
        gesture: RawGesture::Fist,
        key: Some('s'),
    });
    assert_eq!(
        game.state().round().map(|r| r.active_gesture()),
        Some(ActiveGesture::Sword)
    );

    game.step(GameInput::tick(Duration::from_millis(5), RawGesture::Fist));
    assert_eq!(
        game.state().round().map(|r| r.active_gesture()),
        Some(ActiveGesture::Fist)
    );
}
