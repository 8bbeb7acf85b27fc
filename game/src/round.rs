//! One play-through of a level, advanced by a pure `update` per frame.

use std::time::Duration;

use gesture::debounce::direct_map;
use gesture::{ActiveGesture, GestureDebouncer, RawGesture};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::level::{LevelConfig, ObjectKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallingObject {
    pub kind: ObjectKind,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureSource {
    Camera,
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    Spawned(ObjectKind),
    /// The object reached the bottom while its gesture was active.
    Hit {
        kind: ObjectKind,
        enemy_health: i32,
    },
    Miss {
        kind: ObjectKind,
        active: ActiveGesture,
        player_health: i32,
    },
    GestureChanged {
        gesture: ActiveGesture,
        source: GestureSource,
    },
    Finished(RoundOutcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundInput {
    pub dt: Duration,
    /// Latest label from the tracker.
    pub raw_gesture: RawGesture,
    /// A key pressed this frame.
    pub key_override: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRound {
    level: LevelConfig,
    objects: Vec<FallingObject>,
    player_health: i32,
    enemy_health: i32,
    spawn_index: usize,
    #[serde(with = "crate::serde_duration")]
    elapsed: Duration,
    #[serde(with = "crate::serde_duration")]
    since_tick: Duration,
    active: ActiveGesture,
    debouncer: GestureDebouncer,
    outcome: Option<RoundOutcome>,
}

impl LevelRound {
    pub fn new(level: LevelConfig, debounce_threshold: u32) -> Self {
        info!(level = level.number, "level started");
        Self {
            player_health: level.player_health,
            enemy_health: level.enemy_health,
            level,
            objects: Vec::new(),
            spawn_index: 0,
            elapsed: Duration::ZERO,
            since_tick: Duration::ZERO,
            active: ActiveGesture::None,
            debouncer: GestureDebouncer::new(debounce_threshold),
            outcome: None,
        }
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn objects(&self) -> &[FallingObject] {
        &self.objects
    }

    pub fn player_health(&self) -> i32 {
        self.player_health
    }

    pub fn enemy_health(&self) -> i32 {
        self.enemy_health
    }

    pub fn active_gesture(&self) -> ActiveGesture {
        self.active
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn spawned(&self) -> usize {
        self.spawn_index
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Advances the round by one frame. Does nothing once the round is over.
    ///
    /// Order within a frame: fall and resolve, spawn, camera gesture, keyboard override.
    pub fn update(&mut self, input: RoundInput) -> Vec<RoundEvent> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }

        self.elapsed = self.elapsed.saturating_add(input.dt);
        self.since_tick = self.since_tick.saturating_add(input.dt);

        if self.since_tick > self.level.update_interval {
            self.since_tick = Duration::ZERO;
            if let Some(outcome) = self.advance_objects(&mut events) {
                self.finish(outcome, &mut events);
                return events;
            }
        }

        self.spawn_due(&mut events);
        self.apply_camera(input.raw_gesture, &mut events);
        if let Some(key) = input.key_override {
            self.apply_key(key, &mut events);
        }
        events
    }

    fn advance_objects(&mut self, events: &mut Vec<RoundEvent>) -> Option<RoundOutcome> {
        let mut i = 0;
        while i < self.objects.len() {
            let obj = &mut self.objects[i];
            obj.y = obj.y.saturating_add(self.level.fall_step);
            if obj.y <= self.level.bottom_threshold {
                i += 1;
                continue;
            }

            let obj = self.objects.remove(i);
            events.push(self.resolve(obj));
            if self.player_health <= 0 {
                return Some(RoundOutcome::Lost);
            }
            if self.enemy_health <= 0 {
                return Some(RoundOutcome::Won);
            }
        }
        None
    }

    fn resolve(&mut self, obj: FallingObject) -> RoundEvent {
        if obj.kind.required_gesture() == self.active {
            self.enemy_health -= 1;
            info!(kind = obj.kind.label(), enemy_health = self.enemy_health, "hit");
            RoundEvent::Hit {
                kind: obj.kind,
                enemy_health: self.enemy_health,
            }
        } else {
            self.player_health -= 1;
            info!(
                kind = obj.kind.label(),
                active = %self.active,
                player_health = self.player_health,
                "miss"
            );
            RoundEvent::Miss {
                kind: obj.kind,
                active: self.active,
                player_health: self.player_health,
            }
        }
    }

    fn finish(&mut self, outcome: RoundOutcome, events: &mut Vec<RoundEvent>) {
        self.outcome = Some(outcome);
        self.objects.clear();
        info!(level = self.level.number, ?outcome, "level finished");
        events.push(RoundEvent::Finished(outcome));
    }

    fn spawn_due(&mut self, events: &mut Vec<RoundEvent>) {
        let Some(entry) = self.level.recipe.get(self.spawn_index) else {
            return;
        };
        if self.elapsed < entry.at() {
            return;
        }
        let (x, y) = self.level.spawn_pos;
        self.objects.push(FallingObject {
            kind: entry.kind,
            x,
            y,
        });
        self.spawn_index += 1;
        debug!(kind = entry.kind.label(), index = self.spawn_index, "spawned");
        events.push(RoundEvent::Spawned(entry.kind));
    }

    fn apply_camera(&mut self, raw: RawGesture, events: &mut Vec<RoundEvent>) {
        let candidate = if self.level.debounce {
            self.debouncer.observe(raw)
        } else {
            Some(direct_map(raw))
        };

        if let Some(gesture) = candidate {
            if gesture != self.active {
                debug!(%raw, %gesture, "gesture committed");
                self.set_active(gesture, GestureSource::Camera, events);
            }
        }
    }

    fn apply_key(&mut self, key: char, events: &mut Vec<RoundEvent>) {
        let Some(gesture) = self.level.key_override(key) else {
            return;
        };
        debug!(%key, %gesture, "keyboard override");
        if gesture != self.active {
            self.set_active(gesture, GestureSource::Keyboard, events);
        }
    }

    fn set_active(
        &mut self,
        gesture: ActiveGesture,
        source: GestureSource,
        events: &mut Vec<RoundEvent>,
    ) {
        self.active = gesture;
        events.push(RoundEvent::GestureChanged { gesture, source });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::SpawnEntry;

    fn level(recipe: &[(ObjectKind, f32)]) -> LevelConfig {
        let mut level = LevelConfig::new(
            1,
            recipe
                .iter()
                .map(|&(kind, at_secs)| SpawnEntry { kind, at_secs })
                .collect(),
            Duration::from_millis(30),
        );
        level.keys.insert('s', ActiveGesture::Sword);
        level
    }

    fn tick(dt_ms: u64) -> RoundInput {
        RoundInput {
            dt: Duration::from_millis(dt_ms),
            ..RoundInput::default()
        }
    }

    #[test]
    fn spawns_at_most_one_object_per_update() {
        let mut round = LevelRound::new(
            level(&[(ObjectKind::Sword, 0.0), (ObjectKind::Fist, 0.0)]),
            3,
        );
        let events = round.update(tick(0));
        assert_eq!(events, vec![RoundEvent::Spawned(ObjectKind::Sword)]);
        assert_eq!(round.objects().len(), 1);
        round.update(tick(0));
        assert_eq!(round.objects().len(), 2);
        assert_eq!(round.objects()[1].kind, ObjectKind::Fist);
    }

    #[test]
    fn movement_waits_for_strictly_longer_than_interval() {
        let mut round = LevelRound::new(level(&[(ObjectKind::Sword, 0.0)]), 3);
        round.update(tick(0));
        round.update(tick(30));
        assert_eq!(round.objects()[0].y, 0);
        round.update(tick(1));
        assert_eq!(round.objects()[0].y, 10);
    }

    #[test]
    fn key_override_wins_over_camera_in_same_frame() {
        let mut direct = level(&[]);
        direct.debounce = false;
        let mut round = LevelRound::new(direct, 3);
        let events = round.update(RoundInput {
            dt: Duration::ZERO,
            raw_gesture: RawGesture::Fist,
            key_override: Some('s'),
        });
        assert_eq!(round.active_gesture(), ActiveGesture::Sword);
        assert_eq!(
            events.first(),
            Some(&RoundEvent::GestureChanged {
                gesture: ActiveGesture::Fist,
                source: GestureSource::Camera
            })
        );
        assert_eq!(
            events.last(),
            Some(&RoundEvent::GestureChanged {
                gesture: ActiveGesture::Sword,
                source: GestureSource::Keyboard
            })
        );
    }

    #[test]
    fn finished_round_ignores_updates() {
        let mut round = LevelRound::new(level(&[(ObjectKind::Fist, 0.0)]), 3);
        round.player_health = 1;
        round.update(tick(0));
        for _ in 0..100 {
            round.update(tick(31));
        }
        assert_eq!(round.outcome(), Some(RoundOutcome::Lost));
        assert!(round.update(tick(31)).is_empty());
        assert!(round.objects().is_empty());
    }
}
