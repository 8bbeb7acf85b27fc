//! Short synthesized cues for round events.
//!
//! Volumes are in 0.0..=1.0 and get multiplied by the player's SFX gain.

use std::time::Duration;

use crate::round::{RoundEvent, RoundOutcome};

pub const HIT_SFX_VOLUME: f32 = 0.35;
pub const MISS_SFX_VOLUME: f32 = 0.40;
pub const RESULT_SFX_VOLUME: f32 = 0.45;
pub const CLICK_SFX_VOLUME: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Hit,
    Miss,
    Win,
    Lose,
    Click,
}

/// One sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub volume: f32,
}

impl Cue {
    pub fn for_event(event: &RoundEvent) -> Option<Cue> {
        match event {
            RoundEvent::Hit { .. } => Some(Cue::Hit),
            RoundEvent::Miss { .. } => Some(Cue::Miss),
            RoundEvent::Finished(RoundOutcome::Won) => Some(Cue::Win),
            RoundEvent::Finished(RoundOutcome::Lost) => Some(Cue::Lose),
            RoundEvent::Spawned(_) | RoundEvent::GestureChanged { .. } => None,
        }
    }

    /// Tones played back to back.
    pub fn tones(self) -> &'static [Tone] {
        match self {
            Cue::Hit => HIT_TONES,
            Cue::Miss => MISS_TONES,
            Cue::Win => WIN_TONES,
            Cue::Lose => LOSE_TONES,
            Cue::Click => CLICK_TONES,
        }
    }
}

const fn tone(frequency_hz: f32, millis: u64, volume: f32) -> Tone {
    Tone {
        frequency_hz,
        duration: Duration::from_millis(millis),
        volume,
    }
}

const HIT_TONES: &[Tone] = &[tone(880.0, 70, HIT_SFX_VOLUME)];
const MISS_TONES: &[Tone] = &[tone(196.0, 160, MISS_SFX_VOLUME)];
const WIN_TONES: &[Tone] = &[
    tone(523.0, 120, RESULT_SFX_VOLUME),
    tone(659.0, 120, RESULT_SFX_VOLUME),
    tone(784.0, 220, RESULT_SFX_VOLUME),
];
const LOSE_TONES: &[Tone] = &[
    tone(392.0, 160, RESULT_SFX_VOLUME),
    tone(262.0, 320, RESULT_SFX_VOLUME),
];
const CLICK_TONES: &[Tone] = &[tone(1200.0, 25, CLICK_SFX_VOLUME)];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::ObjectKind;

    #[test]
    fn volumes_stay_in_unit_range() {
        for cue in [Cue::Hit, Cue::Miss, Cue::Win, Cue::Lose, Cue::Click] {
            for tone in cue.tones() {
                assert!((0.0..=1.0).contains(&tone.volume), "{cue:?}");
                assert!(!tone.duration.is_zero());
            }
        }
    }

    #[test]
    fn only_resolutions_and_results_make_sound() {
        assert_eq!(Cue::for_event(&RoundEvent::Spawned(ObjectKind::Sword)), None);
        assert_eq!(
            Cue::for_event(&RoundEvent::Finished(RoundOutcome::Won)),
            Some(Cue::Win)
        );
    }
}
