//! Run-length debounce between raw classifier output and game input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::RawGesture;

/// Consecutive matches needed before a raw label is committed.
pub const DEFAULT_STABILITY_THRESHOLD: u32 = 3;

/// Gesture as the game sees it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveGesture {
    #[default]
    None,
    Sword,
    Fist,
    Shield,
    /// Only reachable through a keyboard override.
    Ok,
}

impl ActiveGesture {
    pub fn from_raw(raw: RawGesture) -> Self {
        match raw {
            RawGesture::Scissor => ActiveGesture::Sword,
            RawGesture::Fist => ActiveGesture::Fist,
            RawGesture::Paper => ActiveGesture::Shield,
            RawGesture::Unknown | RawGesture::None => ActiveGesture::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActiveGesture::None => "None",
            ActiveGesture::Sword => "Sword",
            ActiveGesture::Fist => "Fist",
            ActiveGesture::Shield => "Shield",
            ActiveGesture::Ok => "Ok",
        }
    }
}

impl fmt::Display for ActiveGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Undebounced mapping, for levels that react to every frame.
pub fn direct_map(raw: RawGesture) -> ActiveGesture {
    ActiveGesture::from_raw(raw)
}

/// Confirms a raw label once it has been repeated `threshold` times in a row.
///
/// A new label only resets the run: the first reading of it starts the counter at zero, so the
/// label is first reported on the reading after `threshold` repeats. From then on every further
/// repeat reports it again; the caller applies it when it differs from the active gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureDebouncer {
    confirmed_raw: RawGesture,
    counter: u32,
    threshold: u32,
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY_THRESHOLD)
    }
}

impl GestureDebouncer {
    pub fn new(threshold: u32) -> Self {
        Self {
            confirmed_raw: RawGesture::None,
            counter: 0,
            threshold,
        }
    }

    /// Feeds one raw reading. Returns the mapped gesture while the label is stable.
    pub fn observe(&mut self, raw: RawGesture) -> Option<ActiveGesture> {
        if raw != self.confirmed_raw {
            self.confirmed_raw = raw;
            self.counter = 0;
            return None;
        }

        self.counter = self.counter.saturating_add(1);
        if self.counter < self.threshold {
            return None;
        }

        Some(ActiveGesture::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(debouncer: &mut GestureDebouncer, raws: &[RawGesture]) -> Vec<Option<ActiveGesture>> {
        raws.iter().map(|r| debouncer.observe(*r)).collect()
    }

    #[test]
    fn commits_after_three_repeats() {
        let mut d = GestureDebouncer::default();
        let out = feed(&mut d, &[RawGesture::Scissor; 4]);
        assert_eq!(out, vec![None, None, None, Some(ActiveGesture::Sword)]);
    }

    #[test]
    fn interrupted_run_starts_over() {
        let mut d = GestureDebouncer::default();
        let out = feed(
            &mut d,
            &[
                RawGesture::Fist,
                RawGesture::Fist,
                RawGesture::Fist,
                RawGesture::Paper,
                RawGesture::Fist,
            ],
        );
        assert!(out.iter().all(Option::is_none));
        let out = feed(&mut d, &[RawGesture::Fist; 3]);
        assert_eq!(out, vec![None, None, Some(ActiveGesture::Fist)]);
    }

    #[test]
    fn holding_a_gesture_keeps_reporting_it() {
        let mut d = GestureDebouncer::default();
        let out = feed(&mut d, &[RawGesture::Paper; 8]);
        assert_eq!(out[..3], [None, None, None]);
        assert!(out[3..].iter().all(|g| *g == Some(ActiveGesture::Shield)));
    }

    #[test]
    fn unknown_and_missing_hand_commit_none() {
        let mut d = GestureDebouncer::default();
        feed(&mut d, &[RawGesture::Fist; 4]);
        let out = feed(&mut d, &[RawGesture::Unknown; 4]);
        assert_eq!(out.last().copied().flatten(), Some(ActiveGesture::None));
    }

    #[test]
    fn direct_map_follows_raw() {
        assert_eq!(direct_map(RawGesture::Scissor), ActiveGesture::Sword);
        assert_eq!(direct_map(RawGesture::None), ActiveGesture::None);
    }
}
