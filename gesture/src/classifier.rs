//! Static gesture classification from one hand's landmarks.
//!
//! Purely geometric: a finger counts as extended when its tip sits above its PIP joint (with
//! some slack for partial bends), the thumb when its tip is right of its IP joint. The result
//! assumes a right hand facing the camera.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::landmarks::{
    INDEX_PIP, INDEX_TIP, LandmarkSet, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP,
    RING_TIP, THUMB_IP, THUMB_TIP,
};

/// Slack in pixels: a tip up to this far below its PIP still counts as extended.
pub const FINGER_TOLERANCE_PX: i32 = 20;

/// Per-frame classifier output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawGesture {
    #[serde(rename = "fist")]
    Fist,
    #[serde(rename = "scissor")]
    Scissor,
    #[serde(rename = "paper")]
    Paper,
    #[serde(rename = "unknown_gesture")]
    Unknown,
    /// No hand in view.
    #[default]
    #[serde(rename = "None")]
    None,
}

impl RawGesture {
    pub const ALL: [RawGesture; 5] = [
        RawGesture::Fist,
        RawGesture::Scissor,
        RawGesture::Paper,
        RawGesture::Unknown,
        RawGesture::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RawGesture::Fist => "fist",
            RawGesture::Scissor => "scissor",
            RawGesture::Paper => "paper",
            RawGesture::Unknown => "unknown_gesture",
            RawGesture::None => "None",
        }
    }
}

impl fmt::Display for RawGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RawGesture {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RawGesture::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown gesture tag {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn tip(self) -> u8 {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// Reference joint for the extension test: IP for the thumb, PIP otherwise.
    pub fn reference_joint(self) -> u8 {
        match self {
            Finger::Thumb => THUMB_IP,
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Which fingers passed the extension test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedFingers(u8);

impl ExtendedFingers {
    pub fn contains(self, finger: Finger) -> bool {
        self.0 & finger.bit() != 0
    }

    pub fn insert(&mut self, finger: Finger) {
        self.0 |= finger.bit();
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

/// Runs the per-finger extension tests. Fingers with a missing joint are left out.
pub fn extended_fingers(landmarks: &LandmarkSet) -> ExtendedFingers {
    let mut extended = ExtendedFingers::default();
    for finger in Finger::ALL {
        let (Some(tip), Some(joint)) = (
            landmarks.get(finger.tip()),
            landmarks.get(finger.reference_joint()),
        ) else {
            continue;
        };
        let is_extended = match finger {
            Finger::Thumb => tip.x > joint.x,
            _ => tip.y < joint.y.saturating_add(FINGER_TOLERANCE_PX),
        };
        if is_extended {
            extended.insert(finger);
        }
    }
    extended
}

/// Maps one hand to a gesture label.
///
/// Scissor is tested before paper, so three fingers including index and middle is scissor.
pub fn classify_hand(landmarks: &LandmarkSet) -> RawGesture {
    if !landmarks.is_complete() {
        return RawGesture::Unknown;
    }

    let extended = extended_fingers(landmarks);
    let count = extended.count();
    let index_and_middle = extended.contains(Finger::Index) && extended.contains(Finger::Middle);

    if count <= 1 {
        RawGesture::Fist
    } else if (2..=3).contains(&count) && index_and_middle {
        RawGesture::Scissor
    } else if count >= 3 {
        RawGesture::Paper
    } else {
        RawGesture::Unknown
    }
}
