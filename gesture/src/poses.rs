//! Synthetic right-hand poses in the 640x480 processing frame.
//!
//! Used by scripted sources and tests in place of a real detector.

use crate::classifier::{Finger, RawGesture};
use crate::landmarks::{LANDMARK_COUNT, LandmarkSet, WRIST};

const WRIST_POS: (i32, i32) = (320, 420);

const MCP_Y: i32 = 320;
const PIP_Y: i32 = 280;
const DIP_Y: i32 = 250;
const EXTENDED_TIP_Y: i32 = 220;
const FOLDED_TIP_Y: i32 = 330;

const THUMB_IP: (i32, i32) = (250, 340);

fn finger_column(finger: Finger) -> i32 {
    match finger {
        Finger::Thumb => THUMB_IP.0,
        Finger::Index => 290,
        Finger::Middle => 320,
        Finger::Ring => 350,
        Finger::Pinky => 380,
    }
}

/// Builds a full hand with the given fingers extended.
pub fn hand(extended: &[Finger]) -> LandmarkSet {
    let mut points = vec![(0, 0); LANDMARK_COUNT];
    points[WRIST as usize] = WRIST_POS;

    // CMC, MCP, IP, TIP
    points[1] = (285, 400);
    points[2] = (265, 370);
    points[3] = THUMB_IP;
    points[4] = if extended.contains(&Finger::Thumb) {
        (THUMB_IP.0 + 25, 310)
    } else {
        (THUMB_IP.0 - 10, 345)
    };

    for (n, finger) in [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky]
        .into_iter()
        .enumerate()
    {
        let base = 5 + n * 4;
        let x = finger_column(finger);
        let tip_y = if extended.contains(&finger) {
            EXTENDED_TIP_Y
        } else {
            FOLDED_TIP_Y
        };
        points[base] = (x, MCP_Y);
        points[base + 1] = (x, PIP_Y);
        points[base + 2] = (x, DIP_Y);
        points[base + 3] = (x, tip_y);
    }

    LandmarkSet::from_xy(&points)
}

pub fn fist() -> LandmarkSet {
    hand(&[])
}

pub fn scissor() -> LandmarkSet {
    hand(&[Finger::Index, Finger::Middle])
}

pub fn paper() -> LandmarkSet {
    hand(&Finger::ALL)
}

/// Two fingers up, but not index and middle.
pub fn unknown() -> LandmarkSet {
    hand(&[Finger::Thumb, Finger::Pinky])
}

/// A pose that classifies as `gesture`. `RawGesture::None` has no hand.
pub fn for_gesture(gesture: RawGesture) -> Option<LandmarkSet> {
    match gesture {
        RawGesture::Fist => Some(fist()),
        RawGesture::Scissor => Some(scissor()),
        RawGesture::Paper => Some(paper()),
        RawGesture::Unknown => Some(unknown()),
        RawGesture::None => None,
    }
}
