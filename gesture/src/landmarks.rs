use serde::{Deserialize, Serialize};

/// Points per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Detection runs on frames of this size; normalized landmarks are scaled by it.
pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

pub const WRIST: u8 = 0;
pub const THUMB_CMC: u8 = 1;
pub const THUMB_MCP: u8 = 2;
pub const THUMB_IP: u8 = 3;
pub const THUMB_TIP: u8 = 4;
pub const INDEX_MCP: u8 = 5;
pub const INDEX_PIP: u8 = 6;
pub const INDEX_DIP: u8 = 7;
pub const INDEX_TIP: u8 = 8;
pub const MIDDLE_MCP: u8 = 9;
pub const MIDDLE_PIP: u8 = 10;
pub const MIDDLE_DIP: u8 = 11;
pub const MIDDLE_TIP: u8 = 12;
pub const RING_MCP: u8 = 13;
pub const RING_PIP: u8 = 14;
pub const RING_DIP: u8 = 15;
pub const RING_TIP: u8 = 16;
pub const PINKY_MCP: u8 = 17;
pub const PINKY_PIP: u8 = 18;
pub const PINKY_DIP: u8 = 19;
pub const PINKY_TIP: u8 = 20;

/// One joint in pixel space. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: u8,
    pub x: i32,
    pub y: i32,
}

impl Landmark {
    pub const fn new(id: u8, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }
}

/// Detector output, each coordinate relative to the frame in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

/// The landmarks of one detected hand, in detector order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Numbers `(x, y)` pairs by position.
    pub fn from_xy(points: &[(i32, i32)]) -> Self {
        Self {
            points: points
                .iter()
                .enumerate()
                .map_while(|(i, &(x, y))| u8::try_from(i).ok().map(|id| Landmark::new(id, x, y)))
                .collect(),
        }
    }

    /// Scales detector output to pixel coordinates of a `width`x`height` frame.
    ///
    /// Coordinates truncate toward zero; ids are assigned by position.
    pub fn denormalize(points: &[NormalizedLandmark], width: u32, height: u32) -> Self {
        Self {
            points: points
                .iter()
                .enumerate()
                .map_while(|(i, p)| {
                    let id = u8::try_from(i).ok()?;
                    Some(Landmark::new(
                        id,
                        (p.x * width as f32) as i32,
                        (p.y * height as f32) as i32,
                    ))
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A usable hand has at least all 21 joints.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Looks a joint up by id. With duplicate ids the last entry wins.
    pub fn get(&self, id: u8) -> Option<Landmark> {
        self.points.iter().rev().find(|p| p.id == id).copied()
    }

    pub fn set(&mut self, id: u8, x: i32, y: i32) {
        match self.points.iter_mut().rev().find(|p| p.id == id) {
            Some(p) => {
                p.x = x;
                p.y = y;
            }
            None => self.points.push(Landmark::new(id, x, y)),
        }
    }
}
