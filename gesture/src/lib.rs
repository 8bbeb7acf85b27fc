//! Hand-gesture input: landmark model, classification, debouncing and the background tracker.
//!
//! The camera and the hand-landmark model are external capabilities. They plug in either at
//! frame level (`camera::FrameSource` + `camera::HandDetector`) or as a ready-made landmark
//! stream from another process (`stream`).

pub mod camera;
pub mod classifier;
pub mod debounce;
pub mod landmarks;
pub mod poses;
pub mod scripted;
pub mod source;
pub mod stream;
pub mod tracker;

pub use classifier::{RawGesture, classify_hand};
pub use debounce::{ActiveGesture, GestureDebouncer};
pub use landmarks::{Landmark, LandmarkSet, NormalizedLandmark};
pub use source::{LandmarkSource, Observation};
pub use tracker::{GestureFeed, GestureTracker, TrackerConfig, TrackerStatus};
