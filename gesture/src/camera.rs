//! Frame-level seam: a camera that hands out RGB frames and a detector that finds a hand in them.

use anyhow::{Result, bail};
use image::RgbImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::landmarks::{FRAME_HEIGHT, FRAME_WIDTH, LandmarkSet, NormalizedLandmark};
use crate::source::{LandmarkSource, Observation};

/// A video device. `None` means the read failed for this frame.
pub trait FrameSource: Send {
    fn read(&mut self) -> Option<RgbImage>;
}

/// A hand-landmark model. Returns the landmarks of at most one hand.
pub trait HandDetector: Send {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<Vec<NormalizedLandmark>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub static_image_mode: bool,
    pub max_num_hands: u32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            max_num_hands: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.5,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_num_hands == 0 {
            bail!("max_num_hands must be at least 1");
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }
        Ok(())
    }
}

/// Camera plus detector, producing pixel landmarks in the 640x480 processing frame.
pub struct CameraPipeline<F, D> {
    frames: F,
    detector: D,
}

impl<F: FrameSource, D: HandDetector> CameraPipeline<F, D> {
    pub fn new(frames: F, detector: D) -> Self {
        Self { frames, detector }
    }

    pub fn into_parts(self) -> (F, D) {
        (self.frames, self.detector)
    }
}

/// Scales `frame` to the processing size unless it already matches.
pub fn to_processing_frame(frame: RgbImage) -> RgbImage {
    if frame.dimensions() == (FRAME_WIDTH, FRAME_HEIGHT) {
        return frame;
    }
    debug!(
        width = frame.width(),
        height = frame.height(),
        "resizing frame for detection"
    );
    imageops::resize(&frame, FRAME_WIDTH, FRAME_HEIGHT, FilterType::Triangle)
}

impl<F: FrameSource, D: HandDetector> LandmarkSource for CameraPipeline<F, D> {
    fn poll(&mut self) -> Result<Observation> {
        let Some(frame) = self.frames.read() else {
            return Ok(Observation::NoFrame);
        };
        let frame = to_processing_frame(frame);
        let observation = match self.detector.detect(&frame)? {
            Some(points) => Observation::Hand(LandmarkSet::denormalize(
                &points,
                FRAME_WIDTH,
                FRAME_HEIGHT,
            )),
            None => Observation::NoHand,
        };
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Frames(Vec<Option<RgbImage>>);

    impl FrameSource for Frames {
        fn read(&mut self) -> Option<RgbImage> {
            if self.0.is_empty() {
                None
            } else {
                self.0.remove(0)
            }
        }
    }

    /// Reports a single landmark at the centre for bright frames and no hand otherwise.
    struct BrightnessDetector {
        seen: Vec<(u32, u32)>,
    }

    impl HandDetector for BrightnessDetector {
        fn detect(&mut self, frame: &RgbImage) -> Result<Option<Vec<NormalizedLandmark>>> {
            self.seen.push(frame.dimensions());
            if frame.get_pixel(0, 0).0[0] > 128 {
                Ok(Some(vec![NormalizedLandmark { x: 0.5, y: 0.25 }]))
            } else {
                Ok(None)
            }
        }
    }

    #[test]
    fn pipeline_resizes_detects_and_denormalizes() {
        let bright = RgbImage::from_pixel(1280, 720, image::Rgb([255, 255, 255]));
        let dark = RgbImage::from_pixel(640, 480, image::Rgb([0, 0, 0]));
        let mut pipeline = CameraPipeline::new(
            Frames(vec![Some(bright), None, Some(dark)]),
            BrightnessDetector { seen: Vec::new() },
        );

        match pipeline.poll().unwrap() {
            Observation::Hand(set) => {
                assert_eq!(set.points().len(), 1);
                assert_eq!((set.points()[0].x, set.points()[0].y), (320, 120));
            }
            other => panic!("expected a hand, got {other:?}"),
        }
        assert_eq!(pipeline.poll().unwrap(), Observation::NoFrame);
        assert_eq!(pipeline.poll().unwrap(), Observation::NoHand);

        let (_, detector) = pipeline.into_parts();
        assert_eq!(detector.seen, vec![(640, 480), (640, 480)]);
    }

    #[test]
    fn config_rejects_out_of_range_values() {
        assert!(DetectorConfig::default().validate().is_ok());
        let bad = DetectorConfig {
            min_detection_confidence: 1.5,
            ..DetectorConfig::default()
        };
        assert!(bad.validate().is_err());
        let no_hands = DetectorConfig {
            max_num_hands: 0,
            ..DetectorConfig::default()
        };
        assert!(no_hands.validate().is_err());
    }
}
