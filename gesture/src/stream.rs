//! Landmarks streamed as JSON lines, typically from an out-of-process hand detector.
//!
//! Each line is one frame:
//!
//! ```text
//! null                      no hand
//! []                        no hand
//! [[0.41, 0.72], ...]       normalized (x, y) per joint, in joint order
//! [{"x": 0.41, "y": 0.72}]  same, as objects
//! ```
//!
//! A blank line is a dropped frame. The stream ending means the detector is gone.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::camera::DetectorConfig;
use crate::landmarks::{FRAME_HEIGHT, FRAME_WIDTH, LandmarkSet, NormalizedLandmark};
use crate::source::{LandmarkSource, Observation};

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Pair([f32; 2]),
    Object { x: f32, y: f32 },
}

impl From<PointRepr> for NormalizedLandmark {
    fn from(p: PointRepr) -> Self {
        match p {
            PointRepr::Pair([x, y]) => NormalizedLandmark { x, y },
            PointRepr::Object { x, y } => NormalizedLandmark { x, y },
        }
    }
}

/// Parses one line of the stream.
pub fn parse_line(line: &str) -> Result<Observation> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Observation::NoFrame);
    }
    let points: Option<Vec<PointRepr>> =
        serde_json::from_str(line).with_context(|| format!("malformed landmark line {line:?}"))?;
    let points: Vec<NormalizedLandmark> = match points {
        Some(points) if !points.is_empty() => points.into_iter().map(Into::into).collect(),
        _ => return Ok(Observation::NoHand),
    };
    Ok(Observation::Hand(LandmarkSet::denormalize(
        &points,
        FRAME_WIDTH,
        FRAME_HEIGHT,
    )))
}

pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_no: u64,
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
        }
    }

    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

impl<R: BufRead + Send> LandmarkSource for JsonLinesSource<R> {
    fn poll(&mut self) -> Result<Observation> {
        self.line.clear();
        let read = self
            .reader
            .read_line(&mut self.line)
            .context("reading landmark stream")?;
        if read == 0 {
            return Ok(Observation::Exhausted);
        }
        self.line_no += 1;
        parse_line(&self.line).with_context(|| format!("line {}", self.line_no))
    }
}

/// A detector child process whose stdout is the landmark stream. Killed on drop.
pub struct DetectorProcess {
    child: Child,
    stream: JsonLinesSource<BufReader<ChildStdout>>,
}

impl DetectorProcess {
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl LandmarkSource for DetectorProcess {
    fn poll(&mut self) -> Result<Observation> {
        self.stream.poll()
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        match self.child.try_wait() {
            Ok(Some(status)) => debug!(%status, "detector already exited"),
            _ => {
                if let Err(err) = self.child.kill() {
                    warn!("failed to stop detector: {err}");
                }
                let _ = self.child.wait();
            }
        }
    }
}

/// Starts `command` (program and whitespace-separated arguments) with piped stdout.
///
/// The detector settings are passed through the environment so a script can pick them up.
pub fn spawn_detector(command: &str, config: &DetectorConfig) -> Result<DetectorProcess> {
    config.validate()?;
    let mut parts = command.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("detector command is empty");
    };

    let mut child = Command::new(program)
        .args(parts)
        .env("HAND_MAX_NUM_HANDS", config.max_num_hands.to_string())
        .env(
            "HAND_STATIC_IMAGE_MODE",
            if config.static_image_mode { "1" } else { "0" },
        )
        .env(
            "HAND_MIN_DETECTION_CONFIDENCE",
            config.min_detection_confidence.to_string(),
        )
        .env(
            "HAND_MIN_TRACKING_CONFIDENCE",
            config.min_tracking_confidence.to_string(),
        )
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("spawning detector {program:?}"))?;

    let stdout = child
        .stdout
        .take()
        .context("detector stdout was not piped")?;
    info!(pid = child.id(), %program, "detector started");

    Ok(DetectorProcess {
        child,
        stream: JsonLinesSource::new(BufReader::new(stdout)),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn parses_every_line_shape() {
        let input = "null\n[]\n\n[[0.5, 0.5], {\"x\": 0.25, \"y\": 1.0}]\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        assert_eq!(source.poll().unwrap(), Observation::NoHand);
        assert_eq!(source.poll().unwrap(), Observation::NoHand);
        assert_eq!(source.poll().unwrap(), Observation::NoFrame);
        assert_eq!(
            source.poll().unwrap(),
            Observation::Hand(LandmarkSet::new(vec![
                Landmark::new(0, 320, 240),
                Landmark::new(1, 160, 480),
            ]))
        );
        assert_eq!(source.poll().unwrap(), Observation::Exhausted);
        assert_eq!(source.lines_read(), 4);
    }

    #[test]
    fn malformed_line_is_an_error_with_position() {
        let mut source = JsonLinesSource::new(Cursor::new("[]\n{oops\n[]\n"));
        assert!(source.poll().is_ok());
        let err = source.poll().unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert_eq!(source.poll().unwrap(), Observation::NoHand);
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(spawn_detector("   ", &DetectorConfig::default()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn reads_from_child_process() {
        let mut detector = spawn_detector("echo [[0.5,0.5]]", &DetectorConfig::default()).unwrap();
        assert!(matches!(detector.poll().unwrap(), Observation::Hand(_)));
        assert_eq!(detector.poll().unwrap(), Observation::Exhausted);
    }
}
