//! Background thread turning a landmark source into a stream of gesture labels.
//!
//! The latest label lives in a `watch` channel: the game reads it without blocking once per
//! frame and older labels are simply overwritten.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::classifier::{RawGesture, classify_hand};
use crate::source::{LandmarkSource, Observation};

/// Delay after each processed frame.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerStatus {
    pub running: bool,
    /// Processed frames, with or without a hand.
    pub frames: u64,
    pub hands: u64,
    /// Dropped frames.
    pub skipped: u64,
    pub errors: u64,
    pub last_gesture: RawGesture,
}

/// Read side of the tracker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GestureFeed {
    rx: watch::Receiver<RawGesture>,
}

impl GestureFeed {
    /// Most recent label, `RawGesture::None` until the first frame.
    pub fn latest(&self) -> RawGesture {
        *self.rx.borrow()
    }

    /// Whether a new label arrived since the last `mark_seen`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    pub fn mark_seen(&mut self) -> RawGesture {
        *self.rx.borrow_and_update()
    }
}

pub struct GestureTracker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    gesture_rx: watch::Receiver<RawGesture>,
    status_rx: watch::Receiver<TrackerStatus>,
}

impl GestureTracker {
    /// Starts polling `source` on a dedicated thread. The source is dropped on that thread.
    pub fn spawn<S>(source: S, config: TrackerConfig) -> Result<Self>
    where
        S: LandmarkSource + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let (gesture_tx, gesture_rx) = watch::channel(RawGesture::None);
        let (status_tx, status_rx) = watch::channel(TrackerStatus {
            running: true,
            ..TrackerStatus::default()
        });

        let stop_flag = stop.clone();
        let handle = thread::Builder::new()
            .name("gesture-tracker".into())
            .spawn(move || track_loop(source, config, &stop_flag, &gesture_tx, &status_tx))
            .context("spawning gesture tracker thread")?;

        info!(
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "gesture tracker started"
        );

        Ok(Self {
            stop,
            handle: Some(handle),
            gesture_rx,
            status_rx,
        })
    }

    pub fn feed(&self) -> GestureFeed {
        GestureFeed {
            rx: self.gesture_rx.clone(),
        }
    }

    pub fn status(&self) -> TrackerStatus {
        self.status_rx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread and waits for it, so the source is released before this returns.
    ///
    /// A source blocked in `poll` delays this until that poll completes.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.stop.store(true, Ordering::Release);
        handle.thread().unpark();
        if handle.join().is_err() {
            warn!("gesture tracker thread panicked");
        }
        debug!("gesture tracker stopped");
    }
}

impl Drop for GestureTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn publish(gesture_tx: &watch::Sender<RawGesture>, gesture: RawGesture) {
    gesture_tx.send_if_modified(|current| {
        if *current == gesture {
            false
        } else {
            *current = gesture;
            true
        }
    });
}

fn track_loop<S: LandmarkSource>(
    mut source: S,
    config: TrackerConfig,
    stop: &AtomicBool,
    gesture_tx: &watch::Sender<RawGesture>,
    status_tx: &watch::Sender<TrackerStatus>,
) {
    while !stop.load(Ordering::Acquire) {
        let gesture = match source.poll() {
            Ok(Observation::NoFrame) => {
                status_tx.send_modify(|s| s.skipped += 1);
                thread::yield_now();
                continue;
            }
            Ok(Observation::NoHand) => RawGesture::None,
            Ok(Observation::Hand(landmarks)) => {
                status_tx.send_modify(|s| s.hands += 1);
                classify_hand(&landmarks)
            }
            Ok(Observation::Exhausted) => {
                info!("landmark source exhausted");
                publish(gesture_tx, RawGesture::None);
                status_tx.send_modify(|s| s.last_gesture = RawGesture::None);
                break;
            }
            Err(err) => {
                warn!("landmark source error: {err:#}");
                status_tx.send_modify(|s| s.errors += 1);
                thread::park_timeout(config.poll_interval);
                continue;
            }
        };

        if gesture != *gesture_tx.borrow() {
            debug!(%gesture, "raw gesture changed");
        }
        publish(gesture_tx, gesture);
        status_tx.send_modify(|s| {
            s.frames += 1;
            s.last_gesture = gesture;
        });

        thread::park_timeout(config.poll_interval);
    }

    drop(source);
    status_tx.send_modify(|s| s.running = false);
}
