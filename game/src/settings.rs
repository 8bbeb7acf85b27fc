use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use gesture::camera::DetectorConfig;
use gesture::debounce::DEFAULT_STABILITY_THRESHOLD;
use gesture::tracker::{DEFAULT_POLL_INTERVAL, TrackerConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_PATH_ENV: &str = "REACTION_SETTINGS_PATH";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub mute_all: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            sfx_volume: 1.0,
            mute_all: false,
        }
    }
}

impl AudioSettings {
    pub fn clamp(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    pub fn effective_sfx_gain(self) -> f32 {
        if self.mute_all {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackingSettings {
    pub poll_interval_ms: u64,
    pub debounce_threshold: u32,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    /// External landmark detector, e.g. `python3 tools/hands.py`.
    pub detector_command: Option<String>,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        let detector = DetectorConfig::default();
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            debounce_threshold: DEFAULT_STABILITY_THRESHOLD,
            min_detection_confidence: detector.min_detection_confidence,
            min_tracking_confidence: detector.min_tracking_confidence,
            detector_command: None,
        }
    }
}

impl TrackingSettings {
    fn clamp(mut self) -> Self {
        self.poll_interval_ms = self.poll_interval_ms.clamp(1, 1000);
        self.debounce_threshold = self.debounce_threshold.clamp(1, 30);
        self.min_detection_confidence = self.min_detection_confidence.clamp(0.0, 1.0);
        self.min_tracking_confidence = self.min_tracking_confidence.clamp(0.0, 1.0);
        self.detector_command = self
            .detector_command
            .filter(|cmd| !cmd.trim().is_empty());
        self
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            min_detection_confidence: self.min_detection_confidence,
            min_tracking_confidence: self.min_tracking_confidence,
            ..DetectorConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoSettings {
    pub vsync: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self { vsync: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub tracking: TrackingSettings,
    #[serde(default)]
    pub video: VideoSettings,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            audio: AudioSettings::default(),
            tracking: TrackingSettings::default(),
            video: VideoSettings::default(),
        }
    }
}

impl PlayerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.audio = self.audio.clamp();
        self.tracking = self.tracking.clamp();
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Resolves the settings path from `REACTION_SETTINGS_PATH`, then the XDG config dir.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        if let Some(explicit) = lookup(SETTINGS_PATH_ENV) {
            return Self::at(explicit);
        }

        let base = lookup("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::at(base.join("reaction-game").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing files give defaults; unreadable ones are logged and also give defaults.
    pub fn load(&self) -> PlayerSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return PlayerSettings::default();
        };
        match serde_json::from_slice::<PlayerSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                warn!(path = %self.path.display(), "ignoring invalid settings: {err}");
                PlayerSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &PlayerSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let text = serde_json::to_string_pretty(settings).context("encoding settings")?;
        fs::write(&self.path, text).with_context(|| format!("writing {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sfx_gain_respects_mute() {
        let mut audio = AudioSettings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            mute_all: false,
        };
        assert!((audio.effective_sfx_gain() - 0.25).abs() < 1e-6);
        audio.mute_all = true;
        assert_eq!(audio.effective_sfx_gain(), 0.0);
    }

    #[test]
    fn sanitized_clamps_tracking_and_audio() {
        let settings = PlayerSettings {
            version: 7,
            audio: AudioSettings {
                master_volume: 4.0,
                sfx_volume: -1.0,
                mute_all: false,
            },
            tracking: TrackingSettings {
                poll_interval_ms: 0,
                debounce_threshold: 0,
                min_detection_confidence: 2.0,
                min_tracking_confidence: -0.5,
                detector_command: Some("   ".into()),
            },
            ..PlayerSettings::default()
        }
        .sanitized();

        assert_eq!(settings.version, 1);
        assert_eq!(settings.audio.master_volume, 1.0);
        assert_eq!(settings.audio.sfx_volume, 0.0);
        assert_eq!(settings.tracking.poll_interval_ms, 1);
        assert_eq!(settings.tracking.debounce_threshold, 1);
        assert_eq!(settings.tracking.min_detection_confidence, 1.0);
        assert_eq!(settings.tracking.min_tracking_confidence, 0.0);
        assert_eq!(settings.tracking.detector_command, None);
    }

    #[test]
    fn tracking_defaults_match_detector_and_tracker() {
        let tracking = TrackingSettings::default();
        assert_eq!(tracking.tracker_config(), TrackerConfig::default());
        assert_eq!(tracking.detector_config(), DetectorConfig::default());
        assert_eq!(tracking.debounce_threshold, 3);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let parsed: PlayerSettings =
            serde_json::from_str(r#"{"version":1,"tracking":{"poll_interval_ms":50}}"#)
                .expect("settings JSON should parse");
        assert_eq!(parsed.tracking.poll_interval_ms, 50);
        assert_eq!(parsed.tracking.debounce_threshold, 3);
        assert_eq!(parsed.audio, AudioSettings::default());
    }

    #[test]
    fn path_prefers_explicit_env_then_xdg_then_home() {
        let explicit = SettingsStore::from_lookup(|k| {
            (k == SETTINGS_PATH_ENV).then(|| OsString::from("/tmp/custom.json"))
        });
        assert_eq!(explicit.path(), Path::new("/tmp/custom.json"));

        let xdg =
            SettingsStore::from_lookup(|k| (k == "XDG_CONFIG_HOME").then(|| OsString::from("/x")));
        assert_eq!(xdg.path(), Path::new("/x/reaction-game/settings.json"));

        let home = SettingsStore::from_lookup(|k| (k == "HOME").then(|| OsString::from("/h")));
        assert_eq!(home.path(), Path::new("/h/.config/reaction-game/settings.json"));
    }
}
