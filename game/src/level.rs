//! Level definitions: what falls, when, and how the player answers it.

use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::Path};

use anyhow::{Context, Result, bail, ensure};
use gesture::ActiveGesture;
use serde::{Deserialize, Serialize};

/// Levels shipped with the game.
pub const DEFAULT_LEVELS_JSON: &str = include_str!("../assets/levels.json");

pub const DEFAULT_PLAYER_HEALTH: i32 = 5;
pub const DEFAULT_ENEMY_HEALTH: i32 = 10;
pub const DEFAULT_FALL_STEP: i32 = 10;
pub const DEFAULT_BOTTOM_THRESHOLD: i32 = 830;
pub const DEFAULT_SPAWN_POS: (i32, i32) = (300, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Sword,
    Fist,
    Shield,
    Ok,
}

impl ObjectKind {
    /// The gesture that must be active when this object reaches the bottom.
    pub fn required_gesture(self) -> ActiveGesture {
        match self {
            ObjectKind::Sword => ActiveGesture::Sword,
            ObjectKind::Fist => ActiveGesture::Fist,
            ObjectKind::Shield => ActiveGesture::Shield,
            ObjectKind::Ok => ActiveGesture::Ok,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Sword => "SWORD",
            ObjectKind::Fist => "FIST",
            ObjectKind::Shield => "SHIELD",
            ObjectKind::Ok => "OK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: ObjectKind,
    /// Seconds after the level starts.
    pub at_secs: f32,
}

impl SpawnEntry {
    pub fn at(&self) -> Duration {
        Duration::try_from_secs_f32(self.at_secs).unwrap_or(Duration::MAX)
    }
}

fn default_player_health() -> i32 {
    DEFAULT_PLAYER_HEALTH
}

fn default_enemy_health() -> i32 {
    DEFAULT_ENEMY_HEALTH
}

fn default_fall_step() -> i32 {
    DEFAULT_FALL_STEP
}

fn default_bottom_threshold() -> i32 {
    DEFAULT_BOTTOM_THRESHOLD
}

fn default_spawn_pos() -> (i32, i32) {
    DEFAULT_SPAWN_POS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub number: u8,
    pub recipe: Vec<SpawnEntry>,
    /// Objects fall one step each time more than this has passed.
    #[serde(rename = "update_interval_ms", with = "crate::serde_duration")]
    pub update_interval: Duration,
    /// Run camera input through the debounce filter instead of mapping it directly.
    pub debounce: bool,
    /// Whether `ok` objects may appear. They can only be answered from the keyboard.
    pub allow_ok: bool,
    /// Keyboard overrides, applied after camera input.
    #[serde(default)]
    pub keys: BTreeMap<char, ActiveGesture>,
    #[serde(default = "default_player_health")]
    pub player_health: i32,
    #[serde(default = "default_enemy_health")]
    pub enemy_health: i32,
    #[serde(default = "default_fall_step")]
    pub fall_step: i32,
    #[serde(default = "default_bottom_threshold")]
    pub bottom_threshold: i32,
    #[serde(default = "default_spawn_pos")]
    pub spawn_pos: (i32, i32),
}

impl LevelConfig {
    /// A level with the stock health, speed and geometry.
    pub fn new(number: u8, recipe: Vec<SpawnEntry>, update_interval: Duration) -> Self {
        Self {
            number,
            recipe,
            update_interval,
            debounce: true,
            allow_ok: false,
            keys: BTreeMap::new(),
            player_health: DEFAULT_PLAYER_HEALTH,
            enemy_health: DEFAULT_ENEMY_HEALTH,
            fall_step: DEFAULT_FALL_STEP,
            bottom_threshold: DEFAULT_BOTTOM_THRESHOLD,
            spawn_pos: DEFAULT_SPAWN_POS,
        }
    }

    /// Levels without a recipe are listed in the menu but cannot be started.
    pub fn is_playable(&self) -> bool {
        !self.recipe.is_empty()
    }

    pub fn key_override(&self, key: char) -> Option<ActiveGesture> {
        self.keys.get(&key.to_ascii_lowercase()).copied()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.fall_step > 0, "fall_step must be positive");
        ensure!(
            self.player_health > 0 && self.enemy_health > 0,
            "health must start positive"
        );
        let mut previous = 0.0f32;
        for (i, entry) in self.recipe.iter().enumerate() {
            if !entry.at_secs.is_finite() || entry.at_secs < 0.0 {
                bail!("recipe entry {i}: invalid spawn time {}", entry.at_secs);
            }
            if entry.at_secs < previous {
                bail!("recipe entry {i}: spawn times must not go backwards");
            }
            if entry.kind == ObjectKind::Ok && !self.allow_ok {
                bail!("recipe entry {i}: ok objects are not allowed in this level");
            }
            previous = entry.at_secs;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBook {
    levels: Vec<LevelConfig>,
}

impl LevelBook {
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self> {
        let book = Self { levels };
        book.validate()?;
        Ok(book)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_json_str(DEFAULT_LEVELS_JSON).context("built-in levels")
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let book: LevelBook = serde_json::from_str(json).context("parsing levels")?;
        book.validate()?;
        Ok(book)
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading levels from {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("levels file {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.levels.is_empty(), "no levels defined");
        for (i, level) in self.levels.iter().enumerate() {
            if self.levels[..i].iter().any(|l| l.number == level.number) {
                bail!("level {} is defined twice", level.number);
            }
            level
                .validate()
                .with_context(|| format!("level {}", level.number))?;
        }
        Ok(())
    }

    pub fn get(&self, number: u8) -> Option<&LevelConfig> {
        self.levels.iter().find(|l| l.number == number)
    }

    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }
}
