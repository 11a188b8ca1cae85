//! Difficulty tiers and the physics config they resolve to

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    /// Parse, falling back to `Normal` for anything unrecognized
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Scales the base power-up spawn chance (easier tiers spawn more)
    pub fn power_up_spawn_multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.2,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.8,
            Difficulty::Expert => 0.6,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Difficulty::parse_or_default(&raw))
    }
}

/// Physics parameters for one session
///
/// Units are per display frame: gravity is added to velocity once per
/// step, scroll speed is pixels moved per step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub gravity: f32,
    /// Velocity set by a jump (negative is up)
    pub jump_force: f32,
    pub scroll_speed: f32,
    pub gap: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        resolve(Difficulty::Normal)
    }
}

/// Resolve a difficulty tier to its config
pub fn resolve(difficulty: Difficulty) -> GameConfig {
    let (gravity, jump_force, scroll_speed, gap) = match difficulty {
        Difficulty::Easy => (0.12, -6.0, 0.8, 280.0),
        Difficulty::Normal => (0.2, -6.0, 1.2, 200.0),
        Difficulty::Hard => (0.35, -6.5, 1.6, 160.0),
        Difficulty::Expert => (0.5, -7.0, 2.0, 130.0),
    };
    GameConfig {
        gravity,
        jump_force,
        scroll_speed,
        gap,
        canvas_width: CANVAS_WIDTH,
        canvas_height: CANVAS_HEIGHT,
    }
}

/// Resolve a difficulty by name; unknown names get `normal`
pub fn resolve_named(name: &str) -> GameConfig {
    resolve(Difficulty::parse_or_default(name))
}
