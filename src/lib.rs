//! Gap Runner - a gap-obstacle arcade flyer
//!
//! Core modules:
//! - `sim`: Simulation core (physics, spawning, power-ups, skills, collisions)
//! - `economy`: Coin reward calculators and the persisted coin ledger
//! - `effects`: Cosmetic visual side channel, never read by the simulation
//! - `game`: Session host exposing the discrete action surface
//! - `persistence`: Key-value storage adapters and JSON records
//! - `platform`: Clock and frame scheduling abstractions

pub mod economy;
pub mod effects;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod skins;

pub use economy::{CoinGameSummary, CoinLedger};
pub use game::{Game, PurchaseError};
pub use highscores::{Leaderboard, LeaderboardEntry};
pub use platform::Millis;
pub use settings::Settings;
pub use sim::{Difficulty, GameConfig, GamePhase, GameState};

/// Tunables table
///
/// The grace period, boundary slack and collision margin are forgiveness
/// windows. They bias collision detection toward false negatives and are
/// part of the game feel, not rounding errors.
pub mod consts {
    use crate::platform::Millis;

    /// Playfield dimensions (pixels)
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Avatar spawn point and square hit-box edge
    pub const AVATAR_START_X: f32 = 100.0;
    pub const AVATAR_START_Y: f32 = 300.0;
    pub const AVATAR_SIZE: f32 = 20.0;

    /// Boundary and obstacle collisions are ignored this long after session start
    pub const START_GRACE_MS: Millis = 1000;
    /// How far past the floor/ceiling the avatar must be before the run ends
    pub const BOUNDARY_SLACK: f32 = 20.0;
    /// Shrinks both hit-boxes in avatar/obstacle tests
    pub const COLLISION_MARGIN: f32 = 2.0;

    /// Obstacle generation
    pub const OBSTACLE_SPAWN_INTERVAL_MS: Millis = 2500;
    pub const OBSTACLE_WIDTH: f32 = 50.0;
    pub const MIN_TOP_HEIGHT: f32 = 80.0;
    /// Includes the ground strip
    pub const MIN_BOTTOM_HEIGHT: f32 = 100.0;

    /// Pickups
    pub const POWER_UP_SIZE: f32 = 24.0;
    pub const POWER_UP_BASE_SPAWN_CHANCE: f64 = 0.20;
    pub const COIN_SPAWN_CHANCE: f64 = 0.30;
    pub const COIN_SIZE: f32 = 16.0;
    pub const COIN_VALUE: u32 = 5;
    /// Vertical safety margin inside the gap: max(30px, 15% of gap)
    pub const PICKUP_MIN_MARGIN: f32 = 30.0;
    pub const PICKUP_MARGIN_FRACTION: f32 = 0.15;
    /// Below this band height coins fall back to the gap center
    pub const COIN_MIN_BAND: f32 = 20.0;
    /// Total horizontal jitter for coin placement
    pub const COIN_JITTER_X: f32 = 20.0;
    /// Coins drift left slightly faster than the obstacles
    pub const COIN_SCROLL_FACTOR: f32 = 1.2;
    /// Pickups are dropped once they scroll this far past the left edge
    pub const PICKUP_DESPAWN_X: f32 = -50.0;

    /// Magnet attraction field
    pub const MAGNET_RADIUS: f32 = 150.0;
    pub const MAGNET_STRENGTH: f32 = 200.0;
    pub const MAGNET_DAMPING: f32 = 0.8;
    /// Force-to-velocity gain per frame (16ms frame x 0.01)
    pub const MAGNET_GAIN: f32 = 0.16;
    pub const MAGNET_MAX_SPEED: f32 = 8.0;

    /// Speed multipliers for the speed power-ups
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
    pub const SLOW_MOTION_MULTIPLIER: f32 = 0.3;
    /// Boost and slow-motion both active: boost wins, damped
    pub const CONTESTED_SPEED_MULTIPLIER: f32 = 1.25;
    /// Gravity scale while the world is slowed
    pub const SLOW_GRAVITY_FACTOR: f32 = 0.7;
    /// Coin multiplier granted by coin_double
    pub const COIN_DOUBLE_MULTIPLIER: u32 = 2;

    /// Timers
    pub const TIME_REWARD_INTERVAL_MS: Millis = 30_000;
    /// Nominal display frame
    pub const FRAME_MS: Millis = 16;
    /// Visual side-channel timer (~60 Hz)
    pub const EFFECTS_TICK_MS: Millis = 16;
    /// Skill cooldown bookkeeping timer (10 Hz)
    pub const SKILL_TICK_MS: Millis = 100;

    /// Cap on live cosmetic particles
    pub const MAX_PARTICLES: usize = 512;
}
