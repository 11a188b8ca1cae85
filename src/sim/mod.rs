//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only arrives through `TickInput`
//! - Randomness only through the RNG handed to `step`
//! - No storage, rendering or platform dependencies

pub mod coin;
pub mod collision;
pub mod config;
pub mod powerup;
pub mod skill;
pub mod spawn;
pub mod state;
pub mod tick;

pub use config::{Difficulty, GameConfig, resolve, resolve_named};
pub use powerup::{ActivePowerUp, EffectSnapshot, PowerUpKind, PowerUpType, Rarity};
pub use skill::{Skill, SkillEffect, SkillState};
pub use state::{
    Avatar, CoinPickup, EntityId, GamePhase, GameState, Obstacle, PowerUpPickup, RewardEvent,
    SessionStats,
};
pub use tick::{GameOverCause, TickInput, TickOutcome, step};
