//! Power-up types, activation and the flattened effect snapshot

use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use crate::consts::{
    COIN_DOUBLE_MULTIPLIER, CONTESTED_SPEED_MULTIPLIER, SLOW_GRAVITY_FACTOR,
    SLOW_MOTION_MULTIPLIER, SPEED_BOOST_MULTIPLIER,
};
use crate::platform::Millis;

/// Rarity tier (power-ups and skins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Screen-shake (intensity px, duration ms) when something of this rarity is collected
    pub fn shake(&self) -> (f32, Millis) {
        match self {
            Rarity::Legendary => (8.0, 400),
            Rarity::Epic => (5.0, 300),
            Rarity::Rare | Rarity::Common => (3.0, 200),
        }
    }
}

/// Power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Invincible,
    SpeedBoost,
    CoinDouble,
    Magnet,
    SlowMotion,
}

impl PowerUpKind {
    /// Static descriptor from the type table
    pub fn descriptor(self) -> &'static PowerUpType {
        match self {
            PowerUpKind::Invincible => &POWER_UP_TYPES[0],
            PowerUpKind::SpeedBoost => &POWER_UP_TYPES[1],
            PowerUpKind::CoinDouble => &POWER_UP_TYPES[2],
            PowerUpKind::Magnet => &POWER_UP_TYPES[3],
            PowerUpKind::SlowMotion => &POWER_UP_TYPES[4],
        }
    }
}

/// Static power-up descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerUpType {
    pub kind: PowerUpKind,
    pub id: &'static str,
    pub name: &'static str,
    pub rarity: Rarity,
    pub duration_ms: Millis,
    /// Relative spawn weight; the table does not sum to 1, the rest is "nothing"
    pub spawn_weight: f64,
    /// 0xRRGGBB
    pub color: u32,
}

/// Type table, in cumulative-sampling order
pub static POWER_UP_TYPES: [PowerUpType; 5] = [
    PowerUpType {
        kind: PowerUpKind::Invincible,
        id: "invincible",
        name: "Invincibility",
        rarity: Rarity::Legendary,
        duration_ms: 5000,
        spawn_weight: 0.08,
        color: 0xFFD700,
    },
    PowerUpType {
        kind: PowerUpKind::SpeedBoost,
        id: "speed_boost",
        name: "Speed Boost",
        rarity: Rarity::Rare,
        duration_ms: 10_000,
        spawn_weight: 0.15,
        color: 0x1E90FF,
    },
    PowerUpType {
        kind: PowerUpKind::CoinDouble,
        id: "coin_double",
        name: "Double Coins",
        rarity: Rarity::Epic,
        duration_ms: 15_000,
        spawn_weight: 0.12,
        color: 0xFFFF00,
    },
    PowerUpType {
        kind: PowerUpKind::Magnet,
        id: "magnet",
        name: "Magnet",
        rarity: Rarity::Rare,
        duration_ms: 8000,
        spawn_weight: 0.18,
        color: 0x8A2BE2,
    },
    PowerUpType {
        kind: PowerUpKind::SlowMotion,
        id: "slow_motion",
        name: "Slow Motion",
        rarity: Rarity::Common,
        duration_ms: 12_000,
        spawn_weight: 0.25,
        color: 0x32CD32,
    },
];

/// Cumulative-weight sampling: first type whose running weight exceeds `draw`
///
/// `draw` is uniform in [0, 1). Draws past the total weight spawn nothing.
pub fn pick_type(draw: f64) -> Option<&'static PowerUpType> {
    let mut cumulative = 0.0;
    for ty in &POWER_UP_TYPES {
        cumulative += ty.spawn_weight;
        if draw < cumulative {
            return Some(ty);
        }
    }
    None
}

/// A collected power-up whose effect is running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub started_at: Millis,
    pub ends_at: Millis,
}

impl ActivePowerUp {
    /// Milliseconds left (0 once expired)
    pub fn remaining(&self, now: Millis) -> Millis {
        self.ends_at.saturating_sub(now)
    }

    pub fn is_expired(&self, now: Millis) -> bool {
        now >= self.ends_at
    }
}

/// Start a power-up's effect window
pub fn activate(kind: PowerUpKind, now: Millis) -> ActivePowerUp {
    ActivePowerUp {
        kind,
        started_at: now,
        ends_at: now + kind.descriptor().duration_ms,
    }
}

/// All active effects folded together
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSnapshot {
    pub invincible: bool,
    /// Scroll speed multiplier (1.0 = normal)
    pub speed_multiplier: f32,
    pub coin_multiplier: u32,
    pub magnet: bool,
    pub slow_motion: bool,
}

impl Default for EffectSnapshot {
    fn default() -> Self {
        Self {
            invincible: false,
            speed_multiplier: 1.0,
            coin_multiplier: 1,
            magnet: false,
            slow_motion: false,
        }
    }
}

/// Fold a set of (unexpired) power-ups into one snapshot
pub fn snapshot_of(active: &[ActivePowerUp]) -> EffectSnapshot {
    let mut effects = EffectSnapshot::default();
    let mut boost = false;
    let mut slow = false;

    for power_up in active {
        match power_up.kind {
            PowerUpKind::Invincible => effects.invincible = true,
            PowerUpKind::SpeedBoost => boost = true,
            PowerUpKind::CoinDouble => {
                effects.coin_multiplier = effects.coin_multiplier.max(COIN_DOUBLE_MULTIPLIER)
            }
            PowerUpKind::Magnet => effects.magnet = true,
            PowerUpKind::SlowMotion => slow = true,
        }
    }

    // Boost beats slow-motion, but damped
    effects.speed_multiplier = match (boost, slow) {
        (true, true) => CONTESTED_SPEED_MULTIPLIER,
        (true, false) => SPEED_BOOST_MULTIPLIER,
        (false, true) => SLOW_MOTION_MULTIPLIER,
        (false, false) => 1.0,
    };
    effects.slow_motion = slow;
    effects
}

/// Prune expired power-ups and recompute the snapshot
pub fn tick(active: &[ActivePowerUp], now: Millis) -> (EffectSnapshot, Vec<ActivePowerUp>) {
    let live: Vec<ActivePowerUp> = active
        .iter()
        .copied()
        .filter(|p| !p.is_expired(now))
        .collect();
    (snapshot_of(&live), live)
}

/// First stage of the effective-config pipeline
pub fn apply_to_config(config: &GameConfig, effects: &EffectSnapshot) -> GameConfig {
    let gravity = if effects.speed_multiplier < 1.0 {
        config.gravity * SLOW_GRAVITY_FACTOR
    } else {
        config.gravity
    };
    GameConfig {
        scroll_speed: config.scroll_speed * effects.speed_multiplier,
        gravity,
        ..*config
    }
}
