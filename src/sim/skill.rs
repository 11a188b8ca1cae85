//! Skin skills
//!
//! One skill per skin, triggered on demand and gated by a cooldown. A
//! skill either transforms the effective config while it is active
//! (dash, freeze, gravity invert), mutates entities once when it fires
//! (teleport, destroy, shrink), or overlays the effect snapshot while
//! active (shield, magnet).

use glam::Vec2;
use serde::Serialize;

use super::config::GameConfig;
use super::powerup::EffectSnapshot;
use super::state::GameState;
use crate::platform::Millis;

/// Shared cooldown of every skill
pub const SKILL_COOLDOWN_MS: Millis = 30_000;

/// What a skill does, with its tuning value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SkillEffect {
    /// No gravity and faster scrolling
    Dash { speed_factor: f32 },
    /// Jump forward along x
    Teleport { distance: f32 },
    /// Remove the nearest obstacle ahead
    Destroy,
    /// Obstacles stop scrolling
    Freeze,
    /// Gravity scaled by a negative factor
    GravityInvert { factor: f32 },
    Shield,
    /// Hit-box scaled down
    Shrink { scale: f32 },
    /// Coin attraction with a wider reach
    Magnet { range_factor: f32 },
}

/// Static skill definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Skill {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cooldown_ms: Millis,
    /// 0 for instant skills
    pub effect_duration_ms: Millis,
    pub effect: SkillEffect,
}

pub const STORM: Skill = Skill {
    id: "storm",
    name: "Whirlwind Dash",
    description: "Dash forward for 3 seconds, ignoring gravity",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 3000,
    effect: SkillEffect::Dash { speed_factor: 2.0 },
};

pub const LIGHTNING: Skill = Skill {
    id: "lightning",
    name: "Lightning Blink",
    description: "Teleport forward through obstacles",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 0,
    effect: SkillEffect::Teleport { distance: 200.0 },
};

pub const FLAME: Skill = Skill {
    id: "flame",
    name: "Fireball",
    description: "Destroy the nearest obstacle ahead",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 0,
    effect: SkillEffect::Destroy,
};

pub const FROST: Skill = Skill {
    id: "frost",
    name: "Time Freeze",
    description: "Freeze all obstacles for 3 seconds",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 3000,
    effect: SkillEffect::Freeze,
};

pub const GRAVITY: Skill = Skill {
    id: "gravity",
    name: "Gravity Flip",
    description: "Reverse gravity for 3 seconds",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 3000,
    effect: SkillEffect::GravityInvert { factor: -1.0 },
};

pub const SHIELD: Skill = Skill {
    id: "shield",
    name: "Shield",
    description: "Become invincible for 3 seconds",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 3000,
    effect: SkillEffect::Shield,
};

pub const SHRINK: Skill = Skill {
    id: "shrink",
    name: "Minify",
    description: "Shrink to half size for 3 seconds",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 3000,
    effect: SkillEffect::Shrink { scale: 0.5 },
};

pub const MAGNET: Skill = Skill {
    id: "magnet",
    name: "Super Magnet",
    description: "Pull in every coin nearby for 3 seconds",
    cooldown_ms: SKILL_COOLDOWN_MS,
    effect_duration_ms: 3000,
    effect: SkillEffect::Magnet { range_factor: 2.0 },
};

pub static SKILLS: [Skill; 8] = [STORM, LIGHTNING, FLAME, FROST, GRAVITY, SHIELD, SHRINK, MAGNET];

pub fn skill_by_id(id: &str) -> Option<&'static Skill> {
    SKILLS.iter().find(|s| s.id == id)
}

/// Cooldown bookkeeping for the equipped skill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkillState {
    /// None until first use this session
    pub last_used_at: Option<Millis>,
    pub cooldown_remaining: Millis,
    pub active: bool,
    pub active_until: Millis,
}

impl SkillState {
    pub fn is_available(&self) -> bool {
        !self.active && self.cooldown_remaining == 0
    }

    /// Start the skill; no-op returning false while unavailable
    ///
    /// The cooldown starts counting immediately and runs alongside the
    /// effect window.
    pub fn activate(&mut self, skill: &Skill, now: Millis) -> bool {
        if !self.is_available() {
            return false;
        }
        self.last_used_at = Some(now);
        self.cooldown_remaining = skill.cooldown_ms;
        self.active = skill.effect_duration_ms > 0;
        self.active_until = if self.active {
            now + skill.effect_duration_ms
        } else {
            0
        };
        true
    }

    /// Recompute the remaining cooldown and retire an elapsed effect
    pub fn update_cooldown(&mut self, skill: &Skill, now: Millis) {
        if let Some(used) = self.last_used_at {
            let since = now.saturating_sub(used);
            self.cooldown_remaining = skill.cooldown_ms.saturating_sub(since);
        }
        if self.active && now >= self.active_until {
            self.active = false;
            self.active_until = 0;
        }
    }

    /// Effect window check that does not wait for the cooldown timer
    pub fn is_active_at(&self, now: Millis) -> bool {
        self.active && now < self.active_until
    }

    /// 0.0 right after use, 1.0 when ready
    pub fn cooldown_progress(&self, skill: &Skill) -> f32 {
        if self.cooldown_remaining == 0 || skill.cooldown_ms == 0 {
            return 1.0;
        }
        let progress = 1.0 - self.cooldown_remaining as f32 / skill.cooldown_ms as f32;
        progress.clamp(0.0, 1.0)
    }
}

/// The equipped skill's effect, if it is running at `now`
pub fn active_effect(
    skill: Option<&Skill>,
    state: &SkillState,
    now: Millis,
) -> Option<SkillEffect> {
    skill
        .filter(|_| state.is_active_at(now))
        .map(|s| s.effect)
}

/// Second stage of the effective-config pipeline, layered over power-ups
///
/// Dash and freeze override the scroll speed computed from power-ups.
pub fn apply_to_config(config: &GameConfig, effect: Option<SkillEffect>) -> GameConfig {
    let Some(effect) = effect else {
        return *config;
    };
    match effect {
        SkillEffect::Dash { speed_factor } => GameConfig {
            gravity: 0.0,
            scroll_speed: config.scroll_speed * speed_factor,
            ..*config
        },
        SkillEffect::Freeze => GameConfig {
            scroll_speed: 0.0,
            ..*config
        },
        SkillEffect::GravityInvert { factor } => GameConfig {
            gravity: config.gravity * factor,
            ..*config
        },
        SkillEffect::Teleport { .. }
        | SkillEffect::Destroy
        | SkillEffect::Shield
        | SkillEffect::Shrink { .. }
        | SkillEffect::Magnet { .. } => *config,
    }
}

/// Force snapshot flags for the skills that piggyback on power-up effects
pub fn overlay_effects(effects: &mut EffectSnapshot, effect: Option<SkillEffect>) {
    match effect {
        Some(SkillEffect::Shield) => effects.invincible = true,
        Some(SkillEffect::Magnet { .. }) => effects.magnet = true,
        _ => {}
    }
}

/// Multiplier on the magnet radius
pub fn magnet_range(effect: Option<SkillEffect>) -> f32 {
    match effect {
        Some(SkillEffect::Magnet { range_factor }) => range_factor,
        _ => 1.0,
    }
}

/// Hit-box scale implied by the running effect
pub fn avatar_scale(effect: Option<SkillEffect>) -> f32 {
    match effect {
        Some(SkillEffect::Shrink { scale }) => scale,
        _ => 1.0,
    }
}

/// What a successful activation did, for the visual channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillActivation {
    pub skill: &'static Skill,
    /// Avatar position before the skill fired
    pub origin: Vec2,
    /// Teleport destination or destroyed gap center
    pub target: Option<Vec2>,
}

/// Fire the equipped skill
///
/// Returns None when no skill is equipped or it is unavailable. Instant
/// entity effects are applied to `state` here; timed effects are read by
/// the step from the skill state.
pub fn trigger(state: &mut GameState, config: &GameConfig, now: Millis) -> Option<SkillActivation> {
    let skill = state.skill?;
    if !state.skill_state.activate(skill, now) {
        return None;
    }

    let origin = state.avatar.pos;
    let target = match skill.effect {
        SkillEffect::Teleport { distance } => {
            let limit = config.canvas_width - state.avatar.hitbox_size();
            state.avatar.pos.x = (state.avatar.pos.x + distance).min(limit);
            Some(state.avatar.pos)
        }
        SkillEffect::Destroy => {
            let id = state.nearest_obstacle_ahead().map(|o| (o.id, o.gap_center()));
            id.map(|(id, center)| {
                state.obstacles.retain(|o| o.id != id);
                center
            })
        }
        SkillEffect::Shrink { scale } => {
            state.avatar.scale = scale;
            None
        }
        SkillEffect::Shield | SkillEffect::Magnet { .. } => {
            overlay_effects(&mut state.effects, Some(skill.effect));
            None
        }
        SkillEffect::Dash { .. } | SkillEffect::Freeze | SkillEffect::GravityInvert { .. } => None,
    };

    log::debug!("Skill `{}` fired at {}ms", skill.id, now);
    Some(SkillActivation {
        skill,
        origin,
        target,
    })
}
