//! Simulation step
//!
//! One step per display frame. The step reads the previous snapshot and
//! returns the next one; it never touches storage or the visual channel.

use glam::Vec2;
use rand::Rng;

use super::coin::{advance_spin, attract, magnet_radius};
use super::collision::{BoundaryHit, avatar_hits_obstacle, avatar_hits_pickup, boundary_violation};
use super::config::GameConfig;
use super::powerup;
use super::skill::{self, SkillEffect};
use super::spawn::spawn_entities;
use super::state::{EntityId, GamePhase, GameState};
use crate::consts::*;
use crate::economy::{
    RewardKind, TIME_REWARD_INTERVAL_SECS, milestone_reward, perfect_reward, pipe_reward,
    streak_reward, time_reward,
};
use crate::effects::VisualCue;
use crate::platform::Millis;

/// Power-up spin advance per step (radians)
const POWER_UP_SPIN_PER_STEP: f32 = 0.05;

/// Input for a single step
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Monotonic clock reading for this frame
    pub now: Millis,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    Boundary(BoundaryHit),
    Obstacle(EntityId),
}

/// Result of one step
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub state: GameState,
    /// Effective config used this step
    pub config: GameConfig,
    /// For the visual channel
    pub cues: Vec<VisualCue>,
    /// Set when the step ended the run
    pub game_over: Option<GameOverCause>,
}

/// Base config with power-ups applied, then the running skill on top
pub fn effective_config(
    base: &GameConfig,
    state: &GameState,
    skill_effect: Option<SkillEffect>,
) -> GameConfig {
    let with_power_ups = powerup::apply_to_config(base, &state.effects);
    skill::apply_to_config(&with_power_ups, skill_effect)
}

/// Advance the game by one frame
pub fn step<R: Rng + ?Sized>(
    prev: &GameState,
    config: &GameConfig,
    input: &TickInput,
    rng: &mut R,
) -> TickOutcome {
    let now = input.now;
    let mut next = prev.clone();
    let mut cues = Vec::new();

    if prev.phase != GamePhase::Playing {
        return TickOutcome {
            state: next,
            config: *config,
            cues,
            game_over: None,
        };
    }

    let skill_effect = skill::active_effect(next.skill, &next.skill_state, now);
    let effective = effective_config(config, &next, skill_effect);
    let entry_effects = next.effects;
    let in_grace = next.stats.in_grace_period(now);
    next.avatar.scale = skill::avatar_scale(skill_effect);

    // Avatar physics
    next.avatar.integrate(effective.gravity);

    // Boundary check
    if !in_grace && !entry_effects.invincible {
        if let Some(hit) = boundary_violation(&next.avatar, effective.canvas_height, BOUNDARY_SLACK) {
            return end_run(next, effective, cues, GameOverCause::Boundary(hit));
        }
    }

    spawn_entities(&mut next, config, now, rng);

    // Magnet pull happens before the scroll
    if entry_effects.magnet {
        let target = next.avatar.center();
        let radius = magnet_radius(skill::magnet_range(skill_effect));
        for coin in &mut next.coins {
            attract(coin, target, radius);
        }
    } else {
        for coin in &mut next.coins {
            coin.magnet_velocity = None;
        }
    }

    // Scroll
    let speed = effective.scroll_speed;
    for obstacle in &mut next.obstacles {
        obstacle.x -= speed;
    }
    next.obstacles.retain(|o| o.x > PICKUP_DESPAWN_X);
    for power_up in &mut next.power_ups {
        power_up.pos.x -= speed;
        power_up.phase = (power_up.phase + POWER_UP_SPIN_PER_STEP) % std::f32::consts::TAU;
    }
    next.power_ups.retain(|p| p.pos.x > PICKUP_DESPAWN_X);
    for coin in &mut next.coins {
        coin.pos.x -= speed * COIN_SCROLL_FACTOR;
        advance_spin(coin);
    }
    next.coins.retain(|c| c.pos.x > PICKUP_DESPAWN_X);

    collect_power_ups(&mut next, now, &mut cues);
    collect_coins(&mut next, entry_effects.coin_multiplier, &mut cues);

    // Recompute the snapshot from the pruned list
    let (mut effects, live) = powerup::tick(&next.active_power_ups, now);
    skill::overlay_effects(&mut effects, skill_effect);
    next.active_power_ups = live;
    next.effects = effects;

    // Obstacle collisions
    let forgiven = in_grace || next.effects.invincible;
    let hit = next
        .obstacles
        .iter()
        .find(|o| avatar_hits_obstacle(&next.avatar, o, COLLISION_MARGIN))
        .map(|o| o.id);
    if let Some(id) = hit {
        if !forgiven {
            return end_run(next, effective, cues, GameOverCause::Obstacle(id));
        }
        if !in_grace {
            // A hit soaked by invincibility still breaks the clean run
            next.stats.consecutive_clears = 0;
        }
    }

    score_cleared_obstacles(&mut next);
    pay_time_reward(&mut next, now);

    TickOutcome {
        state: next,
        config: effective,
        cues,
        game_over: None,
    }
}

fn end_run(
    mut state: GameState,
    config: GameConfig,
    cues: Vec<VisualCue>,
    cause: GameOverCause,
) -> TickOutcome {
    log::debug!("Run ended at score {}: {:?}", state.score, cause);
    state.phase = GamePhase::GameOver;
    TickOutcome {
        state,
        config,
        cues,
        game_over: Some(cause),
    }
}

fn collect_power_ups(state: &mut GameState, now: Millis, cues: &mut Vec<VisualCue>) {
    let mut collected = Vec::new();
    for pickup in &mut state.power_ups {
        if !pickup.collected && avatar_hits_pickup(&state.avatar, pickup.pos, pickup.size) {
            pickup.collected = true;
            collected.push((pickup.kind, pickup.pos));
        }
    }
    state.power_ups.retain(|p| !p.collected);

    for (kind, pos) in collected {
        let ty = kind.descriptor();
        state.active_power_ups.push(powerup::activate(kind, now));
        state.push_reward_event(
            RewardKind::PowerUp,
            0,
            format!("Power-up: {}", ty.name),
            Some(pos),
        );
        cues.push(VisualCue::PowerUpCollected { kind, pos });
        log::debug!("Collected power-up `{}`", ty.id);
    }
}

fn collect_coins(state: &mut GameState, multiplier: u32, cues: &mut Vec<VisualCue>) {
    let mut collected = Vec::new();
    for coin in &mut state.coins {
        if !coin.collected && avatar_hits_pickup(&state.avatar, coin.pos, coin.size) {
            coin.collected = true;
            collected.push((coin.value, coin.pos));
        }
    }
    state.coins.retain(|c| !c.collected);

    for (value, pos) in collected {
        state.credit(RewardKind::Coin, value * multiplier, Some(pos));
        cues.push(VisualCue::CoinCollected { pos });
    }
}

/// Score every obstacle whose trailing edge the avatar has passed and run
/// the reward cascade for each
fn score_cleared_obstacles(state: &mut GameState) {
    let avatar_x = state.avatar.pos.x;
    let mut cleared = Vec::new();
    for obstacle in &mut state.obstacles {
        if !obstacle.passed && avatar_x > obstacle.trailing_edge() {
            obstacle.passed = true;
            cleared.push(obstacle.gap_center());
        }
    }

    for center in cleared {
        let multiplier = state.effects.coin_multiplier;
        state.score += 1;
        let stats = &mut state.stats;
        stats.consecutive_clears += 1;
        stats.current_streak += 1;
        stats.max_streak = stats.max_streak.max(stats.current_streak);

        let streak = streak_reward(stats.current_streak);
        let perfect = perfect_reward(&mut stats.consecutive_clears);
        if perfect > 0 {
            stats.perfect_streaks += 1;
        }
        let milestone = milestone_reward(state.score, &mut state.stats.milestones);

        state.credit(RewardKind::Pipe, pipe_reward(1) * multiplier, Some(center));
        state.credit(
            RewardKind::Streak,
            streak * multiplier,
            Some(center - Vec2::new(0.0, 30.0)),
        );
        state.credit(
            RewardKind::Perfect,
            perfect * multiplier,
            Some(center - Vec2::new(0.0, 60.0)),
        );
        state.credit(
            RewardKind::Milestone,
            milestone.reward * multiplier,
            Some(center - Vec2::new(0.0, 90.0)),
        );
        if !milestone.new_milestones.is_empty() {
            log::debug!("Milestones reached: {:?}", milestone.new_milestones);
        }
    }
}

/// Pay one 30-second reward once an interval has elapsed, then restart the
/// timer; a late firing still pays a single interval
fn pay_time_reward(state: &mut GameState, now: Millis) {
    let elapsed = now.saturating_sub(state.stats.last_time_reward_at);
    if elapsed < TIME_REWARD_INTERVAL_MS {
        return;
    }
    let reward = time_reward(TIME_REWARD_INTERVAL_SECS);
    let pos = Vec2::new(CANVAS_WIDTH / 2.0, 100.0);
    state.credit(RewardKind::Time, reward * state.effects.coin_multiplier, Some(pos));
    state.stats.time_rewards += 1;
    state.stats.last_time_reward_at = now;
}
