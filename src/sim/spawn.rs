//! Entity spawner
//!
//! Obstacles come on a fixed interval. Pickups only spawn together with
//! an obstacle, inside its gap.

use glam::Vec2;
use rand::Rng;

use super::coin::new_coin;
use super::config::{Difficulty, GameConfig};
use super::powerup::{PowerUpType, pick_type};
use super::state::{EntityId, GameState, Obstacle, PowerUpPickup};
use crate::consts::*;
use crate::platform::Millis;

/// Whether enough time has passed since the last obstacle
pub fn spawn_due(now: Millis, last_spawn_at: Millis) -> bool {
    now.saturating_sub(last_spawn_at) > OBSTACLE_SPAWN_INTERVAL_MS
}

/// Top segment height for a gap, or None when the gap cannot fit
///
/// `draw` is uniform in [0, 1). Heights are whole pixels so
/// `bottom_y - top_height` equals the gap exactly.
pub fn place_gap(config: &GameConfig, draw: f64) -> Option<f32> {
    let slack = config.canvas_height - (MIN_TOP_HEIGHT + config.gap + MIN_BOTTOM_HEIGHT);
    if slack <= 0.0 {
        return None;
    }
    let offset = (draw.clamp(0.0, 1.0) * slack as f64).floor() as f32;
    Some(MIN_TOP_HEIGHT + offset.min(slack))
}

/// New obstacle at the right edge, if one is due and the gap fits
pub fn maybe_spawn_obstacle<R: Rng + ?Sized>(
    id: EntityId,
    now: Millis,
    last_spawn_at: Millis,
    config: &GameConfig,
    rng: &mut R,
) -> Option<Obstacle> {
    if !spawn_due(now, last_spawn_at) {
        return None;
    }
    let top_height = place_gap(config, rng.random::<f64>())?;
    let obstacle = Obstacle {
        id,
        x: config.canvas_width,
        top_height,
        bottom_y: top_height + config.gap,
        width: OBSTACLE_WIDTH,
        gap: config.gap,
        passed: false,
    };

    // Belt and braces against float drift in custom configs
    let valid = obstacle.top_height >= MIN_TOP_HEIGHT
        && obstacle.bottom_height(config.canvas_height) >= MIN_BOTTOM_HEIGHT;
    valid.then_some(obstacle)
}

/// Power-up spawn chance for a difficulty
pub fn power_up_chance(difficulty: Difficulty) -> f64 {
    POWER_UP_BASE_SPAWN_CHANCE * difficulty.power_up_spawn_multiplier()
}

pub fn should_spawn_power_up<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> bool {
    rng.random::<f64>() < power_up_chance(difficulty)
}

pub fn should_spawn_coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random::<f64>() < COIN_SPAWN_CHANCE
}

/// Weighted power-up type roll; None means the roll landed on "nothing"
pub fn roll_power_up_type<R: Rng + ?Sized>(rng: &mut R) -> Option<&'static PowerUpType> {
    pick_type(rng.random::<f64>())
}

/// Vertical safety margin inside a gap
pub fn pickup_margin(gap: f32) -> f32 {
    PICKUP_MIN_MARGIN.max(gap * PICKUP_MARGIN_FRACTION)
}

/// Power-ups sit at the gap center
pub fn power_up_position(obstacle: &Obstacle) -> Vec2 {
    obstacle.gap_center()
}

/// Coin position inside the gap's safe band
///
/// `draw_y` and `draw_x` are uniform in [0, 1). Narrow bands fall back to
/// the gap center with no jitter.
pub fn coin_position(obstacle: &Obstacle, draw_y: f32, draw_x: f32) -> Vec2 {
    let margin = pickup_margin(obstacle.gap);
    let min_y = obstacle.top_height + margin;
    let max_y = obstacle.top_height + obstacle.gap - margin;
    let band = max_y - min_y;
    if band <= COIN_MIN_BAND {
        return obstacle.gap_center();
    }
    Vec2::new(
        obstacle.x + obstacle.width / 2.0 + (draw_x - 0.5) * COIN_JITTER_X,
        min_y + draw_y * band,
    )
}

/// What one spawn attempt produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnReport {
    pub obstacle: Option<EntityId>,
    pub power_up: Option<EntityId>,
    pub coin: Option<EntityId>,
}

/// Spawn an obstacle when due, then roll its pickups
pub fn spawn_entities<R: Rng + ?Sized>(
    state: &mut GameState,
    config: &GameConfig,
    now: Millis,
    rng: &mut R,
) -> SpawnReport {
    let mut report = SpawnReport::default();
    if !spawn_due(now, state.stats.last_spawn_at) {
        return report;
    }

    let id = state.next_entity_id();
    let Some(obstacle) = maybe_spawn_obstacle(id, now, state.stats.last_spawn_at, config, rng)
    else {
        log::debug!("Skipped obstacle spawn: gap {} does not fit", config.gap);
        return report;
    };
    state.stats.last_spawn_at = now;
    report.obstacle = Some(obstacle.id);

    if should_spawn_power_up(state.difficulty, rng) {
        if let Some(ty) = roll_power_up_type(rng) {
            let id = state.next_entity_id();
            state.power_ups.push(PowerUpPickup {
                id,
                kind: ty.kind,
                pos: power_up_position(&obstacle),
                size: POWER_UP_SIZE,
                collected: false,
                phase: 0.0,
            });
            report.power_up = Some(id);
            log::debug!("Spawned power-up `{}`", ty.id);
        }
    }

    if should_spawn_coin(rng) {
        let pos = coin_position(&obstacle, rng.random::<f32>(), rng.random::<f32>());
        let id = state.next_entity_id();
        state.coins.push(new_coin(id, pos, COIN_VALUE));
        report.coin = Some(id);
    }

    log::debug!(
        "Spawned obstacle {} (top {}, gap {})",
        obstacle.id,
        obstacle.top_height,
        obstacle.gap
    );
    state.obstacles.push(obstacle);
    report
}
