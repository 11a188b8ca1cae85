//! Coin pickups and the magnet attraction field

use glam::Vec2;

use super::state::{CoinPickup, EntityId};
use crate::consts::{
    COIN_SIZE, MAGNET_DAMPING, MAGNET_GAIN, MAGNET_MAX_SPEED, MAGNET_RADIUS, MAGNET_STRENGTH,
};

/// Spin advance per step (radians)
const COIN_SPIN_PER_STEP: f32 = 0.08;

pub fn new_coin(id: EntityId, pos: Vec2, value: u32) -> CoinPickup {
    CoinPickup {
        id,
        pos,
        size: COIN_SIZE,
        value,
        collected: false,
        phase: 0.0,
        magnet_velocity: None,
    }
}

/// Pull toward `target`, stronger when closer
///
/// Zero when the coin sits exactly on the target.
pub fn magnet_force(from: Vec2, target: Vec2) -> Vec2 {
    let delta = target - from;
    let distance = delta.length();
    if distance == 0.0 {
        return Vec2::ZERO;
    }
    let magnitude = MAGNET_STRENGTH / (distance * 0.1).max(1.0);
    delta / distance * magnitude
}

/// One step of magnet attraction
///
/// Coins outside `radius` are released and lose their pull velocity.
pub fn attract(coin: &mut CoinPickup, target: Vec2, radius: f32) {
    if coin.pos.distance(target) > radius {
        coin.magnet_velocity = None;
        return;
    }
    let previous = coin.magnet_velocity.unwrap_or(Vec2::ZERO);
    let velocity = (previous * MAGNET_DAMPING + magnet_force(coin.pos, target) * MAGNET_GAIN)
        .clamp_length_max(MAGNET_MAX_SPEED);
    coin.pos += velocity;
    coin.magnet_velocity = Some(velocity);
}

/// Effective magnet reach
pub fn magnet_radius(range_factor: f32) -> f32 {
    MAGNET_RADIUS * range_factor
}

pub fn advance_spin(coin: &mut CoinPickup) {
    coin.phase = (coin.phase + COIN_SPIN_PER_STEP) % std::f32::consts::TAU;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_points_at_target() {
        let force = magnet_force(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0));
        // 200 / max(10, 1)
        assert!((force.x - 20.0).abs() < 1e-4);
        assert_eq!(force.y, 0.0);
        assert_eq!(magnet_force(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_close_range_force_caps_divisor() {
        let force = magnet_force(Vec2::ZERO, Vec2::new(5.0, 0.0));
        assert!((force.x - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_attract_moves_and_caps_speed() {
        let mut coin = new_coin(1, Vec2::new(200.0, 300.0), 5);
        let target = Vec2::new(110.0, 310.0);
        attract(&mut coin, target, MAGNET_RADIUS);
        let velocity = coin.magnet_velocity.unwrap();
        assert!(velocity.x < 0.0);
        assert!(velocity.length() <= MAGNET_MAX_SPEED + 1e-4);
        assert!(coin.pos.x < 200.0);
    }

    #[test]
    fn test_out_of_range_releases() {
        let mut coin = new_coin(1, Vec2::new(390.0, 300.0), 5);
        coin.magnet_velocity = Some(Vec2::new(-3.0, 0.0));
        attract(&mut coin, Vec2::new(110.0, 310.0), MAGNET_RADIUS);
        assert!(coin.magnet_velocity.is_none());
        assert_eq!(coin.pos, Vec2::new(390.0, 300.0));

        // Doubled reach catches it
        let mut coin = new_coin(2, Vec2::new(390.0, 300.0), 5);
        attract(&mut coin, Vec2::new(110.0, 310.0), magnet_radius(2.0));
        assert!(coin.magnet_velocity.is_some());
    }

    #[test]
    fn test_repeated_pull_converges() {
        let mut coin = new_coin(1, Vec2::new(220.0, 250.0), 5);
        let target = Vec2::new(110.0, 310.0);
        let start = coin.pos.distance(target);
        for _ in 0..30 {
            attract(&mut coin, target, MAGNET_RADIUS);
        }
        assert!(coin.pos.distance(target) < start / 2.0);
    }
}
