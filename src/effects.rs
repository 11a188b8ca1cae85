//! Cosmetic visual side channel
//!
//! Flashes, screen shake and particle bursts. The simulation never reads
//! this state; it only hands over `VisualCue`s describing what happened.
//! The channel has its own RNG so cosmetics never perturb gameplay
//! randomness.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::MAX_PARTICLES;
use crate::platform::Millis;
use crate::sim::powerup::PowerUpKind;
use crate::sim::skill::SkillEffect;

/// Something the step wants shown
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualCue {
    PowerUpCollected { kind: PowerUpKind, pos: Vec2 },
    CoinCollected { pos: Vec2 },
    SkillActivated {
        effect: SkillEffect,
        origin: Vec2,
        target: Option<Vec2>,
    },
}

/// Full-screen effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEffectKind {
    Flash,
    Shake,
    /// Tinted overlay while a timed skill runs
    Aura,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenEffect {
    pub kind: ScreenEffectKind,
    pub started_at: Millis,
    pub duration_ms: Millis,
    /// Alpha for flashes, pixels for shake
    pub intensity: f32,
    /// 0xRRGGBB
    pub color: u32,
}

impl ScreenEffect {
    /// 1.0 at start, 0.0 when over
    pub fn remaining_fraction(&self, now: Millis) -> f32 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        let elapsed = now.saturating_sub(self.started_at) as f32;
        (1.0 - elapsed / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        now >= self.started_at + self.duration_ms
    }
}

/// A decorative particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    /// Life lost per second
    pub decay: f32,
    pub size: f32,
}

const GOLD: u32 = 0xFFD700;
const WHITE: u32 = 0xFFFFFF;

/// Particle and screen-effect state
#[derive(Debug, Clone)]
pub struct VisualChannel {
    pub particles: Vec<Particle>,
    pub screen_effects: Vec<ScreenEffect>,
    rng: Pcg32,
}

impl VisualChannel {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            screen_effects: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.particles.is_empty() && self.screen_effects.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.screen_effects.clear();
    }

    /// Turn a cue into effects
    pub fn emit(&mut self, cue: &VisualCue, now: Millis) {
        match *cue {
            VisualCue::PowerUpCollected { kind, pos } => {
                let ty = kind.descriptor();
                let (shake, shake_ms) = ty.rarity.shake();
                self.flash(now, 150, 0.4, ty.color);
                self.shake(now, shake_ms, shake);
                self.burst(pos, 25, (80.0, 200.0), (3.0, 6.0), 1.5, ty.color);
                self.burst(pos, 15, (30.0, 90.0), (2.0, 4.0), 1.0, WHITE);
            }
            VisualCue::CoinCollected { pos } => {
                self.burst(pos, 8, (40.0, 100.0), (1.5, 3.0), 2.5, GOLD);
            }
            VisualCue::SkillActivated {
                effect,
                origin,
                target,
            } => self.emit_skill(effect, origin, target, now),
        }
    }

    fn emit_skill(&mut self, effect: SkillEffect, origin: Vec2, target: Option<Vec2>, now: Millis) {
        match effect {
            SkillEffect::Dash { .. } => {
                self.aura(now, 3000, 0x06B6D4);
                self.trail(origin, 20, 0x06B6D4);
            }
            SkillEffect::Teleport { .. } => {
                self.flash(now, 500, 0.6, 0x8B5CF6);
                self.burst(origin, 15, (40.0, 120.0), (1.0, 3.0), 3.0, 0x8B5CF6);
                if let Some(end) = target {
                    self.burst(end, 15, (40.0, 120.0), (1.0, 3.0), 3.0, 0x8B5CF6);
                }
            }
            SkillEffect::Destroy => {
                if let Some(hit) = target {
                    self.shake(now, 300, 5.0);
                    self.burst(hit, 30, (100.0, 260.0), (3.0, 7.0), 1.5, 0xF97316);
                }
            }
            SkillEffect::Freeze => {
                self.flash(now, 300, 0.5, 0x93C5FD);
                self.aura(now, 3000, 0x93C5FD);
                self.burst(origin, 20, (20.0, 80.0), (2.0, 4.0), 0.8, 0xBFDBFE);
            }
            SkillEffect::GravityInvert { .. } => {
                self.aura(now, 3000, 0xA855F7);
                self.burst(origin, 20, (30.0, 90.0), (2.0, 4.0), 1.0, 0xA855F7);
            }
            SkillEffect::Shield => {
                self.aura(now, 3000, 0x22C55E);
                self.ring(origin, 20, 30.0, 0x22C55E);
            }
            SkillEffect::Shrink { .. } => {
                self.burst(origin, 15, (20.0, 60.0), (1.0, 2.5), 2.0, 0xEC4899);
            }
            SkillEffect::Magnet { .. } => {
                self.aura(now, 3000, 0xEF4444);
                self.ring(origin, 20, 60.0, 0xEF4444);
            }
        }
    }

    pub fn flash(&mut self, now: Millis, duration_ms: Millis, alpha: f32, color: u32) {
        self.push_screen(ScreenEffectKind::Flash, now, duration_ms, alpha, color);
    }

    pub fn shake(&mut self, now: Millis, duration_ms: Millis, pixels: f32) {
        self.push_screen(ScreenEffectKind::Shake, now, duration_ms, pixels, WHITE);
    }

    fn aura(&mut self, now: Millis, duration_ms: Millis, color: u32) {
        self.push_screen(ScreenEffectKind::Aura, now, duration_ms, 0.2, color);
    }

    fn push_screen(
        &mut self,
        kind: ScreenEffectKind,
        now: Millis,
        duration_ms: Millis,
        intensity: f32,
        color: u32,
    ) {
        self.screen_effects.push(ScreenEffect {
            kind,
            started_at: now,
            duration_ms,
            intensity,
            color,
        });
    }

    /// Radial burst in random directions
    fn burst(
        &mut self,
        pos: Vec2,
        count: usize,
        speed_range: (f32, f32),
        size_range: (f32, f32),
        decay: f32,
        color: u32,
    ) {
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(speed_range.0..speed_range.1);
            let size = self.rng.random_range(size_range.0..size_range.1);
            self.push_particle(Particle {
                pos,
                vel: Vec2::from_angle(angle) * speed,
                color,
                life: 1.0,
                decay,
                size,
            });
        }
    }

    /// Particles streaming backwards from a point
    fn trail(&mut self, pos: Vec2, count: usize, color: u32) {
        for _ in 0..count {
            let jitter = Vec2::new(
                self.rng.random_range(-20.0..20.0),
                self.rng.random_range(-20.0..20.0),
            );
            let vel = Vec2::new(
                -self.rng.random_range(120.0..300.0),
                self.rng.random_range(-60.0..60.0),
            );
            let size = self.rng.random_range(2.0..4.0);
            self.push_particle(Particle {
                pos: pos + jitter,
                vel,
                color,
                life: 1.0,
                decay: 0.8,
                size,
            });
        }
    }

    /// Evenly spaced ring drifting outward
    fn ring(&mut self, center: Vec2, count: usize, radius: f32, color: u32) {
        for i in 0..count {
            let dir = Vec2::from_angle(i as f32 / count as f32 * std::f32::consts::TAU);
            self.push_particle(Particle {
                pos: center + dir * radius,
                vel: dir * 20.0,
                color,
                life: 1.0,
                decay: 1.0,
                size: 3.0,
            });
        }
    }

    fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() >= MAX_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Advance lifetimes by `dt_ms`, dropping anything finished
    pub fn update(&mut self, now: Millis, dt_ms: Millis) {
        let dt = dt_ms as f32 / 1000.0;
        for particle in &mut self.particles {
            particle.pos += particle.vel * dt;
            particle.vel *= 0.98;
            particle.life -= dt * particle.decay;
            particle.size *= 0.995;
        }
        self.particles.retain(|p| p.life > 0.0);
        self.screen_effects.retain(|e| !e.is_finished(now));
    }

    /// Current shake offset (fades out over the effect's duration)
    pub fn shake_offset(&mut self, now: Millis) -> Vec2 {
        let amplitude = self
            .screen_effects
            .iter()
            .filter(|e| e.kind == ScreenEffectKind::Shake)
            .map(|e| e.intensity * e.remaining_fraction(now))
            .fold(0.0, f32::max);
        if amplitude <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.rng.random_range(-amplitude..=amplitude),
            self.rng.random_range(-amplitude..=amplitude),
        )
    }

    /// Strongest flash alpha right now
    pub fn flash_alpha(&self, now: Millis) -> f32 {
        self.screen_effects
            .iter()
            .filter(|e| e.kind == ScreenEffectKind::Flash)
            .map(|e| e.intensity * e.remaining_fraction(now))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::skill::{FLAME, LIGHTNING};

    #[test]
    fn test_power_up_bundle() {
        let mut channel = VisualChannel::new(1);
        channel.emit(
            &VisualCue::PowerUpCollected {
                kind: PowerUpKind::Invincible,
                pos: Vec2::new(100.0, 300.0),
            },
            1000,
        );
        assert_eq!(channel.particles.len(), 40);
        let shake = channel
            .screen_effects
            .iter()
            .find(|e| e.kind == ScreenEffectKind::Shake)
            .unwrap();
        // Legendary
        assert_eq!(shake.intensity, 8.0);
        assert_eq!(shake.duration_ms, 400);
        assert!((channel.flash_alpha(1000) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_effects_expire() {
        let mut channel = VisualChannel::new(2);
        channel.emit(
            &VisualCue::PowerUpCollected {
                kind: PowerUpKind::SlowMotion,
                pos: Vec2::ZERO,
            },
            0,
        );
        channel.update(150, 16);
        assert!(channel.screen_effects.iter().all(|e| e.kind == ScreenEffectKind::Shake));
        for step in 1..=200 {
            channel.update(150 + step * 16, 16);
        }
        assert!(channel.is_idle());
        assert_eq!(channel.shake_offset(10_000), Vec2::ZERO);
    }

    #[test]
    fn test_particle_cap() {
        let mut channel = VisualChannel::new(3);
        for _ in 0..100 {
            channel.emit(&VisualCue::CoinCollected { pos: Vec2::ZERO }, 0);
        }
        assert_eq!(channel.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_skill_cues() {
        let mut channel = VisualChannel::new(4);
        channel.emit(
            &VisualCue::SkillActivated {
                effect: FLAME.effect,
                origin: Vec2::ZERO,
                target: None,
            },
            0,
        );
        // Nothing to blow up
        assert!(channel.is_idle());

        channel.emit(
            &VisualCue::SkillActivated {
                effect: LIGHTNING.effect,
                origin: Vec2::ZERO,
                target: Some(Vec2::new(200.0, 0.0)),
            },
            0,
        );
        assert_eq!(channel.particles.len(), 30);
    }
}
