//! Game state and core simulation types
//!
//! `GameState` is the single authoritative snapshot. The step function
//! reads one and produces the next; everything else only reads it.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::config::Difficulty;
use super::powerup::{ActivePowerUp, EffectSnapshot, PowerUpKind};
use super::skill::{Skill, SkillState};
use crate::consts::*;
use crate::economy::{CoinLedger, CoinTally, RewardKind};
use crate::platform::Millis;

/// Entity / reward-event identifier, unique within one session
pub type EntityId = u64;

/// Session-scoped id source
///
/// Lives inside `GameState` and restarts with every session, so nothing
/// leaks between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Top-level status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Main menu
    #[default]
    Start,
    /// Physics running
    Playing,
    Paused,
    /// Run ended, summary on screen
    GameOver,
    Leaderboard,
    Settings,
    Shop,
}

impl GamePhase {
    /// Menu screens reachable from the start screen
    pub fn is_menu(&self) -> bool {
        matches!(
            self,
            GamePhase::Start | GamePhase::Leaderboard | GamePhase::Settings | GamePhase::Shop
        )
    }
}

/// The player's avatar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    /// Top-left corner of the hit-box
    pub pos: Vec2,
    /// Vertical velocity (pixels/frame, positive is down)
    pub velocity: f32,
    /// Nominal hit-box edge
    pub size: f32,
    /// Temporary hit-box scale (shrink skill)
    pub scale: f32,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            pos: Vec2::new(AVATAR_START_X, AVATAR_START_Y),
            velocity: 0.0,
            size: AVATAR_SIZE,
            scale: 1.0,
        }
    }
}

impl Avatar {
    /// Effective hit-box edge
    pub fn hitbox_size(&self) -> f32 {
        self.size * self.scale
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.hitbox_size() / 2.0)
    }

    /// Gravity integration for one step
    pub fn integrate(&mut self, gravity: f32) {
        self.velocity += gravity;
        self.pos.y += self.velocity;
    }

    pub fn jump(&mut self, force: f32) {
        self.velocity = force;
    }
}

/// A pipe pair with a traversable gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    /// Left edge
    pub x: f32,
    /// Height of the top segment
    pub top_height: f32,
    /// Where the bottom segment starts (`top_height + gap`)
    pub bottom_y: f32,
    pub width: f32,
    pub gap: f32,
    /// Set once the avatar has cleared it (scored)
    pub passed: bool,
}

impl Obstacle {
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom_height(&self, canvas_height: f32) -> f32 {
        canvas_height - self.bottom_y
    }

    /// Center of the gap
    pub fn gap_center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.top_height + self.gap / 2.0)
    }
}

/// A power-up floating in a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpPickup {
    pub id: EntityId,
    pub kind: PowerUpKind,
    /// Center
    pub pos: Vec2,
    pub size: f32,
    pub collected: bool,
    /// Spin/bob phase for rendering (radians)
    pub phase: f32,
}

/// A coin floating in a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinPickup {
    pub id: EntityId,
    /// Center
    pub pos: Vec2,
    pub size: f32,
    pub value: u32,
    pub collected: bool,
    /// Spin phase for rendering (radians)
    pub phase: f32,
    /// Present while the magnet field is pulling this coin
    pub magnet_velocity: Option<Vec2>,
}

/// Ephemeral reward popup for the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEvent {
    pub id: EntityId,
    pub kind: RewardKind,
    pub amount: u32,
    pub message: String,
    pub pos: Option<Vec2>,
}

/// Per-session counters, reset every new game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub started_at: Millis,
    /// Clean clears since the last perfect-streak payout or forgiven hit
    pub consecutive_clears: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    /// Number of 30-second rewards paid
    pub time_rewards: u32,
    /// Score milestones already paid
    pub milestones: BTreeSet<u32>,
    pub perfect_streaks: u32,
    /// Reference point of the 30-second reward timer
    pub last_time_reward_at: Millis,
    /// Time of the last obstacle spawn
    pub last_spawn_at: Millis,
    /// Coins earned this session, by category
    pub tally: CoinTally,
}

impl SessionStats {
    pub fn new(now: Millis) -> Self {
        Self {
            started_at: now,
            last_time_reward_at: now,
            last_spawn_at: now,
            ..Default::default()
        }
    }

    /// Inside the start-of-session grace window
    pub fn in_grace_period(&self, now: Millis) -> bool {
        now.saturating_sub(self.started_at) < START_GRACE_MS
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u32,
    /// Persisted best score
    pub high_score: u32,
    pub difficulty: Difficulty,
    pub avatar: Avatar,
    /// Sorted by spawn order (left to right)
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUpPickup>,
    pub active_power_ups: Vec<ActivePowerUp>,
    /// Flattened effect of all active power-ups (plus the active skill)
    pub effects: EffectSnapshot,
    pub coins: Vec<CoinPickup>,
    pub stats: SessionStats,
    /// Coins earned in the current session
    pub session_coins: u32,
    /// Persisted balance as of the last read/write
    pub ledger: CoinLedger,
    /// Pending reward popups (UI only)
    pub rewards: Vec<RewardEvent>,
    pub skin_id: String,
    /// Skill of the equipped skin
    pub skill: Option<&'static Skill>,
    pub skill_state: SkillState,
    ids: IdAllocator,
}

impl GameState {
    /// Fresh state on the start screen
    pub fn new(
        difficulty: Difficulty,
        high_score: u32,
        ledger: CoinLedger,
        skin_id: impl Into<String>,
        skill: Option<&'static Skill>,
    ) -> Self {
        Self {
            phase: GamePhase::Start,
            score: 0,
            high_score,
            difficulty,
            avatar: Avatar::default(),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            active_power_ups: Vec::new(),
            effects: EffectSnapshot::default(),
            coins: Vec::new(),
            stats: SessionStats::default(),
            session_coins: 0,
            ledger,
            rewards: Vec::new(),
            skin_id: skin_id.into(),
            skill,
            skill_state: SkillState::default(),
            ids: IdAllocator::new(),
        }
    }

    /// Allocate a new entity/event ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    /// Discard the session's entities and counters
    pub fn clear_session(&mut self) {
        self.score = 0;
        self.avatar = Avatar::default();
        self.obstacles.clear();
        self.power_ups.clear();
        self.active_power_ups.clear();
        self.effects = EffectSnapshot::default();
        self.coins.clear();
        self.stats = SessionStats::default();
        self.session_coins = 0;
        self.rewards.clear();
        self.skill_state = SkillState::default();
        self.ids = IdAllocator::new();
    }

    /// Reset everything and enter `Playing`
    pub fn begin_session(&mut self, now: Millis) {
        self.clear_session();
        self.stats = SessionStats::new(now);
        self.phase = GamePhase::Playing;
    }

    /// Push every session timer forward by `paused` so a pause neither
    /// expires effects nor accrues time rewards
    pub fn shift_timers(&mut self, paused: Millis) {
        let stats = &mut self.stats;
        stats.started_at += paused;
        stats.last_time_reward_at += paused;
        stats.last_spawn_at += paused;
        for active in &mut self.active_power_ups {
            active.started_at += paused;
            active.ends_at += paused;
        }
        if let Some(used) = self.skill_state.last_used_at.as_mut() {
            *used += paused;
        }
        if self.skill_state.active {
            self.skill_state.active_until += paused;
        }
    }

    /// Queue a reward popup without paying anything
    pub fn push_reward_event(
        &mut self,
        kind: RewardKind,
        amount: u32,
        message: String,
        pos: Option<Vec2>,
    ) -> EntityId {
        let id = self.next_entity_id();
        self.rewards.push(RewardEvent {
            id,
            kind,
            amount,
            message,
            pos,
        });
        id
    }

    /// Pay coins into the session total and queue the popup
    pub fn credit(&mut self, kind: RewardKind, amount: u32, pos: Option<Vec2>) {
        if amount == 0 {
            return;
        }
        self.session_coins += amount;
        self.stats.tally.record(kind, amount);
        self.push_reward_event(kind, amount, kind.message(amount), pos);
    }

    /// Drop one reward popup; false if it was already gone
    pub fn dismiss_reward(&mut self, id: EntityId) -> bool {
        let before = self.rewards.len();
        self.rewards.retain(|r| r.id != id);
        self.rewards.len() != before
    }

    /// Live (not yet passed) obstacle nearest ahead of the avatar
    pub fn nearest_obstacle_ahead(&self) -> Option<&Obstacle> {
        let x = self.avatar.pos.x;
        self.obstacles
            .iter()
            .filter(|o| o.x > x && !o.passed)
            .min_by(|a, b| a.x.total_cmp(&b.x))
    }
}
