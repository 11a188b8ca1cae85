//! Coin economy
//!
//! Pure reward calculators, the per-session tally and the persisted
//! coin ledger. Calculators return base amounts; the step scales them by
//! the live coin multiplier when it pays them out.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Coin payout table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardRates {
    pub per_pipe: u32,
    pub streak3: u32,
    pub streak5: u32,
    pub streak10: u32,
    pub time30s: u32,
    pub score10: u32,
    pub score20: u32,
    pub score50: u32,
    pub perfect15: u32,
}

pub const COIN_REWARDS: RewardRates = RewardRates {
    per_pipe: 10,
    streak3: 5,
    streak5: 10,
    streak10: 20,
    time30s: 5,
    score10: 50,
    score20: 100,
    score50: 250,
    perfect15: 50,
};

/// Seconds per time-reward interval
pub const TIME_REWARD_INTERVAL_SECS: u64 = 30;
/// Clean clears needed for the perfect-streak bonus
pub const PERFECT_STREAK_LENGTH: u32 = 15;
/// Score thresholds paid once per session
pub const MILESTONES: [u32; 3] = [10, 20, 50];
/// One-time balance for a first-time player
pub const STARTER_COINS: u32 = 2000;

/// What a coin reward was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Pipe,
    Streak,
    Time,
    Milestone,
    Perfect,
    /// Coin pickup
    Coin,
    /// Power-up collection notice (never pays)
    PowerUp,
}

impl RewardKind {
    /// Popup text
    pub fn message(&self, amount: u32) -> String {
        match self {
            RewardKind::Pipe | RewardKind::Coin => format!("+{}", amount),
            RewardKind::Streak => format!("Streak bonus +{}", amount),
            RewardKind::Time => format!("Time bonus +{}", amount),
            RewardKind::Milestone => format!("Milestone +{}", amount),
            RewardKind::Perfect => format!("Perfect run +{}", amount),
            RewardKind::PowerUp => "Power-up!".to_string(),
        }
    }
}

/// Coins for `count` cleared obstacles
pub fn pipe_reward(count: u32) -> u32 {
    count * COIN_REWARDS.per_pipe
}

/// Bonus for reaching exactly `streak` clears in a row
///
/// Only the rung matching the exact value pays, so 6..9 and 11+ pay nothing.
pub fn streak_reward(streak: u32) -> u32 {
    match streak {
        3 => COIN_REWARDS.streak3,
        5 => COIN_REWARDS.streak5,
        10 => COIN_REWARDS.streak10,
        _ => 0,
    }
}

/// `floor(seconds / 30) * time30s`
pub fn time_reward(elapsed_secs: u64) -> u32 {
    let intervals = elapsed_secs / TIME_REWARD_INTERVAL_SECS;
    u32::try_from(intervals)
        .unwrap_or(u32::MAX)
        .saturating_mul(COIN_REWARDS.time30s)
}

/// Result of a milestone check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MilestoneReward {
    pub reward: u32,
    pub new_milestones: Vec<u32>,
}

fn milestone_payout(milestone: u32) -> u32 {
    match milestone {
        10 => COIN_REWARDS.score10,
        20 => COIN_REWARDS.score20,
        50 => COIN_REWARDS.score50,
        _ => 0,
    }
}

/// Pay every milestone `score` has reached that is not yet in `achieved`
///
/// Newly crossed thresholds are inserted into `achieved`.
pub fn milestone_reward(score: u32, achieved: &mut BTreeSet<u32>) -> MilestoneReward {
    let mut result = MilestoneReward::default();
    for milestone in MILESTONES {
        if score >= milestone && achieved.insert(milestone) {
            result.reward += milestone_payout(milestone);
            result.new_milestones.push(milestone);
        }
    }
    result
}

/// Perfect-streak bonus; resets `consecutive` when it pays
pub fn perfect_reward(consecutive: &mut u32) -> u32 {
    if *consecutive >= PERFECT_STREAK_LENGTH {
        *consecutive = 0;
        COIN_REWARDS.perfect15
    } else {
        0
    }
}

/// Coins earned this session, by category (already multiplied)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinTally {
    pub pipe: u32,
    pub streak: u32,
    pub time: u32,
    pub milestone: u32,
    pub perfect: u32,
    pub pickup: u32,
}

impl CoinTally {
    pub fn record(&mut self, kind: RewardKind, amount: u32) {
        let bucket = match kind {
            RewardKind::Pipe => &mut self.pipe,
            RewardKind::Streak => &mut self.streak,
            RewardKind::Time => &mut self.time,
            RewardKind::Milestone => &mut self.milestone,
            RewardKind::Perfect => &mut self.perfect,
            RewardKind::Coin => &mut self.pickup,
            RewardKind::PowerUp => return,
        };
        *bucket += amount;
    }

    pub fn total(&self) -> u32 {
        self.pipe + self.streak + self.time + self.milestone + self.perfect + self.pickup
    }

    pub fn summarize(&self) -> CoinGameSummary {
        CoinGameSummary {
            base_rewards: self.pipe,
            streak_rewards: self.streak,
            time_rewards: self.time,
            milestone_rewards: self.milestone,
            perfect_rewards: self.perfect,
            pickup_rewards: self.pickup,
            total_coins: self.total(),
        }
    }
}

/// End-of-game coin breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinGameSummary {
    pub base_rewards: u32,
    pub streak_rewards: u32,
    pub time_rewards: u32,
    pub milestone_rewards: u32,
    pub perfect_rewards: u32,
    pub pickup_rewards: u32,
    pub total_coins: u32,
}

/// Persisted coin balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoinLedger {
    pub coins: u32,
    /// Lifetime earnings; never decreases
    pub total_earned: u32,
    #[serde(alias = "lastGameCoins")]
    pub last_session_coins: u32,
}

impl CoinLedger {
    /// Add session earnings
    pub fn credit(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
        self.total_earned = self.total_earned.saturating_add(amount);
        self.last_session_coins = self.last_session_coins.saturating_add(amount);
    }

    pub fn can_afford(&self, price: u32) -> bool {
        self.coins >= price
    }

    /// Spend coins; false (and unchanged) if the balance is too low
    pub fn debit(&mut self, price: u32) -> bool {
        if !self.can_afford(price) {
            return false;
        }
        self.coins -= price;
        true
    }

    /// Zero the per-session counter
    pub fn begin_session(&mut self) {
        self.last_session_coins = 0;
    }

    /// Top the balance up to `STARTER_COINS`; the top-up counts as earned
    pub fn grant_starter(&mut self) {
        let top_up = STARTER_COINS.saturating_sub(self.coins);
        self.coins += top_up;
        self.total_earned = self.total_earned.saturating_add(top_up);
    }
}

/// Compact balance text: 999, 1.2K, 3.4M
pub fn format_coins(coins: u32) -> String {
    if coins >= 1_000_000 {
        format!("{:.1}M", coins as f64 / 1_000_000.0)
    } else if coins >= 1000 {
        format!("{:.1}K", coins as f64 / 1000.0)
    } else {
        coins.to_string()
    }
}
