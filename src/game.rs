//! Session host
//!
//! Owns the authoritative `GameState` plus every collaborator the pure
//! simulation is kept away from: clock, storage, frame scheduler, RNG and
//! the visual channel. Presentation layers drive it through the action
//! methods and the three timer entry points:
//! - `frame` once per display repaint while playing
//! - `update_effects` at ~60 Hz for the visual channel
//! - `update_skill_cooldown` at 10 Hz while playing

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::economy::{CoinGameSummary, CoinLedger};
use crate::effects::{VisualChannel, VisualCue};
use crate::highscores::{self, Leaderboard};
use crate::persistence::{KeyValueStore, Snapshot, StoreError, keys, load_record, save_record};
use crate::platform::{Clock, FrameScheduler, Millis};
use crate::settings::Settings;
use crate::sim::tick::effective_config;
use crate::sim::{
    self, Difficulty, EntityId, GameConfig, GameOverCause, GamePhase, GameState, TickInput, skill,
};
use crate::skins::{Skin, SkinUnlocks, skin_by_id};

/// Why a skin purchase was refused
#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("unknown skin `{0}`")]
    UnknownSkin(String),

    #[error("skin `{0}` is already unlocked")]
    AlreadyUnlocked(String),

    #[error("cannot purchase while a game is running")]
    GameInProgress,

    #[error("purchase could not be saved: {0}")]
    Storage(#[from] StoreError),
}

/// A game instance and its collaborators
pub struct Game {
    state: GameState,
    /// Difficulty config resolved at session start
    config: GameConfig,
    /// Persisted preferences (edited from menus)
    settings: Settings,
    /// Preferences captured by the last `start_game`
    session_settings: Settings,
    player_name: String,
    unlocks: SkinUnlocks,
    leaderboard: Leaderboard,
    visuals: VisualChannel,
    last_summary: Option<CoinGameSummary>,
    last_effects_update: Millis,
    /// Clock reading when the running session was paused
    paused_at: Option<Millis>,
    rng: Pcg32,
    clock: Box<dyn Clock>,
    store: Box<dyn KeyValueStore>,
    scheduler: Box<dyn FrameScheduler>,
}

impl Game {
    /// Load every persisted record and sit on the start screen
    pub fn new(
        clock: Box<dyn Clock>,
        store: Box<dyn KeyValueStore>,
        scheduler: Box<dyn FrameScheduler>,
        seed: u64,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        let unlocks = load_record::<SkinUnlocks>(store.as_ref(), keys::UNLOCKS).sanitize();
        let ledger: CoinLedger = load_record(store.as_ref(), keys::LEDGER);
        let high_score = highscores::load_high_score(store.as_ref());
        let leaderboard = Leaderboard::load(store.as_ref());
        let player_name = highscores::load_player_name(store.as_ref());

        let skin = unlocks.current();
        let state = GameState::new(settings.difficulty, high_score, ledger, skin.id, skin.skill);
        let now = clock.now();

        log::info!(
            "Game ready: {} coins, high score {}, skin `{}`",
            ledger.coins,
            high_score,
            skin.id
        );

        Self {
            state,
            config: sim::resolve(settings.difficulty),
            settings,
            session_settings: settings,
            player_name,
            unlocks,
            leaderboard,
            visuals: VisualChannel::new(seed ^ 0x5EED_F00D),
            last_summary: None,
            last_effects_update: now,
            paused_at: None,
            rng: Pcg32::seed_from_u64(seed),
            clock,
            store,
            scheduler,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Config resolved for the current session
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn unlocks(&self) -> &SkinUnlocks {
        &self.unlocks
    }

    pub fn ledger(&self) -> &CoinLedger {
        &self.state.ledger
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn visuals(&self) -> &VisualChannel {
        &self.visuals
    }

    /// Shake offset for the renderer (consumes visual-channel randomness)
    pub fn shake_offset(&mut self) -> glam::Vec2 {
        let now = self.clock.now();
        self.visuals.shake_offset(now)
    }

    /// Coin breakdown of the last finished session
    pub fn last_summary(&self) -> Option<&CoinGameSummary> {
        self.last_summary.as_ref()
    }

    /// 0..1 cooldown progress of the equipped skill (None without a skill)
    pub fn skill_cooldown_progress(&self) -> Option<f32> {
        self.state
            .skill
            .map(|s| self.state.skill_state.cooldown_progress(s))
    }

    /// Config the step would use right now, power-ups and skill included
    pub fn effective_config(&self) -> GameConfig {
        let now = self.clock.now();
        let effect = skill::active_effect(self.state.skill, &self.state.skill_state, now);
        effective_config(&self.config, &self.state, effect)
    }

    // === Session actions ===

    /// Begin a new run with the current settings
    ///
    /// Refused while a session is running or paused; end it first.
    pub fn start_game(&mut self) -> bool {
        if matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused) {
            return false;
        }
        let now = self.clock.now();
        self.grant_starter_coins();

        self.session_settings = self.settings;
        self.config = sim::resolve(self.settings.difficulty);
        self.state.difficulty = self.settings.difficulty;
        self.state.ledger.begin_session();
        self.state.begin_session(now);
        self.visuals.clear();
        self.last_summary = None;
        self.scheduler.request_frame();

        log::info!(
            "Session started ({}, skin `{}`)",
            self.state.difficulty,
            self.state.skin_id
        );
        true
    }

    pub fn pause_game(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.phase = GamePhase::Paused;
        self.paused_at = Some(self.clock.now());
        self.scheduler.cancel_frame();
        log::info!("Paused at score {}", self.state.score);
        true
    }

    pub fn resume_game(&mut self) -> bool {
        if self.state.phase != GamePhase::Paused {
            return false;
        }
        if let Some(paused_at) = self.paused_at.take() {
            let paused = self.clock.now().saturating_sub(paused_at);
            self.state.shift_timers(paused);
        }
        self.state.phase = GamePhase::Playing;
        self.scheduler.request_frame();
        log::info!("Resumed");
        true
    }

    /// End the running (or paused) session as if the player crashed
    pub fn end_game(&mut self) -> bool {
        if !matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused) {
            return false;
        }
        self.finish_session(None);
        true
    }

    /// Drop the session without paying out and go back to the start screen
    pub fn reset_game(&mut self) {
        self.scheduler.cancel_frame();
        self.paused_at = None;
        self.state.clear_session();
        self.state.phase = GamePhase::Start;
        self.visuals.clear();
        log::info!("Game reset");
    }

    /// Leave a finished or paused session (paused runs are paid out first)
    pub fn return_to_menu(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Playing => false,
            GamePhase::Paused => {
                self.finish_session(None);
                self.state.phase = GamePhase::Start;
                true
            }
            _ => {
                self.state.phase = GamePhase::Start;
                true
            }
        }
    }

    pub fn show_leaderboard(&mut self) -> bool {
        self.show_menu(GamePhase::Leaderboard)
    }

    pub fn show_settings(&mut self) -> bool {
        self.show_menu(GamePhase::Settings)
    }

    pub fn show_shop(&mut self) -> bool {
        self.show_menu(GamePhase::Shop)
    }

    fn show_menu(&mut self, phase: GamePhase) -> bool {
        if !(self.state.phase.is_menu() || self.state.phase == GamePhase::GameOver) {
            return false;
        }
        self.state.phase = phase;
        true
    }

    // === Gameplay actions ===

    /// One jump impulse; no-op unless playing
    pub fn jump(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        let force = self.effective_config().jump_force;
        self.state.avatar.jump(force);
        true
    }

    /// Fire the equipped skill; false when none is equipped or it is cooling down
    pub fn activate_skill(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        let now = self.clock.now();
        let config = self.effective_config();
        let Some(activation) = skill::trigger(&mut self.state, &config, now) else {
            return false;
        };

        if self.session_settings.effects_enabled {
            let cue = VisualCue::SkillActivated {
                effect: activation.skill.effect,
                origin: activation.origin,
                target: activation.target,
            };
            self.visuals.emit(&cue, now);
        }
        log::debug!("Skill `{}` activated", activation.skill.name);
        true
    }

    pub fn dismiss_reward_event(&mut self, id: EntityId) -> bool {
        self.state.dismiss_reward(id)
    }

    // === Timers ===

    /// Display-refresh callback: advance the simulation by one step
    ///
    /// Returns the cause when this frame ended the run.
    pub fn frame(&mut self) -> Option<GameOverCause> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        let now = self.clock.now();
        let outcome = sim::step(&self.state, &self.config, &TickInput { now }, &mut self.rng);
        self.state = outcome.state;

        if self.session_settings.effects_enabled {
            for cue in &outcome.cues {
                self.visuals.emit(cue, now);
            }
        }

        match outcome.game_over {
            Some(cause) => {
                self.finish_session(Some(cause));
                Some(cause)
            }
            None => {
                self.scheduler.request_frame();
                None
            }
        }
    }

    /// Fixed-rate visual channel update; never touches `GameState`
    pub fn update_effects(&mut self) {
        let now = self.clock.now();
        let dt = now.saturating_sub(self.last_effects_update);
        self.last_effects_update = now;
        self.visuals.update(now, dt);
    }

    /// Low-frequency skill cooldown bookkeeping
    pub fn update_skill_cooldown(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        if let Some(skill) = self.state.skill {
            let now = self.clock.now();
            self.state.skill_state.update_cooldown(skill, now);
        }
    }

    /// Pay out the session and write the records that changed
    fn finish_session(&mut self, cause: Option<GameOverCause>) {
        self.scheduler.cancel_frame();
        self.paused_at = None;
        self.state.phase = GamePhase::GameOver;

        let summary = self.state.stats.tally.summarize();
        self.state.ledger.credit(summary.total_coins);
        if let Err(err) = save_record(self.store.as_mut(), keys::LEDGER, &self.state.ledger) {
            log::warn!("Could not save coin ledger: {}", err);
        }

        let score = self.state.score;
        if score > self.state.high_score {
            self.state.high_score = score;
            if let Err(err) = highscores::save_high_score(self.store.as_mut(), score) {
                log::warn!("Could not save high score: {}", err);
            }
        }

        if !self.player_name.trim().is_empty() && score > 0 {
            let date = self.clock.wall_time();
            let rank = self
                .leaderboard
                .record(&self.player_name, score, date, self.state.difficulty);
            if let Some(rank) = rank {
                log::info!("{} placed #{} on the leaderboard", self.player_name, rank);
                if let Err(err) = self.leaderboard.save(self.store.as_mut()) {
                    log::warn!("Could not save leaderboard: {}", err);
                }
            }
        }

        log::info!(
            "Game over ({:?}): score {}, {} coins earned, balance {}",
            cause,
            score,
            summary.total_coins,
            self.state.ledger.coins
        );
        self.last_summary = Some(summary);
    }

    /// First-time players get `STARTER_COINS` once, on their first start
    fn grant_starter_coins(&mut self) {
        if load_record::<bool>(self.store.as_ref(), keys::STARTER_GRANTED) {
            return;
        }
        self.state.ledger.grant_starter();
        let saved = save_record(self.store.as_mut(), keys::LEDGER, &self.state.ledger)
            .and_then(|_| save_record(self.store.as_mut(), keys::STARTER_GRANTED, &true));
        match saved {
            Ok(()) => log::info!("Starter balance granted: {} coins", self.state.ledger.coins),
            Err(err) => log::warn!("Could not save starter balance: {}", err),
        }
    }

    // === Skins ===

    /// Equip an unlocked skin; refused during a run
    pub fn select_skin(&mut self, id: &str) -> bool {
        if self.state.phase == GamePhase::Playing {
            return false;
        }
        if !self.unlocks.select(id) {
            return false;
        }
        let skin = self.unlocks.current();
        self.state.skin_id = skin.id.to_string();
        self.state.skill = skin.skill;
        self.state.skill_state = Default::default();
        if let Err(err) = save_record(self.store.as_mut(), keys::UNLOCKS, &self.unlocks) {
            log::warn!("Could not save skin selection: {}", err);
        }
        log::info!("Equipped skin `{}`", skin.id);
        true
    }

    /// Buy a skin at `price`
    ///
    /// The debited ledger and the new unlock set are written together; if
    /// either write fails both keys are restored and memory is unchanged.
    pub fn purchase_skin(&mut self, id: &str, price: u32) -> Result<&'static Skin, PurchaseError> {
        if self.state.phase == GamePhase::Playing {
            return Err(PurchaseError::GameInProgress);
        }
        if !self.state.ledger.can_afford(price) {
            return Err(PurchaseError::InsufficientFunds);
        }
        let skin = skin_by_id(id).ok_or_else(|| PurchaseError::UnknownSkin(id.to_string()))?;
        if self.unlocks.is_unlocked(id) {
            return Err(PurchaseError::AlreadyUnlocked(id.to_string()));
        }

        let mut ledger = self.state.ledger;
        let mut unlocks = self.unlocks.clone();
        if !ledger.debit(price) {
            return Err(PurchaseError::InsufficientFunds);
        }
        unlocks.unlock(id);

        let snapshots = [
            Snapshot::capture(self.store.as_ref(), keys::LEDGER)?,
            Snapshot::capture(self.store.as_ref(), keys::UNLOCKS)?,
        ];
        let written = save_record(self.store.as_mut(), keys::LEDGER, &ledger)
            .and_then(|_| save_record(self.store.as_mut(), keys::UNLOCKS, &unlocks));
        if let Err(err) = written {
            log::warn!("Purchase of `{}` rolled back: {}", id, err);
            for snapshot in &snapshots {
                snapshot.restore(self.store.as_mut());
            }
            return Err(err.into());
        }

        self.state.ledger = ledger;
        self.unlocks = unlocks;
        log::info!("Purchased `{}` for {} coins ({} left)", id, price, ledger.coins);
        Ok(skin)
    }

    // === Settings (take effect on the next start) ===

    pub fn change_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
        self.save_settings();
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
        self.save_settings();
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.settings.set_volume(volume);
        self.save_settings();
    }

    pub fn set_effects_enabled(&mut self, enabled: bool) {
        self.settings.effects_enabled = enabled;
        self.save_settings();
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.trim().to_string();
        if let Err(err) = highscores::save_player_name(self.store.as_mut(), &self.player_name) {
            log::warn!("Could not save player name: {}", err);
        }
    }

    fn save_settings(&mut self) {
        if let Err(err) = self.settings.save(self.store.as_mut()) {
            log::warn!("Could not save settings: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::platform::{ManualClock, ManualScheduler};
    use crate::economy::STARTER_COINS;
    use crate::sim::skill::STORM;

    struct Harness {
        game: Game,
        clock: ManualClock,
        store: MemoryStore,
        scheduler: ManualScheduler,
    }

    fn harness_with(store: MemoryStore) -> Harness {
        let clock = ManualClock::new(1_000);
        let scheduler = ManualScheduler::new();
        let game = Game::new(
            Box::new(clock.clone()),
            Box::new(store.clone()),
            Box::new(scheduler.clone()),
            7,
        );
        Harness {
            game,
            clock,
            store,
            scheduler,
        }
    }

    /// Returning player with no coins
    fn harness() -> Harness {
        harness_with(store_with_coins(0))
    }

    fn store_with_coins(coins: u32) -> MemoryStore {
        let mut store = MemoryStore::new();
        let ledger = CoinLedger {
            coins,
            total_earned: coins,
            last_session_coins: 0,
        };
        save_record(&mut store, keys::LEDGER, &ledger).unwrap();
        save_record(&mut store, keys::STARTER_GRANTED, &true).unwrap();
        store
    }

    #[test]
    fn test_phase_transitions() {
        let mut h = harness();
        assert_eq!(h.game.phase(), GamePhase::Start);
        assert!(!h.game.pause_game());
        assert!(h.game.start_game());
        assert!(!h.game.start_game());
        assert!(h.game.pause_game());
        assert!(!h.scheduler.is_pending());
        assert!(h.game.resume_game());
        assert!(h.scheduler.is_pending());
        assert!(h.game.end_game());
        assert_eq!(h.game.phase(), GamePhase::GameOver);
        assert!(h.game.show_leaderboard());
        assert!(h.game.return_to_menu());
        assert_eq!(h.game.phase(), GamePhase::Start);
    }

    #[test]
    fn test_start_refused_while_paused() {
        let mut h = harness();
        h.game.start_game();
        h.game.state.credit(crate::economy::RewardKind::Pipe, 10, None);
        h.game.pause_game();
        assert!(!h.game.start_game());
        assert_eq!(h.game.phase(), GamePhase::Paused);
        assert_eq!(h.game.state().session_coins, 10);

        assert!(h.game.return_to_menu());
        assert_eq!(h.game.ledger().coins, 10);
        assert!(h.game.start_game());
    }

    #[test]
    fn test_pause_does_not_earn_time_rewards() {
        let mut h = harness();
        h.game.start_game();
        h.clock.advance(16);
        h.game.frame();
        h.game.pause_game();
        h.clock.advance(600_000);
        h.game.resume_game();
        h.clock.advance(16);
        assert!(h.game.frame().is_none());
        assert_eq!(h.game.state().stats.time_rewards, 0);
        assert_eq!(h.game.state().stats.tally.time, 0);
        assert!(h.game.state().obstacles.is_empty());

        // Thirty seconds of actual play still pays one interval
        h.clock.advance(30_000);
        assert!(h.game.frame().is_none());
        assert_eq!(h.game.state().stats.time_rewards, 1);
        assert_eq!(h.game.state().stats.tally.time, 5);
    }

    #[test]
    fn test_pause_keeps_power_up_time() {
        let mut h = harness();
        h.game.start_game();
        let now = h.clock.now();
        h.game
            .state
            .active_power_ups
            .push(crate::sim::powerup::activate(crate::sim::PowerUpKind::Magnet, now));
        h.game.pause_game();
        h.clock.advance(60_000);
        h.game.resume_game();
        h.clock.advance(16);
        h.game.frame();
        assert_eq!(h.game.state().active_power_ups.len(), 1);
        assert!(h.game.state().effects.magnet);
    }

    #[test]
    fn test_starter_balance_granted_once() {
        let mut h = harness_with(MemoryStore::new());
        assert_eq!(h.game.ledger().coins, 0);
        h.game.start_game();
        assert_eq!(h.game.ledger().coins, STARTER_COINS);
        assert_eq!(h.game.ledger().total_earned, STARTER_COINS);
        assert!(load_record::<bool>(&h.store, keys::STARTER_GRANTED));
        h.game.end_game();

        h.game.purchase_skin("storm_bird", 1_200).unwrap();
        h.game.return_to_menu();
        h.game.start_game();
        assert_eq!(h.game.ledger().coins, STARTER_COINS - 1_200);

        let reloaded = harness_with(h.store.clone());
        assert_eq!(reloaded.game.ledger().coins, STARTER_COINS - 1_200);
    }

    #[test]
    fn test_menus_unreachable_while_playing() {
        let mut h = harness();
        assert!(h.game.show_shop());
        assert!(h.game.show_settings());
        h.game.start_game();
        assert!(!h.game.show_shop());
        assert!(!h.game.return_to_menu());
    }

    #[test]
    fn test_jump_only_while_playing() {
        let mut h = harness();
        assert!(!h.game.jump());
        h.game.start_game();
        assert!(h.game.jump());
        assert_eq!(h.game.state().avatar.velocity, -6.0);
    }

    #[test]
    fn test_frame_requests_next_frame() {
        let mut h = harness();
        h.game.start_game();
        assert!(h.scheduler.take_pending());
        h.clock.advance(16);
        assert!(h.game.frame().is_none());
        assert!(h.scheduler.is_pending());
        assert!(h.game.state().avatar.velocity > 0.0);
    }

    #[test]
    fn test_frame_game_over_pays_out_and_cancels() {
        let mut h = harness();
        h.game.set_player_name("ann");
        h.game.start_game();
        h.game.state.score = 3;
        h.game.state.credit(crate::economy::RewardKind::Pipe, 30, None);
        h.game.state.avatar.pos.y = 700.0;
        h.clock.advance(1_500);

        assert!(h.game.frame().is_some());
        assert_eq!(h.game.phase(), GamePhase::GameOver);
        assert!(!h.scheduler.is_pending());
        assert_eq!(h.game.ledger().coins, 30);
        assert_eq!(h.game.state().high_score, 3);
        assert_eq!(h.game.last_summary().map(|s| s.total_coins), Some(30));
        assert_eq!(h.game.leaderboard().rank_of("ann"), Some(1));

        let saved: CoinLedger = load_record(&h.store, keys::LEDGER);
        assert_eq!(saved.coins, 30);
        assert_eq!(highscores::load_high_score(&h.store), 3);
    }

    #[test]
    fn test_no_leaderboard_entry_without_name() {
        let mut h = harness();
        h.game.start_game();
        h.game.state.score = 5;
        h.game.end_game();
        assert!(h.game.leaderboard().is_empty());
        assert_eq!(h.game.state().high_score, 5);
    }

    #[test]
    fn test_reset_discards_session() {
        let mut h = harness();
        h.game.start_game();
        h.game.state.credit(crate::economy::RewardKind::Pipe, 10, None);
        h.game.reset_game();
        assert_eq!(h.game.phase(), GamePhase::Start);
        assert_eq!(h.game.state().session_coins, 0);
        assert_eq!(h.game.ledger().coins, 0);
    }

    #[test]
    fn test_settings_apply_on_next_start() {
        let mut h = harness();
        h.game.change_difficulty(Difficulty::Expert);
        assert_eq!(h.game.config().scroll_speed, 1.2);
        h.game.start_game();
        assert_eq!(h.game.config().scroll_speed, 2.0);
        assert_eq!(h.game.state().difficulty, Difficulty::Expert);
        assert_eq!(Settings::load(&h.store).difficulty, Difficulty::Expert);
    }

    #[test]
    fn test_settings_survive_restart() {
        let mut h = harness();
        h.game.set_volume(3.0);
        h.game.set_sound_enabled(false);
        h.game.set_effects_enabled(false);
        let h2 = harness_with(h.store.clone());
        let settings = h2.game.settings();
        assert_eq!(settings.volume, 1.0);
        assert!(!settings.sound_enabled);
        assert!(!settings.effects_enabled);
    }

    #[test]
    fn test_purchase_and_select() {
        let mut h = harness_with(store_with_coins(2_000));
        let skin = h.game.purchase_skin("storm_bird", 1_200).unwrap();
        assert_eq!(skin.id, "storm_bird");
        assert_eq!(h.game.ledger().coins, 800);
        assert!(h.game.select_skin("storm_bird"));
        assert_eq!(h.game.state().skill.map(|s| s.id), Some(STORM.id));

        let reloaded = harness_with(h.store.clone());
        assert_eq!(reloaded.game.ledger().coins, 800);
        assert_eq!(reloaded.game.unlocks().current().id, "storm_bird");
    }

    #[test]
    fn test_purchase_refusals() {
        let mut h = harness_with(store_with_coins(300));
        let err = h.game.purchase_skin("x", 500).unwrap_err();
        assert_eq!(err.to_string(), "insufficient funds");
        assert!(matches!(
            h.game.purchase_skin("x", 100),
            Err(PurchaseError::UnknownSkin(_))
        ));
        assert!(matches!(
            h.game.purchase_skin("classic", 0),
            Err(PurchaseError::AlreadyUnlocked(_))
        ));
        h.game.start_game();
        assert!(matches!(
            h.game.purchase_skin("gold", 100),
            Err(PurchaseError::GameInProgress)
        ));
        assert_eq!(h.game.ledger().coins, 300);
    }

    #[test]
    fn test_select_skin_rules() {
        let mut h = harness();
        assert!(!h.game.select_skin("gold"));
        assert!(h.game.select_skin("classic"));
        h.game.start_game();
        assert!(!h.game.select_skin("classic"));
    }

    #[test]
    fn test_skill_activation_and_cooldown() {
        let mut h = harness_with(store_with_coins(2_000));
        h.game.purchase_skin("storm_bird", 1_200).unwrap();
        h.game.select_skin("storm_bird");
        assert!(!h.game.activate_skill());

        h.game.start_game();
        assert_eq!(h.game.skill_cooldown_progress(), Some(1.0));
        assert!(h.game.activate_skill());
        assert!(!h.game.activate_skill());
        assert!(!h.game.visuals().is_idle());
        assert_eq!(h.game.effective_config().gravity, 0.0);

        h.clock.advance(15_000);
        h.game.update_skill_cooldown();
        let progress = h.game.skill_cooldown_progress().unwrap();
        assert!((progress - 0.5).abs() < 1e-6);

        h.clock.advance(15_000);
        h.game.update_skill_cooldown();
        assert!(h.game.activate_skill());
    }

    #[test]
    fn test_effects_timer_drains_visuals() {
        let mut h = harness_with(store_with_coins(2_000));
        h.game.purchase_skin("storm_bird", 1_200).unwrap();
        h.game.select_skin("storm_bird");
        h.game.start_game();
        h.game.activate_skill();
        for _ in 0..400 {
            h.clock.advance(16);
            h.game.update_effects();
        }
        assert!(h.game.visuals().is_idle());
    }

    #[test]
    fn test_dismiss_reward_event() {
        let mut h = harness();
        h.game.start_game();
        h.game.state.credit(crate::economy::RewardKind::Pipe, 10, None);
        let id = h.game.state().rewards[0].id;
        assert!(h.game.dismiss_reward_event(id));
        assert!(!h.game.dismiss_reward_event(id));
    }
}
