//! Session host tests: purchases, persistence and the frame loop

use std::cell::RefCell;
use std::rc::Rc;

use gap_runner::consts::*;
use gap_runner::persistence::{
    KeyValueStore, MemoryStore, StoreError, keys, load_record, save_record,
};
use gap_runner::platform::{Clock, ManualClock, ManualScheduler};
use gap_runner::skins::SkinUnlocks;
use gap_runner::{CoinLedger, Game, GamePhase, Millis, PurchaseError};

/// Memory store that refuses writes to one chosen key
#[derive(Clone, Default)]
struct FailingStore {
    inner: MemoryStore,
    fail_on: Rc<RefCell<Option<&'static str>>>,
}

impl FailingStore {
    fn fail_writes_to(&self, key: &'static str) {
        *self.fail_on.borrow_mut() = Some(key);
    }
}

impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if *self.fail_on.borrow() == Some(key) {
            return Err(StoreError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}

fn seed_coins(store: &mut dyn KeyValueStore, coins: u32) {
    let ledger = CoinLedger {
        coins,
        total_earned: coins,
        last_session_coins: 0,
    };
    save_record(store, keys::LEDGER, &ledger).unwrap();
}

fn game_on(store: impl KeyValueStore + 'static) -> (Game, ManualClock, ManualScheduler) {
    let clock = ManualClock::new(0);
    let scheduler = ManualScheduler::new();
    let game = Game::new(
        Box::new(clock.clone()),
        Box::new(store),
        Box::new(scheduler.clone()),
        42,
    );
    (game, clock, scheduler)
}

/// Play until the run ends, holding the avatar near mid-screen
fn play_out(game: &mut Game, clock: &ManualClock, scheduler: &ManualScheduler, limit: Millis) {
    let started = clock.now();
    while game.phase() == GamePhase::Playing {
        clock.advance(FRAME_MS);
        let avatar = game.state().avatar;
        if avatar.pos.y > CANVAS_HEIGHT / 2.0 && avatar.velocity >= 0.0 {
            game.jump();
        }
        if scheduler.take_pending() {
            game.frame();
        }
        game.update_effects();
        game.update_skill_cooldown();
        if clock.now() - started > limit {
            game.end_game();
        }
    }
}

#[test]
fn test_insufficient_funds_leaves_records_untouched() {
    let mut store = MemoryStore::new();
    seed_coins(&mut store, 300);
    let before_ledger = store.get(keys::LEDGER).unwrap();
    let before_unlocks = store.get(keys::UNLOCKS).unwrap();

    let (mut game, _, _) = game_on(store.clone());
    let err = game.purchase_skin("x", 500).unwrap_err();
    assert!(matches!(err, PurchaseError::InsufficientFunds));
    assert_eq!(err.to_string(), "insufficient funds");

    assert_eq!(game.ledger().coins, 300);
    assert_eq!(game.unlocks(), &SkinUnlocks::default());
    assert_eq!(store.get(keys::LEDGER).unwrap(), before_ledger);
    assert_eq!(store.get(keys::UNLOCKS).unwrap(), before_unlocks);
}

#[test]
fn test_failed_unlock_write_rolls_back_ledger() {
    let mut store = FailingStore::default();
    seed_coins(&mut store, 1_000);
    let before_ledger = store.get(keys::LEDGER).unwrap();
    store.fail_writes_to(keys::UNLOCKS);

    let (mut game, _, _) = game_on(store.clone());
    let err = game.purchase_skin("gold", 800).unwrap_err();
    assert!(matches!(err, PurchaseError::Storage(_)));

    // Memory and storage both still show the pre-purchase state
    assert_eq!(game.ledger().coins, 1_000);
    assert!(!game.unlocks().is_unlocked("gold"));
    assert_eq!(store.get(keys::LEDGER).unwrap(), before_ledger);
    assert_eq!(store.get(keys::UNLOCKS).unwrap(), None);
}

#[test]
fn test_failed_ledger_write_changes_nothing() {
    let mut store = FailingStore::default();
    seed_coins(&mut store, 1_000);
    store.fail_writes_to(keys::LEDGER);

    let (mut game, _, _) = game_on(store.clone());
    assert!(game.purchase_skin("gold", 800).is_err());
    let saved: CoinLedger = load_record(&store, keys::LEDGER);
    assert_eq!(saved.coins, 1_000);
    assert_eq!(store.get(keys::UNLOCKS).unwrap(), None);
}

#[test]
fn test_purchase_persists_both_records() {
    let mut store = MemoryStore::new();
    seed_coins(&mut store, 1_000);

    let (mut game, _, _) = game_on(store.clone());
    let skin = game.purchase_skin("gold", 800).unwrap();
    assert_eq!(skin.name, "Gold");

    let ledger: CoinLedger = load_record(&store, keys::LEDGER);
    let unlocks: SkinUnlocks = load_record(&store, keys::UNLOCKS);
    assert_eq!(ledger.coins, 200);
    assert_eq!(ledger.total_earned, 1_000);
    assert!(unlocks.is_unlocked("gold"));
    assert_eq!(unlocks.purchase_log, vec!["gold".to_string()]);
}

#[test]
fn test_ledger_monotonic_across_sessions() {
    let mut store = MemoryStore::new();
    seed_coins(&mut store, 1_500);
    let (mut game, clock, scheduler) = game_on(store.clone());
    game.set_player_name("tester");

    let mut last = *game.ledger();
    for round in 0..4 {
        game.start_game();
        play_out(&mut game, &clock, &scheduler, 60_000);
        let now = *game.ledger();
        assert!(now.total_earned >= last.total_earned);
        assert!(now.coins >= last.coins, "coins dropped without a purchase");
        assert_eq!(now.coins - last.coins, now.total_earned - last.total_earned);
        assert_eq!(
            Some(now.last_session_coins),
            game.last_summary().map(|s| s.total_coins)
        );
        last = now;

        if round == 1 {
            game.purchase_skin("shield_bird", 1_400).unwrap();
            let after = *game.ledger();
            assert_eq!(after.coins, last.coins - 1_400);
            assert_eq!(after.total_earned, last.total_earned);
            assert!(game.select_skin("shield_bird"));
            last = after;
        }
        game.return_to_menu();
    }

    let saved: CoinLedger = load_record(&store, keys::LEDGER);
    assert_eq!(saved, last);
}

#[test]
fn test_frame_loop_follows_phase() {
    let (mut game, clock, scheduler) = game_on(MemoryStore::new());
    assert!(game.frame().is_none());
    assert!(!scheduler.is_pending());

    game.start_game();
    assert!(scheduler.take_pending());
    clock.advance(FRAME_MS);
    game.frame();
    assert!(scheduler.is_pending());

    game.pause_game();
    assert!(!scheduler.is_pending());
    let frozen = game.state().avatar;
    clock.advance(1_000);
    assert!(game.frame().is_none());
    assert_eq!(game.state().avatar, frozen);

    game.resume_game();
    assert!(scheduler.take_pending());
    play_out(&mut game, &clock, &scheduler, 120_000);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(!scheduler.is_pending());
}

#[test]
fn test_records_survive_restart() {
    let store = MemoryStore::new();
    let (mut game, clock, scheduler) = game_on(store.clone());
    game.set_player_name("  ann  ");
    game.start_game();
    play_out(&mut game, &clock, &scheduler, 60_000);
    let score = game.state().score;
    let high = game.state().high_score;
    assert_eq!(high, score);

    let (reloaded, _, _) = game_on(store.clone());
    assert_eq!(reloaded.player_name(), "ann");
    assert_eq!(reloaded.state().high_score, high);
    assert_eq!(reloaded.ledger(), game.ledger());
    if score > 0 {
        assert_eq!(reloaded.leaderboard().rank_of("ann"), Some(1));
    } else {
        assert!(reloaded.leaderboard().is_empty());
    }
}
