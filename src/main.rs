//! Gap Runner entry point
//!
//! Native builds run headless sessions with a simple autopilot, driving the
//! three game timers from a manual clock:
//!
//! ```text
//! gap-runner [difficulty] [seed] [sessions]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use anyhow::{Context, Result};

    use gap_runner::consts::*;
    use gap_runner::economy::format_coins;
    use gap_runner::highscores::format_age;
    use gap_runner::persistence::MemoryStore;
    use gap_runner::platform::{Clock, ManualClock, ManualScheduler, SystemClock, init_logging};
    use gap_runner::skins::{SKINS, SkinCategory};
    use gap_runner::{Difficulty, Game, GamePhase, Millis};

    /// Simulated time limit per session
    const MAX_SESSION_MS: Millis = 5 * 60 * 1000;

    /// Autopilot jumps when this far below its target line
    const AUTOPILOT_DEADBAND: f32 = 12.0;

    struct Options {
        difficulty: Difficulty,
        seed: u64,
        sessions: u32,
    }

    impl Options {
        fn from_args() -> Result<Self> {
            let args: Vec<String> = std::env::args().skip(1).collect();
            let difficulty = args
                .first()
                .map(|s| Difficulty::parse_or_default(s))
                .unwrap_or_default();
            let seed = match args.get(1) {
                Some(s) => s.parse().with_context(|| format!("invalid seed `{}`", s))?,
                None => SystemClock::new().wall_time(),
            };
            let sessions = match args.get(2) {
                Some(s) => s
                    .parse()
                    .with_context(|| format!("invalid session count `{}`", s))?,
                None => 3,
            };
            Ok(Self {
                difficulty,
                seed,
                sessions,
            })
        }
    }

    pub fn run() -> Result<()> {
        init_logging();
        let options = Options::from_args()?;
        log::info!(
            "Gap Runner headless: {} difficulty, seed {}, {} sessions",
            options.difficulty,
            options.seed,
            options.sessions
        );

        let clock = ManualClock::new(0);
        let scheduler = ManualScheduler::new();
        let mut game = Game::new(
            Box::new(clock.clone()),
            Box::new(MemoryStore::new()),
            Box::new(scheduler.clone()),
            options.seed,
        );
        game.set_player_name("autopilot");
        game.change_difficulty(options.difficulty);

        for session in 1..=options.sessions {
            play_session(&mut game, &clock, &scheduler);
            if let Some(summary) = game.last_summary() {
                log::info!(
                    "Session {}: score {}, coins +{} (pipes {}, streaks {}, time {}, milestones {}, perfect {}, pickups {})",
                    session,
                    game.state().score,
                    summary.total_coins,
                    summary.base_rewards,
                    summary.streak_rewards,
                    summary.time_rewards,
                    summary.milestone_rewards,
                    summary.perfect_rewards,
                    summary.pickup_rewards
                );
            }
            shop(&mut game);
            game.return_to_menu();
        }

        let now = clock.now();
        for (rank, entry) in game.leaderboard().top(5).iter().enumerate() {
            log::info!(
                "#{} {} {} ({}, {})",
                rank + 1,
                entry.player_name,
                entry.score,
                entry.difficulty,
                format_age(entry.date, now)
            );
        }
        log::info!("Final balance: {} coins", format_coins(game.ledger().coins));
        Ok(())
    }

    /// Run one session to game over (or the time limit)
    fn play_session(game: &mut Game, clock: &ManualClock, scheduler: &ManualScheduler) {
        game.start_game();
        let started = clock.now();
        let mut effects_acc: Millis = 0;
        let mut skill_acc: Millis = 0;

        while game.phase() == GamePhase::Playing {
            clock.advance(FRAME_MS);
            effects_acc += FRAME_MS;
            skill_acc += FRAME_MS;

            while effects_acc >= EFFECTS_TICK_MS {
                effects_acc -= EFFECTS_TICK_MS;
                game.update_effects();
            }
            while skill_acc >= SKILL_TICK_MS {
                skill_acc -= SKILL_TICK_MS;
                game.update_skill_cooldown();
            }

            autopilot(game);
            if scheduler.take_pending() {
                game.frame();
            }

            if clock.now() - started >= MAX_SESSION_MS {
                log::info!("Session time limit reached");
                game.end_game();
            }
        }
    }

    /// Steer toward the next gap's center
    fn autopilot(game: &mut Game) {
        let state = game.state();
        let target = state
            .nearest_obstacle_ahead()
            .map(|o| o.gap_center().y)
            .unwrap_or(CANVAS_HEIGHT / 2.0);
        let below = state.avatar.center().y - target;
        let should_jump = below > AUTOPILOT_DEADBAND && state.avatar.velocity >= 0.0;
        let skill_ready = state.skill.is_some() && state.skill_state.is_available();

        if should_jump {
            game.jump();
        }
        if skill_ready {
            game.activate_skill();
        }
    }

    /// Buy and equip the cheapest affordable skill skin
    fn shop(game: &mut Game) {
        let coins = game.ledger().coins;
        let pick = SKINS
            .iter()
            .filter(|s| s.category == SkinCategory::Skill)
            .filter(|s| !game.unlocks().is_unlocked(s.id) && s.price <= coins)
            .min_by_key(|s| s.price);
        let Some(skin) = pick else {
            return;
        };
        match game.purchase_skin(skin.id, skin.price) {
            Ok(skin) => {
                game.select_skin(skin.id);
            }
            Err(err) => log::warn!("Could not buy `{}`: {}", skin.id, err),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    headless::run()
}

/// Browser build: load the persisted records and report what the page
/// will drive through `Game`'s actions
#[cfg(target_arch = "wasm32")]
fn main() {
    use gap_runner::Game;
    use gap_runner::persistence::LocalStorageStore;
    use gap_runner::platform::{Clock, ManualScheduler, PerformanceClock, init_logging};

    init_logging();
    let seed = PerformanceClock.wall_time();
    let game = Game::new(
        Box::new(PerformanceClock),
        Box::new(LocalStorageStore::new()),
        Box::new(ManualScheduler::new()),
        seed,
    );
    log::info!(
        "Gap Runner loaded: {} coins, skin `{}`",
        game.ledger().coins,
        game.unlocks().current().name
    );
}
