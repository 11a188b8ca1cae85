//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic milliseconds, wall-clock dates for the leaderboard)
//! - Frame scheduling (one callback per repaint)
//! - Logger installation

use std::cell::Cell;
use std::rc::Rc;

/// Milliseconds on the host's monotonic clock
pub type Millis = u64;

/// Monotonic clock consumed by the game host
pub trait Clock {
    /// Monotonic milliseconds
    fn now(&self) -> Millis;

    /// Unix milliseconds, used only to date leaderboard entries
    fn wall_time(&self) -> Millis {
        self.now()
    }
}

/// Request/cancel one callback per display repaint
///
/// The host owns the actual callback; the game only tells it whether the
/// physics loop wants another frame.
pub trait FrameScheduler {
    fn request_frame(&mut self);
    fn cancel_frame(&mut self);
}

/// Clock driven by hand (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.now.get()
    }
}

/// Scheduler that only records whether a frame is pending
///
/// Clones share state, so a driver can keep one handle while the game owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    pending: Rc<Cell<bool>>,
    requests: Rc<Cell<u64>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a repaint callback is currently requested
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Consume the pending request (the host is about to run the callback)
    pub fn take_pending(&self) -> bool {
        self.pending.replace(false)
    }

    /// Total number of frame requests seen
    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending.set(true);
        self.requests.set(self.requests.get() + 1);
    }

    fn cancel_frame(&mut self) {
        self.pending.set(false);
    }
}

/// Native monotonic clock
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }

    fn wall_time(&self) -> Millis {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as Millis)
            .unwrap_or(0)
    }
}

/// Browser clock backed by `performance.now()`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct PerformanceClock;

#[cfg(target_arch = "wasm32")]
impl Clock for PerformanceClock {
    fn now(&self) -> Millis {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now().max(0.0) as Millis)
            .unwrap_or(0)
    }

    fn wall_time(&self) -> Millis {
        js_sys::Date::now().max(0.0) as Millis
    }
}

/// Install the platform logger
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Install the platform logger (`RUST_LOG` overrides the `info` default)
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(500);
        let handle = clock.clone();
        handle.advance(250);
        assert_eq!(clock.now(), 750);
        clock.set(10);
        assert_eq!(handle.now(), 10);
    }

    #[test]
    fn test_manual_scheduler_request_and_cancel() {
        let mut scheduler = ManualScheduler::new();
        let observer = scheduler.clone();

        scheduler.request_frame();
        assert!(observer.is_pending());
        assert!(observer.take_pending());
        assert!(!observer.is_pending());

        scheduler.request_frame();
        scheduler.cancel_frame();
        assert!(!observer.is_pending());
        assert_eq!(observer.request_count(), 2);
    }
}
