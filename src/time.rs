//! Platform-agnostic time utilities
//!
//! Seconds since app start, plus a per-frame clock for the animator.

#[cfg(target_arch = "wasm32")]
pub fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_seconds() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Wall-clock frame timer.
///
/// `elapsed` drives shader time so visual speed does not depend on frame rate.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: f64,
    last: f64,
}

/// Longest delta fed to the tweens; a backgrounded tab resumes without a jump.
const MAX_DELTA: f64 = 0.25;

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(now_seconds())
    }

    pub fn starting_at(now: f64) -> Self {
        Self { start: now, last: now }
    }

    /// Advance to `now`; returns (elapsed since start, clamped delta since last tick).
    pub fn tick_at(&mut self, now: f64) -> (f64, f64) {
        let delta = (now - self.last).clamp(0.0, MAX_DELTA);
        self.last = now;
        ((now - self.start).max(0.0), delta)
    }

    pub fn tick(&mut self) -> (f64, f64) {
        self.tick_at(now_seconds())
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
