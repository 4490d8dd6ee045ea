//! Keyframe tween timelines
//!
//! A [`Timeline`] is an explicit state machine: current leg, time spent in
//! that leg, and direction. The host's frame tick drives it through
//! [`Timeline::advance`]; nothing runs on its own. Both repeat modes loop
//! forever until [`Timeline::cancel`].

use glam::Vec3;
use std::f32::consts::PI;

use crate::error::SceneError;

/// Easing curve applied within each leg
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    InOutSine,
    InOutQuad,
}

impl Ease {
    /// Map linear progress `t` in [0, 1] to eased progress
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InOutSine => -((PI * t).cos() - 1.0) * 0.5,
            Ease::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
        }
    }
}

/// What happens after the last leg
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Play the legs backwards, then forwards again
    Yoyo,
    /// Jump back to the first keyframe
    Restart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineState {
    Idle,
    Running,
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct Timeline {
    keyframes: Vec<Vec3>,
    leg_duration: f32,
    ease: Ease,
    repeat: Repeat,
    state: TimelineState,
    leg: usize,
    elapsed: f32,
    reversed: bool,
}

impl Timeline {
    /// Needs at least two keyframes and a positive leg duration.
    pub fn new(
        keyframes: Vec<Vec3>,
        leg_duration: f32,
        ease: Ease,
        repeat: Repeat,
    ) -> Result<Self, SceneError> {
        if keyframes.len() < 2 {
            return Err(SceneError::Construction(format!(
                "timeline needs at least 2 keyframes, got {}",
                keyframes.len()
            )));
        }
        if !(leg_duration > 0.0 && leg_duration.is_finite()) {
            return Err(SceneError::Construction(format!(
                "timeline leg duration must be positive, got {}",
                leg_duration
            )));
        }
        Ok(Self {
            keyframes,
            leg_duration,
            ease,
            repeat,
            state: TimelineState::Idle,
            leg: 0,
            elapsed: 0.0,
            reversed: false,
        })
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Idle → Running. No effect once running or cancelled.
    pub fn start(&mut self) {
        if self.state == TimelineState::Idle {
            self.state = TimelineState::Running;
        }
    }

    /// Stop for good. Safe to call any number of times.
    pub fn cancel(&mut self) {
        self.state = TimelineState::Cancelled;
    }

    fn legs(&self) -> usize {
        self.keyframes.len() - 1
    }

    fn next_leg(&mut self) {
        let last = self.legs() - 1;
        match self.repeat {
            Repeat::Restart => self.leg = if self.leg == last { 0 } else { self.leg + 1 },
            Repeat::Yoyo if !self.reversed => {
                if self.leg < last {
                    self.leg += 1;
                } else {
                    self.reversed = true;
                }
            }
            Repeat::Yoyo => {
                if self.leg > 0 {
                    self.leg -= 1;
                } else {
                    self.reversed = false;
                }
            }
        }
    }

    /// Interpolated value at the current position
    pub fn current(&self) -> Vec3 {
        let from = self.keyframes[self.leg];
        let to = self.keyframes[self.leg + 1];
        let (from, to) = if self.reversed { (to, from) } else { (from, to) };
        let t = self.ease.apply(self.elapsed / self.leg_duration);
        from.lerp(to, t)
    }

    /// Legs stepped before the timeline is back where it started
    fn cycle_legs(&self) -> usize {
        match self.repeat {
            Repeat::Yoyo => 2 * self.legs(),
            Repeat::Restart => self.legs(),
        }
    }

    /// Move forward by `dt` seconds. Returns the new value while running,
    /// `None` when idle or cancelled. Non-finite or negative `dt` counts as 0.
    pub fn advance(&mut self, dt: f32) -> Option<Vec3> {
        if self.state != TimelineState::Running {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        // Whole cycles leave leg and direction unchanged
        let cycle = self.cycle_legs() as f32 * self.leg_duration;
        if self.elapsed >= cycle {
            self.elapsed = self.elapsed.rem_euclid(cycle);
        }
        while self.elapsed >= self.leg_duration {
            self.elapsed -= self.leg_duration;
            self.next_leg();
        }
        Some(self.current())
    }
}
