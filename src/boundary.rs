//! Fault boundary around the 3D subtree
//!
//! Scene construction and per-frame updates run inside [`FaultBoundary::run`].
//! The first `Err` (or panic, where unwinding is available) trips it; from
//! then on the subtree is skipped and the host shows [`FaultBoundary::fallback_text`]
//! instead. The rest of the UI keeps running. Nothing retries on its own.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

use crate::error::SceneError;

/// Leading text of the fallback message
pub const FALLBACK_TEXT: &str = "The galaxy failed to render";

#[derive(Debug, Clone, PartialEq, Eq)]
enum BoundaryState {
    Healthy,
    Tripped { message: String },
}

#[derive(Debug)]
pub struct FaultBoundary {
    state: BoundaryState,
    trips: u32,
}

impl Default for FaultBoundary {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultBoundary {
    pub fn new() -> Self {
        Self {
            state: BoundaryState::Healthy,
            trips: 0,
        }
    }

    /// Run `f` unless already tripped. Returns its value on success.
    pub fn run<T>(&mut self, f: impl FnOnce() -> Result<T, SceneError>) -> Option<T> {
        if self.is_tripped() {
            return None;
        }
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.trip(e.to_string());
                None
            }
            Err(payload) => {
                self.trip(panic_message(payload.as_ref()));
                None
            }
        }
    }

    pub fn trip(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.trips += 1;
        error!(error = %message, trips = self.trips, "Scene subtree failed, showing fallback");
        self.state = BoundaryState::Tripped { message };
    }

    pub fn is_tripped(&self) -> bool {
        matches!(self.state, BoundaryState::Tripped { .. })
    }

    /// Message the host shows in place of the scene, if tripped
    pub fn fallback_text(&self) -> Option<String> {
        match &self.state {
            BoundaryState::Healthy => None,
            BoundaryState::Tripped { message } => Some(format!("{}: {}", FALLBACK_TEXT, message)),
        }
    }

    /// Explicit user retry
    pub fn reset(&mut self) {
        self.state = BoundaryState::Healthy;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_run_passes_value_through() {
        let mut boundary = FaultBoundary::new();
        assert_eq!(boundary.run(|| Ok(7)), Some(7));
        assert!(!boundary.is_tripped());
        assert_eq!(boundary.fallback_text(), None);
    }

    #[test]
    fn error_renders_fallback_with_message() {
        let mut boundary = FaultBoundary::new();
        let out: Option<()> =
            boundary.run(|| Err(SceneError::Construction("test-error".to_string())));
        assert_eq!(out, None);
        let text = boundary.fallback_text().unwrap();
        assert!(text.contains(FALLBACK_TEXT), "{}", text);
        assert!(text.contains("test-error"), "{}", text);
    }

    #[test]
    fn panic_is_contained() {
        let mut boundary = FaultBoundary::new();
        let out: Option<()> = boundary.run(|| panic!("test-error"));
        assert_eq!(out, None);
        let text = boundary.fallback_text().unwrap();
        assert!(text.contains(FALLBACK_TEXT));
        assert!(text.contains("test-error"));
    }

    #[test]
    fn tripped_boundary_skips_subtree_until_reset() {
        let mut boundary = FaultBoundary::new();
        boundary.trip("boom");
        let mut ran = false;
        assert_eq!(
            boundary.run(|| {
                ran = true;
                Ok(())
            }),
            None
        );
        assert!(!ran);

        boundary.reset();
        assert_eq!(boundary.run(|| Ok(1)), Some(1));
    }
}
