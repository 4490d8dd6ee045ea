//! Scene animation: group rotation, core uniforms, camera/light tweens

mod animator;
mod tween;

pub use animator::{AnimatorConfig, PoseTarget, SceneAnimator};
pub use tween::{Ease, Repeat, Timeline, TimelineState};
