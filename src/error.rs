//! Error types for scene construction, per-frame updates and presets

/// Failure while building or updating the 3D subtree.
///
/// Any of these trips the [`FaultBoundary`](crate::boundary::FaultBoundary),
/// which swaps the scene for a static message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("scene construction failed: {0}")]
    Construction(String),
    #[error("frame update failed: {0}")]
    Update(String),
    #[error("parameter `{name}` has invalid value {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Failure while loading a tuning preset.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("preset read error: {0}")]
    Read(#[from] std::io::Error),
    #[error("preset parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
