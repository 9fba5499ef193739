//! Error types
//!
//! Configuration problems fail fast when a session is built. A refused start is
//! reported back to the caller and leaves the session untouched.

/// Invalid game configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("field must have positive dimensions, got {width}x{height}")]
    FieldSize { width: f32, height: f32 },

    #[error("entity size {size} must be positive and fit inside a field {width} wide")]
    EntitySize { size: f32, width: f32 },

    #[error("fall speed range {min}..{max} must be non-negative and ordered")]
    FallSpeed { min: f32, max: f32 },

    #[error("spawn interval must be positive (base {base_ms} ms, minimum {min_ms} ms)")]
    SpawnInterval { base_ms: u32, min_ms: u32 },

    #[error("minimum spawn interval {min_ms} ms exceeds the base interval {base_ms} ms")]
    SpawnFloor { base_ms: u32, min_ms: u32 },

    #[error("probability '{name}' must lie in [0, 1], got {value}")]
    Probability { name: &'static str, value: f32 },

    #[error("harmful cap {harmful} plus power-up chance {power_up} exceeds 1")]
    ProbabilitySum { harmful: f32, power_up: f32 },

    #[error("level-up threshold must be positive")]
    LevelThreshold,

    #[error("slow factor must lie in (0, 1], got {0}")]
    SlowFactor(f32),

    #[error("slow-time duration {duration_ms} ms must be positive and at most the cap {max_ms} ms")]
    SlowDuration { duration_ms: u32, max_ms: u32 },

    #[error("initial lives must be positive, got {0}")]
    Lives(i32),

    #[error("'{name}' must not be negative, got {value}")]
    NegativeLives { name: &'static str, value: i32 },

    #[error("'{name}' is too large ({value}), at most {max} points")]
    Points { name: &'static str, value: u64, max: u64 },

    #[error("weighted power-up selection needs at least one positive weight")]
    PowerUpWeights,

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A session operation that could not run in the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Start was requested before every visual finished loading (or failing).
    #[error("assets are still loading ({settled}/{total} ready), try again shortly")]
    AssetsNotReady { settled: usize, total: usize },
}
