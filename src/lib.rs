//! Drop Catch - tap the falling items before they leave the field
//!
//! Core modules:
//! - `sim`: Simulation core (entities, difficulty, scoring, input resolution, session)
//! - `renderer`: Draw-call emission against an abstract render surface
//! - `platform`: Asset readiness tracking and host frame timing
//! - `settings`: Data-driven game configuration and presets

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, SessionError};
pub use settings::{GameConfig, Preset, PowerUpSelection};
pub use sim::{GamePhase, GameState, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Speeds are expressed in pixels per reference frame (60 Hz)
    pub const REFERENCE_FRAME_SECS: f32 = 1.0 / 60.0;
    /// Longest elapsed time a single tick may consume (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Upper bound on spawns fired by one tick
    pub const MAX_SPAWNS_PER_TICK: u32 = 4;

    /// Default simulation field (logical resolution)
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    pub const ENTITY_SIZE: f32 = 50.0;

    /// Fall speed range (pixels per reference frame)
    pub const MIN_FALL_SPEED: f32 = 1.0;
    pub const MAX_FALL_SPEED: f32 = 3.0;

    /// Spawn cadence
    pub const SPAWN_INTERVAL_MS: u32 = 1000;
    pub const MIN_SPAWN_INTERVAL_MS: u32 = 500;
    pub const SPAWN_INTERVAL_STEP_MS: u32 = 5;

    /// Score needed per level
    pub const LEVEL_UP_THRESHOLD: u64 = 50;
    /// Largest score change a single catch may apply
    pub const MAX_POINTS: u64 = i64::MAX as u64;
}

/// Convert a millisecond setting to simulation seconds
#[inline]
pub fn ms_to_secs(ms: u32) -> f32 {
    ms as f32 / 1000.0
}

/// Convert simulation seconds back to whole milliseconds (for display and events)
#[inline]
pub fn secs_to_ms(secs: f32) -> u32 {
    (secs.max(0.0) * 1000.0).round() as u32
}
