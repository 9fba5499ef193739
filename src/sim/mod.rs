//! Simulation core
//!
//! All gameplay logic lives here. Nothing in this module touches the DOM or
//! a clock:
//! - Elapsed time comes in through `tick`
//! - Taps come in as `PointerEvent`s
//! - Randomness comes from a seeded RNG owned by the session

pub mod difficulty;
pub mod entity;
pub mod input;
pub mod kind;
pub mod session;
pub mod state;
pub mod tick;

pub use difficulty::{DifficultySchedule, KindThresholds, SpawnTimer, level_for_score, schedule};
pub use entity::{Entity, SpawnBounds, spawn_entity};
pub use input::{DisplayRect, PointerEvent, resolve, to_sim_coords};
pub use kind::{EffectKind, EntityKind, KindRegistry, KindSpec, PowerUpKind};
pub use state::{
    ActiveEffects, FeedbackMarker, GameEvent, GamePhase, GameState, ScoreState, Snapshot,
};
pub use tick::tick;
