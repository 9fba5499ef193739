//! Falling entities and their factory

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultySchedule;
use super::kind::EntityKind;
use crate::consts::REFERENCE_FRAME_SECS;

/// A falling entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    /// Top-left corner in simulation space
    pub pos: Vec2,
    /// Edge length of the square bounding box
    pub size: f32,
    /// Fall speed fixed at spawn (pixels per reference frame)
    pub base_speed: f32,
    /// Resolved by a tap; removed with the same call
    pub struck: bool,
}

impl Entity {
    /// Fall speed after global modifiers. Derived every tick, never stored.
    #[inline]
    pub fn effective_speed(&self, speed_factor: f32) -> f32 {
        (self.base_speed * speed_factor).max(0.0)
    }

    /// Per-tick velocity (pixels per second)
    pub fn velocity(&self, speed_factor: f32) -> Vec2 {
        Vec2::new(0.0, self.effective_speed(speed_factor) / REFERENCE_FRAME_SECS)
    }

    /// Move by `dt` seconds of wall time
    pub fn advance(&mut self, dt: f32, speed_factor: f32) {
        self.pos += self.velocity(speed_factor) * dt;
    }

    /// Axis-aligned containment, edges inclusive
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.pos.x
            && point.x <= self.pos.x + self.size
            && point.y >= self.pos.y
            && point.y <= self.pos.y + self.size
    }

    /// Fully below the bottom edge of the field
    #[inline]
    pub fn has_exited(&self, field_height: f32) -> bool {
        self.pos.y > field_height
    }

    /// Centre of the bounding box (feedback markers anchor here)
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }
}

/// Spawn parameters that do not change during a session
#[derive(Debug, Clone, Copy)]
pub struct SpawnBounds {
    pub field_width: f32,
    pub size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

/// Create an entity of `kind` just above the field.
///
/// The horizontal position keeps the whole box inside the field and the speed
/// captures the difficulty at spawn time.
pub fn spawn_entity(
    id: u32,
    kind: EntityKind,
    bounds: &SpawnBounds,
    difficulty: &DifficultySchedule,
    rng: &mut impl Rng,
) -> Entity {
    let max_x = (bounds.field_width - bounds.size).max(0.0);
    let x = if max_x > 0.0 {
        rng.random_range(0.0..=max_x)
    } else {
        0.0
    };
    let speed = if bounds.max_speed > bounds.min_speed {
        rng.random_range(bounds.min_speed..bounds.max_speed)
    } else {
        bounds.min_speed
    };

    Entity {
        id,
        kind,
        pos: Vec2::new(x, -bounds.size),
        size: bounds.size,
        base_speed: speed * difficulty.speed_multiplier,
        struck: false,
    }
}
