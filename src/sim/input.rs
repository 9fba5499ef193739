//! Pointer input: display-to-simulation mapping and hit resolution

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::state::GameState;

/// On-screen rectangle of the play surface, in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// A tap or click in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
}

impl PointerEvent {
    pub fn new(client_x: f32, client_y: f32) -> Self {
        Self { client_x, client_y }
    }
}

/// Convert a pointer position into simulation space.
///
/// The surface may be displayed scaled; each axis is scaled independently.
/// Returns None when the surface has no visible area (collapsed layout,
/// hidden canvas).
pub fn to_sim_coords(
    pointer: PointerEvent,
    rect: DisplayRect,
    sim_w: f32,
    sim_h: f32,
) -> Option<Vec2> {
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    let point = Vec2::new(
        (pointer.client_x - rect.left) * sim_w / rect.width,
        (pointer.client_y - rect.top) * sim_h / rect.height,
    );
    point.is_finite().then_some(point)
}

/// Index of the entity hit at `point`. Overlaps go to the most recently
/// spawned entity (topmost when drawn in spawn order).
pub fn resolve(point: Vec2, entities: &[Entity]) -> Option<usize> {
    entities
        .iter()
        .rposition(|e| !e.struck && e.contains(point))
}

impl GameState {
    /// Handle one pointer press. At most one entity is resolved per press;
    /// presses outside every entity or outside a running session do nothing.
    pub fn handle_pointer(&mut self, event: PointerEvent, rect: DisplayRect) -> Option<Entity> {
        if !self.is_running() {
            return None;
        }
        let Some(point) = to_sim_coords(
            event,
            rect,
            self.config.field_width,
            self.config.field_height,
        ) else {
            log::debug!("Tap ignored: display rect {:?} has no area", rect);
            return None;
        };
        let index = resolve(point, &self.entities)?;
        log::trace!("Tap at ({:.1}, {:.1}) hit index {}", point.x, point.y, index);
        self.resolve_catch(index)
    }

    /// Handle a press already expressed in simulation coordinates
    pub fn handle_sim_point(&mut self, point: Vec2) -> Option<Entity> {
        if !self.is_running() {
            return None;
        }
        let index = resolve(point, &self.entities)?;
        self.resolve_catch(index)
    }
}
