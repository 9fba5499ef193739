//! Rendering module
//!
//! Emits draw calls for one frame against an abstract surface. The browser
//! host implements the surface on a 2D canvas context; tests record calls.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::platform::AssetProvider;
use crate::sim::{GamePhase, GameState};

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const GOLD: Color = Color::rgb(255, 215, 0);
    pub const DARK_RED: Color = Color::rgb(139, 0, 0);
    pub const SKY_BLUE: Color = Color::rgb(135, 206, 235);
    pub const HOT_PINK: Color = Color::rgb(255, 105, 180);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// CSS colour string with alpha, e.g. `rgba(255, 215, 0, 0.50)`
    pub fn to_css(&self, alpha: f32) -> String {
        format!(
            "rgba({}, {}, {}, {:.2})",
            self.r,
            self.g,
            self.b,
            alpha.clamp(0.0, 1.0)
        )
    }
}

/// Minimal immediate-mode drawing target
pub trait RenderSurface {
    /// Image type the surface can blit
    type Image;

    fn clear(&mut self, width: f32, height: f32);
    /// Draw `image` scaled into the square at `pos` (top-left)
    fn draw_image(&mut self, image: &Self::Image, pos: Vec2, size: f32);
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color, alpha: f32);
    /// Centred text
    fn fill_text(&mut self, text: &str, pos: Vec2, font_px: f32, color: Color, alpha: f32);
}

const FEEDBACK_FONT_PX: f32 = 20.0;
const OVERLAY_FONT_PX: f32 = 32.0;

/// Draw the field for the current state.
///
/// Entities are drawn in spawn order so the newest ends up on top, matching
/// how overlapping taps are resolved. A kind whose visual is missing (still
/// loading or failed) is drawn as a rectangle in its fallback colour.
pub fn draw_frame<S, A>(state: &GameState, surface: &mut S, assets: &A)
where
    S: RenderSurface,
    A: AssetProvider<Handle = S::Image>,
{
    let config = state.config();
    surface.clear(config.field_width, config.field_height);

    for entity in state.entities() {
        let spec = state.registry().spec(entity.kind);
        match assets.visual(spec.visual) {
            Some(image) => surface.draw_image(image, entity.pos, entity.size),
            None => surface.fill_rect(entity.pos, Vec2::splat(entity.size), spec.fallback, 1.0),
        }
    }

    for marker in state.feedback() {
        surface.fill_text(
            &marker.text,
            marker.pos,
            FEEDBACK_FONT_PX,
            marker.color,
            marker.alpha(),
        );
    }

    if state.phase() == GamePhase::Ended {
        let field = Vec2::new(config.field_width, config.field_height);
        surface.fill_rect(Vec2::ZERO, field, Color::BLACK, 0.6);
        let center = field / 2.0;
        surface.fill_text(
            "Game over",
            center - Vec2::new(0.0, 24.0),
            OVERLAY_FONT_PX,
            Color::WHITE,
            1.0,
        );
        surface.fill_text(
            &format!("Score: {}", state.score().score),
            center + Vec2::new(0.0, 24.0),
            FEEDBACK_FONT_PX,
            Color::WHITE,
            1.0,
        );
    }
}
