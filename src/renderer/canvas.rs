//! 2D canvas implementation of the render surface

use glam::Vec2;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::{Color, RenderSurface};

/// Draws into a `CanvasRenderingContext2d` whose coordinate space is the
/// simulation field
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl RenderSurface for CanvasSurface {
    type Image = HtmlImageElement;

    fn clear(&mut self, width: f32, height: f32) {
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn draw_image(&mut self, image: &HtmlImageElement, pos: Vec2, size: f32) {
        if let Err(e) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            pos.x as f64,
            pos.y as f64,
            size as f64,
            size as f64,
        ) {
            log::warn!("drawImage failed: {:?}", e);
        }
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color, alpha: f32) {
        self.ctx.set_fill_style_str(&color.to_css(alpha));
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, font_px: f32, color: Color, alpha: f32) {
        self.ctx.set_font(&format!("bold {}px sans-serif", font_px));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.set_fill_style_str(&color.to_css(alpha));
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}
