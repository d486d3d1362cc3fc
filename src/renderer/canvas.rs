//! 2D canvas surface for the browser build

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{Color, Surface};
use crate::error::ArcadeError;
use crate::sim::Rect;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, ArcadeError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| ArcadeError::Surface(format!("{e:?}")))?
            .ok_or_else(|| ArcadeError::Surface("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ArcadeError::Surface("context is not 2d".into()))?;
        Ok(Self { canvas, ctx })
    }

    /// Resize the backing store in CSS pixels
    pub fn resize(&mut self, width: f32, height: f32) {
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Option<Vec2> {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        (self.canvas.is_connected() && w > 0 && h > 0).then(|| Vec2::new(w as f32, h as f32))
    }

    fn clear(&mut self, rect: Rect) {
        self.ctx.set_fill_style_str(&Color::BLACK.to_css());
        self.ctx
            .fill_rect(rect.x.into(), rect.y.into(), rect.w.into(), rect.h.into());
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(rect.x.into(), rect.y.into(), rect.w.into(), rect.h.into());
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x.into(), center.y.into(), radius.max(0.0).into(), 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("{size}px monospace"));
        if let Err(e) = self.ctx.fill_text(text, pos.x.into(), pos.y.into()) {
            log::debug!("fill_text failed: {e:?}");
        }
    }
}
