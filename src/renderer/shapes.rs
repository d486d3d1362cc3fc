//! Composite shapes built from surface primitives

use glam::Vec2;

use super::{Color, Surface};
use crate::sim::Rect;

/// Dashed vertical line (Pong's center net)
pub fn dashed_vline(surface: &mut dyn Surface, x: f32, height: f32, dash: f32, color: Color) {
    if dash <= 0.0 {
        return;
    }
    let mut y = 0.0;
    while y < height {
        surface.fill_rect(Rect::new(x - 1.0, y, 2.0, dash.min(height - y)), color);
        y += dash * 2.0;
    }
}

/// Dotted ray from `origin` along `angle` (radians), used as an aim guide
pub fn dotted_ray(
    surface: &mut dyn Surface,
    origin: Vec2,
    angle: f32,
    length: f32,
    dots: u32,
    color: Color,
) {
    let dir = Vec2::new(angle.cos(), angle.sin());
    for i in 1..=dots {
        let t = i as f32 / dots as f32;
        surface.fill_circle(origin + dir * length * t, 1.5, color);
    }
}

/// Text roughly centered horizontally on `center_x`
pub fn centered_text(
    surface: &mut dyn Surface,
    text: &str,
    center_x: f32,
    y: f32,
    size: f32,
    color: Color,
) {
    // Monospace estimate: glyphs are ~0.6 em wide
    let width = text.chars().count() as f32 * size * 0.6;
    surface.text(text, Vec2::new(center_x - width / 2.0, y), size, color);
}
