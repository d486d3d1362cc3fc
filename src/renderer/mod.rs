//! Rendering module
//!
//! Games draw through the [`Surface`] trait using four primitives (filled
//! rectangles, filled circles, text, clear). Rendering reads world state and
//! never mutates it. [`DrawList`] records commands for tests and headless runs;
//! the browser build draws onto a 2D canvas.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

use crate::sim::Rect;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const GREEN: Color = Color(0x00ff00);
    pub const DARK_GREEN: Color = Color(0x001800);
    pub const RED: Color = Color(0xff0000);
    pub const WHITE: Color = Color(0xffffff);
    pub const BLACK: Color = Color(0x000000);
    pub const GREY: Color = Color(0x666666);
    pub const LIGHT_GREY: Color = Color(0x888888);
    pub const AMBER: Color = Color(0xffb000);

    /// CSS hex form, e.g. `#00ff00`
    pub fn to_css(self) -> String {
        format!("#{:06x}", self.0 & 0xffffff)
    }
}

/// A 2D drawing target, pixel-addressed with origin top-left
pub trait Surface {
    /// Drawable size; `None` while unmounted or zero-sized
    fn size(&self) -> Option<Vec2>;

    fn clear(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color);

    /// Whether a tick may render right now
    fn is_ready(&self) -> bool {
        self.size().is_some()
    }

    fn clear_all(&mut self) {
        if let Some(size) = self.size() {
            self.clear(Rect::new(0.0, 0.0, size.x, size.y));
        }
    }
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rect),
    Rect(Rect, Color),
    Circle { center: Vec2, radius: f32, color: Color },
    Text { text: String, pos: Vec2, size: f32, color: Color },
}

/// Surface that records draw calls
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: Option<Vec2>,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Some(Vec2::new(width, height)),
            commands: Vec::new(),
        }
    }

    /// A surface that is not mounted yet
    pub fn unmounted() -> Self {
        Self::default()
    }

    /// Mount (or unmount with `None`) the surface
    pub fn set_size(&mut self, size: Option<Vec2>) {
        self.size = size.filter(|s| s.x > 0.0 && s.y > 0.0);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands since the most recent full clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear(_)))
            .unwrap_or(0);
        &self.commands[start..]
    }

    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Texts drawn in the last frame
    pub fn texts(&self) -> Vec<&str> {
        self.last_frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DrawList {
    fn size(&self) -> Option<Vec2> {
        self.size
    }

    fn clear(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Clear(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect(rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css() {
        assert_eq!(Color::GREEN.to_css(), "#00ff00");
        assert_eq!(Color(0x123).to_css(), "#000123");
    }

    #[test]
    fn test_unmounted_is_not_ready() {
        let mut list = DrawList::unmounted();
        assert!(!list.is_ready());
        list.set_size(Some(Vec2::new(0.0, 100.0)));
        assert!(!list.is_ready());
        list.set_size(Some(Vec2::new(480.0, 360.0)));
        assert!(list.is_ready());
    }

    #[test]
    fn test_last_frame_starts_at_clear() {
        let mut list = DrawList::new(10.0, 10.0);
        list.clear_all();
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::RED);
        list.clear_all();
        list.text("hi", Vec2::ZERO, 12.0, Color::GREEN);
        assert_eq!(list.last_frame().len(), 2);
        assert_eq!(list.texts(), vec!["hi"]);
    }
}
