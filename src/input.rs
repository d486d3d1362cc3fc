//! Input sampling
//!
//! Platform event handlers write into an [`InputState`]; the simulation reads
//! it once per tick. Two kinds of signal live side by side:
//! - Level-triggered: held keys and the pointer position persist until changed
//! - Edge-triggered: key presses, clicks and text edits are cleared by
//!   [`InputState::end_tick`] once the tick has consumed them

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Keys the games understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    R,
    H,
    Space,
    Enter,
    Escape,
    Backspace,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Key> {
        Some(match key {
            "ArrowUp" | "Up" => Key::Up,
            "ArrowDown" | "Down" => Key::Down,
            "ArrowLeft" | "Left" => Key::Left,
            "ArrowRight" | "Right" => Key::Right,
            "w" | "W" => Key::W,
            "a" | "A" => Key::A,
            "s" | "S" => Key::S,
            "d" | "D" => Key::D,
            "r" | "R" => Key::R,
            "h" | "H" => Key::H,
            " " | "Spacebar" => Key::Space,
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            "Backspace" => Key::Backspace,
            _ => return None,
        })
    }
}

/// One edit to the text being typed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
}

/// Control signals for the current tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    pressed: Vec<Key>,
    pointer: Option<Vec2>,
    clicks: Vec<Vec2>,
    text: Vec<TextEdit>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    // === Reads (simulation side) ===

    /// Key currently held down (level-triggered)
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Key went down since the last tick (edge-triggered)
    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Presses since the last tick, oldest first
    pub fn pressed(&self) -> &[Key] {
        &self.pressed
    }

    /// Last known pointer position; `None` until the pointer first moves
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Click positions since the last tick, oldest first
    pub fn clicks(&self) -> &[Vec2] {
        &self.clicks
    }

    pub fn clicked(&self) -> bool {
        !self.clicks.is_empty()
    }

    /// Text edits since the last tick, oldest first
    pub fn text(&self) -> &[TextEdit] {
        &self.text
    }

    // === Writes (sampler side) ===

    /// Key down; auto-repeat of a held key does not produce a second press
    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.pressed.push(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Feed a DOM `keydown`: mapped keys plus typed characters
    pub fn dom_key_down(&mut self, key: &str) {
        if key == "Backspace" {
            self.text.push(TextEdit::Backspace);
        } else {
            let mut chars = key.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if !c.is_control() {
                    self.text.push(TextEdit::Insert(c));
                }
            }
        }
        if let Some(mapped) = Key::from_dom(key) {
            self.key_down(mapped);
        }
    }

    /// Feed a DOM `keyup`
    pub fn dom_key_up(&mut self, key: &str) {
        if let Some(mapped) = Key::from_dom(key) {
            self.key_up(mapped);
        }
    }

    /// Focus lost: keyups will never arrive for keys still down
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    pub fn click(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        self.clicks.push(pos);
    }

    pub fn type_char(&mut self, c: char) {
        self.text.push(TextEdit::Insert(c));
    }

    pub fn backspace(&mut self) {
        self.text.push(TextEdit::Backspace);
    }

    /// Drop the edge-triggered signals the tick just consumed
    pub fn end_tick(&mut self) {
        self.pressed.clear();
        self.clicks.clear();
        self.text.clear();
    }

    /// Forget everything (session start)
    pub fn clear(&mut self) {
        self.held.clear();
        self.pointer = None;
        self.end_tick();
    }
}

/// Scoped listener registration
///
/// Holds the code that unregisters a session's event listeners and runs it
/// exactly once: on [`release`](Self::release) or when dropped, including on
/// early returns and unwinding.
pub struct ListenerGuard {
    release: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn release(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("armed", &self.release.is_some())
            .finish()
    }
}
