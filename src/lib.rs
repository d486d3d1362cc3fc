//! Mini Arcade - small arcade and card games on one fixed-step loop
//!
//! Core modules:
//! - `sim`: Shared simulation pieces (timers, difficulty, collision, spawning)
//! - `driver`: Loop driver owning a game session's lifecycle
//! - `input`: Input sampling (held keys, one-shot presses, pointer)
//! - `renderer`: Drawing surface abstraction
//! - `games`: The real-time and board games built on the loop
//! - `cards`: Deck model and turn resolvers for the card games
//! - `persistence`: Key-value storage for high scores and settings
//! - `platform`: Browser bindings (canvas, listeners, word fetch)

pub mod audio;
pub mod cards;
pub mod driver;
pub mod error;
pub mod games;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{Game, LoopDriver, SessionResult, Status, TickOutcome};
pub use error::ArcadeError;
pub use games::GameKind;
pub use highscores::HighScore;
pub use settings::Settings;

use glam::Vec2;

/// Loop configuration constants
pub mod consts {
    /// Reference frame all per-tick velocities are expressed against (60 Hz)
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
    /// Default tick length for real-time games
    pub const FRAME_DT: f32 = 0.016;
    /// Maximum ticks run per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Wall time accepted per `advance` call (longer gaps are dropped)
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Spawn placement retry cap
    pub const SPAWN_ATTEMPTS: u32 = 100;
    /// Minimum distance between a fresh spawn and the pointer
    pub const AVOID_RADIUS: f32 = 50.0;

    /// Difficulty growth cadence (seconds)
    pub const DIFFICULTY_INTERVAL: f32 = 5.0;
    /// Speed multiplier growth per interval
    pub const SPEED_GROWTH: f32 = 1.1;
    /// Spawn interval shrink per interval
    pub const SPAWN_GROWTH: f32 = 0.95;
}

/// Scale factor turning per-reference-frame velocities into per-tick motion
#[inline]
pub fn dt_factor(dt: f32) -> f32 {
    dt / consts::REFERENCE_DT
}

/// Integrate velocity into position for one tick
#[inline]
pub fn integrate(pos: Vec2, vel: Vec2, dt: f32) -> Vec2 {
    pos + vel * dt_factor(dt)
}
