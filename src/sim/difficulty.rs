//! Compounding difficulty curves
//!
//! A curve starts at `initial` and is multiplied by `growth` each time it is
//! stepped. The value is always recomputed from the step count so that after
//! N steps it is exactly `initial * growth^N` (no accumulated drift).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    initial: f32,
    growth: f32,
    /// Ceiling for growing curves, floor for shrinking ones
    limit: Option<f32>,
    steps: u32,
}

impl Difficulty {
    pub fn new(initial: f32, growth: f32) -> Self {
        Self {
            initial,
            growth,
            limit: None,
            steps: 0,
        }
    }

    /// Bound the curve: a ceiling when `growth > 1`, a floor when `growth < 1`
    pub fn with_limit(mut self, limit: f32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply one growth interval
    pub fn step(&mut self) {
        self.steps = self.steps.saturating_add(1);
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Unbounded value after the current number of steps
    pub fn raw(&self) -> f32 {
        self.initial * self.growth.powi(self.steps as i32)
    }

    /// Current value, respecting the limit
    pub fn value(&self) -> f32 {
        let raw = self.raw();
        match self.limit {
            Some(limit) if self.growth >= 1.0 => raw.min(limit),
            Some(limit) => raw.max(limit),
            None => raw,
        }
    }

    pub fn reset(&mut self) {
        self.steps = 0;
    }
}
