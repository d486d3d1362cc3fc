//! Simulation-time timers
//!
//! Games never touch the wall clock. Periodic work (spawning, score ticks,
//! difficulty growth) is registered here and fired by advancing the set with
//! the tick length. Cancelling drops the timer outright, so nothing can fire
//! after a session is stopped.

use serde::{Deserialize, Serialize};

/// Handle to a registered timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: TimerId,
    interval: f32,
    elapsed: f32,
    repeating: bool,
}

/// Timers owned by one game session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    timers: Vec<Timer>,
    next_id: u32,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, interval: f32, repeating: bool) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.timers.push(Timer {
            id,
            interval,
            elapsed: 0.0,
            repeating,
        });
        id
    }

    /// Fire every `interval` seconds until cancelled
    pub fn every(&mut self, interval: f32) -> TimerId {
        self.register(interval, true)
    }

    /// Fire once after `delay` seconds
    pub fn after(&mut self, delay: f32) -> TimerId {
        self.register(delay, false)
    }

    /// Change a timer's period; progress toward the next firing is kept
    pub fn set_interval(&mut self, id: TimerId, interval: f32) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.id == id) {
            timer.interval = interval;
        }
    }

    /// Returns true if the timer was still registered
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            log::debug!("Cancelling {} pending timers", self.timers.len());
        }
        self.timers.clear();
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance every timer by `dt` seconds
    ///
    /// Returns the ids that fired, in registration order. A repeating timer
    /// whose period fits several times into `dt` is reported once per period.
    pub fn advance(&mut self, dt: f32) -> Vec<TimerId> {
        let mut fired = Vec::new();
        for timer in &mut self.timers {
            timer.elapsed += dt;
            if timer.interval <= 0.0 {
                fired.push(timer.id);
                timer.elapsed = 0.0;
                continue;
            }
            while timer.elapsed >= timer.interval {
                fired.push(timer.id);
                timer.elapsed -= timer.interval;
                if !timer.repeating {
                    break;
                }
            }
        }
        // One-shots are done once they have fired
        self.timers.retain(|t| t.repeating || !fired.contains(&t.id));
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_fires_per_period() {
        let mut timers = Timers::new();
        let score = timers.every(0.1);
        let mut count = 0;
        for _ in 0..100 {
            count += timers.advance(0.016).iter().filter(|&&id| id == score).count();
        }
        // 1.6 s of ticks at 0.1 s per point
        assert!((15..=16).contains(&count), "fired {count} times");
    }

    #[test]
    fn test_after_fires_once() {
        let mut timers = Timers::new();
        let wake = timers.after(1.0);
        assert!(timers.advance(0.5).is_empty());
        assert_eq!(timers.advance(0.6), vec![wake]);
        assert!(!timers.is_active(wake));
        assert!(timers.advance(5.0).is_empty());
    }

    #[test]
    fn test_cancel_all_silences_everything() {
        let mut timers = Timers::new();
        timers.every(0.016);
        timers.after(0.5);
        timers.cancel_all();
        assert!(timers.is_empty());
        assert!(timers.advance(10.0).is_empty());
    }

    #[test]
    fn test_set_interval_changes_rate() {
        let mut timers = Timers::new();
        let spawn = timers.every(3.0);
        timers.set_interval(spawn, 1.0);
        assert_eq!(timers.advance(2.5).len(), 2);
        assert!(timers.cancel(spawn));
        assert!(!timers.cancel(spawn));
    }
}
