//! Bounded spawn placement
//!
//! Rejection sampling with a hard attempt cap. When every sample is rejected
//! the search falls back to a deterministic placement instead of looping.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Result of a placement search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: Vec2,
    /// Samples drawn before acceptance (or the cap, on fallback)
    pub attempts: u32,
    /// True when the cap was hit and the fallback was used
    pub fallback: bool,
}

/// Pick a point in `[0, area)` at least `min_distance` away from `avoid`
///
/// With no point to avoid the first sample is taken. After `max_attempts`
/// rejected samples the corner of the area farthest from `avoid` is used.
pub fn place_away_from<R: Rng + ?Sized>(
    rng: &mut R,
    area: Vec2,
    avoid: Option<Vec2>,
    min_distance: f32,
    max_attempts: u32,
) -> Placement {
    let area = area.max(Vec2::ZERO);
    let Some(avoid) = avoid else {
        let pos = Vec2::new(rng.random::<f32>() * area.x, rng.random::<f32>() * area.y);
        return Placement {
            pos,
            attempts: 1,
            fallback: false,
        };
    };

    for attempt in 1..=max_attempts {
        let pos = Vec2::new(rng.random::<f32>() * area.x, rng.random::<f32>() * area.y);
        if pos.distance(avoid) >= min_distance {
            return Placement {
                pos,
                attempts: attempt,
                fallback: false,
            };
        }
    }

    let corners = [
        Vec2::ZERO,
        Vec2::new(area.x, 0.0),
        Vec2::new(0.0, area.y),
        area,
    ];
    let pos = corners
        .into_iter()
        .max_by(|a, b| a.distance_squared(avoid).total_cmp(&b.distance_squared(avoid)))
        .unwrap_or(Vec2::ZERO);
    log::debug!("Spawn search hit the {max_attempts}-attempt cap, falling back to {pos}");
    Placement {
        pos,
        attempts: max_attempts,
        fallback: true,
    }
}

/// Cell coordinate on a tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pick a random free cell on a `cols` × `rows` grid
///
/// Random samples first; once the cap is reached, a row-major scan returns the
/// first free cell. `None` only when the grid is full.
pub fn place_on_grid<R, F>(
    rng: &mut R,
    cols: i32,
    rows: i32,
    occupied: F,
    max_attempts: u32,
) -> Option<GridPos>
where
    R: Rng + ?Sized,
    F: Fn(GridPos) -> bool,
{
    if cols <= 0 || rows <= 0 {
        return None;
    }
    for _ in 0..max_attempts {
        let cell = GridPos::new(rng.random_range(0..cols), rng.random_range(0..rows));
        if !occupied(cell) {
            return Some(cell);
        }
    }
    (0..rows)
        .flat_map(|y| (0..cols).map(move |x| GridPos::new(x, y)))
        .find(|&cell| !occupied(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{SequenceRng, seeded};

    #[test]
    fn test_no_pointer_takes_first_sample() {
        let mut rng = seeded(7);
        let placed = place_away_from(&mut rng, Vec2::new(580.0, 380.0), None, 50.0, 100);
        assert_eq!(placed.attempts, 1);
        assert!(!placed.fallback);
    }

    #[test]
    fn test_respects_avoid_radius() {
        let mut rng = seeded(3);
        let pointer = Vec2::new(300.0, 200.0);
        for _ in 0..200 {
            let placed = place_away_from(
                &mut rng,
                Vec2::new(580.0, 380.0),
                Some(pointer),
                50.0,
                100,
            );
            assert!(placed.pos.distance(pointer) >= 50.0);
        }
    }

    #[test]
    fn test_cap_falls_back_to_far_corner() {
        // Every sample lands on the origin, right where the pointer is
        let mut rng = SequenceRng::constant(0);
        let placed = place_away_from(
            &mut rng,
            Vec2::new(580.0, 380.0),
            Some(Vec2::new(5.0, 5.0)),
            50.0,
            100,
        );
        assert!(placed.fallback);
        assert_eq!(placed.attempts, 100);
        assert_eq!(placed.pos, Vec2::new(580.0, 380.0));
        // Two floats per attempt
        assert_eq!(rng.draws(), 200);
    }

    #[test]
    fn test_grid_scan_after_cap() {
        let mut rng = SequenceRng::constant(0);
        // Only (3, 2) is free; random draws keep hitting (0, 0)
        let cell = place_on_grid(&mut rng, 4, 4, |c| c != GridPos::new(3, 2), 10);
        assert_eq!(cell, Some(GridPos::new(3, 2)));
        assert_eq!(place_on_grid(&mut rng, 4, 4, |_| true, 10), None);
    }
}
