//! Shared simulation module
//!
//! Game-agnostic pieces every tick is built from. Like the games themselves,
//! this module must stay deterministic:
//! - Simulation time only (no wall clock)
//! - Injected RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod rng;
pub mod spawn;
pub mod timer;

pub use collision::{
    Rect, WallHits, aabb_overlap, approaching, circle_rect_overlap, circles_overlap,
    elastic_collision, point_in_circle, reflect_circle_in_bounds, reflect_in_bounds,
    reflect_velocity, separate_circles,
};
pub use difficulty::Difficulty;
pub use rng::{GameRng, SequenceRng, seeded};
pub use spawn::{GridPos, Placement, place_away_from, place_on_grid};
pub use timer::{TimerId, Timers};
