//! Collision detection and response for flat 2D geometry
//!
//! Screen space throughout: origin top-left, +y down. Circles are addressed by
//! center, rectangles and boxes by their top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle at `pos` with `size`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Grow the rectangle by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.w + margin * 2.0,
            self.h + margin * 2.0,
        )
    }

    /// Strict containment (points on the edge are outside)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }
}

/// Circle-circle overlap: distance between centers below the summed radii
///
/// Pass a larger radius for forgiving ("buffered") hit detection.
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Point inside a circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    circles_overlap(point, 0.0, center, radius)
}

/// Circle vs rectangle: the center lies within the rectangle grown by the radius
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    rect.expanded(radius).contains(center)
}

/// Axis-aligned box overlap
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Walls touched while keeping a body inside its area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHits {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl WallHits {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Keep a box of `size` (top-left at `pos`) inside `[0, bounds - size]`
///
/// A box that crosses a wall is clamped back onto it and the velocity
/// component along that wall's normal is turned inward, scaled by
/// `restitution` (1.0 for a lossless bounce).
pub fn reflect_in_bounds(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    bounds: Vec2,
    restitution: f32,
) -> WallHits {
    let max = (bounds - size).max(Vec2::ZERO);
    let mut hits = WallHits::default();

    if pos.x < 0.0 {
        pos.x = 0.0;
        vel.x = vel.x.abs() * restitution;
        hits.left = true;
    } else if pos.x > max.x {
        pos.x = max.x;
        vel.x = -vel.x.abs() * restitution;
        hits.right = true;
    }

    if pos.y < 0.0 {
        pos.y = 0.0;
        vel.y = vel.y.abs() * restitution;
        hits.top = true;
    } else if pos.y > max.y {
        pos.y = max.y;
        vel.y = -vel.y.abs() * restitution;
        hits.bottom = true;
    }

    hits
}

/// Circle flavor of [`reflect_in_bounds`]; `center` stays within `[r, bounds - r]`
pub fn reflect_circle_in_bounds(
    center: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    bounds: Vec2,
    restitution: f32,
) -> WallHits {
    let mut corner = *center - Vec2::splat(radius);
    let hits = reflect_in_bounds(&mut corner, vel, Vec2::splat(radius * 2.0), bounds, restitution);
    *center = corner + Vec2::splat(radius);
    hits
}

/// True when body 1 is closing in on body 2 along the line between them
pub fn approaching(p1: Vec2, v1: Vec2, p2: Vec2, v2: Vec2) -> bool {
    let normal = (p2 - p1).normalize_or_zero();
    (v1 - v2).dot(normal) > 0.0
}

/// Equal-mass elastic collision
///
/// Velocities are split into components along the impact normal and the
/// tangent. The normal components are exchanged (a 1D elastic collision along
/// the normal); the tangential components are kept.
pub fn elastic_collision(p1: Vec2, v1: Vec2, p2: Vec2, v2: Vec2) -> (Vec2, Vec2) {
    let normal = (p2 - p1).normalize_or_zero();
    if normal == Vec2::ZERO {
        return (v1, v2);
    }
    let v1n = v1.dot(normal);
    let v2n = v2.dot(normal);
    (v1 + (v2n - v1n) * normal, v2 + (v1n - v2n) * normal)
}

/// Push two overlapping circles apart along their center line (half each)
pub fn separate_circles(p1: &mut Vec2, r1: f32, p2: &mut Vec2, r2: f32) {
    let delta = *p2 - *p1;
    let dist = delta.length();
    let overlap = r1 + r2 - dist;
    if overlap <= 0.0 {
        return;
    }
    // Coincident centers: split along x
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };
    *p1 -= normal * (overlap / 2.0);
    *p2 += normal * (overlap / 2.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(19.0, 0.0), 10.0));
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
        // Buffered hit radius catches a near miss
        assert!(circles_overlap(Vec2::ZERO, 18.0, Vec2::new(17.0, 0.0), 0.0));
    }

    #[test]
    fn test_circle_rect_overlap_uses_expanded_bounds() {
        let brick = Rect::new(30.0, 30.0, 75.0, 20.0);
        // Center above the brick but within one radius of its top edge
        assert!(circle_rect_overlap(Vec2::new(60.0, 25.0), 10.0, &brick));
        assert!(!circle_rect_overlap(Vec2::new(60.0, 15.0), 10.0, &brick));
        assert!(circle_rect_overlap(brick.center(), 1.0, &brick));
    }

    #[test]
    fn test_aabb_overlap() {
        let dino = Rect::new(50.0, 150.0, 40.0, 60.0);
        assert!(aabb_overlap(&dino, &Rect::new(80.0, 150.0, 30.0, 30.0)));
        assert!(!aabb_overlap(&dino, &Rect::new(90.0, 150.0, 30.0, 30.0)));
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_reflect_in_bounds_loses_energy() {
        let mut pos = Vec2::new(595.0, 100.0);
        let mut vel = Vec2::new(5.0, 1.0);
        let hits = reflect_in_bounds(
            &mut pos,
            &mut vel,
            Vec2::splat(20.0),
            Vec2::new(600.0, 400.0),
            0.8,
        );
        assert!(hits.right && !hits.left);
        assert_eq!(pos.x, 580.0);
        assert!((vel.x + 4.0).abs() < 1e-5);
        assert_eq!(vel.y, 1.0);
    }

    #[test]
    fn test_elastic_collision_head_on_swaps() {
        let (v1, v2) = elastic_collision(
            Vec2::new(0.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::ZERO,
        );
        assert!((v1 - Vec2::ZERO).length() < 1e-5);
        assert!((v2 - Vec2::new(5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_elastic_collision_keeps_tangent() {
        // Glancing hit: normal is +x, the y component must survive on ball 1
        let (v1, v2) = elastic_collision(
            Vec2::ZERO,
            Vec2::new(3.0, 4.0),
            Vec2::new(20.0, 0.0),
            Vec2::ZERO,
        );
        assert!((v1 - Vec2::new(0.0, 4.0)).length() < 1e-5);
        assert!((v2 - Vec2::new(3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_separate_circles() {
        let mut a = Vec2::new(0.0, 0.0);
        let mut b = Vec2::new(10.0, 0.0);
        separate_circles(&mut a, 10.0, &mut b, 10.0);
        assert!((a.distance(b) - 20.0).abs() < 1e-4);
        assert!(approaching(a, Vec2::X, b, Vec2::ZERO));
        assert!(!approaching(a, -Vec2::X, b, Vec2::ZERO));
    }

    proptest! {
        #[test]
        fn prop_circle_overlap_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ar in 0.0f32..50.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, br in 0.0f32..50.0,
        ) {
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            prop_assert_eq!(circles_overlap(a, ar, b, br), circles_overlap(b, br, a, ar));
        }

        #[test]
        fn prop_reflection_stays_in_area(
            x in -2000.0f32..2000.0, y in -2000.0f32..2000.0,
            vx in -50.0f32..50.0, vy in -50.0f32..50.0,
            size in 1.0f32..40.0, restitution in 0.0f32..1.0,
        ) {
            let bounds = Vec2::new(600.0, 400.0);
            let mut pos = Vec2::new(x, y);
            let mut vel = Vec2::new(vx, vy);
            reflect_in_bounds(&mut pos, &mut vel, Vec2::splat(size), bounds, restitution);
            prop_assert!(pos.x >= 0.0 && pos.x <= bounds.x - size);
            prop_assert!(pos.y >= 0.0 && pos.y <= bounds.y - size);
        }

        #[test]
        fn prop_elastic_collision_conserves_momentum(
            v1x in -10.0f32..10.0, v1y in -10.0f32..10.0,
            v2x in -10.0f32..10.0, v2y in -10.0f32..10.0,
            dx in 1.0f32..20.0, dy in -20.0f32..20.0,
        ) {
            let p1 = Vec2::ZERO;
            let p2 = Vec2::new(dx, dy);
            let v1 = Vec2::new(v1x, v1y);
            let v2 = Vec2::new(v2x, v2y);
            let (a, b) = elastic_collision(p1, v1, p2, v2);
            prop_assert!(((a + b) - (v1 + v2)).length() < 1e-3);
            let before = v1.length_squared() + v2.length_squared();
            let after = a.length_squared() + b.length_squared();
            prop_assert!((before - after).abs() < 1e-2);
        }
    }
}
