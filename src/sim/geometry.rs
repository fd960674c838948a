//! Collision predicates and bounce math
//!
//! Everything here is pure: no state, no randomness. Ball tests use the
//! ball's bounding square rather than an exact circle-rect distance; level
//! speeds are tuned against that approximation, so corner hits slightly
//! over-detect on purpose.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Rectangle of the given size centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Point-in-rectangle (edges inclusive)
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Open-interval overlap of two rectangles
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Edge-to-edge gap on each axis (negative when overlapping on that axis)
    pub fn gap_to(&self, other: &Rect) -> Vec2 {
        let d = (self.center() - other.center()).abs();
        d - (self.size + other.size) / 2.0
    }

    /// True if the gap on both axes is at most `max_gap`
    pub fn touches(&self, other: &Rect, max_gap: f32) -> bool {
        let gap = self.gap_to(other);
        gap.x <= max_gap && gap.y <= max_gap
    }
}

/// Ball bounding square vs rectangle
pub fn ball_hits_rect(ball_pos: Vec2, ball_radius: f32, rect: &Rect) -> bool {
    ball_pos.x + ball_radius > rect.left()
        && ball_pos.x - ball_radius < rect.right()
        && ball_pos.y + ball_radius > rect.top()
        && ball_pos.y - ball_radius < rect.bottom()
}

/// Laser tip vs rectangle
#[inline]
pub fn laser_hits_rect(point: Vec2, rect: &Rect) -> bool {
    rect.contains(point)
}

/// Paddle bounce angle (radians from vertical, positive = rightward).
///
/// The hit offset across the paddle maps linearly onto ±0.35π (±63°).
pub fn bounce_angle(ball_x: f32, paddle: &Rect) -> f32 {
    let t = if paddle.size.x > 0.0 {
        ((ball_x - paddle.left()) / paddle.size.x).clamp(0.0, 1.0)
    } else {
        0.5
    };
    (t - 0.5) * 0.7 * std::f32::consts::PI
}

/// Velocity of the given speed heading `angle` from straight up
#[inline]
pub fn velocity_from_angle(angle: f32, speed: f32) -> Vec2 {
    Vec2::new(angle.sin() * speed, -angle.cos() * speed)
}

/// Rescale a velocity to `speed`; zero velocity stays zero
pub fn with_speed(vel: Vec2, speed: f32) -> Vec2 {
    let len = vel.length();
    if len <= f32::EPSILON {
        return vel;
    }
    vel * (speed / len)
}

/// Raise |vy| to at least `ratio` of the speed, keeping the speed.
///
/// The horizontal sign is kept; a vy of exactly zero is pushed upward.
pub fn enforce_min_vertical(vel: Vec2, ratio: f32) -> Vec2 {
    let speed = vel.length();
    if speed <= f32::EPSILON {
        return vel;
    }
    let min_vy = speed * ratio;
    if vel.y.abs() >= min_vy {
        return vel;
    }
    let vy = if vel.y > 0.0 { min_vy } else { -min_vy };
    let vx = (speed * speed - min_vy * min_vy).max(0.0).sqrt();
    Vec2::new(if vel.x < 0.0 { -vx } else { vx }, vy)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_ball_hits_rect_uses_bounding_square() {
        let rect = Rect::new(100.0, 100.0, 40.0, 15.0);
        // Corner: the circle misses (distance ~8.5 > 6) but the square overlaps
        let corner = Vec2::new(100.0 - 6.0, 100.0 - 6.0);
        assert!(ball_hits_rect(corner, 7.0, &rect));

        assert!(!ball_hits_rect(Vec2::new(80.0, 107.0), 7.0, &rect));
        assert!(ball_hits_rect(Vec2::new(120.0, 107.0), 7.0, &rect));
    }

    #[test]
    fn test_laser_hits_rect() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(laser_hits_rect(Vec2::new(5.0, 5.0), &rect));
        assert!(laser_hits_rect(Vec2::new(10.0, 10.0), &rect));
        assert!(!laser_hits_rect(Vec2::new(10.5, 5.0), &rect));
    }

    #[test]
    fn test_bounce_angle_range() {
        let paddle = Rect::new(100.0, 600.0, 80.0, 12.0);
        assert!(bounce_angle(140.0, &paddle).abs() < 1e-6);
        assert!((bounce_angle(100.0, &paddle) + 0.35 * PI).abs() < 1e-5);
        assert!((bounce_angle(180.0, &paddle) - 0.35 * PI).abs() < 1e-5);
        // Off the edge clamps
        assert!((bounce_angle(500.0, &paddle) - 0.35 * PI).abs() < 1e-5);
    }

    #[test]
    fn test_enforce_min_vertical_keeps_speed() {
        let vel = Vec2::new(300.0, 10.0);
        let fixed = enforce_min_vertical(vel, 0.25);
        assert!((fixed.length() - vel.length()).abs() < 1e-3);
        assert!(fixed.y >= 0.25 * vel.length() - 1e-3);
        assert!(fixed.x > 0.0);

        // Pure horizontal goes upward
        let fixed = enforce_min_vertical(Vec2::new(-200.0, 0.0), 0.25);
        assert!(fixed.y < 0.0);
        assert!(fixed.x < 0.0);

        // Zero is a no-op, not NaN
        assert_eq!(enforce_min_vertical(Vec2::ZERO, 0.25), Vec2::ZERO);
    }

    #[test]
    fn test_with_speed_zero_guard() {
        assert_eq!(with_speed(Vec2::ZERO, 300.0), Vec2::ZERO);
        let v = with_speed(Vec2::new(3.0, 4.0), 10.0);
        assert!((v - Vec2::new(6.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn test_touches_gap() {
        let a = Rect::new(0.0, 0.0, 40.0, 15.0);
        let b = Rect::new(45.0, 0.0, 40.0, 15.0);
        let c = Rect::new(46.0, 0.0, 40.0, 15.0);
        let diag = Rect::new(45.0, 20.0, 40.0, 15.0);
        assert!(a.touches(&b, 5.0));
        assert!(!a.touches(&c, 5.0));
        assert!(a.touches(&diag, 5.0));
    }

    #[test]
    fn test_reflect_velocity() {
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);
        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x + 100.0).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }
}
