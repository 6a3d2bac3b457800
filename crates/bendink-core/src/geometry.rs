//! 2D vector math shared by the shape engines.
//!
//! All functions are pure and operate on kurbo primitives. Angles are in
//! radians, measured with `atan2` in screen space (y grows downward).

use crate::outline::StrokePoint;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Squared lengths below this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Distance between two points.
pub fn dist(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Midpoint of two points.
pub fn med(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Unit vector in the direction of `v`, or zero for a zero-length vector.
pub fn uni(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len * len < DEGENERATE_EPSILON {
        Vec2::ZERO
    } else {
        v / len
    }
}

/// Perpendicular of `v`, rotated a quarter turn: `(y, -x)`.
pub fn per(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Rotate `p` about `center` by `r` radians.
pub fn rot_with(p: Point, center: Point, r: f64) -> Point {
    if r == 0.0 {
        return p;
    }
    let (s, c) = r.sin_cos();
    let px = p.x - center.x;
    let py = p.y - center.y;
    Point::new(px * c - py * s + center.x, px * s + py * c + center.y)
}

/// Move `a` toward `b` by distance `d`.
pub fn nudge(a: Point, b: Point, d: f64) -> Point {
    a + uni(b - a) * d
}

/// Move `a` by distance `d` in the direction of `angle`.
pub fn nudge_at_angle(a: Point, angle: f64, d: f64) -> Point {
    Point::new(a.x + angle.cos() * d, a.y + angle.sin() * d)
}

/// Angle of the vector from `a` to `b`.
pub fn angle(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Linear interpolation between two points.
pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

/// Round both coordinates to the nearest integer.
pub fn round_point(p: Point) -> Point {
    Point::new(p.x.round(), p.y.round())
}

/// Clamp `n` into `[min, max]`.
pub fn clamp(n: f64, min: f64, max: f64) -> f64 {
    n.max(min).min(max)
}

/// Nearest point to `p` on the line through `a` and `b`.
///
/// With `clamp` set the result is restricted to the segment `a..b`.
pub fn nearest_point_on_segment(a: Point, b: Point, p: Point, clamp: bool) -> Point {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < DEGENERATE_EPSILON {
        return a;
    }
    let mut t = (p - a).dot(ab) / len_sq;
    if clamp {
        t = t.clamp(0.0, 1.0);
    }
    a + ab * t
}

/// Shortest signed angular distance from `a0` to `a1`.
pub fn short_angle_dist(a0: f64, a1: f64) -> f64 {
    let da = (a1 - a0) % TAU;
    ((2.0 * da) % TAU) - da
}

/// Interpolate between two angles along the shortest direction.
pub fn lerp_angles(a0: f64, a1: f64, t: f64) -> f64 {
    a0 + short_angle_dist(a0, a1) * t
}

/// Normalize an angle into `[0, 2π)`.
pub fn clamp_radians(r: f64) -> f64 {
    (TAU + (r % TAU)) % TAU
}

/// Snap an angle to the nearest of `segments` equal divisions of a full turn.
pub fn clamp_to_rotation_segments(r: f64, segments: u32) -> f64 {
    if segments == 0 {
        return r;
    }
    let seg = TAU / f64::from(segments);
    ((clamp_radians(r) + seg / 2.0) / seg).floor() * seg
}

/// Whether angle `c` lies on the sweep from `a` to `b`.
pub fn is_angle_between(a: f64, b: f64, c: f64) -> bool {
    if c == a || c == b {
        return true;
    }
    let ab = (b - a + TAU) % TAU;
    let ac = (c - a + TAU) % TAU;
    (ab <= PI) != (ac > ab)
}

/// Evenly spaced samples from `a` to `b` with a simulated pressure that
/// dips toward the middle of the segment.
pub fn points_between(a: Point, b: Point, steps: usize) -> Vec<StrokePoint> {
    if steps < 2 {
        return vec![StrokePoint::new(a, 1.0)];
    }
    (0..steps)
        .map(|i| {
            let t = i as f64 / (steps - 1) as f64;
            let pressure = (0.5 + (0.5 - t).abs()).min(1.0);
            StrokePoint::new(lerp(a, b, t), pressure)
        })
        .collect()
}

/// Axis-aligned bounds of a point set.
///
/// A non-zero `rotation` rotates the points about the center of their
/// unrotated bounds before measuring. Fewer than two points yield empty
/// bounds at the origin.
pub fn bounds_from_points(points: &[Point], rotation: f64) -> Rect {
    if points.len() < 2 {
        return Rect::ZERO;
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    if rotation != 0.0 {
        let center = Point::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
        let rotated: Vec<Point> = points
            .iter()
            .map(|p| rot_with(*p, center, rotation))
            .collect();
        return bounds_from_points(&rotated, 0.0);
    }

    Rect::new(min_x, min_y, max_x, max_y)
}

/// Offset bounds by a vector.
pub fn translate_bounds(bounds: Rect, delta: Vec2) -> Rect {
    bounds + delta
}

/// Grow bounds by `margin` on every side.
pub fn expand_bounds(bounds: Rect, margin: f64) -> Rect {
    bounds.inflate(margin, margin)
}

/// Union of a set of bounds, or `None` when empty.
pub fn common_bounds<I>(bounds: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    bounds.into_iter().reduce(|acc, b| acc.union(b))
}

/// Bounds of the same size re-centered on `center`.
pub fn center_bounds(bounds: Rect, center: Point) -> Rect {
    Rect::from_center_size(center, bounds.size())
}

/// Inclusive point-in-bounds test.
pub fn point_in_bounds(p: Point, bounds: Rect) -> bool {
    p.x >= bounds.x0 && p.x <= bounds.x1 && p.y >= bounds.y0 && p.y <= bounds.y1
}

/// Whether `outer` fully contains `inner`.
pub fn bounds_contain(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

/// A circle by center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

/// The unique circle through three points, or `None` when they are collinear.
pub fn circle_from_three_points(a: Point, b: Point, c: Point) -> Option<Circle> {
    let det = a.x * (b.y - c.y) - a.y * (b.x - c.x) + b.x * c.y - c.x * b.y;
    if det.abs() < 1e-9 {
        return None;
    }

    let a_sq = a.x * a.x + a.y * a.y;
    let b_sq = b.x * b.x + b.y * b.y;
    let c_sq = c.x * c.x + c.y * c.y;

    let bx = a_sq * (c.y - b.y) + b_sq * (a.y - c.y) + c_sq * (b.y - a.y);
    let by = a_sq * (b.x - c.x) + b_sq * (c.x - a.x) + c_sq * (a.x - b.x);

    let center = Point::new(-bx / (2.0 * det), -by / (2.0 * det));
    let radius = dist(center, a);
    if !radius.is_finite() {
        return None;
    }
    Some(Circle { center, radius })
}

/// Signed shortest sweep angle from `a` to `b` around `center`.
pub fn sweep(center: Point, a: Point, b: Point) -> f64 {
    short_angle_dist(angle(center, a), angle(center, b))
}

/// Signed length of the shortest arc from `a` to `b` on a circle.
pub fn arc_length(center: Point, radius: f64, a: Point, b: Point) -> f64 {
    radius * sweep(center, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_per_is_quarter_turn() {
        let v = per(Vec2::new(1.0, 0.0));
        assert!((v.x - 0.0).abs() < EPS);
        assert!((v.y + 1.0).abs() < EPS);
    }

    #[test]
    fn test_uni_of_zero_is_zero() {
        assert_eq!(uni(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_rot_with_quarter_turn() {
        let p = rot_with(Point::new(10.0, 0.0), Point::ZERO, PI / 2.0);
        assert!(p.x.abs() < EPS);
        assert!((p.y - 10.0).abs() < EPS);
    }

    #[test]
    fn test_nearest_point_clamps_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let p = nearest_point_on_segment(a, b, Point::new(20.0, 5.0), true);
        assert_eq!(p, b);
        let p = nearest_point_on_segment(a, b, Point::new(20.0, 5.0), false);
        assert!((p.x - 20.0).abs() < EPS);
    }

    #[test]
    fn test_short_angle_dist_wraps() {
        let d = short_angle_dist(PI - 0.1, -PI + 0.1);
        assert!((d - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_to_rotation_segments() {
        let snapped = clamp_to_rotation_segments(0.3, 24);
        assert!((snapped - PI / 12.0).abs() < EPS);
        let snapped = clamp_to_rotation_segments(-0.05, 24);
        assert!(snapped.abs() < EPS || (snapped - TAU).abs() < EPS);
    }

    #[test]
    fn test_is_angle_between() {
        assert!(is_angle_between(0.0, PI, 1.0));
        assert!(!is_angle_between(0.0, PI, -1.0));
    }

    #[test]
    fn test_circle_from_three_points() {
        let c = circle_from_three_points(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(50.0, -25.0),
        )
        .unwrap();
        assert!((c.center.x - 50.0).abs() < EPS);
        assert!((c.center.y - 37.5).abs() < EPS);
        assert!((c.radius - 62.5).abs() < EPS);
    }

    #[test]
    fn test_circle_from_collinear_points() {
        let c = circle_from_three_points(
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!(c.is_none());
    }

    #[test]
    fn test_bounds_from_points() {
        let b = bounds_from_points(
            &[Point::new(10.0, 5.0), Point::new(-2.0, 8.0), Point::new(4.0, -1.0)],
            0.0,
        );
        assert_eq!(b, Rect::new(-2.0, -1.0, 10.0, 8.0));
    }

    #[test]
    fn test_rotated_bounds_of_square() {
        let b = bounds_from_points(&[Point::new(0.0, 0.0), Point::new(10.0, 10.0)], PI / 2.0);
        assert!((b.width() - 10.0).abs() < 1e-9);
        assert!((b.height() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_between_pressure() {
        let pts = points_between(Point::ZERO, Point::new(10.0, 0.0), 6);
        assert_eq!(pts.len(), 6);
        assert!((pts[0].pressure - 1.0).abs() < EPS);
        assert!(pts[2].pressure < 1.0);
        assert_eq!(pts[5].point, Point::new(10.0, 0.0));
    }
}
