//! Intersection tests between segments, arcs, polylines and bounds.

use crate::geometry::{Circle, angle, is_angle_between, point_in_bounds};
use kurbo::{Point, Rect};

/// The four edges of a rectangle, clockwise from the top-left corner.
pub fn bounds_edges(rect: Rect) -> [(Point, Point); 4] {
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ]
}

/// Whether segments `a..b` and `c..d` touch, including collinear overlap.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// Whether a segment has an endpoint inside `rect` or crosses one of its edges.
pub fn segment_intersects_bounds(a: Point, b: Point, rect: Rect) -> bool {
    polyline_intersects_bounds(&[a, b], rect)
}

/// Whether any vertex of a polyline lies inside `rect` or any segment crosses it.
pub fn polyline_intersects_bounds(points: &[Point], rect: Rect) -> bool {
    if points.iter().any(|p| point_in_bounds(*p, rect)) {
        return true;
    }
    let edges = bounds_edges(rect);
    points.windows(2).any(|w| {
        edges
            .iter()
            .any(|&(c, d)| segments_intersect(w[0], w[1], c, d))
    })
}

/// Whether a closed polygon's outline crosses `rect` or has a vertex inside it.
pub fn polygon_intersects_bounds(points: &[Point], rect: Rect) -> bool {
    if points.is_empty() {
        return false;
    }
    let mut closed = points.to_vec();
    closed.push(points[0]);
    polyline_intersects_bounds(&closed, rect)
}

/// Even-odd point in polygon test.
pub fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    let mut inside = false;
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Points where segment `a..b` meets the circle.
pub fn segment_circle_intersections(a: Point, b: Point, circle: Circle) -> Vec<Point> {
    let d = b - a;
    let f = a - circle.center;
    let qa = d.hypot2();
    if qa < f64::EPSILON {
        return Vec::new();
    }
    let qb = 2.0 * f.dot(d);
    let qc = f.hypot2() - circle.radius * circle.radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return Vec::new();
    }

    let root = disc.sqrt();
    let mut hits = Vec::with_capacity(2);
    for t in [(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)] {
        if (0.0..=1.0).contains(&t) {
            hits.push(a + d * t);
        }
    }
    if hits.len() == 2 && (hits[0] - hits[1]).hypot2() < f64::EPSILON {
        hits.pop();
    }
    hits
}

/// Whether `p` on the circle lies on the shortest arc from `start` to `end`.
fn on_short_arc(circle: Circle, start: Point, end: Point, p: Point) -> bool {
    let a0 = angle(circle.center, start);
    let a1 = angle(circle.center, end);
    let ap = angle(circle.center, p);
    let da = crate::geometry::short_angle_dist(a0, a1);
    if da >= 0.0 {
        is_angle_between(a0, a1, ap)
    } else {
        is_angle_between(a1, a0, ap)
    }
}

/// Whether the shortest arc from `start` to `end` on `circle` crosses an edge of `rect`.
pub fn arc_intersects_bounds(circle: Circle, start: Point, end: Point, rect: Rect) -> bool {
    bounds_edges(rect).iter().any(|&(c, d)| {
        segment_circle_intersections(c, d, circle)
            .into_iter()
            .any(|p| on_short_arc(circle, start, end, p))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_cross() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ));
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 5.0),
            Point::new(10.0, 5.0),
        ));
    }

    #[test]
    fn test_segment_through_bounds() {
        let rect = Rect::new(40.0, -10.0, 60.0, 10.0);
        assert!(segment_intersects_bounds(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            rect
        ));
        assert!(!segment_intersects_bounds(
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
            rect
        ));
    }

    #[test]
    fn test_segment_circle() {
        let circle = Circle {
            center: Point::ZERO,
            radius: 10.0,
        };
        let hits = segment_circle_intersections(Point::new(-20.0, 0.0), Point::new(20.0, 0.0), circle);
        assert_eq!(hits.len(), 2);
        let hits = segment_circle_intersections(Point::new(-20.0, 30.0), Point::new(20.0, 30.0), circle);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_arc_only_counts_drawn_sweep() {
        // Upper half of a circle of radius 10 centered at the origin.
        let circle = Circle {
            center: Point::ZERO,
            radius: 10.0,
        };
        let start = Point::new(-10.0, 0.0);
        let end = Point::new(10.0, 0.0);
        let above = Rect::new(-2.0, -12.0, 2.0, -8.0);
        let below = Rect::new(-2.0, 8.0, 2.0, 12.0);
        // Sweep from angle π to 0 going through -π/2 (negative y).
        let crosses_above = arc_intersects_bounds(circle, start, Point::new(0.0, -10.0), above)
            || arc_intersects_bounds(circle, Point::new(0.0, -10.0), end, above);
        assert!(crosses_above);
        assert!(!arc_intersects_bounds(circle, Point::new(0.0, -10.0), end, below));
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &square));
    }
}
