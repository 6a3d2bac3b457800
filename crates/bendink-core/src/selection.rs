//! Selection bounds handles and the resize math behind them.

use crate::geometry::{angle, clamp_to_rotation_segments, rot_with};
use crate::shapes::TransformInfo;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Distance from the top edge to the rotation handle (in world units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// A handle on the selection's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundsHandle {
    Corner(Corner),
    Edge(Edge),
    /// Rotation handle (positioned above the top edge).
    Rotate,
}

/// Which sides of the box a handle drags.
#[derive(Debug, Clone, Copy, Default)]
struct Sides {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

impl BoundsHandle {
    fn sides(self) -> Sides {
        let none = Sides::default();
        match self {
            BoundsHandle::Corner(Corner::TopLeft) => Sides { left: true, top: true, ..none },
            BoundsHandle::Corner(Corner::TopRight) => Sides { right: true, top: true, ..none },
            BoundsHandle::Corner(Corner::BottomLeft) => Sides { left: true, bottom: true, ..none },
            BoundsHandle::Corner(Corner::BottomRight) => Sides { right: true, bottom: true, ..none },
            BoundsHandle::Edge(Edge::Top) => Sides { top: true, ..none },
            BoundsHandle::Edge(Edge::Right) => Sides { right: true, ..none },
            BoundsHandle::Edge(Edge::Bottom) => Sides { bottom: true, ..none },
            BoundsHandle::Edge(Edge::Left) => Sides { left: true, ..none },
            BoundsHandle::Rotate => none,
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(self, BoundsHandle::Corner(_))
    }
}

/// A bounds handle with its position.
#[derive(Debug, Clone, Copy)]
pub struct SelectionHandle {
    /// Position in world coordinates.
    pub position: Point,
    pub kind: BoundsHandle,
}

impl SelectionHandle {
    pub fn new(position: Point, kind: BoundsHandle) -> Self {
        Self { position, kind }
    }

    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should be adjusted for camera zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance_squared(point) <= tolerance * tolerance
    }
}

/// Corner, edge and rotation handles of a box rotated about its center.
pub fn bounds_handles(bounds: Rect, rotation: f64) -> Vec<SelectionHandle> {
    let c = bounds.center();
    let place = |x: f64, y: f64, kind| SelectionHandle::new(rot_with(Point::new(x, y), c, rotation), kind);
    vec![
        place(bounds.x0, bounds.y0, BoundsHandle::Corner(Corner::TopLeft)),
        place(bounds.x1, bounds.y0, BoundsHandle::Corner(Corner::TopRight)),
        place(bounds.x0, bounds.y1, BoundsHandle::Corner(Corner::BottomLeft)),
        place(bounds.x1, bounds.y1, BoundsHandle::Corner(Corner::BottomRight)),
        place(c.x, bounds.y0, BoundsHandle::Edge(Edge::Top)),
        place(bounds.x1, c.y, BoundsHandle::Edge(Edge::Right)),
        place(c.x, bounds.y1, BoundsHandle::Edge(Edge::Bottom)),
        place(bounds.x0, c.y, BoundsHandle::Edge(Edge::Left)),
        place(c.x, bounds.y0 - ROTATE_HANDLE_OFFSET, BoundsHandle::Rotate),
    ]
}

/// Find which handle (if any) is hit at the given point.
/// Corners win over edges when both are in reach.
pub fn hit_test_bounds_handles(
    bounds: Rect,
    rotation: f64,
    point: Point,
    tolerance: f64,
) -> Option<BoundsHandle> {
    bounds_handles(bounds, rotation)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| h.kind)
}

/// Bounds after dragging `handle` by `delta`, with the signed scale factors.
///
/// A scale goes negative once the dragged side passes the opposite one; the
/// returned rectangle is always normalized. With `keep_aspect`, corner drags
/// use the larger of the two scales on both axes.
pub fn transformed_bounds(
    initial: Rect,
    handle: BoundsHandle,
    delta: Vec2,
    keep_aspect: bool,
) -> (Rect, TransformInfo) {
    let sides = handle.sides();
    let (mut ax, mut ay, mut bx, mut by) = (initial.x0, initial.y0, initial.x1, initial.y1);
    if sides.left {
        ax += delta.x;
    }
    if sides.right {
        bx += delta.x;
    }
    if sides.top {
        ay += delta.y;
    }
    if sides.bottom {
        by += delta.y;
    }

    let (w, h) = (initial.width(), initial.height());
    let mut scale_x = if w > f64::EPSILON { (bx - ax) / w } else { 1.0 };
    let mut scale_y = if h > f64::EPSILON { (by - ay) / h } else { 1.0 };

    if keep_aspect && handle.is_corner() {
        let s = scale_x.abs().max(scale_y.abs());
        scale_x = s.copysign(scale_x);
        scale_y = s.copysign(scale_y);
        if sides.left {
            ax = bx - w * scale_x;
        } else {
            bx = ax + w * scale_x;
        }
        if sides.top {
            ay = by - h * scale_y;
        } else {
            by = ay + h * scale_y;
        }
    }

    (
        Rect::from_points(Point::new(ax, ay), Point::new(bx, by)),
        TransformInfo { scale_x, scale_y },
    )
}

/// Where one shape's bounds land when the selection box goes from
/// `initial_common` to `new_common`, keeping its relative placement.
pub fn relative_bounds(
    new_common: Rect,
    initial_common: Rect,
    initial_shape: Rect,
    flip_x: bool,
    flip_y: bool,
) -> Rect {
    let (cw, ch) = (initial_common.width(), initial_common.height());

    let (nx, nw) = if cw > f64::EPSILON {
        let offset = if flip_x {
            initial_common.x1 - initial_shape.x1
        } else {
            initial_shape.x0 - initial_common.x0
        };
        (offset / cw, initial_shape.width() / cw)
    } else {
        (0.0, 1.0)
    };
    let (ny, nh) = if ch > f64::EPSILON {
        let offset = if flip_y {
            initial_common.y1 - initial_shape.y1
        } else {
            initial_shape.y0 - initial_common.y0
        };
        (offset / ch, initial_shape.height() / ch)
    } else {
        (0.0, 1.0)
    };

    let x0 = new_common.x0 + new_common.width() * nx;
    let y0 = new_common.y0 + new_common.height() * ny;
    Rect::new(x0, y0, x0 + new_common.width() * nw, y0 + new_common.height() * nh)
}

/// Rotation swept by the pointer around `center` since `origin`.
/// With `snap` the result is clamped to that many segments per turn.
pub fn rotation_delta(center: Point, origin: Point, point: Point, snap: Option<u32>) -> f64 {
    let delta = angle(center, point) - angle(center, origin);
    match snap {
        Some(segments) => clamp_to_rotation_segments(delta, segments),
        None => delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_handles_hit() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(
            hit_test_bounds_handles(bounds, 0.0, Point::new(101.0, 51.0), 4.0),
            Some(BoundsHandle::Corner(Corner::BottomRight))
        );
        assert_eq!(
            hit_test_bounds_handles(bounds, 0.0, Point::new(50.0, -25.0), 4.0),
            Some(BoundsHandle::Rotate)
        );
        assert_eq!(hit_test_bounds_handles(bounds, 0.0, Point::new(50.0, 25.0), 4.0), None);
    }

    #[test]
    fn test_corner_drag_grows() {
        let initial = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (rect, info) = transformed_bounds(
            initial,
            BoundsHandle::Corner(Corner::BottomRight),
            Vec2::new(100.0, 50.0),
            false,
        );
        assert_eq!(rect, Rect::new(0.0, 0.0, 200.0, 150.0));
        assert!((info.scale_x - 2.0).abs() < 1e-9);
        assert!((info.scale_y - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_drag_past_opposite_side_flips() {
        let initial = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (rect, info) = transformed_bounds(
            initial,
            BoundsHandle::Edge(Edge::Right),
            Vec2::new(-150.0, 0.0),
            false,
        );
        assert_eq!(rect, Rect::new(-50.0, 0.0, 0.0, 100.0));
        assert!((info.scale_x + 0.5).abs() < 1e-9);
        assert!((info.scale_y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_keep_aspect_on_corner() {
        let initial = Rect::new(0.0, 0.0, 100.0, 50.0);
        let (rect, info) = transformed_bounds(
            initial,
            BoundsHandle::Corner(Corner::TopLeft),
            Vec2::new(-100.0, 0.0),
            true,
        );
        assert!((info.scale_x - 2.0).abs() < 1e-9);
        assert!((info.scale_y - 2.0).abs() < 1e-9);
        assert_eq!(rect, Rect::new(-100.0, -50.0, 100.0, 50.0));
    }

    #[test]
    fn test_relative_bounds() {
        let initial_common = Rect::new(0.0, 0.0, 100.0, 100.0);
        let shape = Rect::new(0.0, 0.0, 50.0, 50.0);
        let out = relative_bounds(Rect::new(0.0, 0.0, 200.0, 200.0), initial_common, shape, false, false);
        assert_eq!(out, Rect::new(0.0, 0.0, 100.0, 100.0));

        // Mirrored horizontally, the left half lands on the right.
        let out = relative_bounds(initial_common, initial_common, shape, true, false);
        assert_eq!(out, Rect::new(50.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_rotation_delta_snaps() {
        let center = Point::ZERO;
        let origin = Point::new(10.0, 0.0);
        let raw = rotation_delta(center, origin, Point::new(0.0, 10.0), None);
        assert!((raw - FRAC_PI_2).abs() < 1e-9);
        let near = rot_with(origin, center, 0.27);
        let snapped = rotation_delta(center, origin, near, Some(24));
        assert!((snapped - std::f64::consts::PI / 12.0).abs() < 1e-9);
    }
}
