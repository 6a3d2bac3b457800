//! Shape kinds and the capability trait the interaction machine drives.

mod arrow;
mod ellipse;
mod handle;
mod rectangle;
mod sticky;

pub use arrow::{
    Arrow, ArrowRender, RenderInfo, HAND_DRAWN_SCALE, MAX_BEND, MIN_BEND_OFFSET,
    STRAIGHT_THRESHOLD, VECTOR_SCALE, ARC_SAMPLES, bend_point,
};
pub use ellipse::Ellipse;
pub use handle::{Decoration, Decorations, Handle, HandleChange, HandleId};
pub use rectangle::Rectangle;
pub use sticky::Sticky;

use crate::config::ANGLE_SNAP_SEGMENTS;
use crate::geometry::{bounds_from_points, rot_with};
use crate::input::Modifiers;
use crate::intersect::{point_in_polygon, polygon_intersects_bounds};
use crate::style::ShapeStyle;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Next value of the process-wide version counter.
///
/// Every mutation of cached fields stamps the shape with a fresh value, so a
/// `(id, version)` pair never names two different geometries.
pub fn next_version() -> u64 {
    static VERSION: AtomicU64 = AtomicU64::new(1);
    VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Scale factors of an in-progress resize, negative when flipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformInfo {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for TransformInfo {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Behavior every shape kind provides to the tools.
///
/// Optional capabilities default to no-ops that return the shape unchanged.
pub trait ShapeUtil: Clone {
    fn id(&self) -> ShapeId;

    /// Top-left origin in page space.
    fn point(&self) -> Point;

    fn rotation(&self) -> f64;

    /// Stamp that changes whenever cached geometry would change.
    fn version(&self) -> u64;

    fn style(&self) -> &ShapeStyle;

    /// Axis-aligned page bounds, ignoring rotation.
    fn bounds(&self) -> Rect;

    /// Page bounds of the shape after rotation.
    fn rotated_bounds(&self) -> Rect {
        let b = self.bounds();
        bounds_from_points(
            &[
                Point::new(b.x0, b.y0),
                Point::new(b.x1, b.y0),
                Point::new(b.x1, b.y1),
                Point::new(b.x0, b.y1),
            ],
            self.rotation(),
        )
    }

    fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Whether a page point touches the shape.
    fn hit_test(&self, point: Point) -> bool;

    /// Whether the shape touches a page-space rectangle.
    fn hit_test_bounds(&self, bounds: Rect) -> bool;

    /// The shape resized so that its bounds become `bounds`.
    fn transform(&self, initial: &Self, bounds: Rect, info: &TransformInfo) -> Self;

    fn translate_to(&mut self, point: Point);

    fn rotate_to(&mut self, rotation: f64);

    /// The shape rotated by `delta` about a page point.
    fn rotate_about(&self, center: Point, delta: f64) -> Self {
        let mut next = self.clone();
        let b = self.bounds();
        let half = kurbo::Vec2::new(b.width() / 2.0, b.height() / 2.0);
        let new_center = rot_with(b.center(), center, delta);
        next.translate_to(new_center - half);
        next.rotate_to((self.rotation() + delta).rem_euclid(std::f64::consts::TAU));
        next
    }

    fn can_clone(&self) -> bool {
        false
    }

    fn has_text(&self) -> bool {
        false
    }

    fn clear_text(&mut self) {}

    fn handles(&self) -> Vec<Handle> {
        Vec::new()
    }

    /// Apply handle moves. Shift snaps endpoint angles to
    /// [`ANGLE_SNAP_SEGMENTS`] divisions of a turn.
    fn on_handle_change(&self, changes: &[HandleChange], modifiers: Modifiers) -> Self {
        self.on_handle_change_snapped(changes, modifiers, ANGLE_SNAP_SEGMENTS)
    }

    /// [`ShapeUtil::on_handle_change`] with an explicit snap segment count.
    fn on_handle_change_snapped(
        &self,
        _changes: &[HandleChange],
        _modifiers: Modifiers,
        _segments: u32,
    ) -> Self {
        self.clone()
    }

    fn on_double_click_handle(&self, _id: HandleId) -> Self {
        self.clone()
    }

    /// Final normalization when a gesture ends.
    fn on_session_complete(&self) -> Self {
        self.clone()
    }

    /// Page-space outline for painters and indicators.
    fn to_path(&self) -> BezPath;
}

/// Corners of a box rotated about its center.
pub(crate) fn rotated_corners(bounds: Rect, rotation: f64) -> [Point; 4] {
    let c = bounds.center();
    [
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
        Point::new(bounds.x1, bounds.y1),
        Point::new(bounds.x0, bounds.y1),
    ]
    .map(|p| rot_with(p, c, rotation))
}

/// Hit test for a rotated polygon against a brush: the brush contains it
/// or crosses its outline.
pub(crate) fn polygon_hit_test_bounds(polygon: &[Point], brush: Rect) -> bool {
    let outer = bounds_from_points(polygon, 0.0);
    crate::geometry::bounds_contain(brush, outer) || polygon_intersects_bounds(polygon, brush)
}

/// Point hit test for a rotated polygon.
pub(crate) fn polygon_hit_test(polygon: &[Point], point: Point) -> bool {
    point_in_polygon(point, polygon) || polygon.iter().any(|p| *p == point)
}

/// Rotation after a resize: a single-axis flip mirrors the angle.
pub(crate) fn flipped_rotation(rotation: f64, info: &TransformInfo) -> f64 {
    if (info.scale_x < 0.0) != (info.scale_y < 0.0) {
        -rotation
    } else {
        rotation
    }
}

/// Enum wrapper for all shape kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Arrow(Arrow),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Sticky(Sticky),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Arrow(s) => s.id(),
            Shape::Rectangle(s) => s.id(),
            Shape::Ellipse(s) => s.id(),
            Shape::Sticky(s) => s.id(),
        }
    }

    pub fn point(&self) -> Point {
        match self {
            Shape::Arrow(s) => s.point(),
            Shape::Rectangle(s) => s.point(),
            Shape::Ellipse(s) => s.point(),
            Shape::Sticky(s) => s.point(),
        }
    }

    pub fn rotation(&self) -> f64 {
        match self {
            Shape::Arrow(s) => s.rotation(),
            Shape::Rectangle(s) => s.rotation(),
            Shape::Ellipse(s) => s.rotation(),
            Shape::Sticky(s) => s.rotation(),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Shape::Arrow(s) => s.version(),
            Shape::Rectangle(s) => s.version(),
            Shape::Ellipse(s) => s.version(),
            Shape::Sticky(s) => s.version(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Arrow(s) => s.style(),
            Shape::Rectangle(s) => s.style(),
            Shape::Ellipse(s) => s.style(),
            Shape::Sticky(s) => s.style(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Arrow(s) => s.bounds(),
            Shape::Rectangle(s) => s.bounds(),
            Shape::Ellipse(s) => s.bounds(),
            Shape::Sticky(s) => s.bounds(),
        }
    }

    pub fn rotated_bounds(&self) -> Rect {
        match self {
            Shape::Arrow(s) => s.rotated_bounds(),
            Shape::Rectangle(s) => s.rotated_bounds(),
            Shape::Ellipse(s) => s.rotated_bounds(),
            Shape::Sticky(s) => s.rotated_bounds(),
        }
    }

    pub fn center(&self) -> Point {
        match self {
            Shape::Arrow(s) => s.center(),
            Shape::Rectangle(s) => s.center(),
            Shape::Ellipse(s) => s.center(),
            Shape::Sticky(s) => s.center(),
        }
    }

    pub fn hit_test(&self, point: Point) -> bool {
        match self {
            Shape::Arrow(s) => s.hit_test(point),
            Shape::Rectangle(s) => s.hit_test(point),
            Shape::Ellipse(s) => s.hit_test(point),
            Shape::Sticky(s) => s.hit_test(point),
        }
    }

    /// Point test with a tolerance box. Arrows only report a coarse hit
    /// from `hit_test`, so they go straight to the precise box test.
    pub fn hit_test_point(&self, point: Point, tolerance: f64) -> bool {
        let area = Rect::from_center_size(point, (tolerance * 2.0, tolerance * 2.0));
        match self {
            Shape::Arrow(s) => s.hit_test_bounds(area),
            _ => self.hit_test(point) || self.hit_test_bounds(area),
        }
    }

    pub fn hit_test_bounds(&self, bounds: Rect) -> bool {
        match self {
            Shape::Arrow(s) => s.hit_test_bounds(bounds),
            Shape::Rectangle(s) => s.hit_test_bounds(bounds),
            Shape::Ellipse(s) => s.hit_test_bounds(bounds),
            Shape::Sticky(s) => s.hit_test_bounds(bounds),
        }
    }

    /// Resize to `bounds`. A mismatched `initial` kind leaves the shape unchanged.
    pub fn transform(&self, initial: &Shape, bounds: Rect, info: &TransformInfo) -> Shape {
        match (self, initial) {
            (Shape::Arrow(s), Shape::Arrow(i)) => Shape::Arrow(s.transform(i, bounds, info)),
            (Shape::Rectangle(s), Shape::Rectangle(i)) => {
                Shape::Rectangle(s.transform(i, bounds, info))
            }
            (Shape::Ellipse(s), Shape::Ellipse(i)) => Shape::Ellipse(s.transform(i, bounds, info)),
            (Shape::Sticky(s), Shape::Sticky(i)) => Shape::Sticky(s.transform(i, bounds, info)),
            _ => {
                log::debug!("transform skipped: shape kind changed for {}", self.id());
                self.clone()
            }
        }
    }

    pub fn translate_to(&mut self, point: Point) {
        match self {
            Shape::Arrow(s) => s.translate_to(point),
            Shape::Rectangle(s) => s.translate_to(point),
            Shape::Ellipse(s) => s.translate_to(point),
            Shape::Sticky(s) => s.translate_to(point),
        }
    }

    /// The shape moved by `delta`.
    pub fn translated(&self, delta: kurbo::Vec2) -> Shape {
        let mut next = self.clone();
        next.translate_to(self.point() + delta);
        next
    }

    pub fn rotate_to(&mut self, rotation: f64) {
        match self {
            Shape::Arrow(s) => s.rotate_to(rotation),
            Shape::Rectangle(s) => s.rotate_to(rotation),
            Shape::Ellipse(s) => s.rotate_to(rotation),
            Shape::Sticky(s) => s.rotate_to(rotation),
        }
    }

    pub fn rotate_about(&self, center: Point, delta: f64) -> Shape {
        match self {
            Shape::Arrow(s) => Shape::Arrow(s.rotate_about(center, delta)),
            Shape::Rectangle(s) => Shape::Rectangle(s.rotate_about(center, delta)),
            Shape::Ellipse(s) => Shape::Ellipse(s.rotate_about(center, delta)),
            Shape::Sticky(s) => Shape::Sticky(s.rotate_about(center, delta)),
        }
    }

    pub fn can_clone(&self) -> bool {
        match self {
            Shape::Arrow(s) => s.can_clone(),
            Shape::Rectangle(s) => s.can_clone(),
            Shape::Ellipse(s) => s.can_clone(),
            Shape::Sticky(s) => s.can_clone(),
        }
    }

    pub fn has_text(&self) -> bool {
        match self {
            Shape::Arrow(s) => s.has_text(),
            Shape::Rectangle(s) => s.has_text(),
            Shape::Ellipse(s) => s.has_text(),
            Shape::Sticky(s) => s.has_text(),
        }
    }

    pub fn clear_text(&mut self) {
        match self {
            Shape::Arrow(s) => s.clear_text(),
            Shape::Rectangle(s) => s.clear_text(),
            Shape::Ellipse(s) => s.clear_text(),
            Shape::Sticky(s) => s.clear_text(),
        }
    }

    pub fn handles(&self) -> Vec<Handle> {
        match self {
            Shape::Arrow(s) => s.handles(),
            Shape::Rectangle(s) => s.handles(),
            Shape::Ellipse(s) => s.handles(),
            Shape::Sticky(s) => s.handles(),
        }
    }

    /// Whether the shape declares a handle with this id.
    pub fn has_handle(&self, id: HandleId) -> bool {
        self.handles().iter().any(|h| h.id == id)
    }

    pub fn on_handle_change(&self, changes: &[HandleChange], modifiers: Modifiers) -> Shape {
        self.on_handle_change_snapped(changes, modifiers, ANGLE_SNAP_SEGMENTS)
    }

    pub fn on_handle_change_snapped(
        &self,
        changes: &[HandleChange],
        modifiers: Modifiers,
        segments: u32,
    ) -> Shape {
        match self {
            Shape::Arrow(s) => Shape::Arrow(s.on_handle_change_snapped(changes, modifiers, segments)),
            Shape::Rectangle(s) => {
                Shape::Rectangle(s.on_handle_change_snapped(changes, modifiers, segments))
            }
            Shape::Ellipse(s) => Shape::Ellipse(s.on_handle_change_snapped(changes, modifiers, segments)),
            Shape::Sticky(s) => Shape::Sticky(s.on_handle_change_snapped(changes, modifiers, segments)),
        }
    }

    pub fn on_double_click_handle(&self, id: HandleId) -> Shape {
        match self {
            Shape::Arrow(s) => Shape::Arrow(s.on_double_click_handle(id)),
            Shape::Rectangle(s) => Shape::Rectangle(s.on_double_click_handle(id)),
            Shape::Ellipse(s) => Shape::Ellipse(s.on_double_click_handle(id)),
            Shape::Sticky(s) => Shape::Sticky(s.on_double_click_handle(id)),
        }
    }

    pub fn on_session_complete(&self) -> Shape {
        match self {
            Shape::Arrow(s) => Shape::Arrow(s.on_session_complete()),
            Shape::Rectangle(s) => Shape::Rectangle(s.on_session_complete()),
            Shape::Ellipse(s) => Shape::Ellipse(s.on_session_complete()),
            Shape::Sticky(s) => Shape::Sticky(s.on_session_complete()),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Arrow(s) => s.to_path(),
            Shape::Rectangle(s) => s.to_path(),
            Shape::Ellipse(s) => s.to_path(),
            Shape::Sticky(s) => s.to_path(),
        }
    }

    pub fn is_arrow(&self) -> bool {
        matches!(self, Shape::Arrow(_))
    }

    pub fn as_arrow(&self) -> Option<&Arrow> {
        match self {
            Shape::Arrow(a) => Some(a),
            _ => None,
        }
    }

    /// Regenerate the shape's ID with a new unique identifier.
    /// This is used when duplicating shapes so copies never share an id.
    pub fn regenerate_id(&mut self) {
        let new_id = Uuid::new_v4();
        match self {
            Shape::Arrow(s) => s.id = new_id,
            Shape::Rectangle(s) => s.id = new_id,
            Shape::Ellipse(s) => s.id = new_id,
            Shape::Sticky(s) => s.id = new_id,
        }
    }
}

impl From<Arrow> for Shape {
    fn from(s: Arrow) -> Self {
        Shape::Arrow(s)
    }
}

impl From<Rectangle> for Shape {
    fn from(s: Rectangle) -> Self {
        Shape::Rectangle(s)
    }
}

impl From<Ellipse> for Shape {
    fn from(s: Ellipse) -> Self {
        Shape::Ellipse(s)
    }
}

impl From<Sticky> for Shape {
    fn from(s: Sticky) -> Self {
        Shape::Sticky(s)
    }
}
