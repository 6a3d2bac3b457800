//! Rectangle shape.

use super::{
    ShapeId, ShapeUtil, TransformInfo, flipped_rotation, next_version, polygon_hit_test,
    polygon_hit_test_bounds, rotated_corners,
};
use crate::style::ShapeStyle;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangle shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    size: Size,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    style: ShapeStyle,
    #[serde(skip, default = "next_version")]
    version: u64,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size: Size::new(width.abs(), height.abs()),
            rotation: 0.0,
            style: ShapeStyle::default(),
            version: next_version(),
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::new(rect.origin(), rect.width(), rect.height())
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = Size::new(size.width.abs(), size.height.abs());
        self.version = next_version();
    }

    pub fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
        self.version = next_version();
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

impl ShapeUtil for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn point(&self) -> Point {
        self.position
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point) -> bool {
        polygon_hit_test(&rotated_corners(self.as_rect(), self.rotation), point)
    }

    fn hit_test_bounds(&self, bounds: Rect) -> bool {
        polygon_hit_test_bounds(&rotated_corners(self.as_rect(), self.rotation), bounds)
    }

    fn transform(&self, initial: &Self, bounds: Rect, info: &TransformInfo) -> Self {
        let mut next = self.clone();
        next.position = bounds.origin();
        next.size = bounds.size();
        next.rotation = flipped_rotation(initial.rotation, info);
        next.version = next_version();
        next
    }

    fn translate_to(&mut self, point: Point) {
        self.position = point;
    }

    fn rotate_to(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    fn can_clone(&self) -> bool {
        true
    }

    fn to_path(&self) -> BezPath {
        let rect = self.as_rect();
        let path = rect.to_path(0.1);
        if self.rotation == 0.0 {
            path
        } else {
            Affine::rotate_about(self.rotation, rect.center()) * path
        }
    }
}
