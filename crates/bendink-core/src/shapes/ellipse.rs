//! Ellipse shape.

use super::{
    ShapeId, ShapeUtil, TransformInfo, flipped_rotation, next_version, polygon_hit_test_bounds,
};
use crate::geometry::rot_with;
use crate::style::ShapeStyle;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vertices used to approximate the outline for brush tests.
const OUTLINE_SEGMENTS: usize = 32;

/// An ellipse inscribed in its bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    radius: Vec2,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    style: ShapeStyle,
    #[serde(skip, default = "next_version")]
    version: u64,
}

impl Ellipse {
    /// Create an ellipse from its top-left corner and radii.
    pub fn new(position: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            radius: Vec2::new(radius_x.abs(), radius_y.abs()),
            rotation: 0.0,
            style: ShapeStyle::default(),
            version: next_version(),
        }
    }

    /// Create an ellipse filling the box between two corners.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::new(rect.origin(), rect.width() / 2.0, rect.height() / 2.0)
    }

    pub fn radius(&self) -> Vec2 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: Vec2) {
        self.radius = Vec2::new(radius.x.abs(), radius.y.abs());
        self.version = next_version();
    }

    pub fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
        self.version = next_version();
    }

    /// Page-space points around the rotated outline.
    fn outline(&self) -> Vec<Point> {
        let c = self.bounds().center();
        (0..OUTLINE_SEGMENTS)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / OUTLINE_SEGMENTS as f64;
                let p = Point::new(c.x + a.cos() * self.radius.x, c.y + a.sin() * self.radius.y);
                rot_with(p, c, self.rotation)
            })
            .collect()
    }
}

impl ShapeUtil for Ellipse {
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
        Rect::from_origin_size(self.position, (self.radius.x * 2.0, self.radius.y * 2.0))
    }

    fn hit_test(&self, point: Point) -> bool {
        if self.radius.x <= 0.0 || self.radius.y <= 0.0 {
            return false;
        }
        let c = self.bounds().center();
        let local = rot_with(point, c, -self.rotation);
        let dx = (local.x - c.x) / self.radius.x;
        let dy = (local.y - c.y) / self.radius.y;
        dx * dx + dy * dy <= 1.0
    }

    fn hit_test_bounds(&self, bounds: Rect) -> bool {
        polygon_hit_test_bounds(&self.outline(), bounds)
    }

    fn transform(&self, initial: &Self, bounds: Rect, info: &TransformInfo) -> Self {
        let mut next = self.clone();
        next.position = bounds.origin();
        next.radius = Vec2::new(bounds.width() / 2.0, bounds.height() / 2.0);
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
        let c = self.bounds().center();
        let ellipse = kurbo::Ellipse::new(c, self.radius, 0.0);
        let path = ellipse.to_path(0.1);
        if self.rotation == 0.0 {
            path
        } else {
            Affine::rotate_about(self.rotation, c) * path
        }
    }
}
