//! Sticky note shape.

use super::{
    ShapeId, ShapeUtil, TransformInfo, next_version, polygon_hit_test, polygon_hit_test_bounds,
    rotated_corners,
};
use crate::geometry::round_point;
use crate::style::ShapeStyle;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

/// A square note carrying text. Notes keep their size when transformed and
/// grow downward to fit measured text.
#[derive(Debug, Serialize, Deserialize)]
pub struct Sticky {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    size: Size,
    text: String,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    style: ShapeStyle,
    #[serde(skip, default = "next_version")]
    version: u64,
    /// Text height measured by the renderer, if any.
    #[serde(skip)]
    measured_height: RwLock<Option<f64>>,
}

impl Clone for Sticky {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            position: self.position,
            size: self.size,
            text: self.text.clone(),
            rotation: self.rotation,
            style: self.style,
            version: self.version,
            // Clone the measured value, not the lock
            measured_height: RwLock::new(self.measured_height.read().ok().and_then(|guard| *guard)),
        }
    }
}

impl Sticky {
    /// Side length of a new note.
    pub const DEFAULT_SIZE: f64 = 200.0;

    /// Create a note with its top-left corner at `position`.
    pub fn new(position: Point, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size: Size::new(Self::DEFAULT_SIZE, Self::DEFAULT_SIZE),
            text: text.into(),
            rotation: 0.0,
            style: ShapeStyle::default(),
            version: next_version(),
            measured_height: RwLock::new(None),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.invalidate_cache();
        self.version = next_version();
    }

    pub fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
        self.version = next_version();
    }

    /// Record the text height measured by the renderer.
    /// Uses interior mutability so this can be called during rendering.
    pub fn set_measured_height(&self, height: f64) {
        if let Ok(mut cache) = self.measured_height.write() {
            *cache = Some(height);
        }
    }

    /// Forget the measured height (call when the text changes).
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.measured_height.write() {
            *cache = None;
        }
    }

    /// Size including any growth needed for the measured text.
    pub fn size(&self) -> Size {
        let measured = self
            .measured_height
            .read()
            .ok()
            .and_then(|guard| *guard)
            .unwrap_or(0.0);
        Size::new(self.size.width, self.size.height.max(measured))
    }
}

impl ShapeUtil for Sticky {
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
        Rect::from_origin_size(self.position, self.size())
    }

    fn hit_test(&self, point: Point) -> bool {
        polygon_hit_test(&rotated_corners(self.bounds(), self.rotation), point)
    }

    fn hit_test_bounds(&self, bounds: Rect) -> bool {
        polygon_hit_test_bounds(&rotated_corners(self.bounds(), self.rotation), bounds)
    }

    /// Notes do not stretch; they are re-centered in the new bounds.
    fn transform(&self, _initial: &Self, bounds: Rect, _info: &TransformInfo) -> Self {
        let size = self.size();
        let mut next = self.clone();
        next.position = round_point(
            bounds.center() - kurbo::Vec2::new(size.width / 2.0, size.height / 2.0),
        );
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

    fn has_text(&self) -> bool {
        true
    }

    fn clear_text(&mut self) {
        self.set_text(String::new());
    }

    fn to_path(&self) -> BezPath {
        let rect = self.bounds();
        let path = rect.to_path(0.1);
        if self.rotation == 0.0 {
            path
        } else {
            Affine::rotate_about(self.rotation, rect.center()) * path
        }
    }
}
