//! Shape storage seen by the interaction machine.

use crate::cache::GeometryCache;
use crate::geometry::common_bounds;
use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Lookup, selection and duplication for the shapes of one page.
pub trait ShapeStore {
    fn shape(&self, id: ShapeId) -> Option<&Shape>;

    /// Shapes in z-order (back to front).
    fn shapes(&self) -> Vec<&Shape>;

    fn add(&mut self, shape: Shape);

    /// Replace the stored shape with the same id. Unknown ids are ignored.
    fn update(&mut self, shape: Shape);

    fn remove(&mut self, id: ShapeId) -> Option<Shape>;

    /// Selected ids in selection order.
    fn selected_ids(&self) -> Vec<ShapeId>;

    fn set_selected(&mut self, ids: Vec<ShapeId>);

    /// Copy `ids` so that the copies' common bounds are centered on
    /// `target`, select the copies and return their ids.
    fn duplicate(&mut self, ids: &[ShapeId], target: Point) -> Vec<ShapeId>;

    /// Page bounds of a shape.
    fn bounds(&self, id: ShapeId) -> Option<Rect> {
        self.shape(id).map(|s| s.bounds())
    }

    /// Common bounds of a set of shapes.
    fn common_bounds(&self, ids: &[ShapeId]) -> Option<Rect> {
        common_bounds(ids.iter().filter_map(|id| self.bounds(*id)))
    }

    fn is_selected(&self, id: ShapeId) -> bool {
        self.selected_ids().contains(&id)
    }

    /// Shapes under a point, front to back.
    fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.shapes()
            .into_iter()
            .rev()
            .filter(|s| s.hit_test_point(point, tolerance))
            .map(|s| s.id())
            .collect()
    }

    /// Shapes touched by a brush, in z-order.
    fn shapes_in_rect(&self, rect: Rect) -> Vec<ShapeId> {
        self.shapes()
            .into_iter()
            .filter(|s| s.hit_test_bounds(rect))
            .map(|s| s.id())
            .collect()
    }
}

/// An in-memory page of shapes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// All shapes in the document, keyed by ID.
    shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    z_order: Vec<ShapeId>,
    #[serde(default)]
    selection: Vec<ShapeId>,
    #[serde(skip)]
    cache: GeometryCache,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            shapes: HashMap::new(),
            z_order: Vec::new(),
            selection: Vec::new(),
            cache: GeometryCache::new(),
        }
    }

    /// Geometry cache shared by everything rendering this document.
    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Ids in z-order (back to front).
    pub fn z_order(&self) -> &[ShapeId] {
        &self.z_order
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ShapeStore for Document {
    fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    fn shapes(&self) -> Vec<&Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id)).collect()
    }

    fn add(&mut self, shape: Shape) {
        let id = shape.id();
        if self.shapes.insert(id, shape).is_none() {
            self.z_order.push(id);
        }
    }

    fn update(&mut self, shape: Shape) {
        match self.shapes.get_mut(&shape.id()) {
            Some(slot) => *slot = shape,
            None => log::debug!("update ignored for unknown shape {}", shape.id()),
        }
    }

    fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.z_order.retain(|&shape_id| shape_id != id);
        self.selection.retain(|&shape_id| shape_id != id);
        self.cache.invalidate(id);
        self.shapes.remove(&id)
    }

    fn selected_ids(&self) -> Vec<ShapeId> {
        self.selection.clone()
    }

    fn set_selected(&mut self, ids: Vec<ShapeId>) {
        self.selection = ids.into_iter().filter(|id| self.shapes.contains_key(id)).collect();
    }

    fn duplicate(&mut self, ids: &[ShapeId], target: Point) -> Vec<ShapeId> {
        let Some(bounds) = self.common_bounds(ids) else {
            return Vec::new();
        };
        let delta = target - bounds.center();

        let copies: Vec<Shape> = ids
            .iter()
            .filter_map(|id| self.shapes.get(id))
            .map(|shape| {
                let mut copy = shape.translated(delta);
                copy.regenerate_id();
                copy
            })
            .collect();

        let new_ids: Vec<ShapeId> = copies.iter().map(|s| s.id()).collect();
        for copy in copies {
            self.add(copy);
        }
        self.selection = new_ids.clone();
        log::debug!("duplicated {} shapes around {:?}", new_ids.len(), target);
        new_ids
    }

    fn bounds(&self, id: ShapeId) -> Option<Rect> {
        self.shapes.get(&id).map(|s| self.cache.bounds(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, ShapeUtil, Sticky};

    fn rect_at(x: f64, y: f64, size: f64) -> Shape {
        Shape::from(Rectangle::new(Point::new(x, y), size, size))
    }

    #[test]
    fn test_add_and_remove() {
        let mut doc = Document::new();
        let shape = rect_at(0.0, 0.0, 10.0);
        let id = shape.id();
        doc.add(shape);
        doc.set_selected(vec![id]);
        assert_eq!(doc.len(), 1);

        assert!(doc.remove(id).is_some());
        assert!(doc.is_empty());
        assert!(doc.selected_ids().is_empty());
    }

    #[test]
    fn test_shapes_at_point_front_first() {
        let mut doc = Document::new();
        let back = rect_at(0.0, 0.0, 100.0);
        let front = rect_at(50.0, 50.0, 100.0);
        let (back_id, front_id) = (back.id(), front.id());
        doc.add(back);
        doc.add(front);

        assert_eq!(doc.shapes_at_point(Point::new(75.0, 75.0), 0.0), vec![front_id, back_id]);
        assert_eq!(doc.shapes_at_point(Point::new(25.0, 25.0), 0.0), vec![back_id]);
    }

    #[test]
    fn test_duplicate_centers_on_target() {
        let mut doc = Document::new();
        let shape = rect_at(0.0, 0.0, 40.0);
        let id = shape.id();
        doc.add(shape);

        let copies = doc.duplicate(&[id], Point::new(100.0, 100.0));
        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], id);
        assert_eq!(doc.bounds(copies[0]), Some(Rect::new(80.0, 80.0, 120.0, 120.0)));
        assert_eq!(doc.selected_ids(), copies);
    }

    #[test]
    fn test_duplicate_keeps_text() {
        let mut doc = Document::new();
        let sticky = Sticky::new(Point::ZERO, "note");
        let id = sticky.id();
        doc.add(sticky.into());
        let copies = doc.duplicate(&[id], Point::new(500.0, 500.0));
        match doc.shape(copies[0]) {
            Some(Shape::Sticky(s)) => assert_eq!(s.text(), "note"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_update_unknown_is_ignored() {
        let mut doc = Document::new();
        doc.update(rect_at(0.0, 0.0, 1.0));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_json_roundtrip_keeps_order() {
        let mut doc = Document::new();
        let a = rect_at(0.0, 0.0, 1.0);
        let b = rect_at(5.0, 5.0, 1.0);
        let ids = vec![a.id(), b.id()];
        doc.add(a);
        doc.add(b);

        let json = doc.to_json().unwrap();
        let restored = Document::from_json(&json).unwrap();
        assert_eq!(restored.z_order(), ids.as_slice());
    }
}
