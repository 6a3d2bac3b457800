//! Memoized per-shape geometry keyed by shape id and version.

use crate::geometry::translate_bounds;
use crate::outline::StrokeOutliner;
use crate::shapes::{Arrow, Shape, ShapeId, ShapeUtil};
use kurbo::{Point, Rect};
use std::cell::RefCell;
use std::collections::HashMap;

/// Cached values for one shape version. Everything is in local space, so
/// moving or rotating a shape never invalidates it.
#[derive(Debug, Clone, Default)]
struct Entry {
    version: u64,
    local_bounds: Option<Rect>,
    shaft_path: Option<String>,
}

/// Geometry cache for a single document.
///
/// Lookups compare the stored version with the shape's current one and
/// recompute on mismatch.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: RefCell<HashMap<ShapeId, Entry>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shaft path of an arrow in local space.
    pub fn shaft_path(&self, arrow: &Arrow, outliner: &dyn StrokeOutliner) -> String {
        let id = arrow.id();
        if let Some(path) = self.with_entry(id, arrow.version(), |e| e.shaft_path.clone()) {
            log::trace!("shaft cache hit for {id}");
            return path;
        }
        log::trace!("shaft cache miss for {id}");
        let path = arrow.shaft_path(outliner);
        self.store(id, arrow.version(), |e| e.shaft_path = Some(path.clone()));
        path
    }

    /// Page bounds, derived from the cached local bounds.
    pub fn bounds(&self, shape: &Shape) -> Rect {
        // A note's height follows the renderer's text measurement, which is
        // recorded behind a lock without a version bump
        if let Shape::Sticky(_) = shape {
            return shape.bounds();
        }
        let id = shape.id();
        let local = match self.with_entry(id, shape.version(), |e| e.local_bounds) {
            Some(rect) => {
                log::trace!("bounds cache hit for {id}");
                rect
            }
            None => {
                log::trace!("bounds cache miss for {id}");
                let rect = local_bounds(shape);
                self.store(id, shape.version(), |e| e.local_bounds = Some(rect));
                rect
            }
        };
        translate_bounds(local, shape.point().to_vec2())
    }

    /// Drop the entry for `id`.
    pub fn invalidate(&self, id: ShapeId) {
        self.entries.borrow_mut().remove(&id);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn with_entry<T>(&self, id: ShapeId, version: u64, f: impl FnOnce(&Entry) -> Option<T>) -> Option<T> {
        let entries = self.entries.borrow();
        entries.get(&id).filter(|e| e.version == version).and_then(f)
    }

    fn store(&self, id: ShapeId, version: u64, f: impl FnOnce(&mut Entry)) {
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(id).or_default();
        if entry.version != version {
            *entry = Entry {
                version,
                ..Entry::default()
            };
        }
        f(entry);
    }
}

fn local_bounds(shape: &Shape) -> Rect {
    match shape {
        Shape::Arrow(a) => a.local_bounds(),
        other => {
            let b = other.bounds();
            Rect::from_origin_size(Point::ZERO, b.size())
        }
    }
}
