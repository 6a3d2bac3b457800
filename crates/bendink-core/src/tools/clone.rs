//! Clone placement: directional clones and clone painting.

use crate::geometry::{center_bounds, expand_bounds, rot_with};
use crate::shapes::{Shape, ShapeId};
use crate::store::ShapeStore;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Direction of a clone button around a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CloneSide {
    Top,
    Right,
    Bottom,
    Left,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CloneSide {
    pub const ALL: [CloneSide; 8] = [
        CloneSide::Top,
        CloneSide::Right,
        CloneSide::Bottom,
        CloneSide::Left,
        CloneSide::TopLeft,
        CloneSide::TopRight,
        CloneSide::BottomRight,
        CloneSide::BottomLeft,
    ];

    /// Parse a side name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "top" => Some(CloneSide::Top),
            "right" => Some(CloneSide::Right),
            "bottom" => Some(CloneSide::Bottom),
            "left" => Some(CloneSide::Left),
            "topLeft" => Some(CloneSide::TopLeft),
            "topRight" => Some(CloneSide::TopRight),
            "bottomRight" => Some(CloneSide::BottomRight),
            "bottomLeft" => Some(CloneSide::BottomLeft),
            _ => None,
        }
    }
}

/// A copy of `id` placed next to it on `side`, `distance` away.
///
/// Returns `None` for unknown ids and for shapes that cannot be cloned.
/// The copy has a fresh id and, for text-bearing shapes, empty text.
pub fn get_shape_clone(
    store: &impl ShapeStore,
    id: ShapeId,
    side: CloneSide,
    distance: f64,
) -> Option<Shape> {
    let Some(shape) = store.shape(id) else {
        log::debug!("clone skipped: unknown shape {id}");
        return None;
    };
    if !shape.can_clone() {
        log::debug!("clone skipped: shape {id} cannot be cloned");
        return None;
    }

    let b = shape.bounds();
    let (w, h) = (b.width(), b.height());
    let above = b.y0 - (h + distance);
    let before = b.x0 - (w + distance);
    let after = b.x1 + distance;
    let below = b.y1 + distance;

    let mut point = match side {
        CloneSide::Top => Point::new(b.x0, above),
        CloneSide::Right => Point::new(after, b.y0),
        CloneSide::Bottom => Point::new(b.x0, below),
        CloneSide::Left => Point::new(before, b.y0),
        CloneSide::TopLeft => Point::new(before, above),
        CloneSide::TopRight => Point::new(after, above),
        CloneSide::BottomLeft => Point::new(before, below),
        CloneSide::BottomRight => Point::new(after, below),
    };

    let rotation = shape.rotation();
    if rotation != 0.0 {
        let half = Vec2::new(w / 2.0, h / 2.0);
        let rotated_center = rot_with(point + half, shape.center(), rotation);
        point = rotated_center - half;
    }

    let mut clone = shape.clone();
    clone.regenerate_id();
    clone.translate_to(point);
    if clone.has_text() {
        clone.clear_text();
    }
    Some(clone)
}

/// Where a clone-paint stamp would land for `point`.
///
/// The grid cell is the selection's common bounds grown by `margin`, and the
/// grid is anchored at the selection's own center. Returns the cell center
/// and the cell bounds centered on it.
pub fn clone_paint_cell(
    store: &impl ShapeStore,
    point: Point,
    margin: f64,
) -> Option<(Point, kurbo::Rect)> {
    let selected = store.selected_ids();
    let bounds = expand_bounds(store.common_bounds(&selected)?, margin);
    let center = bounds.center();
    let (w, h) = (bounds.width(), bounds.height());
    if w <= 0.0 || h <= 0.0 {
        return None;
    }

    let grid_point = Point::new(
        center.x + w * ((point.x + w / 2.0 - center.x) / w).floor(),
        center.y + h * ((point.y + h / 2.0 - center.y) / h).floor(),
    );
    Some((grid_point, center_bounds(bounds, grid_point)))
}

/// Stamp the selection into the grid cell under `point`, unless any shape
/// already touches that cell. Returns the ids of the new copies.
pub fn clone_paint(store: &mut impl ShapeStore, point: Point, margin: f64) -> Vec<ShapeId> {
    let Some((grid_point, cell)) = clone_paint_cell(store, point, margin) else {
        return Vec::new();
    };

    let hit = store.shapes().iter().any(|shape| shape.hit_test_bounds(cell));
    if hit {
        log::debug!("clone paint skipped occupied cell at {grid_point:?}");
        return Vec::new();
    }

    let selected = store.selected_ids();
    let copies = store.duplicate(&selected, grid_point);
    log::debug!("clone paint stamped {} shapes at {grid_point:?}", copies.len());
    copies
}
