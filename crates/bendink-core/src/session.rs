//! In-progress gestures and their commit/cancel semantics.
//!
//! A session snapshots the shapes it touches when it starts. Updates are
//! always recomputed from those snapshots, so a drag never accumulates
//! rounding error, and cancelling restores them verbatim.

use crate::config::InteractionConfig;
use crate::geometry::rot_with;
use crate::input::Modifiers;
use crate::selection::{BoundsHandle, relative_bounds, rotation_delta, transformed_bounds};
use crate::shapes::{HandleChange, HandleId, Shape, ShapeId};
use crate::store::ShapeStore;
use crate::tools::{clone_paint, clone_paint_cell};
use kurbo::{Point, Rect, Vec2};
use std::collections::{HashMap, HashSet};

/// What a session does with pointer movement.
#[derive(Debug, Clone)]
pub enum SessionKind {
    /// Move shapes by the pointer delta.
    Translate,
    /// Drag one handle of one shape.
    Handle { id: ShapeId, handle: HandleId, start: Point },
    /// Resize the selection box from one of its handles.
    Transform { handle: BoundsHandle, initial_bounds: Rect },
    /// Rotate shapes about the selection center.
    Rotate { center: Point },
    /// Rubber-band selection.
    Brush { additive: bool, initial_selection: Vec<ShapeId> },
    /// Fill a grid of copies between the source and the pointer.
    GridClone {
        sources: Vec<ShapeId>,
        center: Point,
        cell: Vec2,
        copies: HashMap<(i64, i64), Vec<ShapeId>>,
    },
    /// Stamp copies into each free grid cell the pointer enters.
    ClonePaint { visited: HashSet<(i64, i64)> },
}

/// The single in-progress gesture.
#[derive(Debug, Clone)]
pub struct Session {
    kind: SessionKind,
    origin: Point,
    /// Shapes as they were when the session began.
    initial: HashMap<ShapeId, Shape>,
    /// Ids in the order the gesture manipulates them.
    ids: Vec<ShapeId>,
    /// Shapes that did not exist before the session.
    created: Vec<ShapeId>,
}

impl Session {
    fn new(store: &impl ShapeStore, kind: SessionKind, origin: Point, ids: Vec<ShapeId>) -> Self {
        let initial = ids
            .iter()
            .filter_map(|id| store.shape(*id).map(|s| (*id, s.clone())))
            .collect();
        log::debug!("session begin: {} on {} shapes", kind.name(), ids.len());
        Self {
            kind,
            origin,
            initial,
            ids,
            created: Vec::new(),
        }
    }

    pub fn translate(store: &impl ShapeStore, ids: Vec<ShapeId>, origin: Point) -> Self {
        Self::new(store, SessionKind::Translate, origin, ids)
    }

    /// Duplicate `ids` in place and translate the copies.
    pub fn translate_clone(store: &mut impl ShapeStore, ids: &[ShapeId], origin: Point) -> Self {
        let copies = match store.common_bounds(ids) {
            Some(bounds) => store.duplicate(ids, bounds.center()),
            None => Vec::new(),
        };
        let mut session = Self::new(&*store, SessionKind::Translate, origin, copies.clone());
        session.created = copies;
        session
    }

    /// Drag a handle. Unknown shapes or handles yield `None`.
    pub fn handle(
        store: &impl ShapeStore,
        id: ShapeId,
        handle: HandleId,
        origin: Point,
    ) -> Option<Self> {
        let shape = store.shape(id)?;
        let start = shape.handles().into_iter().find(|h| h.id == handle)?.point;
        Some(Self::new(store, SessionKind::Handle { id, handle, start }, origin, vec![id]))
    }

    pub fn transform(
        store: &impl ShapeStore,
        ids: Vec<ShapeId>,
        handle: BoundsHandle,
        origin: Point,
    ) -> Option<Self> {
        let initial_bounds = store.common_bounds(&ids)?;
        Some(Self::new(store, SessionKind::Transform { handle, initial_bounds }, origin, ids))
    }

    pub fn rotate(store: &impl ShapeStore, ids: Vec<ShapeId>, origin: Point) -> Option<Self> {
        let center = store.common_bounds(&ids)?.center();
        Some(Self::new(store, SessionKind::Rotate { center }, origin, ids))
    }

    pub fn brush(store: &impl ShapeStore, origin: Point, additive: bool) -> Self {
        let initial_selection = store.selected_ids();
        Self::new(store, SessionKind::Brush { additive, initial_selection }, origin, Vec::new())
    }

    pub fn grid_clone(
        store: &impl ShapeStore,
        ids: Vec<ShapeId>,
        origin: Point,
        gap: f64,
    ) -> Option<Self> {
        let bounds = store.common_bounds(&ids)?;
        let cell = Vec2::new(bounds.width() + gap, bounds.height() + gap);
        let kind = SessionKind::GridClone {
            sources: ids,
            center: bounds.center(),
            cell,
            copies: HashMap::new(),
        };
        Some(Self::new(store, kind, origin, Vec::new()))
    }

    pub fn clone_paint(store: &impl ShapeStore, origin: Point) -> Self {
        let kind = SessionKind::ClonePaint {
            visited: HashSet::new(),
        };
        Self::new(store, kind, origin, store.selected_ids())
    }

    /// Session editing a shape that was just added to the store.
    pub fn creating(mut self, id: ShapeId) -> Self {
        if !self.created.contains(&id) {
            self.created.push(id);
        }
        self
    }

    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Shapes created during this session.
    pub fn created(&self) -> &[ShapeId] {
        &self.created
    }

    /// Apply the pointer position. Returns the ids of shapes that changed.
    pub fn update(
        &mut self,
        store: &mut impl ShapeStore,
        point: Point,
        modifiers: Modifiers,
        config: &InteractionConfig,
    ) -> Vec<ShapeId> {
        let mut delta = point - self.origin;
        match &mut self.kind {
            SessionKind::Translate => {
                if modifiers.shift {
                    delta = lock_axis(delta);
                }
                for id in &self.ids {
                    if let Some(initial) = self.initial.get(id) {
                        store.update(initial.translated(delta));
                    }
                }
                self.ids.clone()
            }
            SessionKind::Handle { id, handle, start } => {
                let (id, handle, start) = (*id, *handle, *start);
                let Some(initial) = self.initial.get(&id) else {
                    return Vec::new();
                };
                // Handles live in the shape's unrotated frame
                let local = rot_with(delta.to_point(), Point::ZERO, -initial.rotation()).to_vec2();
                let change = HandleChange::new(handle, start + local);
                store.update(initial.on_handle_change_snapped(
                    &[change],
                    modifiers,
                    config.angle_snap_segments,
                ));
                vec![id]
            }
            SessionKind::Transform {
                handle,
                initial_bounds,
            } => {
                let (bounds, info) = transformed_bounds(*initial_bounds, *handle, delta, modifiers.shift);
                let (flip_x, flip_y) = (info.scale_x < 0.0, info.scale_y < 0.0);
                for id in &self.ids {
                    if let Some(initial) = self.initial.get(id) {
                        let shape_bounds =
                            relative_bounds(bounds, *initial_bounds, initial.bounds(), flip_x, flip_y);
                        store.update(initial.transform(initial, shape_bounds, &info));
                    }
                }
                self.ids.clone()
            }
            SessionKind::Rotate { center } => {
                let snap = modifiers.shift.then_some(config.rotate_snap_segments);
                let angle = rotation_delta(*center, self.origin, point, snap);
                for id in &self.ids {
                    if let Some(initial) = self.initial.get(id) {
                        store.update(initial.rotate_about(*center, angle));
                    }
                }
                self.ids.clone()
            }
            SessionKind::Brush {
                additive,
                initial_selection,
            } => {
                let brush = Rect::from_points(self.origin, point);
                let mut selected = if *additive {
                    initial_selection.clone()
                } else {
                    Vec::new()
                };
                for id in store.shapes_in_rect(brush) {
                    if !selected.contains(&id) {
                        selected.push(id);
                    }
                }
                store.set_selected(selected);
                Vec::new()
            }
            SessionKind::GridClone {
                sources,
                center,
                cell,
                copies,
            } => {
                let wanted = grid_cells(delta, *cell);
                let mut changed = Vec::new();

                let stale: Vec<(i64, i64)> =
                    copies.keys().filter(|k| !wanted.contains(*k)).copied().collect();
                for key in stale {
                    for id in copies.remove(&key).unwrap_or_default() {
                        store.remove(id);
                        self.created.retain(|c| *c != id);
                    }
                }

                for key in wanted {
                    if copies.contains_key(&key) {
                        continue;
                    }
                    let target = *center
                        + Vec2::new(cell.x * key.0 as f64, cell.y * key.1 as f64);
                    let ids = store.duplicate(sources, target);
                    changed.extend(ids.iter().copied());
                    self.created.extend(ids.iter().copied());
                    copies.insert(key, ids);
                }
                // Keep the sources selected while the grid grows
                store.set_selected(sources.clone());
                changed
            }
            SessionKind::ClonePaint { visited } => {
                let Some((grid_point, _)) =
                    clone_paint_cell(&*store, point, config.clone_paint_margin)
                else {
                    return Vec::new();
                };
                let key = (grid_point.x.round() as i64, grid_point.y.round() as i64);
                if !visited.insert(key) {
                    return Vec::new();
                }
                let copies = clone_paint(store, point, config.clone_paint_margin);
                self.created.extend(copies.iter().copied());
                copies
            }
        }
    }

    /// Finalize every shape the session touched. Returns their ids.
    pub fn complete(self, store: &mut impl ShapeStore) -> Vec<ShapeId> {
        let mut ids: Vec<ShapeId> = self.ids.clone();
        for id in &self.created {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids.retain(|id| store.shape(*id).is_some());
        for id in &ids {
            if let Some(shape) = store.shape(*id) {
                let done = shape.on_session_complete();
                store.update(done);
            }
        }
        log::debug!("session complete: {} on {} shapes", self.kind.name(), ids.len());
        ids
    }

    /// Restore snapshots and remove anything the session created.
    pub fn cancel(self, store: &mut impl ShapeStore) {
        for id in &self.created {
            store.remove(*id);
        }
        for (id, shape) in self.initial {
            if !self.created.contains(&id) {
                store.update(shape);
            }
        }
        if let SessionKind::Brush {
            initial_selection, ..
        } = self.kind
        {
            store.set_selected(initial_selection);
        }
        log::debug!("session cancelled");
    }
}

impl SessionKind {
    pub fn name(&self) -> &'static str {
        match self {
            SessionKind::Translate => "translate",
            SessionKind::Handle { .. } => "handle",
            SessionKind::Transform { .. } => "transform",
            SessionKind::Rotate { .. } => "rotate",
            SessionKind::Brush { .. } => "brush",
            SessionKind::GridClone { .. } => "grid-clone",
            SessionKind::ClonePaint { .. } => "clone-paint",
        }
    }
}

/// Keep only the dominant axis of a drag.
fn lock_axis(delta: Vec2) -> Vec2 {
    if delta.x.abs() > delta.y.abs() {
        Vec2::new(delta.x, 0.0)
    } else {
        Vec2::new(0.0, delta.y)
    }
}

/// Grid cells covered by a drag of `delta`, excluding the source cell.
fn grid_cells(delta: Vec2, cell: Vec2) -> Vec<(i64, i64)> {
    if cell.x <= 0.0 || cell.y <= 0.0 {
        return Vec::new();
    }
    let cols = (delta.x / cell.x).round() as i64;
    let rows = (delta.y / cell.y).round() as i64;
    let mut cells = Vec::new();
    for c in range_to(cols) {
        for r in range_to(rows) {
            if (c, r) != (0, 0) {
                cells.push((c, r));
            }
        }
    }
    cells
}

fn range_to(n: i64) -> std::ops::RangeInclusive<i64> {
    if n < 0 { n..=0 } else { 0..=n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Corner;
    use crate::shapes::{Arrow, Rectangle, ShapeUtil};
    use crate::store::Document;

    fn setup() -> (Document, ShapeId) {
        let mut doc = Document::new();
        let rect = Rectangle::new(Point::ZERO, 100.0, 100.0);
        let id = rect.id();
        doc.add(rect.into());
        doc.set_selected(vec![id]);
        (doc, id)
    }

    fn config() -> InteractionConfig {
        InteractionConfig::default()
    }

    #[test]
    fn test_translate_and_cancel() {
        let (mut doc, id) = setup();
        let mut session = Session::translate(&doc, vec![id], Point::ZERO);
        session.update(&mut doc, Point::new(30.0, 40.0), Modifiers::default(), &config());
        assert_eq!(doc.bounds(id), Some(Rect::new(30.0, 40.0, 130.0, 140.0)));

        session.cancel(&mut doc);
        assert_eq!(doc.bounds(id), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn test_translate_shift_locks_axis() {
        let (mut doc, id) = setup();
        let mut session = Session::translate(&doc, vec![id], Point::ZERO);
        session.update(&mut doc, Point::new(30.0, 5.0), Modifiers::shift(), &config());
        assert_eq!(doc.bounds(id), Some(Rect::new(30.0, 0.0, 130.0, 100.0)));
    }

    #[test]
    fn test_translate_clone_cancel_removes_copies() {
        let (mut doc, id) = setup();
        let mut session = Session::translate_clone(&mut doc, &[id], Point::ZERO);
        assert_eq!(doc.len(), 2);
        session.update(&mut doc, Point::new(200.0, 0.0), Modifiers::default(), &config());
        assert_eq!(doc.bounds(id), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));

        session.cancel(&mut doc);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_handle_session_commits_rebased_arrow() {
        let mut doc = Document::new();
        let arrow = Arrow::new(Point::new(10.0, 10.0), Point::new(110.0, 10.0));
        let id = arrow.id();
        doc.add(arrow.into());

        let mut session = Session::handle(&doc, id, HandleId::Start, Point::new(10.0, 10.0)).unwrap();
        session.update(&mut doc, Point::new(-40.0, 10.0), Modifiers::default(), &config());
        let committed = session.complete(&mut doc);
        assert_eq!(committed, vec![id]);

        let Some(Shape::Arrow(arrow)) = doc.shape(id) else {
            panic!("arrow missing");
        };
        assert_eq!(arrow.point, Point::new(-40.0, 10.0));
        assert_eq!(arrow.start(), Point::ZERO);
        assert_eq!(arrow.end(), Point::new(150.0, 0.0));
    }

    #[test]
    fn test_handle_session_uses_configured_snap() {
        let mut doc = Document::new();
        let arrow = Arrow::new(Point::ZERO, Point::new(100.0, 0.0));
        let id = arrow.id();
        doc.add(arrow.into());
        let quarter_turns = InteractionConfig {
            angle_snap_segments: 4,
            ..InteractionConfig::default()
        };

        let mut session = Session::handle(&doc, id, HandleId::End, Point::new(100.0, 0.0)).unwrap();
        session.update(&mut doc, Point::new(100.0, 30.0), Modifiers::shift(), &quarter_turns);
        let end = doc.shape(id).and_then(Shape::as_arrow).map(|a| a.end());
        assert_eq!(end, Some(Point::new(104.0, 0.0)));
    }

    #[test]
    fn test_handle_session_unknown_handle() {
        let (doc, id) = setup();
        assert!(Session::handle(&doc, id, HandleId::Bend, Point::ZERO).is_none());
    }

    #[test]
    fn test_transform_session() {
        let (mut doc, id) = setup();
        let mut session = Session::transform(
            &doc,
            vec![id],
            BoundsHandle::Corner(Corner::BottomRight),
            Point::new(100.0, 100.0),
        )
        .unwrap();
        session.update(&mut doc, Point::new(150.0, 200.0), Modifiers::default(), &config());
        assert_eq!(doc.bounds(id), Some(Rect::new(0.0, 0.0, 150.0, 200.0)));
    }

    #[test]
    fn test_rotate_session() {
        let (mut doc, id) = setup();
        let mut session = Session::rotate(&doc, vec![id], Point::new(50.0, -10.0)).unwrap();
        session.update(&mut doc, Point::new(110.0, 50.0), Modifiers::default(), &config());
        let rotation = doc.shape(id).map(|s| s.rotation()).unwrap_or_default();
        assert!((rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_brush_selects_and_cancel_restores() {
        let (mut doc, id) = setup();
        let other = Rectangle::new(Point::new(300.0, 300.0), 10.0, 10.0);
        let other_id = other.id();
        doc.add(other.into());
        doc.set_selected(vec![other_id]);

        let mut session = Session::brush(&doc, Point::new(-10.0, -10.0), false);
        session.update(&mut doc, Point::new(50.0, 50.0), Modifiers::default(), &config());
        assert_eq!(doc.selected_ids(), vec![id]);

        session.cancel(&mut doc);
        assert_eq!(doc.selected_ids(), vec![other_id]);
    }

    #[test]
    fn test_grid_clone_grows_and_shrinks() {
        let (mut doc, id) = setup();
        let mut session = Session::grid_clone(&doc, vec![id], Point::ZERO, 20.0).unwrap();
        session.update(&mut doc, Point::new(240.0, 0.0), Modifiers::default(), &config());
        assert_eq!(doc.len(), 3);
        session.update(&mut doc, Point::new(120.0, 0.0), Modifiers::default(), &config());
        assert_eq!(doc.len(), 2);
        assert_eq!(session.created().len(), 1);
        assert_eq!(doc.selected_ids(), vec![id]);

        let committed = session.complete(&mut doc);
        assert_eq!(committed.len(), 1);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_clone_paint_session_cancel() {
        let (mut doc, _) = setup();
        let mut session = Session::clone_paint(&doc, Point::ZERO);
        let first = session.update(&mut doc, Point::new(200.0, 50.0), Modifiers::default(), &config());
        assert_eq!(first.len(), 1);
        let again = session.update(&mut doc, Point::new(210.0, 55.0), Modifiers::default(), &config());
        assert!(again.is_empty());
        session.cancel(&mut doc);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_grid_cells() {
        assert!(grid_cells(Vec2::new(10.0, 10.0), Vec2::new(100.0, 100.0)).is_empty());
        let cells = grid_cells(Vec2::new(-200.0, 100.0), Vec2::new(100.0, 100.0));
        assert_eq!(cells.len(), 5);
        assert!(cells.contains(&(-2, 1)));
    }
}
