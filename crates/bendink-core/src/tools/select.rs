//! The select tool's interaction state machine.
//!
//! `SelectTool::handle` takes one input event plus the shape store and returns
//! the effects of the transition. Every gesture starts and ends in
//! [`Status::Idle`]; pointer-up commits the active session and cancel discards
//! it.

use super::{CloneSide, ToolKind, get_shape_clone};
use crate::config::InteractionConfig;
use crate::geometry::{dist, rot_with};
use crate::input::{Event, Key, Modifiers, Target};
use crate::selection::{BoundsHandle, Corner, hit_test_bounds_handles};
use crate::session::Session;
use crate::shapes::{HandleId, Shape, ShapeId};
use crate::store::ShapeStore;
use crate::style::ShapeStyle;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// The machine's current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    #[default]
    Idle,
    Creating,
    Pinching,
    PointingCanvas,
    PointingHandle,
    PointingBounds,
    PointingClone,
    TranslatingClone,
    PointingBoundsHandle,
    TranslatingHandle,
    Translating,
    Transforming,
    Rotating,
    Brushing,
    GridCloning,
    ClonePainting,
}

impl Status {
    /// Statuses that own a session.
    pub fn has_session(self) -> bool {
        matches!(
            self,
            Status::Creating
                | Status::TranslatingClone
                | Status::TranslatingHandle
                | Status::Translating
                | Status::Transforming
                | Status::Rotating
                | Status::Brushing
                | Status::GridCloning
                | Status::ClonePainting
        )
    }
}

/// Observable outcome of one transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StatusChanged { from: Status, to: Status },
    SelectionChanged(Vec<ShapeId>),
    Created(ShapeId),
    Updated(Vec<ShapeId>),
    Duplicated(Vec<ShapeId>),
    Deleted(Vec<ShapeId>),
    /// Shapes finalized by a completed gesture.
    Committed(Vec<ShapeId>),
    Cancelled,
}

/// Select tool state machine.
#[derive(Debug, Clone)]
pub struct SelectTool {
    status: Status,
    tool: ToolKind,
    config: InteractionConfig,
    /// Style applied to shapes created by drawing tools.
    pub style: ShapeStyle,
    session: Option<Session>,
    origin: Point,
    pointed_id: Option<ShapeId>,
    pointed_handle: Option<HandleId>,
    pointed_bounds_handle: Option<BoundsHandle>,
    /// Clone created from a clone button, not yet owned by a session.
    pending_clone: Option<ShapeId>,
    selection_before: Vec<ShapeId>,
    /// Last selection reported through [`Effect::SelectionChanged`].
    reported_selection: Vec<ShapeId>,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl SelectTool {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            status: Status::Idle,
            tool: ToolKind::Select,
            config,
            style: ShapeStyle::default(),
            session: None,
            origin: Point::ZERO,
            pointed_id: None,
            pointed_handle: None,
            pointed_bounds_handle: None,
            pending_clone: None,
            selection_before: Vec::new(),
            reported_selection: Vec::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch the active tool. Only takes effect while idle.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.status == Status::Idle {
            self.tool = tool;
        } else {
            log::debug!("tool change to {tool:?} ignored while {:?}", self.status);
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Classify what lies under `point`.
    ///
    /// Handles of selected shapes are tested first, then the selection's
    /// bounds handles, then shapes front to back.
    pub fn target_at(&self, store: &impl ShapeStore, point: Point) -> Target {
        let tolerance = self.config.handle_hit_tolerance;
        let selected = store.selected_ids();

        for id in &selected {
            let Some(shape) = store.shape(*id) else {
                continue;
            };
            let (origin, center, rotation) = (shape.point(), shape.center(), shape.rotation());
            let hit = shape.handles().into_iter().find(|h| {
                let page = rot_with(origin + h.point.to_vec2(), center, rotation);
                dist(page, point) <= tolerance
            });
            if let Some(handle) = hit {
                return Target::Handle(*id, handle.id);
            }
        }

        // A lone arrow is edited through its own handles
        let frame = match selected.as_slice() {
            [] => None,
            [id] => store
                .shape(*id)
                .filter(|s| !s.is_arrow())
                .map(|s| (s.bounds(), s.rotation())),
            _ => store.common_bounds(&selected).map(|b| (b, 0.0)),
        };
        if let Some((bounds, rotation)) = frame {
            if let Some(handle) = hit_test_bounds_handles(bounds, rotation, point, tolerance) {
                return Target::BoundsHandle(handle);
            }
        }

        match store.shapes_at_point(point, tolerance).first() {
            Some(id) => Target::Shape(*id),
            None => Target::Canvas,
        }
    }

    /// Feed one event through the machine.
    pub fn handle(&mut self, store: &mut impl ShapeStore, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::PointerDown {
                point,
                target,
                modifiers,
            } => self.on_pointer_down(store, point, target, modifiers, &mut effects),
            Event::PointerMove { point, modifiers } => {
                self.on_pointer_move(store, point, modifiers, &mut effects)
            }
            Event::PointerUp { point: _, modifiers } => {
                self.on_pointer_up(store, modifiers, &mut effects)
            }
            Event::DoubleClick { target, .. } => self.on_double_click(store, target, &mut effects),
            Event::KeyDown { key, .. } => self.on_key_down(store, key, &mut effects),
            Event::Cancel => self.cancel(store, &mut effects),
            Event::PinchStart => {
                self.cancel(store, &mut effects);
                self.set_status(Status::Pinching, &mut effects);
            }
            Event::PinchEnd => {
                if self.status == Status::Pinching {
                    self.set_status(Status::Idle, &mut effects);
                }
            }
        }
        effects
    }

    fn on_pointer_down(
        &mut self,
        store: &mut impl ShapeStore,
        point: Point,
        target: Target,
        modifiers: Modifiers,
        effects: &mut Vec<Effect>,
    ) {
        match self.status {
            Status::Pinching => return,
            Status::Idle => {}
            // A press arriving mid-gesture closes the previous one first
            _ => {
                self.complete(store, effects);
                self.set_status(Status::Idle, effects);
            }
        }

        self.reset_pointed();
        self.origin = point;
        self.selection_before = store.selected_ids();
        self.reported_selection = self.selection_before.clone();

        if modifiers.alt && modifiers.shift && !self.selection_before.is_empty() {
            let mut session = Session::clone_paint(&*store, point);
            let copies = session.update(store, point, modifiers, &self.config);
            self.session = Some(session);
            self.set_status(Status::ClonePainting, effects);
            if !copies.is_empty() {
                effects.push(Effect::Duplicated(copies));
            }
            self.sync_selection(&*store, effects);
            return;
        }

        match target {
            Target::Canvas => {
                if !self.tool.creates_shapes() && !modifiers.shift {
                    store.set_selected(Vec::new());
                }
                self.set_status(Status::PointingCanvas, effects);
            }
            Target::Shape(id) => {
                if store.shape(id).is_none() {
                    log::debug!("pointer down on unknown shape {id}");
                    return;
                }
                self.pointed_id = Some(id);
                if modifiers.alt && store.is_selected(id) {
                    self.set_status(Status::PointingClone, effects);
                    return;
                }
                if modifiers.shift {
                    let mut ids = store.selected_ids();
                    if ids.contains(&id) {
                        ids.retain(|s| *s != id);
                    } else {
                        ids.push(id);
                    }
                    store.set_selected(ids);
                } else if !store.is_selected(id) {
                    store.set_selected(vec![id]);
                }
                self.set_status(Status::PointingBounds, effects);
            }
            Target::Handle(id, handle) => {
                let has_handle = store.shape(id).is_some_and(|s| s.has_handle(handle));
                if !has_handle {
                    log::debug!("pointer down on unknown handle {handle:?} of {id}");
                    return;
                }
                if !store.is_selected(id) {
                    store.set_selected(vec![id]);
                }
                self.pointed_id = Some(id);
                self.pointed_handle = Some(handle);
                self.set_status(Status::PointingHandle, effects);
            }
            Target::BoundsHandle(handle) => {
                if self.selection_before.is_empty() {
                    log::debug!("bounds handle pressed with nothing selected");
                    return;
                }
                self.pointed_bounds_handle = Some(handle);
                self.set_status(Status::PointingBoundsHandle, effects);
            }
            Target::Clone(id, side) => self.on_clone_button(store, id, side, effects),
        }
        self.sync_selection(&*store, effects);
    }

    fn on_clone_button(
        &mut self,
        store: &mut impl ShapeStore,
        id: ShapeId,
        side: CloneSide,
        effects: &mut Vec<Effect>,
    ) {
        let Some(clone) = get_shape_clone(&*store, id, side, self.config.cloning_distance) else {
            return;
        };
        let clone_id = clone.id();
        store.add(clone);
        store.set_selected(vec![clone_id]);
        effects.push(Effect::Created(clone_id));
        self.pending_clone = Some(clone_id);
        self.pointed_id = Some(clone_id);
        self.set_status(Status::PointingClone, effects);
    }

    fn on_pointer_move(
        &mut self,
        store: &mut impl ShapeStore,
        point: Point,
        modifiers: Modifiers,
        effects: &mut Vec<Effect>,
    ) {
        let dragging = dist(self.origin, point) > self.config.dead_zone;
        match self.status {
            Status::Idle | Status::Pinching => return,
            Status::PointingCanvas if dragging => {
                if self.tool.creates_shapes() {
                    self.begin_creating(store, effects);
                } else {
                    self.session = Some(Session::brush(&*store, self.origin, modifiers.shift));
                    self.set_status(Status::Brushing, effects);
                }
            }
            Status::PointingHandle if dragging => {
                let (Some(id), Some(handle)) = (self.pointed_id, self.pointed_handle) else {
                    return;
                };
                let Some(session) = Session::handle(&*store, id, handle, self.origin) else {
                    return;
                };
                self.session = Some(session);
                self.set_status(Status::TranslatingHandle, effects);
            }
            Status::PointingBounds if dragging => {
                let ids = store.selected_ids();
                if ids.is_empty() {
                    return;
                }
                self.session = Some(Session::translate(&*store, ids, self.origin));
                self.set_status(Status::Translating, effects);
            }
            Status::PointingBoundsHandle if dragging => {
                let Some(handle) = self.pointed_bounds_handle else {
                    return;
                };
                let ids = store.selected_ids();
                let (session, status) = match handle {
                    BoundsHandle::Rotate => (Session::rotate(&*store, ids, self.origin), Status::Rotating),
                    _ => (
                        Session::transform(&*store, ids, handle, self.origin),
                        Status::Transforming,
                    ),
                };
                let Some(session) = session else {
                    return;
                };
                self.session = Some(session);
                self.set_status(status, effects);
            }
            Status::PointingClone if dragging => {
                let ids = store.selected_ids();
                let (session, status) = if let Some(clone_id) = self.pending_clone.take() {
                    (
                        Some(Session::translate(&*store, ids, self.origin).creating(clone_id)),
                        Status::TranslatingClone,
                    )
                } else if modifiers.command() {
                    (
                        Session::grid_clone(&*store, ids, self.origin, self.config.cloning_distance),
                        Status::GridCloning,
                    )
                } else {
                    let session = Session::translate_clone(store, &ids, self.origin);
                    effects.push(Effect::Duplicated(session.created().to_vec()));
                    (Some(session), Status::TranslatingClone)
                };
                let Some(session) = session else {
                    return;
                };
                self.session = Some(session);
                self.set_status(status, effects);
            }
            _ => {}
        }

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let changed = session.update(store, point, modifiers, &self.config);
        match self.status {
            Status::GridCloning | Status::ClonePainting if !changed.is_empty() => {
                effects.push(Effect::Duplicated(changed))
            }
            _ if !changed.is_empty() => effects.push(Effect::Updated(changed)),
            _ => {}
        }
        self.sync_selection(&*store, effects);
    }

    fn begin_creating(&mut self, store: &mut impl ShapeStore, effects: &mut Vec<Effect>) {
        let Some(shape) = self.tool.create_shape(self.origin, self.style) else {
            return;
        };
        let id = shape.id();
        let tool = self.tool;
        store.add(shape);
        store.set_selected(vec![id]);
        effects.push(Effect::Created(id));

        let session = match tool {
            ToolKind::Arrow => Session::handle(&*store, id, HandleId::End, self.origin),
            ToolKind::Rectangle | ToolKind::Ellipse => Session::transform(
                &*store,
                vec![id],
                BoundsHandle::Corner(Corner::BottomRight),
                self.origin,
            ),
            ToolKind::Sticky => Some(Session::translate(&*store, vec![id], self.origin)),
            ToolKind::Select => None,
        };
        match session {
            Some(session) => {
                self.session = Some(session.creating(id));
                self.set_status(Status::Creating, effects);
            }
            None => {
                store.remove(id);
                log::debug!("creation aborted for {tool:?}");
            }
        }
    }

    fn on_pointer_up(
        &mut self,
        store: &mut impl ShapeStore,
        modifiers: Modifiers,
        effects: &mut Vec<Effect>,
    ) {
        match self.status {
            Status::Idle => return,
            Status::PointingBounds => {
                // Clicking one member of a multi-selection narrows to it
                if let Some(id) = self.pointed_id {
                    let selected = store.selected_ids();
                    if !modifiers.shift
                        && selected.len() > 1
                        && self.selection_before.contains(&id)
                    {
                        store.set_selected(vec![id]);
                    }
                }
            }
            Status::PointingClone => {
                if let Some(clone_id) = self.pending_clone.take() {
                    if let Some(done) = store.shape(clone_id).map(Shape::on_session_complete) {
                        store.update(done);
                        effects.push(Effect::Committed(vec![clone_id]));
                    }
                }
            }
            status if status.has_session() => {
                let was_creating = status == Status::Creating;
                self.complete(store, effects);
                if was_creating {
                    self.tool = ToolKind::Select;
                }
            }
            _ => {}
        }
        self.set_status(Status::Idle, effects);
        self.sync_selection(&*store, effects);
        self.reset_pointed();
    }

    fn on_double_click(&mut self, store: &mut impl ShapeStore, target: Target, effects: &mut Vec<Effect>) {
        if self.session.is_some() {
            return;
        }
        let Target::Handle(id, handle) = target else {
            return;
        };
        let Some(shape) = store.shape(id) else {
            log::debug!("double click on unknown shape {id}");
            return;
        };
        if !shape.has_handle(handle) {
            log::debug!("double click on unknown handle {handle:?} of {id}");
            return;
        }
        let next = shape.on_double_click_handle(handle).on_session_complete();
        store.update(next);
        effects.push(Effect::Committed(vec![id]));
    }

    fn on_key_down(&mut self, store: &mut impl ShapeStore, key: Key, effects: &mut Vec<Effect>) {
        match key {
            Key::Escape => self.cancel(store, effects),
            Key::Delete | Key::Backspace if self.status == Status::Idle => {
                let ids = store.selected_ids();
                if ids.is_empty() {
                    return;
                }
                for id in &ids {
                    store.remove(*id);
                }
                effects.push(Effect::Deleted(ids));
                store.set_selected(Vec::new());
                self.selection_before = Vec::new();
                self.reported_selection = Vec::new();
                effects.push(Effect::SelectionChanged(Vec::new()));
            }
            other => log::debug!("key {other:?} ignored while {:?}", self.status),
        }
    }

    /// Discard the gesture in progress and return to idle.
    fn cancel(&mut self, store: &mut impl ShapeStore, effects: &mut Vec<Effect>) {
        match self.status {
            Status::Idle => return,
            Status::Pinching => {
                self.set_status(Status::Idle, effects);
                return;
            }
            _ => {}
        }
        if let Some(session) = self.session.take() {
            session.cancel(store);
        }
        if let Some(clone_id) = self.pending_clone.take() {
            store.remove(clone_id);
        }
        store.set_selected(self.selection_before.clone());
        effects.push(Effect::Cancelled);
        self.set_status(Status::Idle, effects);
        self.sync_selection(&*store, effects);
        self.reset_pointed();
    }

    /// Commit the active session, if any.
    fn complete(&mut self, store: &mut impl ShapeStore, effects: &mut Vec<Effect>) {
        if let Some(session) = self.session.take() {
            let ids = session.complete(store);
            effects.push(Effect::Committed(ids));
        }
        if let Some(clone_id) = self.pending_clone.take() {
            if let Some(done) = store.shape(clone_id).map(Shape::on_session_complete) {
                store.update(done);
                effects.push(Effect::Committed(vec![clone_id]));
            }
        }
    }

    fn set_status(&mut self, to: Status, effects: &mut Vec<Effect>) {
        if self.status == to {
            return;
        }
        let from = self.status;
        log::debug!("select tool: {from:?} -> {to:?}");
        self.status = to;
        effects.push(Effect::StatusChanged { from, to });
    }

    /// Report the selection if it moved since it was last reported.
    fn sync_selection(&mut self, store: &impl ShapeStore, effects: &mut Vec<Effect>) {
        let now = store.selected_ids();
        if now != self.reported_selection {
            self.reported_selection = now.clone();
            effects.push(Effect::SelectionChanged(now));
        }
    }

    fn reset_pointed(&mut self) {
        self.pointed_id = None;
        self.pointed_handle = None;
        self.pointed_bounds_handle = None;
    }
}
