//! Draggable shape handles and arrow end decorations.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Identifies a handle on a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandleId {
    Start,
    End,
    Bend,
}

impl HandleId {
    /// Parse a handle name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(HandleId::Start),
            "end" => Some(HandleId::End),
            "bend" => Some(HandleId::Bend),
            _ => None,
        }
    }

    /// The endpoint on the other side of the chord, for `Start` and `End`.
    pub fn opposite(self) -> Option<Self> {
        match self {
            HandleId::Start => Some(HandleId::End),
            HandleId::End => Some(HandleId::Start),
            HandleId::Bend => None,
        }
    }
}

/// A handle in shape-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handle {
    pub id: HandleId,
    /// Draw order among the shape's handles.
    pub index: u32,
    pub point: Point,
    /// Whether the handle may attach to another shape.
    pub can_bind: bool,
}

impl Handle {
    pub fn new(id: HandleId, index: u32, point: Point, can_bind: bool) -> Self {
        Self {
            id,
            index,
            point,
            can_bind,
        }
    }
}

/// A proposed new position for one handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandleChange {
    pub id: HandleId,
    pub point: Point,
}

impl HandleChange {
    pub fn new(id: HandleId, point: Point) -> Self {
        Self { id, point }
    }
}

/// Marker drawn at an arrow end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Decoration {
    Arrow,
}

/// Optional decorations at each end of an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decorations {
    pub start: Option<Decoration>,
    pub end: Option<Decoration>,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            start: None,
            end: Some(Decoration::Arrow),
        }
    }
}

impl Decorations {
    /// Decoration at the end named by `id`. The bend has none.
    pub fn get(&self, id: HandleId) -> Option<Decoration> {
        match id {
            HandleId::Start => self.start,
            HandleId::End => self.end,
            HandleId::Bend => None,
        }
    }

    /// Flip the arrowhead at `id` on or off. The bend is ignored.
    pub fn toggle(&mut self, id: HandleId) {
        let slot = match id {
            HandleId::Start => &mut self.start,
            HandleId::End => &mut self.end,
            HandleId::Bend => return,
        };
        *slot = match slot {
            Some(_) => None,
            None => Some(Decoration::Arrow),
        };
    }
}
