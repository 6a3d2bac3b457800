//! Input events fed to the interaction machine.

use crate::selection::BoundsHandle;
use crate::shapes::{HandleId, ShapeId};
use crate::tools::CloneSide;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u64 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Ctrl or Cmd, whichever the platform uses for commands.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the machine reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    Other(String),
}

impl Key {
    /// Map a key name as reported by the platform.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            other => Key::Other(other.to_string()),
        }
    }
}

/// What the pointer is over when a press or double-click happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Canvas,
    Shape(ShapeId),
    Handle(ShapeId, HandleId),
    BoundsHandle(BoundsHandle),
    /// One of the clone buttons drawn around a single selected shape.
    Clone(ShapeId, CloneSide),
}

/// Input event in page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PointerDown {
        point: Point,
        target: Target,
        modifiers: Modifiers,
    },
    PointerMove {
        point: Point,
        modifiers: Modifiers,
    },
    PointerUp {
        point: Point,
        modifiers: Modifiers,
    },
    DoubleClick {
        point: Point,
        target: Target,
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    /// Abort the current gesture.
    Cancel,
    PinchStart,
    PinchEnd,
}

/// Turns raw presses into double-clicks.
///
/// Timestamps are supplied by the caller in milliseconds so the tracker stays
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_click: Option<(u64, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press; returns true when it completes a double-click.
    pub fn press(&mut self, point: Point, time_ms: u64) -> bool {
        if let Some((last_time, last_pos)) = self.last_click {
            let elapsed = time_ms.saturating_sub(last_time);
            if elapsed < DOUBLE_CLICK_TIME_MS && last_pos.distance(point) < DOUBLE_CLICK_DISTANCE {
                // Reset so a triple click does not count twice
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((time_ms, point));
        false
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name("Backspace"), Key::Backspace);
        assert_eq!(Key::from_name("a"), Key::Other("a".to_string()));
    }

    #[test]
    fn test_command_modifier() {
        let mods = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(mods.command());
        assert!(!Modifiers::shift().command());
    }

    #[test]
    fn test_double_click_detection() {
        let mut clicks = ClickTracker::new();
        let pos = Point::new(100.0, 100.0);
        assert!(!clicks.press(pos, 1000));
        assert!(clicks.press(pos, 1200));
        // Third click starts a new sequence.
        assert!(!clicks.press(pos, 1300));
    }

    #[test]
    fn test_double_click_too_far() {
        let mut clicks = ClickTracker::new();
        assert!(!clicks.press(Point::new(100.0, 100.0), 0));
        assert!(!clicks.press(Point::new(200.0, 200.0), 100));
    }

    #[test]
    fn test_double_click_too_slow() {
        let mut clicks = ClickTracker::new();
        let pos = Point::new(10.0, 10.0);
        assert!(!clicks.press(pos, 0));
        assert!(!clicks.press(pos, 800));
    }
}
