//! BendInk Core Library
//!
//! Arrow geometry and pointer interaction for the BendInk drawing surface.
//! Rendering hosts feed [`input::Event`]s into a [`SelectTool`] together with
//! a [`ShapeStore`], then draw whatever the store holds.

pub mod cache;
pub mod config;
pub mod geometry;
pub mod input;
pub mod intersect;
pub mod outline;
pub mod rng;
pub mod selection;
pub mod session;
pub mod shapes;
pub mod store;
pub mod style;
pub mod tools;

pub use cache::GeometryCache;
pub use config::{ConfigError, ConfigResult, InteractionConfig};
pub use input::{Event, Key, Modifiers, Target};
pub use outline::{PressureOutliner, StrokeOutliner};
pub use selection::{BoundsHandle, Corner, Edge};
pub use session::{Session, SessionKind};
pub use shapes::{Arrow, Ellipse, Rectangle, Shape, ShapeId, ShapeUtil, Sticky};
pub use store::{Document, ShapeStore};
pub use style::ShapeStyle;
pub use tools::{CloneSide, Effect, SelectTool, Status, ToolKind};
