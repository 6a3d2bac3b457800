//! Tool system: the select machine plus the shape-creation tools it hosts.

mod clone;
mod select;

pub use clone::{CloneSide, clone_paint, clone_paint_cell, get_shape_clone};
pub use select::{Effect, SelectTool, Status};

use crate::shapes::{Arrow, Ellipse, Rectangle, Shape, Sticky};
use crate::style::ShapeStyle;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Arrow,
    Rectangle,
    Ellipse,
    Sticky,
}

impl ToolKind {
    /// Whether dragging on the canvas creates a shape with this tool.
    pub fn creates_shapes(self) -> bool {
        !matches!(self, ToolKind::Select)
    }

    /// A zero-size shape for this tool at `point`, styled with `style`.
    pub fn create_shape(self, point: Point, style: ShapeStyle) -> Option<Shape> {
        let shape = match self {
            ToolKind::Arrow => Shape::Arrow(Arrow::new(point, point).with_style(style)),
            ToolKind::Rectangle => {
                let mut rect = Rectangle::from_corners(point, point);
                rect.set_style(style);
                Shape::Rectangle(rect)
            }
            ToolKind::Ellipse => {
                let mut ellipse = Ellipse::from_corners(point, point);
                ellipse.set_style(style);
                Shape::Ellipse(ellipse)
            }
            ToolKind::Sticky => {
                // Notes are placed centered on the pointer
                let half = Sticky::DEFAULT_SIZE / 2.0;
                let mut sticky = Sticky::new(point - Vec2::new(half, half), String::new());
                sticky.set_style(style);
                Shape::Sticky(sticky)
            }
            ToolKind::Select => return None,
        };
        Some(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_tool_no_shape() {
        assert!(ToolKind::Select.create_shape(Point::ZERO, ShapeStyle::default()).is_none());
        assert!(!ToolKind::Select.creates_shapes());
    }

    #[test]
    fn test_create_shapes() {
        let p = Point::new(10.0, 10.0);
        for tool in [ToolKind::Arrow, ToolKind::Rectangle, ToolKind::Ellipse] {
            let shape = tool.create_shape(p, ShapeStyle::default()).unwrap();
            assert_eq!(shape.point(), p);
        }
        let sticky = ToolKind::Sticky.create_shape(p, ShapeStyle::default()).unwrap();
        assert_eq!(sticky.center(), p);
    }
}
