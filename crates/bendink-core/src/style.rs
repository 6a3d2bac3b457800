//! Shape styles, style resolution and dash computation.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Palette entries a shape can be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorStyle {
    White,
    LightGray,
    Gray,
    #[default]
    Black,
    Green,
    Cyan,
    Blue,
    Indigo,
    Violet,
    Red,
    Orange,
    Yellow,
}

impl ColorStyle {
    /// All palette entries in menu order.
    pub const ALL: [ColorStyle; 12] = [
        ColorStyle::White,
        ColorStyle::LightGray,
        ColorStyle::Gray,
        ColorStyle::Black,
        ColorStyle::Green,
        ColorStyle::Cyan,
        ColorStyle::Blue,
        ColorStyle::Indigo,
        ColorStyle::Violet,
        ColorStyle::Red,
        ColorStyle::Orange,
        ColorStyle::Yellow,
    ];

    fn rgb(self, dark_mode: bool) -> (u8, u8, u8) {
        match (self, dark_mode) {
            (ColorStyle::White, false) | (ColorStyle::Black, true) => (0xf0, 0xf1, 0xf3),
            (ColorStyle::LightGray, false) | (ColorStyle::Gray, true) => (0xc6, 0xcb, 0xd1),
            (ColorStyle::Gray, false) | (ColorStyle::LightGray, true) => (0x78, 0x84, 0x92),
            (ColorStyle::Black, false) | (ColorStyle::White, true) => (0x1d, 0x1d, 0x1d),
            (ColorStyle::Green, _) => (0x36, 0xb2, 0x4d),
            (ColorStyle::Cyan, _) => (0x0e, 0x98, 0xad),
            (ColorStyle::Blue, _) => (0x1c, 0x7e, 0xd6),
            (ColorStyle::Indigo, _) => (0x42, 0x63, 0xeb),
            (ColorStyle::Violet, _) => (0x77, 0x46, 0xf1),
            (ColorStyle::Red, _) => (0xff, 0x21, 0x33),
            (ColorStyle::Orange, _) => (0xff, 0x94, 0x33),
            (ColorStyle::Yellow, _) => (0xff, 0xc9, 0x36),
        }
    }
}

/// Stroke size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeStyle {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizeStyle {
    /// Base stroke width for this size.
    pub fn stroke_width(self) -> f64 {
        match self {
            SizeStyle::Small => 2.0,
            SizeStyle::Medium => 3.5,
            SizeStyle::Large => 5.0,
        }
    }
}

/// How a stroke is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DashStyle {
    /// Hand-drawn, variable-width outline.
    #[default]
    Draw,
    Solid,
    Dashed,
    Dotted,
}

impl DashStyle {
    /// Cycle to the next dash style.
    pub fn next(self) -> Self {
        match self {
            DashStyle::Draw => DashStyle::Solid,
            DashStyle::Solid => DashStyle::Dashed,
            DashStyle::Dashed => DashStyle::Dotted,
            DashStyle::Dotted => DashStyle::Draw,
        }
    }
}

/// Style properties carried by every shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub color: ColorStyle,
    pub size: SizeStyle,
    pub dash: DashStyle,
    #[serde(default)]
    pub is_filled: bool,
    /// Uniform multiplier on the stroke width.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: ColorStyle::default(),
            size: SizeStyle::default(),
            dash: DashStyle::default(),
            is_filled: false,
            scale: 1.0,
        }
    }
}

impl ShapeStyle {
    /// Whether the style asks for the hand-drawn outline renderer.
    pub fn is_hand_drawn(&self) -> bool {
        self.dash == DashStyle::Draw
    }
}

/// Concrete colors and width for a style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub stroke: Color,
    pub fill: Color,
    pub stroke_width: f64,
}

const LIGHT_CANVAS: (u8, u8, u8) = (0xfa, 0xfa, 0xfa);
const DARK_CANVAS: (u8, u8, u8) = (0x34, 0x3d, 0x45);

/// How far fills are blended toward the canvas color.
const FILL_BLEND: f64 = 0.82;

/// Resolve a style into concrete stroke color, fill color and stroke width.
pub fn resolve_style(style: &ShapeStyle, dark_mode: bool) -> ResolvedStyle {
    let (r, g, b) = style.color.rgb(dark_mode);
    let canvas = if dark_mode { DARK_CANVAS } else { LIGHT_CANVAS };
    let blend = |from: u8, to: u8| -> u8 {
        (f64::from(from) + (f64::from(to) - f64::from(from)) * FILL_BLEND).round() as u8
    };

    ResolvedStyle {
        stroke: Color::from_rgba8(r, g, b, 255),
        fill: Color::from_rgba8(blend(r, canvas.0), blend(g, canvas.1), blend(b, canvas.2), 255),
        stroke_width: style.size.stroke_width() * style.scale,
    }
}

/// Dash pattern for a stroke of known length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DashProps {
    /// `(dash, gap)` lengths, or `None` for a continuous stroke.
    pub dash_array: Option<(f64, f64)>,
    pub dash_offset: f64,
}

impl DashProps {
    /// The `stroke-dasharray` attribute value.
    pub fn stroke_dasharray(&self) -> String {
        match self.dash_array {
            Some((dash, gap)) => format!("{dash} {gap}"),
            None => "none".to_string(),
        }
    }
}

/// Dash and gap lengths that fit a whole number of dashes onto `length`.
///
/// `snap` rounds the dash count down to a multiple of itself; `outset`
/// spreads the leftover over `n` gaps instead of `n - 1`.
pub fn perfect_dash_props(
    length: f64,
    stroke_width: f64,
    dash: DashStyle,
    snap: u32,
    outset: bool,
) -> DashProps {
    let (dash_length, ratio, offset) = match dash {
        DashStyle::Draw | DashStyle::Solid => return DashProps::default(),
        DashStyle::Dashed => {
            let d = stroke_width * 2.0;
            (d, 1.0, d / 2.0)
        }
        DashStyle::Dotted => (stroke_width / 100.0, 100.0, 0.0),
    };

    if dash_length <= 0.0 || !length.is_finite() {
        return DashProps::default();
    }

    let mut dashes = (length.max(0.0) / dash_length / (2.0 * ratio)).floor() as i64;
    let snap = i64::from(snap.max(1));
    dashes -= dashes % snap;
    let dashes = dashes.max(4);

    let gaps = if outset { dashes } else { dashes - 1 };
    let gap = ((length - dashes as f64 * dash_length) / gaps as f64).max(dash_length);

    DashProps {
        dash_array: Some((dash_length, gap)),
        dash_offset: offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_widths() {
        assert!((SizeStyle::Small.stroke_width() - 2.0).abs() < f64::EPSILON);
        assert!((SizeStyle::Medium.stroke_width() - 3.5).abs() < f64::EPSILON);
        assert!((SizeStyle::Large.stroke_width() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolve_applies_scale() {
        let style = ShapeStyle {
            size: SizeStyle::Large,
            scale: 2.0,
            ..ShapeStyle::default()
        };
        let resolved = resolve_style(&style, false);
        assert!((resolved.stroke_width - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dark_mode_swaps_grayscale() {
        let style = ShapeStyle::default();
        let light = resolve_style(&style, false).stroke.to_rgba8();
        let dark = resolve_style(&style, true).stroke.to_rgba8();
        assert_eq!((light.r, light.g, light.b), (0x1d, 0x1d, 0x1d));
        assert_eq!((dark.r, dark.g, dark.b), (0xf0, 0xf1, 0xf3));
    }

    #[test]
    fn test_solid_has_no_dashes() {
        let props = perfect_dash_props(100.0, 2.0, DashStyle::Solid, 1, true);
        assert!(props.dash_array.is_none());
        assert_eq!(props.stroke_dasharray(), "none");
    }

    #[test]
    fn test_dashed_props() {
        let props = perfect_dash_props(100.0, 2.0, DashStyle::Dashed, 2, true);
        let (dash, gap) = props.dash_array.unwrap();
        assert!((dash - 4.0).abs() < f64::EPSILON);
        // floor(100 / 4 / 2) = 12 dashes, gap = (100 - 48) / 12
        assert!((gap - 52.0 / 12.0).abs() < 1e-9);
        assert!((props.dash_offset - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_short_stroke_keeps_four_dashes() {
        let props = perfect_dash_props(5.0, 2.0, DashStyle::Dashed, 1, true);
        let (dash, gap) = props.dash_array.unwrap();
        assert!((gap - dash).abs() < f64::EPSILON);
    }
}
