//! Arrow shape.
//!
//! An arrow is three handles in shape-local space: `start`, `end` and a
//! derived `bend` handle. The shaft is a straight segment when the bend
//! handle sits on the chord midpoint and the circular arc through all three
//! handles otherwise. `bend` is the signed ratio of the bend handle's offset
//! from the chord midpoint to half the chord length.

use super::{
    Decorations, Handle, HandleChange, HandleId, ShapeId, ShapeUtil, TransformInfo, next_version,
};
use crate::cache::GeometryCache;
use crate::geometry::{
    Circle, angle, arc_length, bounds_from_points, circle_from_three_points,
    clamp_to_rotation_segments, dist, is_angle_between, lerp_angles, med, nearest_point_on_segment,
    nudge, nudge_at_angle, per, point_in_bounds, points_between, rot_with, round_point,
    translate_bounds, uni,
};
use crate::input::Modifiers;
use crate::intersect::{arc_intersects_bounds, segment_intersects_bounds};
use crate::outline::{Easing, StrokeOptions, StrokeOutliner, StrokePoint, svg_path_from_stroke};
use crate::rng::SeededRandom;
use crate::style::{DashProps, ShapeStyle, perfect_dash_props, resolve_style};
use kurbo::{Arc, BezPath, Point, Rect, SvgArc, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

/// A bend handle closer than this to the rounded chord midpoint draws straight.
pub const STRAIGHT_THRESHOLD: f64 = 1.0;
/// Bend offsets shorter than this collapse onto the chord midpoint.
pub const MIN_BEND_OFFSET: f64 = 10.0;
/// Largest magnitude a bend may take.
pub const MAX_BEND: f64 = 0.99;
/// Effective stroke multiplier for hand-drawn shafts.
pub const HAND_DRAWN_SCALE: f64 = 0.618;
/// Effective stroke multiplier for vector shafts and arrowheads.
pub const VECTOR_SCALE: f64 = 1.618;
/// Samples taken along a hand-drawn arc.
pub const ARC_SAMPLES: usize = 21;

/// Arrowheads are at most this many stroke widths long.
const HEAD_LENGTH_FACTOR: f64 = 8.0;
/// Steps along a hand-drawn straight shaft.
const STRAIGHT_SAMPLES: usize = 6;
/// Tolerance used when flattening arcs into path segments.
const ARC_TOLERANCE: f64 = 0.1;

/// Position of the bend handle for a given bend on the chord `start..end`.
///
/// Offsets shorter than [`MIN_BEND_OFFSET`] land on the midpoint. The result
/// is rounded to integer coordinates.
pub fn bend_point(start: Point, end: Point, bend: f64) -> Point {
    let d = dist(start, end);
    let mid = med(start, end);
    let bend_dist = d / 2.0 * bend;
    let u = uni(end - start);

    if bend_dist.abs() < MIN_BEND_OFFSET {
        round_point(mid)
    } else {
        round_point(mid + per(u) * bend_dist)
    }
}

/// The three handles of an arrow, in shape-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowHandles {
    pub start: Handle,
    pub end: Handle,
    pub bend: Handle,
}

impl ArrowHandles {
    fn new(start: Point, end: Point, bend: Point) -> Self {
        Self {
            start: Handle::new(HandleId::Start, 0, start, true),
            end: Handle::new(HandleId::End, 1, end, true),
            bend: Handle::new(HandleId::Bend, 2, bend, false),
        }
    }

    fn get_mut(&mut self, id: HandleId) -> &mut Handle {
        match id {
            HandleId::Start => &mut self.start,
            HandleId::End => &mut self.end,
            HandleId::Bend => &mut self.bend,
        }
    }

    pub fn get(&self, id: HandleId) -> &Handle {
        match id {
            HandleId::Start => &self.start,
            HandleId::End => &self.end,
            HandleId::Bend => &self.bend,
        }
    }
}

/// Per-frame rendering context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderInfo {
    pub dark_mode: bool,
}

/// Everything a painter needs to draw an arrow, in shape-local space.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowRender {
    /// Shaft path. Hand-drawn shafts are closed outlines meant to be filled.
    pub shaft: String,
    /// Whether the shaft path is filled with the stroke color.
    pub fill_shaft: bool,
    pub stroke: Color,
    /// Effective stroke width of the shaft.
    pub stroke_width: f64,
    /// Width of the invisible stroke used for pointer hits.
    pub hit_width: f64,
    pub dash: DashProps,
    pub head_stroke_width: f64,
    pub start_head: Option<String>,
    pub end_head: Option<String>,
}

/// An arrow shape (straight or arced shaft with optional heads).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    /// Page-space origin the handles are relative to.
    pub point: Point,
    pub rotation: f64,
    bend: f64,
    handles: ArrowHandles,
    #[serde(default)]
    decorations: Decorations,
    style: ShapeStyle,
    #[serde(skip, default = "next_version")]
    version: u64,
}

impl Arrow {
    /// Create a straight arrow between two page points.
    pub fn new(start: Point, end: Point) -> Self {
        let origin = Point::new(start.x.min(end.x), start.y.min(end.y));
        let start = start - origin.to_vec2();
        let end = end - origin.to_vec2();
        Self {
            id: Uuid::new_v4(),
            point: origin,
            rotation: 0.0,
            bend: 0.0,
            handles: ArrowHandles::new(start, end, bend_point(start, end, 0.0)),
            decorations: Decorations::default(),
            style: ShapeStyle::default(),
            version: next_version(),
        }
    }

    /// Set the bend, clamped to `±MAX_BEND`, and move the bend handle to match.
    pub fn with_bend(mut self, bend: f64) -> Self {
        self.bend = bend.clamp(-MAX_BEND, MAX_BEND);
        self.handles.bend.point = bend_point(self.start(), self.end(), self.bend);
        self.version = next_version();
        self
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.set_style(style);
        self
    }

    pub fn with_decorations(mut self, decorations: Decorations) -> Self {
        self.set_decorations(decorations);
        self
    }

    pub fn bend(&self) -> f64 {
        self.bend
    }

    /// Local start handle position.
    pub fn start(&self) -> Point {
        self.handles.start.point
    }

    /// Local end handle position.
    pub fn end(&self) -> Point {
        self.handles.end.point
    }

    /// Local bend handle position.
    pub fn bend_handle(&self) -> Point {
        self.handles.bend.point
    }

    pub fn handle(&self, id: HandleId) -> &Handle {
        self.handles.get(id)
    }

    pub fn decorations(&self) -> Decorations {
        self.decorations
    }

    pub fn set_decorations(&mut self, decorations: Decorations) {
        self.decorations = decorations;
        self.version = next_version();
    }

    pub fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
        self.version = next_version();
    }

    /// Bounds of the three handles in local space.
    pub fn local_bounds(&self) -> Rect {
        bounds_from_points(&[self.start(), self.bend_handle(), self.end()], 0.0)
    }

    /// Chord length between the endpoints.
    pub fn chord_length(&self) -> f64 {
        dist(self.start(), self.end())
    }

    /// Whether the shaft is drawn as a straight segment.
    pub fn is_straight(&self) -> bool {
        dist(self.bend_handle(), round_point(med(self.start(), self.end()))) < STRAIGHT_THRESHOLD
    }

    /// The circle the shaft follows, or `None` for a straight shaft.
    pub fn arc(&self) -> Option<Circle> {
        if self.is_straight() {
            return None;
        }
        circle_from_three_points(self.start(), self.end(), self.bend_handle())
    }

    /// Length of the drawn shaft: the arc length for a curved shaft, the
    /// chord otherwise.
    pub fn shaft_length(&self) -> f64 {
        match self.arc() {
            Some(c) => arc_length(c.center, c.radius, self.start(), self.end()).abs(),
            None => self.chord_length(),
        }
    }

    /// Base stroke width of the resolved style.
    pub fn stroke_width(&self) -> f64 {
        resolve_style(&self.style, false).stroke_width
    }

    /// Effective shaft stroke width.
    pub fn shaft_stroke_width(&self) -> f64 {
        let scale = if self.style.is_hand_drawn() {
            HAND_DRAWN_SCALE
        } else {
            VECTOR_SCALE
        };
        self.stroke_width() * scale
    }

    /// Arrowhead length: a third of the chord, capped by the stroke width.
    pub fn head_length(&self) -> f64 {
        (self.chord_length() / 3.0).min(self.stroke_width() * HEAD_LENGTH_FACTOR)
    }

    fn is_degenerate(&self) -> bool {
        self.start() == self.end()
    }

    /// Points on the shaft where the start and end arrowheads begin.
    pub fn head_insets(&self) -> (Point, Point) {
        let (start, end) = (self.start(), self.end());
        let len = self.head_length();
        match self.arc() {
            Some(c) => {
                let total = arc_length(c.center, c.radius, start, end).abs();
                let t = if total > 0.0 { len / total } else { 0.0 };
                let sa = angle(c.center, start);
                let ea = angle(c.center, end);
                (
                    nudge_at_angle(c.center, lerp_angles(sa, ea, t), c.radius),
                    nudge_at_angle(c.center, lerp_angles(ea, sa, t), c.radius),
                )
            }
            None => (nudge(start, end, len), nudge(end, start, len)),
        }
    }

    /// The two barbs of a chevron arrowhead with its tip at `tip`.
    ///
    /// Each call reseeds from the shape id, so both heads of an arrow share
    /// the same jitter.
    pub fn head_points(&self, tip: Point, inset: Point) -> (Point, Point) {
        let mut rng = SeededRandom::from_id(&self.id);
        let left = rot_with(inset, tip, PI / 6.0 + (PI / 12.0) * rng.next());
        let right = rot_with(inset, tip, -PI / 6.0 + (PI / 12.0) * rng.next());
        (left, right)
    }

    /// Chevron path for an arrowhead: `M left L tip L right`.
    pub fn head_path(&self, tip: Point, inset: Point) -> String {
        let (l, r) = self.head_points(tip, inset);
        format!("M {} {} L {} {} L {} {}", l.x, l.y, tip.x, tip.y, r.x, r.y)
    }

    fn straight_vector_path(&self) -> String {
        let s = round_point(self.start());
        let e = round_point(self.end());
        format!("M {} {} L {} {}", s.x, s.y, e.x, e.y)
    }

    fn arc_vector_path(&self, circle: Circle) -> String {
        let (s, e) = (self.start(), self.end());
        let sweep = if self.bend < 0.0 { 0 } else { 1 };
        format!(
            "M {} {} A {} {} 0 0 {} {} {}",
            s.x, s.y, circle.radius, circle.radius, sweep, e.x, e.y
        )
    }

    fn straight_hand_drawn_path(&self, outliner: &dyn StrokeOutliner) -> String {
        let (start, end) = (self.start(), self.end());
        let mut rng = SeededRandom::from_id(&self.id);
        let stroke_width = self.stroke_width() * 2.0;
        let st = rng.next().abs();

        let mut points = points_between(start, end, STRAIGHT_SAMPLES);
        points.extend(std::iter::repeat_n(StrokePoint::from(end), 4));

        let options = StrokeOptions {
            size: stroke_width / 2.0,
            thinning: 0.5 + rng.next() * 0.3,
            easing: Easing::Quadratic,
            taper_start: 1.0 + 32.0 * st.powi(3),
            taper_end: 1.0,
            simulate_pressure: true,
            streamline: StrokeOptions::default().streamline,
            last: true,
        };
        svg_path_from_stroke(&outliner.outline(&points, &options))
    }

    fn arc_hand_drawn_path(&self, circle: Circle, outliner: &dyn StrokeOutliner) -> String {
        let (start, end) = (self.start(), self.end());
        let mut rng = SeededRandom::from_id(&self.id);
        let stroke_width = self.stroke_width() * 2.0;
        let st = rng.next().abs();

        let sa = angle(circle.center, start);
        let ea = angle(circle.center, end);
        let mut points: Vec<StrokePoint> = (0..ARC_SAMPLES)
            .map(|i| {
                let t = i as f64 / (ARC_SAMPLES - 1) as f64;
                let a = lerp_angles(sa, ea, t);
                StrokePoint::from(round_point(nudge_at_angle(circle.center, a, circle.radius)))
            })
            .collect();
        points.extend(std::iter::repeat_n(StrokePoint::from(end), 2));

        let open_taper = 1.0 + stroke_width * 5.0 * st.powi(3);
        let taper = |decorated: bool| if decorated { 1.0 } else { open_taper };

        let options = StrokeOptions {
            size: stroke_width / 2.0,
            thinning: 0.5 + rng.next() * 0.3,
            easing: Easing::Quadratic,
            taper_start: taper(self.decorations.start.is_some()),
            taper_end: taper(self.decorations.end.is_some()),
            simulate_pressure: true,
            streamline: 0.01,
            last: true,
        };
        svg_path_from_stroke(&outliner.outline(&points, &options))
    }

    /// Shaft path in local space for the current style.
    pub fn shaft_path(&self, outliner: &dyn StrokeOutliner) -> String {
        if self.is_degenerate() {
            return self.straight_vector_path();
        }
        let hand_drawn = self.style.is_hand_drawn();
        match (self.arc(), hand_drawn) {
            (None, false) => self.straight_vector_path(),
            (None, true) => self.straight_hand_drawn_path(outliner),
            (Some(c), false) => self.arc_vector_path(c),
            (Some(c), true) => self.arc_hand_drawn_path(c, outliner),
        }
    }

    /// Dash pattern for the shaft.
    pub fn dash_props(&self) -> DashProps {
        let length = match self.arc() {
            Some(_) => self.shaft_length() - 1.0,
            None => self.chord_length(),
        };
        perfect_dash_props(length, self.shaft_stroke_width(), self.style.dash, 2, true)
    }

    /// Render output with a freshly computed shaft.
    pub fn render(&self, info: &RenderInfo, outliner: &dyn StrokeOutliner) -> ArrowRender {
        self.render_with_shaft(info, self.shaft_path(outliner))
    }

    /// Render output reusing a memoized shaft path.
    pub fn render_cached(
        &self,
        info: &RenderInfo,
        outliner: &dyn StrokeOutliner,
        cache: &GeometryCache,
    ) -> ArrowRender {
        self.render_with_shaft(info, cache.shaft_path(self, outliner))
    }

    fn render_with_shaft(&self, info: &RenderInfo, shaft: String) -> ArrowRender {
        let resolved = resolve_style(&self.style, info.dark_mode);
        let (start_head, end_head) = self.head_paths();

        ArrowRender {
            shaft,
            fill_shaft: self.style.is_hand_drawn(),
            stroke: resolved.stroke,
            stroke_width: self.shaft_stroke_width(),
            hit_width: (resolved.stroke_width * 2.0).max(8.0),
            dash: self.dash_props(),
            head_stroke_width: resolved.stroke_width * VECTOR_SCALE,
            start_head,
            end_head,
        }
    }

    fn head_paths(&self) -> (Option<String>, Option<String>) {
        if self.is_degenerate() {
            return (None, None);
        }
        let (inset_start, inset_end) = self.head_insets();
        let start = self
            .decorations
            .start
            .map(|_| self.head_path(self.start(), inset_start));
        let end = self
            .decorations
            .end
            .map(|_| self.head_path(self.end(), inset_end));
        (start, end)
    }

    /// Thin selection indicator: the plain shaft plus any heads.
    pub fn indicator_path(&self) -> String {
        let mut d = match self.arc() {
            Some(c) => self.arc_vector_path(c),
            None => self.straight_vector_path(),
        };
        let (start, end) = self.head_paths();
        for head in [start, end].into_iter().flatten() {
            d.push(' ');
            d.push_str(&head);
        }
        d
    }
}

impl ShapeUtil for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn point(&self) -> Point {
        self.point
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn bounds(&self) -> Rect {
        translate_bounds(self.local_bounds(), self.point.to_vec2())
    }

    fn rotated_bounds(&self) -> Rect {
        let local = bounds_from_points(
            &[self.start(), self.bend_handle(), self.end()],
            self.rotation,
        );
        translate_bounds(local, self.point.to_vec2())
    }

    fn center(&self) -> Point {
        self.point + med(self.start(), self.end()).to_vec2()
    }

    /// Coarse test; always a hit. Follow with `hit_test_bounds`.
    fn hit_test(&self, _point: Point) -> bool {
        true
    }

    fn hit_test_bounds(&self, bounds: Rect) -> bool {
        let offset = self.point.to_vec2();
        let sp = self.start() + offset;
        let ep = self.end() + offset;

        if point_in_bounds(sp, bounds) || point_in_bounds(ep, bounds) {
            return true;
        }

        match self.arc() {
            Some(c) => {
                let circle = Circle {
                    center: c.center + offset,
                    radius: c.radius,
                };
                arc_intersects_bounds(circle, sp, ep, bounds)
            }
            None => segment_intersects_bounds(sp, ep, bounds),
        }
    }

    fn transform(&self, initial: &Self, bounds: Rect, info: &TransformInfo) -> Self {
        let initial_bounds = initial.local_bounds();
        let normalize = |v: f64, extent: f64| if extent == 0.0 { 0.0 } else { v / extent };
        let place = |p: Point| {
            let nw = normalize(p.x - initial_bounds.x0, initial_bounds.width());
            let nh = normalize(p.y - initial_bounds.y0, initial_bounds.height());
            Point::new(
                bounds.width() * if info.scale_x < 0.0 { 1.0 - nw } else { nw },
                bounds.height() * if info.scale_y < 0.0 { 1.0 - nh } else { nh },
            )
        };

        let start = place(initial.start());
        let end = place(initial.end());
        let mid = med(start, end);
        let bend_dist = dist(start, end) / 2.0 * initial.bend;
        let bend = if bend_dist.abs() < MIN_BEND_OFFSET {
            mid
        } else {
            mid + per(uni(end - start)) * bend_dist
        };

        let mut next = self.clone();
        next.point = Point::new(bounds.x0, bounds.y0);
        next.bend = initial.bend;
        next.handles = ArrowHandles::new(start, end, bend);
        next.version = next_version();
        next
    }

    fn translate_to(&mut self, point: Point) {
        self.point = point;
    }

    fn rotate_to(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    /// Rotation moves the handles about the chord midpoint; the rotation
    /// field itself is left alone.
    fn rotate_about(&self, center: Point, delta: f64) -> Self {
        let own_center = self.center();
        let relative = own_center - self.point;
        let next_point = rot_with(own_center, center, delta) - relative;
        let pivot = relative.to_point();

        let changes = [HandleId::Start, HandleId::End, HandleId::Bend].map(|id| {
            HandleChange::new(id, round_point(rot_with(self.handles.get(id).point, pivot, delta)))
        });
        let mut next = self.on_handle_change(&changes, Modifiers::default());
        next.point = next_point;
        next
    }

    fn handles(&self) -> Vec<Handle> {
        vec![self.handles.start, self.handles.end, self.handles.bend]
    }

    fn on_handle_change_snapped(
        &self,
        changes: &[HandleChange],
        modifiers: Modifiers,
        segments: u32,
    ) -> Self {
        let mut handles = self.handles;
        for change in changes {
            handles.get_mut(change.id).point = change.point;
        }

        if modifiers.shift {
            for change in changes {
                let Some(other_id) = change.id.opposite() else {
                    continue;
                };
                let other = self.handles.get(other_id).point;
                let a = angle(other, change.point);
                let distance = dist(other, change.point);
                let snapped = clamp_to_rotation_segments(a, segments);
                handles.get_mut(change.id).point = nudge_at_angle(other, snapped, distance);
            }
        }

        let mut bend = self.bend;
        if changes.iter().any(|c| c.id == HandleId::Bend) {
            let (start, end) = (handles.start.point, handles.end.point);
            let distance = dist(start, end);
            if distance < f64::EPSILON {
                bend = 0.0;
            } else {
                let mid = med(start, end);
                let chord_angle = angle(start, end);
                let normal = per(uni(end - start)) * (distance / 2.0);
                let ap = mid + normal;
                let bp = mid - normal;

                let projected = nearest_point_on_segment(ap, bp, handles.bend.point, true);
                bend = (dist(mid, projected) / (distance / 2.0)).clamp(-MAX_BEND, MAX_BEND);

                let angle_to_bend = angle(start, projected);
                if is_angle_between(chord_angle, chord_angle + PI, angle_to_bend) {
                    bend *= -1.0;
                }
            }
        }

        handles.start.point = round_point(handles.start.point);
        handles.end.point = round_point(handles.end.point);
        handles.bend.point = bend_point(handles.start.point, handles.end.point, bend);

        let mut next = self.clone();
        next.bend = bend;
        next.handles = handles;
        next.version = next_version();
        next
    }

    fn on_double_click_handle(&self, id: HandleId) -> Self {
        let mut next = self.clone();
        match id {
            HandleId::Bend => {
                next.bend = 0.0;
                next.handles.bend.point = bend_point(self.start(), self.end(), 0.0);
            }
            HandleId::Start | HandleId::End => next.decorations.toggle(id),
        }
        next.version = next_version();
        next
    }

    /// Re-anchor so the local bounds start at the origin, keeping the page
    /// position of every handle.
    fn on_session_complete(&self) -> Self {
        let local = self.local_bounds();
        let offset = Vec2::new(local.x0, local.y0);

        let mut next = self.clone();
        next.point = round_point(self.point + offset);
        next.handles.start.point = round_point(self.start() - offset);
        next.handles.end.point = round_point(self.end() - offset);
        next.handles.bend.point = bend_point(next.start(), next.end(), self.bend);
        next.version = next_version();
        next
    }

    fn to_path(&self) -> BezPath {
        let offset = self.point.to_vec2();
        let mut path = BezPath::new();
        let (start, end) = (self.start() + offset, self.end() + offset);
        path.move_to(start);

        match self.arc() {
            Some(c) => {
                let svg_arc = SvgArc {
                    from: start,
                    to: end,
                    radii: Vec2::new(c.radius, c.radius),
                    x_rotation: 0.0,
                    large_arc: false,
                    sweep: self.bend >= 0.0,
                };
                match Arc::from_svg_arc(&svg_arc) {
                    Some(arc) => {
                        for el in arc.append_iter(ARC_TOLERANCE) {
                            path.push(el);
                        }
                    }
                    None => path.line_to(end),
                }
            }
            None => path.line_to(end),
        }

        if !self.is_degenerate() {
            let (inset_start, inset_end) = self.head_insets();
            let heads = [
                (self.decorations.start, self.start(), inset_start),
                (self.decorations.end, self.end(), inset_end),
            ];
            for (_, tip, inset) in heads.iter().filter(|(d, _, _)| d.is_some()) {
                let (l, r) = self.head_points(*tip, *inset);
                path.move_to(l + offset);
                path.line_to(*tip + offset);
                path.line_to(r + offset);
            }
        }
        path
    }
}
