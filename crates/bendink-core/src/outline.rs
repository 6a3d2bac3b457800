//! Variable-width stroke outlines for the hand-drawn renderer.
//!
//! A [`StrokeOutliner`] turns a list of pressure-annotated samples into a
//! closed polygon. The engine only depends on the trait; [`PressureOutliner`]
//! is the implementation used when no other is supplied.

use crate::geometry::{dist, lerp, per, uni};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Rate at which simulated pressure follows stroke speed.
const RATE_OF_PRESSURE_CHANGE: f64 = 0.275;

/// Segments used to approximate a dot when the stroke has no length.
const DOT_SEGMENTS: usize = 12;

/// A stroke sample with pressure in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub point: Point,
    pub pressure: f64,
}

impl StrokePoint {
    pub fn new(point: Point, pressure: f64) -> Self {
        Self { point, pressure }
    }
}

impl From<Point> for StrokePoint {
    fn from(point: Point) -> Self {
        Self::new(point, 0.5)
    }
}

/// Maps normalized pressure to normalized width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    /// `t * t`
    Quadratic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::Quadratic => t * t,
        }
    }
}

/// Options for building an outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeOptions {
    /// Base diameter of the stroke.
    pub size: f64,
    /// How much pressure affects width, in `[-1, 1]`.
    pub thinning: f64,
    pub easing: Easing,
    /// Distance over which the start narrows to a point.
    pub taper_start: f64,
    /// Distance over which the end narrows to a point.
    pub taper_end: f64,
    pub simulate_pressure: bool,
    /// How much to smooth the input, in `[0, 1]`.
    pub streamline: f64,
    /// Whether the stroke is complete; only complete strokes taper at the end.
    pub last: bool,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            size: 8.0,
            thinning: 0.5,
            easing: Easing::Linear,
            taper_start: 0.0,
            taper_end: 0.0,
            simulate_pressure: true,
            streamline: 0.5,
            last: false,
        }
    }
}

/// Builds an outline polygon from stroke samples.
pub trait StrokeOutliner {
    /// Outline polygon for `points`. Must be deterministic.
    fn outline(&self, points: &[StrokePoint], options: &StrokeOptions) -> Vec<Point>;
}

/// Pressure-sensitive outliner with streamlining and distance-based tapers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureOutliner;

struct Sample {
    point: Point,
    pressure: f64,
    running_length: f64,
}

impl PressureOutliner {
    fn streamline(points: &[StrokePoint], streamline: f64) -> Vec<Sample> {
        let t = 0.15 + (1.0 - streamline.clamp(0.0, 1.0)) * 0.85;
        let mut samples: Vec<Sample> = Vec::with_capacity(points.len());
        for p in points {
            match samples.last() {
                None => samples.push(Sample {
                    point: p.point,
                    pressure: p.pressure,
                    running_length: 0.0,
                }),
                Some(prev) => {
                    let point = lerp(prev.point, p.point, t);
                    let step = dist(prev.point, point);
                    if step < f64::EPSILON {
                        continue;
                    }
                    let running_length = prev.running_length + step;
                    samples.push(Sample {
                        point,
                        pressure: p.pressure,
                        running_length,
                    });
                }
            }
        }
        // The last sample always lands on the input's last point.
        if let Some(last) = samples.last_mut().filter(|_| points.len() > 1) {
            let target = points[points.len() - 1].point;
            let extra = dist(last.point, target);
            last.point = target;
            last.running_length += extra;
        }
        samples
    }

    fn radius(options: &StrokeOptions, pressure: f64) -> f64 {
        if options.thinning == 0.0 {
            return options.size / 2.0;
        }
        options.size * options.easing.apply(0.5 - options.thinning * (0.5 - pressure))
    }

    fn dot(center: Point, radius: f64) -> Vec<Point> {
        (0..DOT_SEGMENTS)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / DOT_SEGMENTS as f64;
                Point::new(center.x + a.cos() * radius, center.y + a.sin() * radius)
            })
            .collect()
    }
}

impl StrokeOutliner for PressureOutliner {
    fn outline(&self, points: &[StrokePoint], options: &StrokeOptions) -> Vec<Point> {
        let Some(first) = points.first() else {
            return Vec::new();
        };

        let samples = Self::streamline(points, options.streamline);
        let total = samples.last().map_or(0.0, |s| s.running_length);
        if samples.len() < 2 || total < f64::EPSILON {
            return Self::dot(first.point, (options.size / 2.0).max(0.5));
        }

        let mut left = Vec::with_capacity(samples.len());
        let mut right = Vec::with_capacity(samples.len());
        let mut prev_pressure = samples[0].pressure;

        for (i, sample) in samples.iter().enumerate() {
            let mut pressure = sample.pressure;
            if options.simulate_pressure && i > 0 {
                let step = sample.running_length - samples[i - 1].running_length;
                let sp = (step / options.size.max(f64::EPSILON)).min(1.0);
                let rp = (1.0 - sp).min(1.0);
                pressure = (prev_pressure + (rp - prev_pressure) * (sp * RATE_OF_PRESSURE_CHANGE)).min(1.0);
            }
            prev_pressure = pressure;

            let mut radius = Self::radius(options, pressure).max(0.01);

            if options.taper_start > 0.0 && sample.running_length < options.taper_start {
                let t = sample.running_length / options.taper_start;
                radius *= t * (2.0 - t);
            }
            let remaining = total - sample.running_length;
            if options.last && options.taper_end > 0.0 && remaining < options.taper_end {
                let t = remaining / options.taper_end;
                radius *= t * (2.0 - t);
            }

            let prev = samples[i.saturating_sub(1)].point;
            let next = samples[(i + 1).min(samples.len() - 1)].point;
            let mut direction = uni(next - prev);
            if direction == Vec2::ZERO {
                direction = Vec2::new(1.0, 0.0);
            }
            let normal = per(direction) * radius;

            left.push(sample.point + normal);
            right.push(sample.point - normal);
        }

        let mut outline = left;
        outline.extend(right.into_iter().rev());
        outline
    }
}

/// Closed quadratic path through an outline polygon, smoothing each vertex
/// by routing the curve through edge midpoints.
pub fn svg_path_from_stroke(stroke: &[Point]) -> String {
    let Some(first) = stroke.first() else {
        return String::new();
    };

    let mut d = format!("M {} {} Q", first.x, first.y);
    for (i, p0) in stroke.iter().enumerate() {
        let p1 = stroke[(i + 1) % stroke.len()];
        let _ = write!(d, " {} {} {} {}", p0.x, p0.y, (p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0);
    }
    d.push_str(" Z");
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::points_between;

    fn options() -> StrokeOptions {
        StrokeOptions {
            size: 4.0,
            thinning: 0.5,
            easing: Easing::Quadratic,
            taper_start: 10.0,
            taper_end: 1.0,
            simulate_pressure: true,
            streamline: 0.5,
            last: true,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(PressureOutliner.outline(&[], &options()).is_empty());
        assert_eq!(svg_path_from_stroke(&[]), "");
    }

    #[test]
    fn test_single_point_is_dot() {
        let outline = PressureOutliner.outline(&[StrokePoint::from(Point::new(5.0, 5.0))], &options());
        assert_eq!(outline.len(), DOT_SEGMENTS);
    }

    #[test]
    fn test_outline_is_deterministic() {
        let pts = points_between(Point::ZERO, Point::new(100.0, 0.0), 6);
        let a = PressureOutliner.outline(&pts, &options());
        let b = PressureOutliner.outline(&pts, &options());
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_outline_surrounds_line() {
        let pts = points_between(Point::ZERO, Point::new(100.0, 0.0), 6);
        let outline = PressureOutliner.outline(&pts, &options());
        assert!(outline.iter().any(|p| p.y < 0.0));
        assert!(outline.iter().any(|p| p.y > 0.0));
        assert!(outline.iter().all(|p| p.x >= -5.0 && p.x <= 105.0));
    }

    #[test]
    fn test_svg_path_from_stroke() {
        let d = svg_path_from_stroke(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        assert_eq!(d, "M 0 0 Q 0 0 5 0 10 0 5 0 Z");
    }
}
