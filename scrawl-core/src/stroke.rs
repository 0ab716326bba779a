//! # Strokes
//!
//! One stroke is one continuous pen-down-to-pen-up gesture: an append-only
//! run of points sharing a single color. Points are immutable once appended;
//! the only mutation a live stroke sees is growth at the end.
//!
//! Smoothing happens at append time. Each arriving point carries the
//! interpolation control points for the segment that *ends* at it, derived
//! from the raw positions already in the stroke. Keeping the controls on the
//! later endpoint means any slice `[i..j]` of a stroke renders identically
//! to the same range of the whole stroke, which the incremental baker leans
//! on when it splits a stroke into a baked head and a live tail.

use crate::color::Rgba8;
use crate::id::StrokeId;
use ultraviolet::Vec2;

/// Interpolation controls for the segment ending at the point that carries
/// them. Absent on the first two points of a stroke, where there is not yet
/// enough history to estimate a tangent.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum Control {
    /// Straight segment.
    #[default]
    None,
    /// Single control point, evaluated as a quadratic Bézier.
    Quadratic(Vec2),
    /// Control pair, evaluated as a cubic Bézier.
    Cubic(Vec2, Vec2),
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Point {
    pub pos: Vec2,
    pub control: Control,
    /// Rendered diameter at this point, in canvas units.
    pub thickness: f32,
}

#[derive(Clone, Debug)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<Point>,
    color: Rgba8,
}

impl Stroke {
    #[must_use]
    pub fn new(color: Rgba8) -> Self {
        Self {
            id: StrokeId::next(),
            points: Vec::new(),
            color,
        }
    }
    /// Process-unique identity. Survives undo/redo round trips - the
    /// restored stroke is the same stroke.
    #[must_use]
    pub fn id(&self) -> StrokeId {
        self.id
    }
    #[must_use]
    pub fn color(&self) -> Rgba8 {
        self.color
    }
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
    /// Append a raw input position, computing this point's interpolation
    /// controls from the preceding raw positions.
    ///
    /// Tangents are estimated Catmull-Rom style from whatever history
    /// exists: the first segment of a stroke is straight, the second gets a
    /// single control point, later ones a full pair (central difference at
    /// the segment start, truncated backward difference at the new point,
    /// since its successor is not known yet). Only raw positions feed the
    /// estimate, never the derived controls of earlier points.
    pub fn push_raw(&mut self, pos: Vec2, thickness: f32) {
        let n = self.points.len();
        let raw = |back: usize| self.points[n - back].pos;
        let control = match n {
            // Nothing to smooth against yet.
            0 | 1 => Control::None,
            // One interior predecessor: extend the incoming tangent.
            2 => Control::Quadratic(raw(1) + (pos - raw(2)) * 0.25),
            // Enough history for a full cubic pair.
            _ => Control::Cubic(
                raw(1) + (pos - raw(2)) * (1.0 / 6.0),
                pos - (pos - raw(1)) * (1.0 / 6.0),
            ),
        };
        self.points.push(Point {
            pos,
            control,
            thickness,
        });
    }
}
