//! # Flattening
//!
//! Turns a run of smoothed [`Point`]s into short line spans ready for a
//! raster backend. This is the one and only interpolation routine in the
//! crate: the incremental baker and the live-tail compositor both call it,
//! which is what guarantees a baked range and the live re-render of the same
//! range land on identical pixels.

use crate::stroke::{Control, Point};
use crate::util::{lerp, lerp_vec};
use ultraviolet::Vec2;

/// Spacing between interpolated steps along a segment, in canvas units.
const STEP_SPACING: f32 = 2.5;
/// Segments shorter than this are dropped outright. A sub-unit segment is
/// below visibility at stroke widths we care about, and dividing by its
/// length is numerically hostile.
const MIN_SEGMENT_LEN: f32 = 1.0;

/// One flattened micro-span of a stroke.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Span {
    pub from: Vec2,
    pub to: Vec2,
    /// Width of this span: the average of the interpolated thickness at its
    /// two ends, keeping pressure tapering continuous rather than stepped.
    pub width: f32,
}

/// Number of interpolation steps for a segment of length `distance`:
/// `ceil(distance / 2.5)`, never fewer than 2.
#[inline]
#[must_use]
pub fn segment_steps(distance: f32) -> u32 {
    ((distance / STEP_SPACING).ceil() as u32).max(2)
}

/// Evaluate the segment ending at `to` at parameter `t`.
#[inline]
fn segment_at(from: &Point, to: &Point, t: f32) -> Vec2 {
    match to.control {
        Control::None => lerp_vec(from.pos, to.pos, t),
        Control::Quadratic(c) => {
            let u = 1.0 - t;
            from.pos * (u * u) + c * (2.0 * u * t) + to.pos * (t * t)
        }
        Control::Cubic(c1, c2) => {
            let u = 1.0 - t;
            from.pos * (u * u * u)
                + c1 * (3.0 * u * u * t)
                + c2 * (3.0 * u * t * t)
                + to.pos * (t * t * t)
        }
    }
}

/// Flatten every segment of `points`, feeding spans to `emit` in order.
///
/// Works on any contiguous range of a stroke: controls live on the later
/// endpoint of each segment, so a slice flattens exactly as that range of
/// the full stroke would. A single point produces nothing here - the dot
/// case is the renderer's, not the interpolator's.
pub fn for_each_span(points: &[Point], mut emit: impl FnMut(Span)) {
    for pair in points.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let distance = (to.pos - from.pos).mag();
        if distance < MIN_SEGMENT_LEN {
            continue;
        }
        let steps = segment_steps(distance);
        let mut prev_pos = from.pos;
        let mut prev_thickness = from.thickness;
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            let pos = segment_at(from, to, t);
            let thickness = lerp(from.thickness, to.thickness, t);
            emit(Span {
                from: prev_pos,
                to: pos,
                width: (prev_thickness + thickness) * 0.5,
            });
            prev_pos = pos;
            prev_thickness = thickness;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Rgba8;
    use crate::stroke::Stroke;

    #[test]
    fn step_count_law() {
        // ceil(d / 2.5), floored at 2.
        assert_eq!(segment_steps(10.0), 4);
        assert_eq!(segment_steps(10.1), 5);
        assert_eq!(segment_steps(2.5), 2);
        assert_eq!(segment_steps(0.0), 2);
        assert_eq!(segment_steps(1_000.0), 400);
    }

    #[test]
    fn sub_unit_segments_are_skipped() {
        let mut stroke = Stroke::new(Rgba8::BLACK);
        stroke.push_raw(Vec2::new(0.0, 0.0), 1.0);
        stroke.push_raw(Vec2::new(0.5, 0.0), 1.0);
        let mut spans = 0;
        for_each_span(stroke.points(), |_| spans += 1);
        assert_eq!(spans, 0);
    }

    #[test]
    fn span_endpoints_chain_without_gaps() {
        let mut stroke = Stroke::new(Rgba8::BLACK);
        for i in 0..5 {
            stroke.push_raw(Vec2::new(i as f32 * 7.0, (i as f32).sin() * 4.0), 1.0);
        }
        let mut prev_end: Option<Vec2> = None;
        let mut spans = 0;
        for_each_span(stroke.points(), |span| {
            // Curves evaluate to the raw endpoint at t = 1, so the chain
            // stays gapless even across segment boundaries.
            if let Some(prev) = prev_end {
                assert!((prev - span.from).mag() < 1e-5);
            }
            prev_end = Some(span.to);
            spans += 1;
        });
        assert!(spans > 0);
    }

    #[test]
    fn thickness_tapers_linearly() {
        let mut stroke = Stroke::new(Rgba8::BLACK);
        stroke.push_raw(Vec2::new(0.0, 0.0), 10.0);
        stroke.push_raw(Vec2::new(25.0, 0.0), 0.0);
        let mut widths = Vec::new();
        for_each_span(stroke.points(), |span| widths.push(span.width));
        // d = 25 -> 10 steps, widths are midpoints of a linear taper:
        // strictly decreasing, symmetric around 5.
        assert_eq!(widths.len(), 10);
        for pair in widths.windows(2) {
            assert!(pair[1] < pair[0]);
        }
        let mid = (widths[4] + widths[5]) * 0.5;
        assert!((mid - 5.0).abs() < 1e-4);
    }
}
