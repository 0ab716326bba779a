//! # Sketch model
//!
//! Ground truth for one sketch surface: the ordered finished strokes
//! (insertion order is z-order is undo order), the at-most-one in-progress
//! stroke, the redo buffer, and the active tool. All mutation funnels
//! through [`SketchModel::apply`] so that every caller shares one
//! exhaustive match over [`Action`].
//!
//! The model holds no raster state. The incremental baker watches the
//! finished-stroke count and the current stroke's length from the outside
//! and derives its own bookkeeping from them.

use crate::action::Action;
use crate::color::Rgba8;
use crate::stroke::Stroke;
use crate::tool::ToolState;
use crate::util::point_segment_distance;
use smallvec::SmallVec;
use ultraviolet::Vec2;

/// Violations of the stroke protocol. These indicate a broken event
/// source, not a recoverable condition; the panicking [`SketchModel::apply`]
/// is the intended entry point.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("draw with no active stroke - StartPath must come first")]
    DrawWithoutStart,
    #[error("start while a stroke is already in progress")]
    StartWhileActive,
}

#[derive(Default)]
pub struct SketchModel {
    finished: Vec<Stroke>,
    current: Option<Stroke>,
    /// Strokes popped by undo, most recently undone last. Any new stroke
    /// start drains this - linear history, no branches.
    undone: Vec<Stroke>,
    /// Reference-grid visibility. Cosmetic, read by the compositor only.
    pub grid: bool,
    pub tool: ToolState,
}

impl SketchModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn finished(&self) -> &[Stroke] {
        &self.finished
    }
    #[must_use]
    pub fn current(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }
    /// Whether a redo would restore anything. Shells use this to grey out
    /// the redo affordance.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.finished.is_empty()
    }

    /// Apply one inbound action, failing fast on protocol violations:
    /// `Draw` without an active stroke, or `StartPath` while one is
    /// already active.
    pub fn apply(&mut self, action: Action) {
        if let Err(e) = self.try_apply(action) {
            panic!("action protocol violation: {e}");
        }
    }

    /// Like [`Self::apply`], but reporting protocol violations to the
    /// caller. On error the model is unchanged.
    pub fn try_apply(&mut self, action: Action) -> Result<(), ProtocolError> {
        match action {
            Action::StartPath(color) => return self.start_path(color),
            Action::Draw { pos, pressure } => return self.append_point(pos, pressure),
            Action::PathEnd => self.end_path(),
            Action::Erase(pos) => self.erase(pos),
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::ClearCanvas => self.clear(),
            Action::UpdateTool {
                eraser,
                pressure,
                width,
                color,
            } => {
                self.tool.eraser = eraser;
                self.tool.pressure = pressure;
                self.tool.width = width;
                self.tool.color = color;
            }
            Action::ToggleHandwritingMode(enabled) => self.tool.handwriting = enabled,
            Action::SelectColor(color) => self.tool.color = color,
            Action::SelectStrokeWidth(width) => self.tool.width = width,
        }
        Ok(())
    }

    pub fn start_path(&mut self, color: Rgba8) -> Result<(), ProtocolError> {
        if self.current.is_some() {
            return Err(ProtocolError::StartWhileActive);
        }
        // A fresh stroke invalidates anything waiting on redo.
        self.undone.clear();
        self.current = Some(Stroke::new(color));
        Ok(())
    }

    /// Append a point to the in-progress stroke. Thickness comes from the
    /// tool: `pressure * width` under pressure sensitivity, else `width`.
    pub fn append_point(&mut self, pos: Vec2, pressure: f32) -> Result<(), ProtocolError> {
        let thickness = self.tool.thickness_for(pressure);
        self.current
            .as_mut()
            .ok_or(ProtocolError::DrawWithoutStart)?
            .push_raw(pos, thickness);
        Ok(())
    }

    /// Commit the in-progress stroke. No-op when nothing is in progress; a
    /// stroke that never received a point is dropped rather than committed.
    pub fn end_path(&mut self) {
        if let Some(stroke) = self.current.take() {
            if stroke.is_empty() {
                log::trace!("dropping empty stroke");
            } else {
                self.finished.push(stroke);
            }
        }
    }

    /// Remove every finished stroke whose spine passes within eraser reach
    /// of `pos`.
    ///
    /// Hit test: distance from `pos` to each raw segment of the stroke,
    /// against half the segment's local thickness plus half the tool width.
    /// Removal is whole-stroke. Erasure is terminal - removed strokes do
    /// not enter the undo history, and a hit drains the redo buffer.
    pub fn erase(&mut self, pos: Vec2) {
        let reach = self.tool.width * 0.5;
        let mut hits: SmallVec<[usize; 4]> = SmallVec::new();
        for (index, stroke) in self.finished.iter().enumerate() {
            if stroke_hit(stroke, pos, reach) {
                hits.push(index);
            }
        }
        if hits.is_empty() {
            return;
        }
        log::debug!("erase at {pos:?} removed {} stroke(s)", hits.len());
        for index in hits.iter().rev() {
            self.finished.remove(*index);
        }
        self.undone.clear();
    }

    /// Pop the most recent finished stroke onto the redo buffer.
    pub fn undo(&mut self) {
        if let Some(stroke) = self.finished.pop() {
            self.undone.push(stroke);
        }
    }

    /// Restore the most recently undone stroke. No-op when the buffer is
    /// empty or was invalidated by a new stroke.
    pub fn redo(&mut self) {
        if let Some(stroke) = self.undone.pop() {
            self.finished.push(stroke);
        }
    }

    /// Drop all ink: finished strokes, the in-progress stroke, and the redo
    /// buffer. The raster cache notices the shrink on its next sync and
    /// clears its bitmap.
    pub fn clear(&mut self) {
        log::debug!("clear: dropping {} stroke(s)", self.finished.len());
        self.finished.clear();
        self.current = None;
        self.undone.clear();
    }
}

/// Whether `pos` lands on `stroke`, with `reach` extra radius around the
/// stroke's own local thickness.
fn stroke_hit(stroke: &Stroke, pos: Vec2, reach: f32) -> bool {
    let points = stroke.points();
    match points {
        [] => false,
        [only] => (pos - only.pos).mag() <= only.thickness * 0.5 + reach,
        _ => points.windows(2).any(|pair| {
            let threshold = pair[0].thickness.max(pair[1].thickness) * 0.5 + reach;
            point_segment_distance(pos, pair[0].pos, pair[1].pos) <= threshold
        }),
    }
}
