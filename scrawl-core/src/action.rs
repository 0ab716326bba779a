//! # Actions
//!
//! The single inbound boundary of the sketch core. The shell (toolbars,
//! pointer decoding, pickers) reduces everything it wants done to one of
//! these variants and feeds them to [`crate::model::SketchModel::apply`],
//! which matches exhaustively - adding a variant is a compile error at
//! every dispatch site until it is handled.

use crate::color::Rgba8;
use ultraviolet::Vec2;

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Action {
    /// Begin a new stroke with the given color. Invalidates any pending
    /// redo history.
    StartPath(Rgba8),
    /// Extend the current stroke. Protocol violation if no stroke is
    /// active.
    Draw { pos: Vec2, pressure: f32 },
    /// Commit the current stroke to the finished list. No-op when nothing
    /// is in progress.
    PathEnd,
    /// Remove finished strokes intersecting this position.
    Erase(Vec2),
    Undo,
    Redo,
    ClearCanvas,
    /// Replace the whole tool configuration at once.
    UpdateTool {
        eraser: bool,
        pressure: bool,
        width: f32,
        color: Rgba8,
    },
    ToggleHandwritingMode(bool),
    SelectColor(Rgba8),
    SelectStrokeWidth(f32),
}
