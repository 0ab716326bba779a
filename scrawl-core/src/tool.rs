//! # Tool state
//!
//! The active drawing configuration. Written by explicit tool-change
//! actions, read at stroke start (to stamp color and width) and by the
//! compositor (to size the hover cursor).

use crate::color::Rgba8;

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ToolState {
    /// Eraser engaged, whether by toggle or a detected eraser tip.
    pub eraser: bool,
    /// When set, thickness follows input pressure; otherwise every point
    /// gets the full base width.
    pub pressure: bool,
    /// Base stroke width (diameter), canvas units.
    pub width: f32,
    pub color: Rgba8,
    /// Allow finger contact to draw. Off by default - stylus-only input is
    /// the palm rejection strategy.
    pub handwriting: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            eraser: false,
            pressure: true,
            width: 4.0,
            color: Rgba8::BLACK,
            handwriting: false,
        }
    }
}

impl ToolState {
    /// Thickness a point appended right now would get.
    #[must_use]
    pub fn thickness_for(&self, pressure: f32) -> f32 {
        if self.pressure {
            pressure * self.width
        } else {
            self.width
        }
    }
}
