//! # IDs
//!
//! Strokes carry a process-unique identity so the raster cache can tell
//! "the stroke I was incrementally baking" apart from "some other stroke
//! that happens to live at the same index". Values are never reused within
//! one execution; order carries no meaning.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

// ID zero is reserved as invalid; the counter starts at one.
static NEXT_STROKE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of one stroke within this execution of the program.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(NonZeroU64);

impl StrokeId {
    /// Allocate a fresh, never-before-seen ID.
    #[must_use]
    pub fn next() -> Self {
        let id = NEXT_STROKE_ID.fetch_add(1, Ordering::Relaxed);
        // Exhausting u64::MAX IDs means something has gone deeply wrong
        // upstream; at one stroke per millisecond that is half a billion
        // years of drawing.
        Self(NonZeroU64::new(id).expect("stroke ID counter overflowed"))
    }
    #[must_use]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Debug for StrokeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stroke#{}", self.0)
    }
}
