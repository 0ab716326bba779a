//! # Incremental baking
//!
//! Keeps per-frame render cost bounded no matter how much ink accumulates.
//! Finished strokes - and the stable head of the in-progress stroke - are
//! rasterized once into an owned off-screen surface; each frame only the
//! short live tail near the pen tip is re-derived from geometry.
//!
//! The baker is a pure function of the model observed at [`Baker::sync`]
//! time. It keeps two pieces of bookkeeping: how many finished strokes are
//! already in the bitmap, and (by stroke identity) how many points of the
//! in-progress stroke are. Whenever the model's history shrinks under
//! either counter, the bitmap is cleared and rebuilt from scratch - a stale
//! partial bake is never reused.

use crate::surface::{draw_stroke_points, Pixmap, Surface};
use scrawl_core::id::StrokeId;
use scrawl_core::model::SketchModel;
use scrawl_core::stroke::Stroke;

/// Points at the end of the in-progress stroke that are never baked. The
/// smoothing of the newest segments still shifts as points arrive; baking
/// them would freeze a curve that is about to be re-estimated.
pub const LIVE_TAIL: usize = 4;
/// Smallest run of newly-stable points worth a partial bake. Anything less
/// thrashes the bitmap for no visible gain.
const MIN_BAKE_RUN: usize = 2;

pub struct Baker<S> {
    surface: S,
    /// Finished strokes already rasterized, counted from the front of the
    /// model's finished list.
    drawn_paths: usize,
    /// In-progress bake state: which stroke, and how many of its points are
    /// in the bitmap. Identity-keyed so a cleared or swapped stroke can
    /// never be mistaken for a continuation.
    partial: Option<(StrokeId, usize)>,
}

impl Baker<Pixmap> {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_surface(Pixmap::new(width, height))
    }
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.surface
    }
    /// Reallocate for a new viewport. Discards all baked ink and resets the
    /// counters; the next [`Self::sync`] rebuilds from the model. Progress
    /// baked from an in-flight stroke is lost; its points all return to
    /// the live tail until they stabilize again.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.surface.width() == width && self.surface.height() == height {
            return;
        }
        log::debug!("baker resize to {width}x{height}");
        self.surface = Pixmap::new(width, height);
        self.drawn_paths = 0;
        self.partial = None;
    }
}

impl<S: Surface> Baker<S> {
    #[must_use]
    pub fn with_surface(surface: S) -> Self {
        Self {
            surface,
            drawn_paths: 0,
            partial: None,
        }
    }
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }
    /// Count of finished strokes currently rasterized.
    #[must_use]
    pub fn drawn_paths(&self) -> usize {
        self.drawn_paths
    }
    /// Points of the in-progress stroke currently rasterized.
    #[must_use]
    pub fn current_baked(&self) -> usize {
        self.partial.map_or(0, |(_, baked)| baked)
    }
    /// First point index of `current` the compositor must draw live.
    /// Overlaps the baked range by one point so the first live segment
    /// joins the baked ink without a seam.
    #[must_use]
    pub fn live_tail_start(&self, current: &Stroke) -> usize {
        match self.partial {
            Some((id, baked)) if id == current.id() => baked.saturating_sub(1),
            _ => 0,
        }
    }

    fn reset(&mut self) {
        self.surface.clear();
        self.drawn_paths = 0;
        self.partial = None;
    }

    /// Bring the bitmap up to date with the model. Called once per frame
    /// (or per event batch); every trigger the cache responds to funnels
    /// through here, in a fixed order.
    pub fn sync(&mut self, model: &SketchModel) {
        // 1. History shrank (undo, clear): wipe before anything else.
        if model.finished().len() < self.drawn_paths {
            self.reset();
        }
        // 2. The stroke we were incrementally baking must still be
        //    reachable - still current, or among the newly finished
        //    strokes handled below. Otherwise its ink is orphaned in the
        //    bitmap: wipe and rebuild.
        if let Some((id, _)) = self.partial {
            let still_current = model.current().is_some_and(|s| s.id() == id);
            let newly_finished = model.finished()[self.drawn_paths..]
                .iter()
                .any(|s| s.id() == id);
            if !still_current && !newly_finished {
                self.reset();
            }
        }
        // 3. Bake newly finished strokes. The stroke that was in progress
        //    last sync continues from its baked boundary instead of being
        //    drawn a second time from the start.
        for stroke in &model.finished()[self.drawn_paths..] {
            let start = match self.partial {
                Some((id, baked)) if id == stroke.id() => {
                    self.partial = None;
                    baked.saturating_sub(1)
                }
                _ => 0,
            };
            draw_stroke_points(&mut self.surface, &stroke.points()[start..], stroke.color());
        }
        self.drawn_paths = model.finished().len();
        // 4. Advance the in-progress bake, always leaving LIVE_TAIL points
        //    unbaked and never moving for fewer than MIN_BAKE_RUN new
        //    points.
        match model.current() {
            None => self.partial = None,
            Some(stroke) => {
                let baked = match self.partial {
                    Some((id, baked)) if id == stroke.id() => baked,
                    _ => 0,
                };
                let stable = stroke.len().saturating_sub(LIVE_TAIL);
                if stable >= baked + MIN_BAKE_RUN {
                    let start = baked.saturating_sub(1);
                    draw_stroke_points(
                        &mut self.surface,
                        &stroke.points()[start..stable],
                        stroke.color(),
                    );
                    self.partial = Some((stroke.id(), stable));
                } else if baked > 0 {
                    self.partial = Some((stroke.id(), baked));
                } else {
                    self.partial = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::surface::{TraceOp, TraceSurface};
    use scrawl_core::action::Action;
    use scrawl_core::color::Rgba8;
    use ultraviolet::Vec2;

    fn finish_stroke(model: &mut SketchModel, offset: f32, count: usize) {
        model.apply(Action::StartPath(model.tool.color));
        for i in 0..count {
            model.apply(Action::Draw {
                pos: Vec2::new(i as f32 * 5.0, offset),
                pressure: 1.0,
            });
        }
        model.apply(Action::PathEnd);
    }

    /// Render the whole model directly, no incremental state.
    fn direct_render(model: &SketchModel) -> Vec<TraceOp> {
        let mut trace = TraceSurface::default();
        for stroke in model.finished() {
            draw_stroke_points(&mut trace, stroke.points(), stroke.color());
        }
        trace.ops
    }

    #[test]
    fn bake_completeness() {
        let mut model = SketchModel::new();
        finish_stroke(&mut model, 0.0, 4);
        finish_stroke(&mut model, 10.0, 7);
        finish_stroke(&mut model, 20.0, 2);

        let mut baker = Baker::with_surface(TraceSurface::default());
        baker.sync(&model);
        assert_eq!(baker.drawn_paths(), model.finished().len());
        // Baked draw traffic is exactly a direct render of every stroke.
        assert_eq!(baker.surface().ops, direct_render(&model));
        // A second sync with nothing new is silent.
        baker.sync(&model);
        assert_eq!(baker.surface().ops, direct_render(&model));
    }

    #[test]
    fn bake_non_duplication_across_incremental_syncs() {
        // Append one point at a time, syncing after every event, then
        // finish. The accumulated bake log must equal a one-shot direct
        // render: every segment touched exactly once.
        let mut model = SketchModel::new();
        let mut baker = Baker::with_surface(TraceSurface::default());

        model.apply(Action::StartPath(Rgba8::BLACK));
        for i in 0..12 {
            model.apply(Action::Draw {
                pos: Vec2::new(i as f32 * 6.0, (i % 3) as f32 * 4.0),
                pressure: 1.0,
            });
            baker.sync(&model);
        }
        model.apply(Action::PathEnd);
        baker.sync(&model);

        assert_eq!(baker.surface().ops, direct_render(&model));
        // Lifting the pen resets the in-progress counter.
        assert_eq!(baker.current_baked(), 0);
    }

    #[test]
    fn live_tail_is_never_baked() {
        let mut model = SketchModel::new();
        let mut baker = Baker::with_surface(TraceSurface::default());
        model.apply(Action::StartPath(Rgba8::BLACK));
        for i in 0..9 {
            model.apply(Action::Draw {
                pos: Vec2::new(i as f32 * 5.0, 0.0),
                pressure: 1.0,
            });
        }
        baker.sync(&model);
        // 9 points, 4 reserved for the tail: boundary sits at 5.
        assert_eq!(baker.current_baked(), 5);
        let current = model.current().unwrap();
        // Live tail starts one point back for a seamless join.
        assert_eq!(baker.live_tail_start(current), 4);

        // One more point is below the minimum run; the boundary holds.
        model.apply(Action::Draw {
            pos: Vec2::new(45.0, 0.0),
            pressure: 1.0,
        });
        let before = baker.surface().ops.len();
        baker.sync(&model);
        assert_eq!(baker.current_baked(), 5);
        assert_eq!(baker.surface().ops.len(), before);
    }

    #[test]
    fn shrink_clears_and_rebakes() {
        let mut model = SketchModel::new();
        finish_stroke(&mut model, 0.0, 5);
        finish_stroke(&mut model, 10.0, 5);
        let mut baker = Baker::with_surface(TraceSurface::default());
        baker.sync(&model);
        assert_eq!(baker.drawn_paths(), 2);

        model.apply(Action::Undo);
        let before = baker.surface().ops.len();
        baker.sync(&model);
        // Clear first, then a full re-bake of the one surviving stroke.
        assert_eq!(baker.surface().ops[before], TraceOp::Clear);
        assert_eq!(baker.drawn_paths(), 1);
        assert_eq!(baker.surface().ops[before + 1..].to_vec(), direct_render(&model));
    }

    #[test]
    fn clear_mid_stroke_orphans_nothing() {
        let mut model = SketchModel::new();
        let mut baker = Baker::with_surface(TraceSurface::default());
        model.apply(Action::StartPath(Rgba8::BLACK));
        for i in 0..8 {
            model.apply(Action::Draw {
                pos: Vec2::new(i as f32 * 5.0, 0.0),
                pressure: 1.0,
            });
        }
        baker.sync(&model);
        assert!(baker.current_baked() > 0);

        // The in-flight stroke evaporates without ever finishing.
        model.apply(Action::ClearCanvas);
        baker.sync(&model);
        assert_eq!(baker.current_baked(), 0);
        assert_eq!(baker.drawn_paths(), 0);
        assert_eq!(baker.surface().ops.last(), Some(&TraceOp::Clear));
    }

    #[test]
    fn resize_mid_stroke_resets_bake_state() {
        let mut model = SketchModel::new();
        let mut baker = Baker::new(64, 64);
        model.apply(Action::StartPath(Rgba8::BLACK));
        for i in 0..8 {
            model.apply(Action::Draw {
                pos: Vec2::new(i as f32 * 5.0, 8.0),
                pressure: 1.0,
            });
        }
        baker.sync(&model);
        assert!(baker.current_baked() > 0);
        assert!(!baker.pixmap().is_blank());

        baker.resize(32, 32);
        // Bitmap reallocated transparent; baked progress on the in-flight
        // stroke is forgotten, so the whole stroke is live again.
        assert!(baker.pixmap().is_blank());
        assert_eq!(baker.current_baked(), 0);
        assert_eq!(baker.drawn_paths(), 0);
        assert_eq!(baker.live_tail_start(model.current().unwrap()), 0);

        // Same-size resize is a no-op and keeps baked ink.
        baker.sync(&model);
        assert!(!baker.pixmap().is_blank());
        baker.resize(32, 32);
        assert!(!baker.pixmap().is_blank());
    }
}
