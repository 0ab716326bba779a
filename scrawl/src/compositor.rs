//! # Compositor
//!
//! Assembles one frame from current state: paper, optional reference grid,
//! the baked bitmap, the live tail of the in-progress stroke, and optional
//! debug/cursor overlays on top. Pure - given the same model, baker, and
//! viewport it produces the same pixels every time, so it is safe to call
//! unconditionally every frame.

use crate::baker::Baker;
use crate::surface::{draw_stroke_points, Pixmap, Surface};
use scrawl_core::color::Rgba8;
use scrawl_core::model::SketchModel;
use scrawl_core::stroke::Control;
use ultraviolet::Vec2;

bitflags::bitflags! {
    /// Diagnostic overlays, all off in normal use.
    #[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
    pub struct DebugOverlay: u8 {
        /// Mark derived Bézier control points.
        const CONTROL_POINTS = 1 << 0;
        /// Mark raw input points.
        const RAW_POINTS     = 1 << 1;
    }
}

/// Grid pitch: one em of 12pt type at 96 dpi.
const GRID_CELL: f32 = 16.0;
const GRID_COLOR: Rgba8 = Rgba8::new(100, 120, 160, 56);
const PAPER: Rgba8 = Rgba8::opaque(251, 249, 243);
const CONTROL_MARK: Rgba8 = Rgba8::opaque(220, 60, 40);
const RAW_MARK: Rgba8 = Rgba8::opaque(40, 90, 220);

#[derive(Default)]
pub struct Compositor {
    pub overlay: DebugOverlay,
}

impl Compositor {
    /// Draw a complete frame. `hover` is the pen position while not in
    /// contact, rendered as a width-sized cursor dot.
    pub fn render(
        &self,
        frame: &mut Pixmap,
        model: &SketchModel,
        baker: &Baker<Pixmap>,
        hover: Option<Vec2>,
    ) {
        frame.fill(PAPER);
        if model.grid {
            draw_grid(frame);
        }
        frame.blit_from(baker.pixmap());
        if let Some(stroke) = model.current() {
            let start = baker.live_tail_start(stroke);
            draw_stroke_points(frame, &stroke.points()[start..], stroke.color());
        }
        if !self.overlay.is_empty() {
            self.draw_overlay(frame, model);
        }
        if let Some(pos) = hover {
            let radius = (model.tool.width * 0.5).max(1.5);
            let ink = if model.tool.eraser {
                Rgba8::new(90, 90, 90, 110)
            } else {
                model.tool.color.with_alpha(110)
            };
            frame.draw_circle(pos, radius, ink);
        }
    }

    fn draw_overlay(&self, frame: &mut Pixmap, model: &SketchModel) {
        let strokes = model.finished().iter().chain(model.current());
        for stroke in strokes {
            for point in stroke.points() {
                if self.overlay.contains(DebugOverlay::CONTROL_POINTS) {
                    match point.control {
                        Control::None => {}
                        Control::Quadratic(c) => frame.draw_circle(c, 1.5, CONTROL_MARK),
                        Control::Cubic(c1, c2) => {
                            frame.draw_circle(c1, 1.5, CONTROL_MARK);
                            frame.draw_circle(c2, 1.5, CONTROL_MARK);
                        }
                    }
                }
                if self.overlay.contains(DebugOverlay::RAW_POINTS) {
                    frame.draw_circle(point.pos, 2.0, RAW_MARK);
                }
            }
        }
    }
}

fn draw_grid(frame: &mut Pixmap) {
    let width = frame.width() as f32;
    let height = frame.height() as f32;
    let mut x = GRID_CELL;
    while x < width {
        frame.draw_line(Vec2::new(x, 0.0), Vec2::new(x, height), 1.0, GRID_COLOR);
        x += GRID_CELL;
    }
    let mut y = GRID_CELL;
    while y < height {
        frame.draw_line(Vec2::new(0.0, y), Vec2::new(width, y), 1.0, GRID_COLOR);
        y += GRID_CELL;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use scrawl_core::action::Action;

    const W: u32 = 96;
    const H: u32 = 64;

    fn draw(model: &mut SketchModel, points: &[(f32, f32)]) {
        model.apply(Action::StartPath(model.tool.color));
        for &(x, y) in points {
            model.apply(Action::Draw {
                pos: Vec2::new(x, y),
                pressure: 1.0,
            });
        }
        model.apply(Action::PathEnd);
    }

    fn max_channel_delta(a: &Pixmap, b: &Pixmap) -> u8 {
        a.pixels()
            .iter()
            .zip(b.pixels())
            .map(|(&pa, &pb)| {
                pa.to_le_bytes()
                    .iter()
                    .zip(pb.to_le_bytes())
                    .map(|(&ca, cb)| ca.abs_diff(cb))
                    .max()
                    .unwrap()
            })
            .max()
            .unwrap()
    }

    #[test]
    fn compositing_is_idempotent() {
        let mut model = SketchModel::new();
        model.grid = true;
        draw(&mut model, &[(5.0, 5.0), (40.0, 30.0), (80.0, 10.0)]);
        let mut baker = Baker::new(W, H);
        baker.sync(&model);

        let compositor = Compositor::default();
        let mut first = Pixmap::new(W, H);
        let mut second = Pixmap::new(W, H);
        compositor.render(&mut first, &model, &baker, None);
        compositor.render(&mut second, &model, &baker, None);
        assert_eq!(first.pixels(), second.pixels());
    }

    #[test]
    fn baked_plus_live_tail_matches_direct_render() {
        // Mid-stroke, with a baked head and a live tail, the composited
        // frame must reproduce a from-scratch render of all ink.
        let mut model = SketchModel::new();
        draw(&mut model, &[(4.0, 50.0), (60.0, 50.0)]);
        model.apply(Action::StartPath(model.tool.color));
        for i in 0..10 {
            model.apply(Action::Draw {
                pos: Vec2::new(4.0 + i as f32 * 8.0, 20.0),
                pressure: 1.0,
            });
        }
        let mut baker = Baker::new(W, H);
        baker.sync(&model);
        assert!(baker.current_baked() > 0);

        let mut frame = Pixmap::new(W, H);
        Compositor::default().render(&mut frame, &model, &baker, None);

        let mut reference = Pixmap::new(W, H);
        reference.fill(super::PAPER);
        for stroke in model.finished() {
            draw_stroke_points(&mut reference, stroke.points(), stroke.color());
        }
        let current = model.current().unwrap();
        draw_stroke_points(&mut reference, current.points(), current.color());

        // Blend quantization may wobble the last bit where spans abut;
        // anything beyond that is a seam or a duplicate.
        assert!(max_channel_delta(&frame, &reference) <= 2);
    }

    #[test]
    fn resize_mid_stroke_keeps_all_ink_visible() {
        let mut model = SketchModel::new();
        model.tool.width = 6.0;
        model.apply(Action::StartPath(model.tool.color));
        for i in 0..8 {
            model.apply(Action::Draw {
                pos: Vec2::new(8.0 + i as f32 * 8.0, 32.0),
                pressure: 1.0,
            });
        }
        let mut baker = Baker::new(W, H);
        baker.sync(&model);
        assert!(baker.current_baked() > 0);

        // Viewport changes under the pen: bake state is lost...
        baker.resize(W + 32, H);
        assert_eq!(baker.current_baked(), 0);

        // ...but the next frame still shows the entire stroke, straight
        // from geometry.
        let mut frame = Pixmap::new(W + 32, H);
        Compositor::default().render(&mut frame, &model, &baker, None);
        for i in 0..8 {
            let x = 8 + i * 8;
            assert_eq!(frame.pixel(x, 32), Rgba8::BLACK, "ink missing at x={x}");
        }
    }

    #[test]
    fn grid_is_cosmetic_and_toggleable() {
        let mut model = SketchModel::new();
        let baker = Baker::new(W, H);
        let compositor = Compositor::default();

        let mut plain = Pixmap::new(W, H);
        model.grid = false;
        compositor.render(&mut plain, &model, &baker, None);
        assert_eq!(plain.pixel(GRID_CELL as u32, 5), PAPER);

        let mut gridded = Pixmap::new(W, H);
        model.grid = true;
        compositor.render(&mut gridded, &model, &baker, None);
        assert_ne!(gridded.pixel(GRID_CELL as u32, 5), PAPER);
    }

    #[test]
    fn hover_cursor_draws_at_pointer() {
        let model = SketchModel::new();
        let baker = Baker::new(W, H);
        let mut frame = Pixmap::new(W, H);
        Compositor::default().render(&mut frame, &model, &baker, Some(Vec2::new(48.0, 32.0)));
        assert_ne!(frame.pixel(48, 32), PAPER);
    }
}
