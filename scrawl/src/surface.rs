//! # Raster surfaces
//!
//! The minimal capability the sketch pipeline needs from a 2D backend:
//! clear, a thick round-capped line, and a filled dot. Both the baked
//! bitmap and the on-screen frame are [`Pixmap`]s; tests substitute a
//! recording surface to observe draw traffic instead of pixels.

use scrawl_core::color::Rgba8;
use scrawl_core::flatten;
use scrawl_core::stroke::Point;
use scrawl_core::util::point_segment_distance;
use ultraviolet::Vec2;

pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Reset every pixel to fully transparent.
    fn clear(&mut self);
    /// Thick line from `from` to `to` with round caps. `width` is the full
    /// diameter.
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba8);
    /// Filled dot.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgba8);
}

/// Render a run of smoothed points onto any surface: a lone point becomes a
/// dot of radius `thickness / 2`, anything longer is flattened into spans.
///
/// Both the baker and the compositor come through here, so a range baked
/// into the bitmap and the same range drawn live produce the same ink.
pub fn draw_stroke_points(surface: &mut impl Surface, points: &[Point], color: Rgba8) {
    match points {
        [] => {}
        [only] => surface.draw_circle(only.pos, only.thickness * 0.5, color),
        _ => flatten::for_each_span(points, |span| {
            surface.draw_line(span.from, span.to, span.width, color);
        }),
    }
}

/// Owned software framebuffer. Pixels are packed `0xAARRGGBB`, straight
/// alpha, row-major - the exact format the demo window presents, so a frame
/// goes to screen without conversion.
pub struct Pixmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Pixmap {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        Rgba8::from_argb_u32(self.pixels[y as usize * self.width as usize + x as usize])
    }
    /// True when every pixel is fully transparent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&px| px >> 24 == 0)
    }
    /// Flood with an opaque color (paper background).
    pub fn fill(&mut self, color: Rgba8) {
        self.pixels.fill(color.to_argb_u32());
    }
    /// Source-over another pixmap at the origin. Regions outside the
    /// destination are dropped.
    pub fn blit_from(&mut self, src: &Pixmap) {
        let w = self.width.min(src.width) as usize;
        let h = self.height.min(src.height) as usize;
        for y in 0..h {
            for x in 0..w {
                let over = Rgba8::from_argb_u32(src.pixels[y * src.width as usize + x]);
                if over.a() == 0 {
                    continue;
                }
                self.blend_pixel(x as i64, y as i64, over, 1.0);
            }
        }
    }

    /// Straight-alpha source-over with an extra coverage factor.
    fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba8, coverage: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        let src_a = f32::from(color.a()) / 255.0 * coverage;
        if src_a <= 0.0 {
            return;
        }
        let dst = Rgba8::from_argb_u32(self.pixels[index]);
        let dst_a = f32::from(dst.a()) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let channel = |s: u8, d: u8| {
            let s = f32::from(s) / 255.0;
            let d = f32::from(d) / 255.0;
            (s * src_a + d * dst_a * (1.0 - src_a)) / out_a
        };
        self.pixels[index] = Rgba8::from_f32_lossy([
            channel(color.r(), dst.r()),
            channel(color.g(), dst.g()),
            channel(color.b(), dst.b()),
            out_a,
        ])
        .to_argb_u32();
    }

    /// Fill the capsule around segment `a..=b` with soft single-pixel
    /// edges. A zero-length segment degenerates to a dot.
    fn fill_capsule(&mut self, a: Vec2, b: Vec2, radius: f32, color: Rgba8) {
        let radius = radius.max(0.5);
        let min_x = (a.x.min(b.x) - radius - 1.0).floor() as i64;
        let max_x = (a.x.max(b.x) + radius + 1.0).ceil() as i64;
        let min_y = (a.y.min(b.y) - radius - 1.0).floor() as i64;
        let max_y = (a.y.max(b.y) + radius + 1.0).ceil() as i64;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = point_segment_distance(sample, a, b);
                let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, color, coverage);
                }
            }
        }
    }
}

impl Surface for Pixmap {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn clear(&mut self) {
        self.pixels.fill(0);
    }
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba8) {
        self.fill_capsule(from, to, width * 0.5, color);
    }
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgba8) {
        self.fill_capsule(center, center, radius, color);
    }
}

/// Test-only surface that records draw calls instead of rasterizing.
#[cfg(test)]
#[derive(Default)]
pub struct TraceSurface {
    pub ops: Vec<TraceOp>,
}

#[cfg(test)]
#[derive(Clone, PartialEq, Debug)]
pub enum TraceOp {
    Clear,
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgba8,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgba8,
    },
}

#[cfg(test)]
impl Surface for TraceSurface {
    fn width(&self) -> u32 {
        0
    }
    fn height(&self) -> u32 {
        0
    }
    fn clear(&mut self) {
        self.ops.push(TraceOp::Clear);
    }
    fn draw_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba8) {
        self.ops.push(TraceOp::Line {
            from,
            to,
            width,
            color,
        });
    }
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgba8) {
        self.ops.push(TraceOp::Circle {
            center,
            radius,
            color,
        });
    }
}
