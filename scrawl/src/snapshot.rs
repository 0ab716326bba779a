//! PNG snapshots of composited frames.

use crate::surface::{Pixmap, Surface};
use anyhow::Context;
use scrawl_core::color::Rgba8;

/// Write a frame as an 8-bit RGBA PNG.
pub fn write_png(path: &std::path::Path, pixmap: &Pixmap) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(
        std::io::BufWriter::new(file),
        pixmap.width(),
        pixmap.height(),
    );
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().context("writing png header")?;

    // Unpack the 0xAARRGGBB words into byte-order RGBA.
    let rgba: Vec<Rgba8> = pixmap
        .pixels()
        .iter()
        .map(|&px| Rgba8::from_argb_u32(px))
        .collect();
    writer
        .write_image_data(bytemuck::cast_slice(&rgba))
        .context("writing png data")?;
    Ok(())
}
