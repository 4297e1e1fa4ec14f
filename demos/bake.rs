//! Bakes a paragraph with a procedurally generated font and writes it to a PNG.
//!
//! Usage: `cargo run --example bake -- [text] [output.png]`

use cora::{
    glam::{uvec2, vec2, UVec2},
    Align, Anchor, BitmapFont, Fonts, Srgba, TextRenderer,
};
use simple_logger::SimpleLogger;

const DEFAULT_TEXT: &str = "Bitmap fonts are laid out one cell at a time.\n\
    Wrapped lines are justified\tto fill the block, and the last line of each paragraph stays left aligned.";

/// Builds a 16x8 grid atlas of 6x8 cells. Each printable ASCII glyph gets
/// a block pattern derived from its code point, so every character is
/// distinguishable without shipping an image.
fn procedural_atlas(cell: UVec2) -> (Vec<u8>, UVec2) {
    let size = uvec2(16 * cell.x, 8 * cell.y);
    let mut pixels = vec![0u8; (size.x * size.y * 4) as usize];

    for code in 33u32..127 {
        let origin = uvec2((code % 16) * cell.x, (code / 16) * cell.y);
        let width = 2 + code % (cell.x - 2);
        for y in 1..cell.y - 1 {
            for x in 0..width {
                let lit = x == 0 || (code * 31 + y * 7 + x * 13) % 3 != 0;
                if !lit {
                    continue;
                }
                let offset = (((origin.y + y) * size.x + origin.x + x) * 4) as usize;
                pixels[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
    }

    (pixels, size)
}

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()?;

    let mut args = std::env::args().skip(1);
    let text = args.next().unwrap_or_else(|| DEFAULT_TEXT.to_owned());
    let output = args.next().unwrap_or_else(|| "baked.png".to_owned());

    let cell = uvec2(6, 8);
    let (pixels, atlas_size) = procedural_atlas(cell);
    let mut fonts = Fonts::new();
    fonts.add(BitmapFont::from_rgba("blocks", pixels, atlas_size, cell, true)?);

    let mut renderer = TextRenderer::new(fonts.by_name("blocks")?);
    renderer.set_position(vec2(320., 16.)).set_glyph_height(16.);
    renderer
        .style_mut()
        .set_max_width(480)
        .set_proportional_spacing(1)
        .set_vertical_spacing(3)
        .set_align(Align::Full)
        .set_anchor(Anchor::Center)
        .set_foreground(Srgba::new(250, 220, 120, 255))
        .set_background(Srgba::new(20, 24, 40, 255));

    let bitmap = renderer
        .bake(&text)
        .ok_or_else(|| anyhow::anyhow!("nothing to bake"))?;
    log::info!(
        "Baked {} lines into a {}x{} bitmap at {:?} (scale {})",
        renderer.layout(&text).fragments().len(),
        bitmap.width(),
        bitmap.height(),
        bitmap.position(),
        bitmap.scale()
    );

    bitmap.to_image().save(&output)?;
    log::info!("Wrote {}", output);
    Ok(())
}
