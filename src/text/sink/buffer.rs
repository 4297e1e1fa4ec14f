use glam::{uvec2, UVec2};
use palette::Srgba;

use crate::{
    font::GlyphMetrics,
    text::{layout::PlacedGlyph, line_break::CharKind},
};

use super::{Paint, RenderSink};

/// Composites glyphs into an RGBA8 pixel buffer, one pixel per font unit.
///
/// Writes outside the buffer are clipped.
pub struct BufferSink<'a, M> {
    pixels: Vec<u8>,
    size: UVec2,
    metrics: &'a M,
    proportional: bool,
}

impl<'a, M> BufferSink<'a, M>
where
    M: GlyphMetrics,
{
    /// Creates a sink over a fully transparent buffer.
    pub fn new(size: UVec2, metrics: &'a M, proportional: bool) -> Self {
        Self {
            pixels: vec![0; size.x as usize * size.y as usize * 4],
            size,
            metrics,
            proportional,
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.size.x || y as u32 >= self.size.y {
            return None;
        }
        Some((y as usize * self.size.x as usize + x as usize) * 4)
    }

    fn put(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.pixels[offset..offset + 4].copy_from_slice(&rgba);
        }
    }

    fn fill(&mut self, x: i32, y: i32, width: i32, height: i32, color: Srgba<u8>) {
        let rgba = to_array(color);
        for py in y..y + height {
            for px in x..x + width {
                self.put(px, py, rgba);
            }
        }
    }
}

impl<'a, M> RenderSink for BufferSink<'a, M>
where
    M: GlyphMetrics,
{
    fn draw_glyph(&mut self, glyph: &PlacedGlyph, line_y: i32, paint: &Paint) {
        let height = self.metrics.glyph_height();
        if paint.is_background_visible() {
            self.fill(
                glyph.cell_start(),
                line_y,
                glyph.cell_width(),
                height,
                paint.background,
            );
        }

        if glyph.kind != CharKind::Glyph || self.metrics.is_empty(glyph.c) {
            return;
        }
        let region = match self.metrics.source_rect(glyph.c, self.proportional) {
            Some(region) => region,
            None => return,
        };

        for dy in 0..region.height() {
            for dx in 0..region.width() {
                let source = self.metrics.atlas_pixel(region.pos + uvec2(dx, dy));
                let (x, y) = (glyph.x + dx as i32, line_y + dy as i32);
                // No coverage: the pixel shows the background, as in live drawing.
                if source[3] == 0 || !paint.is_foreground_visible() {
                    if paint.is_background_visible() {
                        self.put(x, y, to_array(paint.background));
                    }
                } else {
                    self.put(x, y, blend(source, paint));
                }
            }
        }
    }

    fn draw_underline(&mut self, x: i32, y: i32, width: i32, paint: &Paint) {
        if paint.is_foreground_visible() {
            self.fill(x, y, width, 1, paint.foreground);
        }
    }
}

fn to_array(color: Srgba<u8>) -> [u8; 4] {
    [color.red, color.green, color.blue, color.alpha]
}

/// Tints an atlas pixel with the foreground and mixes it over the background.
fn blend(source: [u8; 4], paint: &Paint) -> [u8; 4] {
    let fg = to_array(paint.foreground).map(f32::from);
    let bg = to_array(paint.background).map(f32::from);
    let src_alpha = f32::from(source[3]);

    let coverage = (src_alpha / 255.) * (fg[3] / 255.);
    let channel = |i: usize| {
        let ink = f32::from(source[i]) * fg[i] / 255. * coverage;
        let under = bg[i] * bg[3] / 255. * (1. - coverage);
        (ink + under).round().clamp(0., 255.) as u8
    };

    [
        channel(0),
        channel(1),
        channel(2),
        (src_alpha * fg[3] / 255.).round() as u8,
    ]
}
