//! Render sinks: where laid-out glyphs end up.

use palette::Srgba;

use crate::text::layout::PlacedGlyph;

mod buffer;
mod live;

pub use buffer::BufferSink;
pub use live::LiveSink;

/// Colors and scale shared by every glyph of a draw call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Paint {
    pub foreground: Srgba<u8>,
    pub background: Srgba<u8>,
    pub scale: f32,
}

impl Paint {
    pub fn is_foreground_visible(&self) -> bool {
        self.foreground.alpha != 0
    }

    pub fn is_background_visible(&self) -> bool {
        self.background.alpha != 0
    }
}

/// Receives positioned glyphs, in unscaled units relative to the top-left
/// of the text block.
pub trait RenderSink {
    /// Draws one glyph of the line whose top is at `line_y`.
    fn draw_glyph(&mut self, glyph: &PlacedGlyph, line_y: i32, paint: &Paint);

    /// Draws a one-unit-high bar starting at `(x, y)`.
    fn draw_underline(&mut self, x: i32, y: i32, width: i32, paint: &Paint);
}
