use glam::{uvec2, vec2, Vec2};

use crate::{
    bitmap::Bitmap,
    canvas::Canvas,
    font::GlyphMetrics,
    text::{
        layout::TextLayout,
        line_break::{self, BreakParams},
        sink::{BufferSink, LiveSink, Paint, RenderSink},
        TextStyle,
    },
};

/// Lays out and renders text with one font and style.
///
/// Nothing is cached between calls: every `draw` or `bake` breaks and lays
/// out the text again with the current style.
#[derive(Debug, Clone)]
pub struct TextRenderer<F> {
    font: F,
    style: TextStyle,
    position: Vec2,
}

impl<F> TextRenderer<F>
where
    F: GlyphMetrics,
{
    pub fn new(font: F) -> Self {
        Self::with_style(font, TextStyle::default())
    }

    pub fn with_style(font: F, style: TextStyle) -> Self {
        Self {
            font,
            style,
            position: Vec2::ZERO,
        }
    }

    pub fn font(&self) -> &F {
        &self.font
    }

    /// Replaces the font, returning the previous one.
    pub fn set_font(&mut self, font: F) -> F {
        std::mem::replace(&mut self.font, font)
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut TextStyle {
        &mut self.style
    }

    /// The origin used by [`draw`](Self::draw) and [`bake`](Self::bake).
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) -> &mut Self {
        self.position = position;
        self
    }

    /// Sets the scale so that glyphs are `height` pixels tall.
    pub fn set_glyph_height(&mut self, height: f32) -> &mut Self {
        let base = self.font.glyph_height();
        if base > 0 {
            self.style.set_scale(height / base as f32);
        }
        self
    }

    /// Sets the scale so that one atlas cell is `width` pixels wide.
    pub fn set_cell_width(&mut self, width: f32) -> &mut Self {
        let base = self.font.cell_width();
        if base > 0 {
            self.style.set_scale(width / base as f32);
        }
        self
    }

    /// Height of a glyph on screen, in pixels.
    pub fn glyph_height(&self) -> f32 {
        self.font.glyph_height() as f32 * self.style.scale()
    }

    /// Width of an atlas cell on screen, in pixels.
    pub fn cell_width(&self) -> f32 {
        self.font.cell_width() as f32 * self.style.scale()
    }

    pub fn break_params(&self) -> BreakParams {
        BreakParams {
            max_width: self.style.layout_max_width(),
            tab_size: self.style.tab_size(),
            proportional_spacing: self.style.proportional_spacing(),
            proportional: self.style.is_proportional(),
            align: self.style.align(),
        }
    }

    /// Breaks and lays out `text` with the current style.
    pub fn layout(&self, text: &str) -> TextLayout {
        TextLayout::new(
            text,
            &self.font,
            &self.break_params(),
            self.style.vertical_spacing(),
        )
    }

    /// Width of `text` as a single unwrapped line, in unscaled units.
    pub fn measure(&self, text: &str) -> i32 {
        let params = BreakParams {
            max_width: 0,
            ..self.break_params()
        };
        line_break::measure(text, &self.font, &params)
    }

    /// Draws `text` at the renderer's position.
    pub fn draw(&self, canvas: &mut impl Canvas, text: &str) {
        self.draw_at(canvas, text, self.position);
    }

    /// Draws `text` anchored at `position`.
    pub fn draw_at(&self, canvas: &mut impl Canvas, text: &str, position: Vec2) {
        if text.is_empty() {
            return;
        }
        let layout = self.layout(text);
        let origin = self.block_origin(&layout, position);
        let mut sink = LiveSink::new(canvas, &self.font, self.style.is_proportional(), origin);
        self.render(&layout, &mut sink);
    }

    /// Renders `text` into a new bitmap placed at the renderer's position.
    pub fn bake(&self, text: &str) -> Option<Bitmap> {
        self.bake_at(text, self.position)
    }

    /// Renders `text` into a new bitmap anchored at `position`.
    ///
    /// Returns `None` if there is nothing to render.
    pub fn bake_at(&self, text: &str, position: Vec2) -> Option<Bitmap> {
        if text.is_empty() {
            return None;
        }
        let layout = self.layout(text);
        if layout.width() <= 0 || layout.height() <= 0 {
            log::debug!(
                "Not baking text block of size {}x{}",
                layout.width(),
                layout.height()
            );
            return None;
        }

        let size = uvec2(layout.width() as u32, layout.height() as u32);
        let mut sink = BufferSink::new(size, &self.font, self.style.is_proportional());
        self.render(&layout, &mut sink);

        Some(Bitmap::new(
            sink.into_pixels(),
            size,
            self.block_origin(&layout, position),
            self.style.scale(),
        ))
    }

    fn block_origin(&self, layout: &TextLayout, position: Vec2) -> Vec2 {
        let width = layout.width() as f32 * self.style.scale();
        position + vec2(self.style.anchor().offset(width), 0.)
    }

    fn paint(&self) -> Paint {
        Paint {
            foreground: self.style.foreground(),
            background: self.style.background(),
            scale: self.style.scale(),
        }
    }

    fn render(&self, layout: &TextLayout, sink: &mut impl RenderSink) {
        let paint = self.paint();
        let params = self.break_params();
        let underline_row = self.font.glyph_height() - 1;

        for (y, fragment, line) in layout.lines() {
            let mut extent: Option<(i32, i32)> = None;
            for glyph in line.glyphs(fragment, &self.font, &params) {
                sink.draw_glyph(&glyph, y, &paint);
                let start = extent.map_or(glyph.cell_start(), |(start, _)| start);
                extent = Some((start, glyph.end()));
            }

            if let (true, Some((start, end))) = (self.style.is_underlined(), extent) {
                sink.draw_underline(start, y + underline_row, end - start, &paint);
            }
        }

        log::trace!(
            "Rendered {} lines in a {}x{} block",
            layout.fragments().len(),
            layout.width(),
            layout.height()
        );
    }
}
