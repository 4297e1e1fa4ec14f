use glam::{vec2, Vec2};

use crate::{
    canvas::Canvas,
    font::GlyphMetrics,
    rect::Rect,
    text::{layout::PlacedGlyph, line_break::CharKind},
};

use super::{Paint, RenderSink};

/// Issues draw calls against a [`Canvas`] as glyphs arrive.
pub struct LiveSink<'a, C, M> {
    canvas: &'a mut C,
    metrics: &'a M,
    proportional: bool,
    origin: Vec2,
}

impl<'a, C, M> LiveSink<'a, C, M>
where
    C: Canvas,
    M: GlyphMetrics,
{
    /// `origin` is the top-left of the block in canvas coordinates,
    /// after anchoring.
    pub fn new(canvas: &'a mut C, metrics: &'a M, proportional: bool, origin: Vec2) -> Self {
        Self {
            canvas,
            metrics,
            proportional,
            origin,
        }
    }

    fn to_canvas(&self, x: i32, y: i32, scale: f32) -> Vec2 {
        self.origin + vec2(x as f32, y as f32) * scale
    }
}

impl<'a, C, M> RenderSink for LiveSink<'a, C, M>
where
    C: Canvas,
    M: GlyphMetrics,
{
    fn draw_glyph(&mut self, glyph: &PlacedGlyph, line_y: i32, paint: &Paint) {
        let fill_background = paint.is_background_visible() && glyph.cell_width() > 0;
        let region = match glyph.kind {
            CharKind::Glyph if paint.is_foreground_visible() && !self.metrics.is_empty(glyph.c) => {
                self.metrics.source_rect(glyph.c, self.proportional)
            }
            _ => None,
        };
        if !fill_background && region.is_none() {
            return;
        }

        let height = self.metrics.glyph_height() as f32;
        let translation = self.to_canvas(glyph.x, line_y, paint.scale);
        let texture = self.metrics.atlas_name();
        let canvas = &mut *self.canvas;

        canvas.save();
        canvas.translate(translation);
        canvas.scale(Vec2::splat(paint.scale));
        if fill_background {
            canvas.fill_rect(
                Rect::from_xywh(-glyph.gap as f32, 0., glyph.cell_width() as f32, height),
                paint.background,
            );
        }
        if let Some(region) = region {
            canvas.draw_textured_quad(
                texture,
                region,
                Rect::from_xywh(0., 0., region.width() as f32, region.height() as f32),
                paint.foreground,
            );
        }
        canvas.restore();
    }

    fn draw_underline(&mut self, x: i32, y: i32, width: i32, paint: &Paint) {
        if width <= 0 || !paint.is_foreground_visible() {
            return;
        }
        let translation = self.to_canvas(x, y, paint.scale);
        let canvas = &mut *self.canvas;
        canvas.save();
        canvas.translate(translation);
        canvas.scale(Vec2::splat(paint.scale));
        canvas.fill_rect(Rect::from_xywh(0., 0., width as f32, 1.), paint.foreground);
        canvas.restore();
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;
    use palette::Srgba;

    use crate::{
        canvas::{Command, RecordingCanvas},
        font::fixtures,
        rect::AtlasRegion,
    };

    use super::*;

    fn paint(background: Srgba<u8>) -> Paint {
        Paint {
            foreground: Srgba::new(255, 255, 255, 255),
            background,
            scale: 2.,
        }
    }

    fn glyph(c: char, x: i32, gap: i32, advance: i32) -> PlacedGlyph {
        PlacedGlyph {
            c,
            kind: CharKind::of(c),
            x,
            gap,
            advance,
        }
    }

    #[test]
    fn glyph_quads_are_scaled_and_offset() {
        let font = fixtures::font();
        let mut canvas = RecordingCanvas::new();
        let mut sink = LiveSink::new(&mut canvas, &font, true, vec2(100., 50.));
        let width = fixtures::ink_width('A') as i32;
        sink.draw_glyph(&glyph('A', 3, 0, width), 10, &paint(Srgba::new(0, 0, 0, 0)));

        assert_eq!(
            canvas.take_commands(),
            vec![Command::DrawTexturedQuad {
                texture: "test".into(),
                region: AtlasRegion::new(uvec2(8, 40), uvec2(width as u32, 10)),
                dest: Rect::from_xywh(106., 70., width as f32 * 2., 20.),
                color: Srgba::new(255, 255, 255, 255),
            }]
        );
        assert_eq!(canvas.transform(), glam::Affine2::IDENTITY);
    }

    #[test]
    fn background_covers_gap_and_advance() {
        let font = fixtures::font();
        let mut canvas = RecordingCanvas::new();
        let background = Srgba::new(0, 0, 255, 128);
        let mut sink = LiveSink::new(&mut canvas, &font, true, Vec2::ZERO);
        sink.draw_glyph(&glyph(' ', 4, 0, 8), 0, &paint(background));
        sink.draw_glyph(&glyph('b', 17, 5, 3), 0, &paint(background));

        let commands = canvas.take_commands();
        assert_eq!(
            commands[0],
            Command::FillRect {
                dest: Rect::from_xywh(8., 0., 16., 20.),
                color: background,
            }
        );
        assert_eq!(
            commands[1],
            Command::FillRect {
                dest: Rect::from_xywh(24., 0., 16., 20.),
                color: background,
            }
        );
        assert!(matches!(commands[2], Command::DrawTexturedQuad { .. }));
        assert_eq!(commands.len(), 3);
    }

    #[test]
    fn invisible_glyphs_draw_nothing() {
        let font = fixtures::font();
        let mut canvas = RecordingCanvas::new();
        let mut sink = LiveSink::new(&mut canvas, &font, true, Vec2::ZERO);
        let transparent = paint(Srgba::new(0, 0, 0, 0));
        sink.draw_glyph(&glyph(' ', 0, 0, 8), 0, &transparent);
        sink.draw_glyph(&glyph('\t', 8, 0, 8), 0, &transparent);
        sink.draw_underline(0, 9, 0, &transparent);
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn underline_is_one_unit_high() {
        let font = fixtures::font();
        let mut canvas = RecordingCanvas::new();
        let mut sink = LiveSink::new(&mut canvas, &font, true, vec2(1., 1.));
        sink.draw_underline(2, 9, 10, &paint(Srgba::new(0, 0, 0, 0)));
        assert_eq!(
            canvas.take_commands(),
            vec![Command::FillRect {
                dest: Rect::from_xywh(5., 19., 20., 2.),
                color: Srgba::new(255, 255, 255, 255),
            }]
        );
    }
}
