use glam::{Affine2, Vec2};
use palette::Srgba;
use smallvec::SmallVec;
use smartstring::{LazyCompact, SmartString};

use crate::rect::{AtlasRegion, Rect};

/// A 2D surface that text can be drawn onto.
///
/// The canvas keeps a _current transform_ that applies to every
/// draw call. Drawing code should leave the transform as it found it
/// by bracketing its changes with [`save`](Canvas::save) and
/// [`restore`](Canvas::restore).
pub trait Canvas {
    /// Pushes the current transform onto the state stack.
    fn save(&mut self);

    /// Pops the most recently saved transform.
    fn restore(&mut self);

    /// Translates the current coordinate system.
    fn translate(&mut self, translation: Vec2);

    /// Scales the current coordinate system.
    fn scale(&mut self, scale: Vec2);

    /// Fills `dest` with a solid color.
    fn fill_rect(&mut self, dest: Rect, color: Srgba<u8>);

    /// Draws `region` of the named texture stretched over `dest`,
    /// multiplying each texel by `color`.
    fn draw_textured_quad(&mut self, texture: &str, region: AtlasRegion, dest: Rect, color: Srgba<u8>);

    /// Calls `save()`, executes the closure, and then calls `restore()`.
    fn with_save(&mut self, f: impl FnOnce(&mut Self))
    where
        Self: Sized,
    {
        self.save();
        f(self);
        self.restore();
    }
}

/// A draw command with its rectangle in device space.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FillRect {
        dest: Rect,
        color: Srgba<u8>,
    },
    DrawTexturedQuad {
        texture: SmartString<LazyCompact>,
        region: AtlasRegion,
        dest: Rect,
        color: Srgba<u8>,
    },
}

/// A [`Canvas`] that records its draw calls.
///
/// Rectangles are mapped through the current transform when recorded,
/// so hosts can replay the commands without tracking any state.
#[derive(Debug)]
pub struct RecordingCanvas {
    commands: Vec<Command>,
    state_stack: SmallVec<[Affine2; 4]>,
    transform: Affine2,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            state_stack: SmallVec::new(),
            transform: Affine2::IDENTITY,
        }
    }
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Removes and returns all recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.state_stack.push(self.transform);
    }

    /// # Panics
    /// Panics if there is no state to pop. This happens only when
    /// `restore()` is called more times than `save()`.
    fn restore(&mut self) {
        self.transform = self
            .state_stack
            .pop()
            .expect("called Canvas::restore() at the top of the state stack");
    }

    fn translate(&mut self, translation: Vec2) {
        self.transform = self.transform * Affine2::from_translation(translation);
    }

    fn scale(&mut self, scale: Vec2) {
        self.transform = self.transform * Affine2::from_scale(scale);
    }

    fn fill_rect(&mut self, dest: Rect, color: Srgba<u8>) {
        self.commands.push(Command::FillRect {
            dest: dest.bbox_transformed(self.transform),
            color,
        });
    }

    fn draw_textured_quad(&mut self, texture: &str, region: AtlasRegion, dest: Rect, color: Srgba<u8>) {
        self.commands.push(Command::DrawTexturedQuad {
            texture: texture.into(),
            region,
            dest: dest.bbox_transformed(self.transform),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use glam::{uvec2, vec2};

    use super::*;

    fn red() -> Srgba<u8> {
        Srgba::new(255, 0, 0, 255)
    }

    #[test]
    fn transforms_apply_to_recorded_rects() {
        let mut canvas = RecordingCanvas::new();
        canvas.translate(vec2(10., 20.));
        canvas.scale(vec2(2., 2.));
        canvas.fill_rect(Rect::from_xywh(1., 1., 3., 4.), red());
        assert_eq!(
            canvas.take_commands(),
            vec![Command::FillRect {
                dest: Rect::from_xywh(12., 22., 6., 8.),
                color: red(),
            }]
        );
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn restore_undoes_transforms() {
        let mut canvas = RecordingCanvas::new();
        canvas.translate(vec2(5., 0.));
        canvas.with_save(|canvas| {
            canvas.scale(vec2(3., 3.));
            canvas.translate(vec2(1., 1.));
        });
        assert_eq!(canvas.transform(), Affine2::from_translation(vec2(5., 0.)));

        canvas.draw_textured_quad(
            "font",
            AtlasRegion::new(uvec2(0, 0), uvec2(2, 2)),
            Rect::from_xywh(0., 0., 2., 2.),
            red(),
        );
        match &canvas.commands()[0] {
            Command::DrawTexturedQuad { texture, dest, .. } => {
                assert_eq!(texture.as_str(), "font");
                assert_eq!(*dest, Rect::from_xywh(5., 0., 2., 2.));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    #[should_panic]
    fn unbalanced_restore_panics() {
        let mut canvas = RecordingCanvas::new();
        canvas.save();
        canvas.restore();
        canvas.restore();
    }
}
