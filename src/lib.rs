//! Bitmap-font text layout and rendering.
//!
//! Text is broken into lines, laid out with per-line alignment and optional
//! justification, and then either drawn live onto a [`Canvas`] or baked into
//! an RGBA8 [`Bitmap`].

mod bitmap;
pub mod canvas;
pub mod font;
mod rect;
pub mod text;

pub use bitmap::Bitmap;
pub use canvas::{Canvas, Command, RecordingCanvas};
pub use font::{BitmapFont, FontId, Fonts, GlyphMetrics, MalformedAtlas, MissingFont};
pub use rect::{AtlasRegion, Rect};
pub use text::{Align, Anchor, TextLayout, TextRenderer, TextStyle};

pub use glam;
pub use palette::Srgba;
