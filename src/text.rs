//! Bitmap-font text layout and rendering.
//!
//! Text flows through three stages: [`line_break`] turns a string into
//! [`LineFragment`]s, [`layout`] positions the glyphs of each fragment, and
//! a [`RenderSink`] draws them, either live onto a canvas or into a pixel
//! buffer. [`TextRenderer`] ties the stages together.

use palette::Srgba;
use serde::{Deserialize, Serialize};

pub mod layout;
pub mod line_break;
pub mod renderer;
pub mod sink;

pub use layout::{LineLayout, PlacedGlyph, TextLayout};
pub use line_break::{BreakParams, LineFragment};
pub use renderer::TextRenderer;
pub use sink::{BufferSink, LiveSink, Paint, RenderSink};

pub const DEFAULT_TAB_SIZE: usize = 4;
pub const DEFAULT_PROPORTIONAL_SPACING: i32 = 5;
pub const DEFAULT_VERTICAL_SPACING: i32 = 5;

pub fn default_foreground() -> Srgba<u8> {
    Srgba::new(u8::MAX, u8::MAX, u8::MAX, u8::MAX)
}

pub fn default_background() -> Srgba<u8> {
    Srgba::new(0, 0, 0, 0)
}

/// Horizontal alignment of each line within the block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
    Right,
    /// Stretch wrapped lines to the full block width.
    Full,
}

impl Default for Align {
    fn default() -> Self {
        Align::Left
    }
}

impl Align {
    /// The alignment used for lines ended by an explicit break or the end
    /// of the text, where stretching a short remainder makes no sense.
    pub fn for_last_line(self) -> Self {
        match self {
            Align::Full => Align::Left,
            other => other,
        }
    }
}

/// Where the text block sits relative to its origin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// The origin is the block's left edge.
    Left,
    /// The origin is the block's horizontal center.
    Center,
    /// The origin is the block's right edge.
    Right,
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::Left
    }
}

impl Anchor {
    /// Horizontal offset of the block's left edge from the origin.
    pub fn offset(self, block_width: f32) -> f32 {
        match self {
            Anchor::Left => 0.,
            Anchor::Center => -block_width / 2.,
            Anchor::Right => -block_width,
        }
    }
}

/// Style of a text renderer.
///
/// Setters keep the style valid: a value that would break an invariant is
/// ignored and the previous value stays in place. In particular, while
/// `max_width` is non-zero, `tab_size` must stay below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StyleConfig")]
pub struct TextStyle {
    foreground: Srgba<u8>,
    background: Srgba<u8>,
    scale: f32,
    proportional_spacing: i32,
    vertical_spacing: i32,
    tab_size: usize,
    max_width: u32,
    align: Align,
    anchor: Anchor,
    proportional: bool,
    underline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            foreground: default_foreground(),
            background: default_background(),
            scale: 1.,
            proportional_spacing: DEFAULT_PROPORTIONAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
            tab_size: DEFAULT_TAB_SIZE,
            max_width: 0,
            align: Align::default(),
            anchor: Anchor::default(),
            proportional: true,
            underline: false,
        }
    }
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foreground(&self) -> Srgba<u8> {
        self.foreground
    }

    pub fn set_foreground(&mut self, color: Srgba<u8>) -> &mut Self {
        self.foreground = color;
        self
    }

    pub fn background(&self) -> Srgba<u8> {
        self.background
    }

    pub fn set_background(&mut self, color: Srgba<u8>) -> &mut Self {
        self.background = color;
        self
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sets the scale factor applied when drawing. Must be finite and positive.
    pub fn set_scale(&mut self, scale: f32) -> &mut Self {
        if scale.is_finite() && scale > 0. {
            self.scale = scale;
        } else {
            log::debug!("Ignoring invalid text scale {}", scale);
        }
        self
    }

    pub fn proportional_spacing(&self) -> i32 {
        self.proportional_spacing
    }

    /// Sets the gap inserted between consecutive glyphs of a word
    /// in proportional mode.
    pub fn set_proportional_spacing(&mut self, spacing: i32) -> &mut Self {
        self.proportional_spacing = spacing;
        self
    }

    /// The gap between glyphs actually used by layout: zero in fixed mode.
    pub fn word_spacing(&self) -> i32 {
        if self.proportional {
            self.proportional_spacing
        } else {
            0
        }
    }

    pub fn vertical_spacing(&self) -> i32 {
        self.vertical_spacing
    }

    pub fn set_vertical_spacing(&mut self, spacing: i32) -> &mut Self {
        self.vertical_spacing = spacing;
        self
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    /// Sets the tab stop interval, in characters.
    pub fn set_tab_size(&mut self, tab_size: usize) -> &mut Self {
        let fits = self.max_width == 0 || tab_size < self.max_width as usize;
        if tab_size > 0 && fits {
            self.tab_size = tab_size;
        } else {
            log::debug!(
                "Ignoring tab size {} (max width {})",
                tab_size,
                self.max_width
            );
        }
        self
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    /// Sets the wrapping width in screen pixels. Zero disables wrapping.
    pub fn set_max_width(&mut self, max_width: u32) -> &mut Self {
        if max_width == 0 || max_width as usize > self.tab_size {
            self.max_width = max_width;
        } else {
            log::debug!(
                "Ignoring max width {} (tab size {})",
                max_width,
                self.tab_size
            );
        }
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.max_width != 0
    }

    /// The wrapping width in unscaled font units, or zero when unbounded.
    pub fn layout_max_width(&self) -> i32 {
        if self.max_width == 0 {
            return 0;
        }
        ((self.max_width as f32 / self.scale).ceil() as i32).max(1)
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn set_align(&mut self, align: Align) -> &mut Self {
        self.align = align;
        self
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Anchor) -> &mut Self {
        self.anchor = anchor;
        self
    }

    pub fn is_proportional(&self) -> bool {
        self.proportional
    }

    /// Chooses between per-glyph advances (`true`) and fixed cell advances.
    pub fn set_proportional(&mut self, proportional: bool) -> &mut Self {
        self.proportional = proportional;
        self
    }

    pub fn is_underlined(&self) -> bool {
        self.underline
    }

    pub fn set_underline(&mut self, underline: bool) -> &mut Self {
        self.underline = underline;
        self
    }
}

/// Serialized form of a [`TextStyle`]. Deserializing goes through the
/// style setters, so invalid values fall back to the defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct StyleConfig {
    foreground: Srgba<u8>,
    background: Srgba<u8>,
    scale: f32,
    proportional_spacing: i32,
    vertical_spacing: i32,
    tab_size: usize,
    max_width: u32,
    align: Align,
    anchor: Anchor,
    proportional: bool,
    underline: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        let style = TextStyle::default();
        Self {
            foreground: style.foreground,
            background: style.background,
            scale: style.scale,
            proportional_spacing: style.proportional_spacing,
            vertical_spacing: style.vertical_spacing,
            tab_size: style.tab_size,
            max_width: style.max_width,
            align: style.align,
            anchor: style.anchor,
            proportional: style.proportional,
            underline: style.underline,
        }
    }
}

impl From<StyleConfig> for TextStyle {
    fn from(config: StyleConfig) -> Self {
        let mut style = TextStyle::default();
        style
            .set_foreground(config.foreground)
            .set_background(config.background)
            .set_scale(config.scale)
            .set_proportional_spacing(config.proportional_spacing)
            .set_vertical_spacing(config.vertical_spacing)
            .set_tab_size(config.tab_size)
            .set_max_width(config.max_width)
            .set_align(config.align)
            .set_anchor(config.anchor)
            .set_proportional(config.proportional)
            .set_underline(config.underline);
        style
    }
}
