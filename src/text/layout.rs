//! Text layout: block geometry, alignment, and justification.
//!
//! Layout happens in unscaled font units. Each line is placed at
//! `line_index * line_height`; within a line, [`LineLayout`] decides the
//! starting offset and how `Full` alignment stretches the line, and
//! [`Glyphs`] walks the characters producing [`PlacedGlyph`]s.

use std::str::Chars;

use crate::{
    font::GlyphMetrics,
    text::{
        line_break::{break_lines, BreakParams, CharKind, LineFragment},
        Align,
    },
};

/// A block of text broken into lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    fragments: Vec<LineFragment>,
    width: i32,
    line_height: i32,
    bounded: bool,
}

impl TextLayout {
    pub fn new(
        text: &str,
        metrics: &impl GlyphMetrics,
        params: &BreakParams,
        vertical_spacing: i32,
    ) -> Self {
        Self::from_fragments(
            break_lines(text, metrics, params),
            params.max_width,
            metrics.glyph_height() + vertical_spacing,
        )
    }

    /// Builds a layout from already broken lines. `max_width` of zero means
    /// the block is as wide as its widest line.
    pub fn from_fragments(fragments: Vec<LineFragment>, max_width: i32, line_height: i32) -> Self {
        let bounded = max_width > 0;
        let width = if bounded {
            max_width
        } else {
            fragments.iter().map(|f| f.width).max().unwrap_or(0)
        };
        Self {
            fragments,
            width,
            line_height,
            bounded,
        }
    }

    pub fn fragments(&self) -> &[LineFragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Width of the block in unscaled units.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height of the block in unscaled units.
    pub fn height(&self) -> i32 {
        self.fragments.len() as i32 * self.line_height
    }

    pub fn line_height(&self) -> i32 {
        self.line_height
    }

    /// The width a line is aligned against.
    pub fn target_width(&self, fragment: &LineFragment) -> i32 {
        if self.bounded {
            self.width
        } else {
            fragment.width
        }
    }

    /// Iterates over the lines with their vertical position and layout.
    pub fn lines(&self) -> impl Iterator<Item = (i32, &LineFragment, LineLayout)> + '_ {
        self.fragments.iter().enumerate().map(move |(i, fragment)| {
            (
                i as i32 * self.line_height,
                fragment,
                LineLayout::new(fragment, self.target_width(fragment)),
            )
        })
    }
}

/// Extra space spread as evenly as possible over a number of slots.
///
/// The first `slack % slots` slots get one more unit than the others,
/// so the shares always add up to the slack exactly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Distribution {
    per_slot: i32,
    remainder: usize,
}

impl Distribution {
    pub fn new(slack: i32, slots: usize) -> Self {
        if slack <= 0 || slots == 0 {
            return Self::default();
        }
        Self {
            per_slot: slack / slots as i32,
            remainder: (slack % slots as i32) as usize,
        }
    }

    pub fn share(&self, slot: usize) -> i32 {
        self.per_slot + (slot < self.remainder) as i32
    }
}

/// Horizontal placement policy for one line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct LineLayout {
    /// Offset of the first glyph from the block's left edge.
    pub offset: i32,
    /// Extra advance given to each space or tab.
    pub delimiter_extra: Distribution,
    /// Extra spacing given to each gap between two glyphs.
    pub gap_extra: Distribution,
}

impl LineLayout {
    pub fn new(fragment: &LineFragment, target_width: i32) -> Self {
        let slack = target_width - fragment.width;
        match fragment.align {
            Align::Left => Self::default(),
            Align::Center => Self {
                offset: slack / 2,
                ..Default::default()
            },
            Align::Right => Self {
                offset: slack,
                ..Default::default()
            },
            Align::Full => Self::justified(&fragment.text, slack),
        }
    }

    fn justified(text: &str, slack: i32) -> Self {
        let delimiters = text
            .chars()
            .filter(|&c| matches!(CharKind::of(c), CharKind::Space | CharKind::Tab))
            .count();
        if delimiters > 0 {
            return Self {
                delimiter_extra: Distribution::new(slack, delimiters),
                ..Default::default()
            };
        }

        // Without delimiters, stretch the gaps between characters instead.
        let chars = text.chars().count();
        if chars >= 2 {
            return Self {
                gap_extra: Distribution::new(slack, chars - 1),
                ..Default::default()
            };
        }

        Self::default()
    }

    /// Places the glyphs of `fragment` according to this layout.
    pub fn glyphs<'a, M>(
        &self,
        fragment: &'a LineFragment,
        metrics: &'a M,
        params: &BreakParams,
    ) -> Glyphs<'a, M>
    where
        M: GlyphMetrics,
    {
        Glyphs {
            chars: fragment.text.chars(),
            metrics,
            params: *params,
            layout: *self,
            space_advance: params.space_advance(metrics),
            cursor: self.offset,
            previous: CharKind::Space,
            delimiters: 0,
            gaps: 0,
        }
    }
}

/// A character positioned on its line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlacedGlyph {
    pub c: char,
    pub kind: CharKind,
    /// Where the glyph's ink starts, relative to the block's left edge.
    pub x: i32,
    /// Spacing inserted before the glyph.
    pub gap: i32,
    /// Horizontal advance of the glyph itself.
    pub advance: i32,
}

impl PlacedGlyph {
    /// Left edge of the glyph's cell, including the gap before it.
    pub fn cell_start(&self) -> i32 {
        self.x - self.gap
    }

    pub fn cell_width(&self) -> i32 {
        self.gap + self.advance
    }

    pub fn end(&self) -> i32 {
        self.x + self.advance
    }
}

/// Iterator over the placed glyphs of one line.
pub struct Glyphs<'a, M> {
    chars: Chars<'a>,
    metrics: &'a M,
    params: BreakParams,
    layout: LineLayout,
    space_advance: i32,
    cursor: i32,
    previous: CharKind,
    delimiters: usize,
    gaps: usize,
}

impl<'a, M> Iterator for Glyphs<'a, M>
where
    M: GlyphMetrics,
{
    type Item = PlacedGlyph;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;
        let kind = CharKind::of(c);

        let (gap, advance) = match kind {
            CharKind::Space | CharKind::Tab => {
                let extra = self.layout.delimiter_extra.share(self.delimiters);
                self.delimiters += 1;
                (0, self.space_advance + extra)
            }
            CharKind::Newline => (0, 0),
            CharKind::Glyph => {
                let gap = if self.previous.is_delimiter() {
                    0
                } else {
                    let extra = self.layout.gap_extra.share(self.gaps);
                    self.gaps += 1;
                    self.params.spacing() + extra
                };
                (gap, self.params.advance(self.metrics, c))
            }
        };

        self.previous = kind;
        self.cursor += gap;
        let glyph = PlacedGlyph {
            c,
            kind,
            x: self.cursor,
            gap,
            advance,
        };
        self.cursor += advance;
        Some(glyph)
    }
}
