//! Bitmap fonts.
//!
//! A [`BitmapFont`] is a grid atlas of RGBA8 glyph cells indexed by
//! character code. Layout only sees fonts through the [`GlyphMetrics`]
//! trait, so anything that can report advances and hand out atlas pixels
//! can be laid out and rendered.

use std::sync::Arc;

use ahash::AHashMap;
use glam::{uvec2, UVec2};
use slotmap::SlotMap;

use crate::rect::AtlasRegion;

/// Per-glyph metrics and atlas access consumed by text layout and rendering.
pub trait GlyphMetrics {
    /// Width of the glyph's ink, used as its advance in proportional mode.
    ///
    /// Characters the font does not cover have an advance of zero.
    fn advance_width(&self, c: char) -> i32;

    /// Width of one atlas cell, used as the advance of every glyph in fixed mode.
    fn cell_width(&self) -> i32;

    /// Height shared by all glyphs.
    fn glyph_height(&self) -> i32;

    /// Whether the glyph has no ink (whitespace or undefined characters).
    fn is_empty(&self, c: char) -> bool;

    /// The atlas pixels to draw for `c`, or `None` if the font does not cover it.
    fn source_rect(&self, c: char, proportional: bool) -> Option<AtlasRegion>;

    /// RGBA value of an atlas pixel. Out-of-bounds reads are transparent.
    fn atlas_pixel(&self, pos: UVec2) -> [u8; 4];

    /// Name of the atlas texture, used by canvases to bind the right image.
    fn atlas_name(&self) -> &str;
}

impl<T> GlyphMetrics for &T
where
    T: GlyphMetrics + ?Sized,
{
    fn advance_width(&self, c: char) -> i32 {
        (**self).advance_width(c)
    }

    fn cell_width(&self) -> i32 {
        (**self).cell_width()
    }

    fn glyph_height(&self) -> i32 {
        (**self).glyph_height()
    }

    fn is_empty(&self, c: char) -> bool {
        (**self).is_empty(c)
    }

    fn source_rect(&self, c: char, proportional: bool) -> Option<AtlasRegion> {
        (**self).source_rect(c, proportional)
    }

    fn atlas_pixel(&self, pos: UVec2) -> [u8; 4] {
        (**self).atlas_pixel(pos)
    }

    fn atlas_name(&self) -> &str {
        (**self).atlas_name()
    }
}

impl<T> GlyphMetrics for Arc<T>
where
    T: GlyphMetrics + ?Sized,
{
    fn advance_width(&self, c: char) -> i32 {
        (**self).advance_width(c)
    }

    fn cell_width(&self) -> i32 {
        (**self).cell_width()
    }

    fn glyph_height(&self) -> i32 {
        (**self).glyph_height()
    }

    fn is_empty(&self, c: char) -> bool {
        (**self).is_empty(c)
    }

    fn source_rect(&self, c: char, proportional: bool) -> Option<AtlasRegion> {
        (**self).source_rect(c, proportional)
    }

    fn atlas_pixel(&self, pos: UVec2) -> [u8; 4] {
        (**self).atlas_pixel(pos)
    }

    fn atlas_name(&self) -> &str {
        (**self).atlas_name()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MalformedAtlas {
    #[error("glyph cells must have a non-zero size (got {0})")]
    ZeroCell(UVec2),
    #[error("atlas of size {atlas} cannot hold a single {cell} glyph cell")]
    TooSmall { atlas: UVec2, cell: UVec2 },
    #[error("expected {expected} bytes of RGBA data, found {found}")]
    BufferLength { expected: usize, found: usize },
    #[cfg(feature = "image_")]
    #[error("failed to decode atlas image: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, thiserror::Error)]
#[error("no font registered with name '{0}'")]
pub struct MissingFont(String);

/// Ink bounds of one glyph, in atlas pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct GlyphData {
    left: u32,
    width: u32,
    empty: bool,
}

/// A font backed by a grid atlas of RGBA8 glyph cells.
///
/// Character `c` lives in cell `c % cols, c / cols`.
#[derive(Debug, Clone)]
pub struct BitmapFont {
    name: String,
    pixels: Vec<u8>,
    atlas_size: UVec2,
    cell_size: UVec2,
    cols: u32,
    glyphs: Vec<GlyphData>,
}

impl BitmapFont {
    /// Creates a font from raw RGBA8 atlas pixels.
    ///
    /// When `compute_bounds` is set, each glyph's ink is trimmed to the
    /// columns that contain a non-transparent pixel, which gives proportional
    /// advances. Otherwise every glyph spans its whole cell.
    pub fn from_rgba(
        name: impl Into<String>,
        pixels: Vec<u8>,
        atlas_size: UVec2,
        cell_size: UVec2,
        compute_bounds: bool,
    ) -> Result<Self, MalformedAtlas> {
        if cell_size.x == 0 || cell_size.y == 0 {
            return Err(MalformedAtlas::ZeroCell(cell_size));
        }

        let expected = atlas_size.x as usize * atlas_size.y as usize * 4;
        if pixels.len() != expected {
            return Err(MalformedAtlas::BufferLength {
                expected,
                found: pixels.len(),
            });
        }

        let cols = atlas_size.x / cell_size.x;
        let rows = atlas_size.y / cell_size.y;
        if cols == 0 || rows == 0 {
            return Err(MalformedAtlas::TooSmall {
                atlas: atlas_size,
                cell: cell_size,
            });
        }

        let mut font = Self {
            name: name.into(),
            pixels,
            atlas_size,
            cell_size,
            cols,
            glyphs: Vec::with_capacity((cols * rows) as usize),
        };

        for index in 0..cols * rows {
            let cell = uvec2((index % cols) * cell_size.x, (index / cols) * cell_size.y);
            let glyph = if compute_bounds {
                font.ink_bounds(cell)
            } else {
                GlyphData {
                    left: cell.x,
                    width: cell_size.x,
                    empty: !font.has_ink(cell),
                }
            };
            font.glyphs.push(glyph);
        }

        log::debug!(
            "Built bitmap font '{}' with {} glyphs of {}x{}",
            font.name,
            font.glyphs.len(),
            cell_size.x,
            cell_size.y
        );

        Ok(font)
    }

    /// Decodes an in-memory PNG atlas and computes glyph bounds.
    #[cfg(feature = "png")]
    pub fn from_png(
        name: impl Into<String>,
        bytes: &[u8],
        cell_size: UVec2,
    ) -> Result<Self, MalformedAtlas> {
        let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.to_rgba8();
        let atlas_size = uvec2(image.width(), image.height());
        Self::from_rgba(name, image.into_raw(), atlas_size, cell_size, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cell_size(&self) -> UVec2 {
        self.cell_size
    }

    pub fn atlas_size(&self) -> UVec2 {
        self.atlas_size
    }

    /// Number of character codes covered by the atlas.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Overrides the advance of the space character.
    pub fn set_space_width(&mut self, width: u32) {
        if let Some(glyph) = self.glyph_mut(' ') {
            glyph.width = width;
        }
    }

    fn glyph(&self, c: char) -> Option<&GlyphData> {
        self.glyphs.get(c as usize)
    }

    fn glyph_mut(&mut self, c: char) -> Option<&mut GlyphData> {
        self.glyphs.get_mut(c as usize)
    }

    fn alpha(&self, x: u32, y: u32) -> u8 {
        self.atlas_pixel(uvec2(x, y))[3]
    }

    fn has_ink(&self, cell: UVec2) -> bool {
        (cell.y..cell.y + self.cell_size.y)
            .any(|y| (cell.x..cell.x + self.cell_size.x).any(|x| self.alpha(x, y) != 0))
    }

    fn ink_bounds(&self, cell: UVec2) -> GlyphData {
        let column_has_ink =
            |x: u32| (cell.y..cell.y + self.cell_size.y).any(|y| self.alpha(x, y) != 0);

        let columns = cell.x..cell.x + self.cell_size.x;
        let first = columns.clone().find(|&x| column_has_ink(x));
        let last = columns.rev().find(|&x| column_has_ink(x));

        match (first, last) {
            (Some(first), Some(last)) => GlyphData {
                left: first,
                width: last - first + 1,
                empty: false,
            },
            // Whitespace keeps the full cell as its advance.
            _ => GlyphData {
                left: cell.x,
                width: self.cell_size.x,
                empty: true,
            },
        }
    }
}

impl GlyphMetrics for BitmapFont {
    fn advance_width(&self, c: char) -> i32 {
        self.glyph(c).map_or(0, |glyph| glyph.width as i32)
    }

    fn cell_width(&self) -> i32 {
        self.cell_size.x as i32
    }

    fn glyph_height(&self) -> i32 {
        self.cell_size.y as i32
    }

    fn is_empty(&self, c: char) -> bool {
        self.glyph(c).map_or(true, |glyph| glyph.empty)
    }

    fn source_rect(&self, c: char, proportional: bool) -> Option<AtlasRegion> {
        let glyph = self.glyph(c)?;
        let index = c as u32;
        let y = (index / self.cols) * self.cell_size.y;
        let region = if proportional {
            AtlasRegion::new(uvec2(glyph.left, y), uvec2(glyph.width, self.cell_size.y))
        } else {
            AtlasRegion::new(
                uvec2((index % self.cols) * self.cell_size.x, y),
                self.cell_size,
            )
        };
        Some(region)
    }

    fn atlas_pixel(&self, pos: UVec2) -> [u8; 4] {
        if pos.x >= self.atlas_size.x || pos.y >= self.atlas_size.y {
            return [0; 4];
        }
        let offset = (pos.y as usize * self.atlas_size.x as usize + pos.x as usize) * 4;
        let mut pixel = [0; 4];
        pixel.copy_from_slice(&self.pixels[offset..offset + 4]);
        pixel
    }

    fn atlas_name(&self) -> &str {
        &self.name
    }
}

slotmap::new_key_type! {
    /// Unique ID of a font registered in [`Fonts`].
    pub struct FontId;
}

/// The fonts available to text renderers.
///
/// Fonts are shared through `Arc`, so a renderer keeps its font
/// alive even if the registry drops it.
#[derive(Default)]
pub struct Fonts {
    fonts: SlotMap<FontId, Arc<BitmapFont>>,
    by_name: AHashMap<String, FontId>,
}

impl Fonts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, font: BitmapFont) -> FontId {
        let name = font.name().to_owned();
        let id = self.fonts.insert(Arc::new(font));
        if let Some(previous) = self.by_name.insert(name.clone(), id) {
            log::warn!("Duplicate fonts with name '{}'", name);
            self.fonts.remove(previous);
        }
        log::info!("Loaded font '{}'", name);
        id
    }

    pub fn get(&self, id: FontId) -> Option<&Arc<BitmapFont>> {
        self.fonts.get(id)
    }

    /// Gets a font by its name.
    pub fn by_name(&self, name: &str) -> Result<Arc<BitmapFont>, MissingFont> {
        self.by_name
            .get(name)
            .and_then(|id| self.fonts.get(*id))
            .cloned()
            .ok_or_else(|| MissingFont(name.to_owned()))
    }

    pub fn remove(&mut self, id: FontId) -> Option<Arc<BitmapFont>> {
        let font = self.fonts.remove(id)?;
        self.by_name.remove(font.name());
        Some(font)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::{fixtures, *};

    #[test]
    fn ink_bounds_trim_empty_columns() {
        let font = fixtures::font();
        assert_eq!(font.advance_width('a'), fixtures::ink_width('a') as i32);
        assert_eq!(font.advance_width('!'), fixtures::ink_width('!') as i32);
        assert!(!font.is_empty('a'));
    }

    #[test]
    fn whitespace_keeps_full_cell() {
        let font = fixtures::font();
        assert!(font.is_empty(' '));
        assert_eq!(font.advance_width(' '), fixtures::cell().x as i32);
    }

    #[test]
    fn uncovered_characters_have_no_ink() {
        let font = fixtures::font();
        assert_eq!(font.glyph_count(), 128);
        assert_eq!(font.advance_width('é'), 0);
        assert!(font.is_empty('é'));
        assert_eq!(font.source_rect('é', true), None);
    }

    #[test]
    fn source_rects() {
        let font = fixtures::font();
        // 'A' = 65 lives in column 1, row 4.
        assert_eq!(
            font.source_rect('A', false),
            Some(AtlasRegion::new(uvec2(8, 40), uvec2(8, 10)))
        );
        assert_eq!(
            font.source_rect('A', true),
            Some(AtlasRegion::new(uvec2(8, 40), uvec2(fixtures::ink_width('A'), 10)))
        );
    }

    #[test]
    fn space_width_override() {
        let mut font = fixtures::font();
        font.set_space_width(3);
        assert_eq!(font.advance_width(' '), 3);
    }

    #[test]
    fn full_cell_bounds_when_not_computed() {
        let reference = fixtures::font();
        let font = BitmapFont::from_rgba(
            "cells",
            reference.pixels.clone(),
            reference.atlas_size(),
            fixtures::cell(),
            false,
        )
        .unwrap();
        assert_eq!(font.advance_width('a'), 8);
        assert!(font.is_empty(' '));
    }

    #[test]
    fn rejects_malformed_atlases() {
        assert!(matches!(
            BitmapFont::from_rgba("x", vec![0; 16], uvec2(2, 2), uvec2(0, 2), true),
            Err(MalformedAtlas::ZeroCell(_))
        ));
        assert!(matches!(
            BitmapFont::from_rgba("x", vec![0; 15], uvec2(2, 2), uvec2(1, 1), true),
            Err(MalformedAtlas::BufferLength { expected: 16, found: 15 })
        ));
        assert!(matches!(
            BitmapFont::from_rgba("x", vec![0; 16], uvec2(2, 2), uvec2(4, 4), true),
            Err(MalformedAtlas::TooSmall { .. })
        ));
    }

    #[test]
    fn registry_lookup_and_replacement() {
        let mut fonts = Fonts::new();
        let first = fonts.add(fixtures::font());
        assert_eq!(fonts.by_name("test").unwrap().name(), "test");

        let second = fonts.add(fixtures::font());
        assert!(fonts.get(first).is_none());
        assert!(fonts.get(second).is_some());
        assert_eq!(fonts.len(), 1);

        fonts.remove(second);
        assert!(fonts.is_empty());
        assert!(fonts.by_name("test").is_err());
    }
}
