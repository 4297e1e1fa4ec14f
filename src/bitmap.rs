use glam::{UVec2, Vec2};
use palette::Srgba;

use crate::rect::Rect;

/// Text baked into an RGBA8 image.
///
/// Pixels are in unscaled font units; `scale` is the factor the text
/// was styled with, and `position` is where the image's top-left
/// corner belongs on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixels: Vec<u8>,
    size: UVec2,
    position: Vec2,
    scale: f32,
}

impl Bitmap {
    /// # Panics
    /// Panics if `pixels` does not hold exactly `size.x * size.y` RGBA8 pixels.
    pub fn new(pixels: Vec<u8>, size: UVec2, position: Vec2, scale: f32) -> Self {
        assert_eq!(
            pixels.len(),
            size.x as usize * size.y as usize * 4,
            "bitmap buffer does not match its size"
        );
        Self {
            pixels,
            size,
            position,
            scale,
        }
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// The area covered on screen once the scale is applied.
    pub fn dest_rect(&self) -> Rect {
        Rect::new(self.position, self.size.as_f32() * self.scale)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Gets the pixel at `(x, y)`, or `None` if out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Srgba<u8>> {
        if x >= self.size.x || y >= self.size.y {
            return None;
        }
        let offset = (y as usize * self.size.x as usize + x as usize) * 4;
        let p = &self.pixels[offset..offset + 4];
        Some(Srgba::new(p[0], p[1], p[2], p[3]))
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    #[cfg(feature = "image_")]
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.size.x, self.size.y, |x, y| {
            let offset = (y as usize * self.size.x as usize + x as usize) * 4;
            let mut rgba = [0; 4];
            rgba.copy_from_slice(&self.pixels[offset..offset + 4]);
            image::Rgba(rgba)
        })
    }
}
