use glam::{vec2, Affine2, UVec2, Vec2};

/// A rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Rect {
    /// The position of the top-left corner
    /// of this rectangle.
    pub pos: Vec2,
    /// The side lengths of this rectangle.
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(vec2(x, y), vec2(width, height))
    }

    /// Maps the four corners through `transform` and returns
    /// their axis-aligned bounding box.
    pub fn bbox_transformed(self, transform: Affine2) -> Self {
        let corners = [
            self.pos,
            self.pos + vec2(0., self.size.y),
            self.pos + vec2(self.size.x, 0.),
            self.pos + self.size,
        ];

        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(-f32::INFINITY);
        for corner in corners.iter() {
            let point = transform.transform_point2(*corner);
            min = min.min(point);
            max = max.max(point);
        }

        Self {
            pos: min,
            size: max - min,
        }
    }
}

/// A region of a font atlas, in atlas pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct AtlasRegion {
    pub pos: UVec2,
    pub size: UVec2,
}

impl AtlasRegion {
    pub fn new(pos: UVec2, size: UVec2) -> Self {
        Self { pos, size }
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_of_scaled_and_translated_rect() {
        let transform = Affine2::from_translation(vec2(10., 20.)) * Affine2::from_scale(vec2(2., 3.));
        let rect = Rect::from_xywh(1., 1., 4., 2.).bbox_transformed(transform);
        assert_eq!(rect, Rect::from_xywh(12., 23., 8., 6.));
    }
}
