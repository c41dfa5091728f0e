//! Software rendering primitives: pixel surfaces, images and bitmap fonts.

mod font;
mod image;
mod surface;

pub use font::{Font, DEFAULT_COLOR_MISENCODE, DEFAULT_COLOR_MISSING, DEFAULT_COLOR_NORMAL};
pub use image::{Image, PixelFormat};
pub use surface::Surface;

/// Integer rectangle in some widget's coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }

    /// Overlap of two rectangles. May come out with non-positive size.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = (self.x + self.w).min(other.x + other.w);
        let b = (self.y + self.h).min(other.y + other.h);
        Rect { x, y, w: r - x, h: b - y }
    }

    pub fn is_empty(&self) -> bool {
        self.w < 1 || self.h < 1
    }
}
