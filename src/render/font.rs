//! Monospace bitmap fonts.
//!
//! A font is built from an atlas of 16x7 equal cells. Rows 0-5 hold the G0
//! set (0x20..=0x7F, row-major). Row 6 column 0 is the tofu glyph, drawn for
//! any codepoint outside G0 and for misencoded bytes, one cell wide, in the
//! "missing" or "misencode" color.
//!
//! Only zero source pixels are transparent; the atlas is reduced to one bit
//! per pixel on load.

use std::cell::Cell;
use std::path::Path;

use super::{Image, PixelFormat, Surface};
use crate::text::{TextDecoder, TextEncoding, UTF8};
use crate::{Error, Result};

const COLUMNS: u32 = 16;
const ROWS: u32 = 7;
const TOFU_CELL: (u32, u32) = (0, 6);

pub const DEFAULT_COLOR_NORMAL: u32 = 0xffffffff;
pub const DEFAULT_COLOR_MISSING: u32 = 0xff0000ff;
pub const DEFAULT_COLOR_MISENCODE: u32 = 0xff0000ff;

pub struct Font {
    glyph_w: i32,
    glyph_h: i32,
    mask: Image,
    color_normal: Cell<u32>,
    color_missing: Cell<u32>,
    color_misencode: Cell<u32>,
    encoding: Cell<&'static dyn TextEncoding>,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("glyph_w", &self.glyph_w)
            .field("glyph_h", &self.glyph_h)
            .field("encoding", &self.encoding.get().name())
            .finish()
    }
}

impl Font {
    /// Digest an atlas image. Its dimensions must divide into 16x7 cells.
    pub fn from_image(image: &Image) -> Result<Self> {
        if image.width == 0 || image.height == 0 || image.width % COLUMNS != 0 || image.height % ROWS != 0 {
            return Err(Error::Font(format!(
                "atlas {}x{} does not divide into {}x{} cells",
                image.width, image.height, COLUMNS, ROWS
            )));
        }
        Ok(Self {
            glyph_w: (image.width / COLUMNS) as i32,
            glyph_h: (image.height / ROWS) as i32,
            mask: image.to_mask(),
            color_normal: Cell::new(DEFAULT_COLOR_NORMAL),
            color_missing: Cell::new(DEFAULT_COLOR_MISSING),
            color_misencode: Cell::new(DEFAULT_COLOR_MISENCODE),
            encoding: Cell::new(&UTF8),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let image = Image::from_path(path)?;
        Self::from_image(&image)
    }

    /// Generated font with blocky glyphs, for headless runs without font
    /// files. Each printable glyph is a pattern derived from its codepoint;
    /// space is blank and tofu is a hollow box.
    pub fn placeholder(glyph_w: u32, glyph_h: u32) -> Self {
        let glyph_w = glyph_w.max(3);
        let glyph_h = glyph_h.max(3);
        let mut atlas = Image::new(glyph_w * COLUMNS, glyph_h * ROWS, PixelFormat::A1);
        for cp in 0x21u32..=0x7e {
            let (cx, cy) = ((cp & 15) * glyph_w, ((cp - 0x20) >> 4) * glyph_h);
            for y in 1..glyph_h - 1 {
                for x in 1..glyph_w - 1 {
                    let bit = ((x - 1) + (y - 1) * 3) % 7;
                    if (cp >> bit) & 1 != 0 {
                        atlas.set_pixel(cx + x, cy + y, 1);
                    }
                }
            }
        }
        let (tx, ty) = (TOFU_CELL.0 * glyph_w, TOFU_CELL.1 * glyph_h);
        for x in 0..glyph_w {
            atlas.set_pixel(tx + x, ty, 1);
            atlas.set_pixel(tx + x, ty + glyph_h - 1, 1);
        }
        for y in 0..glyph_h {
            atlas.set_pixel(tx, ty + y, 1);
            atlas.set_pixel(tx + glyph_w - 1, ty + y, 1);
        }
        // Dimensions are multiples of the cell grid by construction.
        Self {
            glyph_w: glyph_w as i32,
            glyph_h: glyph_h as i32,
            mask: atlas,
            color_normal: Cell::new(DEFAULT_COLOR_NORMAL),
            color_missing: Cell::new(DEFAULT_COLOR_MISSING),
            color_misencode: Cell::new(DEFAULT_COLOR_MISENCODE),
            encoding: Cell::new(&UTF8),
        }
    }

    pub fn glyph_width(&self) -> i32 {
        self.glyph_w
    }

    pub fn glyph_height(&self) -> i32 {
        self.glyph_h
    }

    pub fn set_color_normal(&self, color: u32) {
        self.color_normal.set(color);
    }

    pub fn set_color_missing(&self, color: u32) {
        self.color_missing.set(color);
    }

    pub fn set_color_misencode(&self, color: u32) {
        self.color_misencode.set(color);
    }

    pub fn color_normal(&self) -> u32 {
        self.color_normal.get()
    }

    /// Switch the decoder used by `measure_string` and `render_string`.
    pub fn set_encoding(&self, encoding: &'static dyn TextEncoding) {
        self.encoding.set(encoding);
    }

    pub fn encoding(&self) -> &'static dyn TextEncoding {
        self.encoding.get()
    }

    pub fn is_g0(codepoint: i32) -> bool {
        (0x20..=0x7f).contains(&codepoint)
    }

    /// Advance of a tofu for `codepoint`. Always one cell.
    pub fn measure_tofu(&self, _codepoint: i32) -> i32 {
        self.glyph_w
    }

    pub fn measure_string(&self, text: &[u8]) -> i32 {
        TextDecoder::new(text, self.encoding.get())
            .map(|cp| if Self::is_g0(cp) { self.glyph_w } else { self.measure_tofu(cp) })
            .sum()
    }

    fn draw_cell(&self, dst: &mut Surface<'_>, x: i32, y: i32, cell: (u32, u32), color: u32) {
        let sx = cell.0 * self.glyph_w as u32;
        let sy = cell.1 * self.glyph_h as u32;
        for gy in 0..self.glyph_h {
            for gx in 0..self.glyph_w {
                if self.mask.pixel(sx + gx as u32, sy + gy as u32) != 0 {
                    dst.put_pixel(x + gx, y + gy, color);
                }
            }
        }
    }

    /// Draw one G0 glyph. Returns the advance, or `None` outside G0.
    pub fn render_glyph(&self, dst: &mut Surface<'_>, x: i32, y: i32, codepoint: i32, color: u32) -> Option<i32> {
        if !Self::is_g0(codepoint) {
            return None;
        }
        let cp = codepoint as u32;
        self.draw_cell(dst, x, y, (cp & 15, (cp - 0x20) >> 4), color);
        Some(self.glyph_w)
    }

    pub fn render_tofu(&self, dst: &mut Surface<'_>, x: i32, y: i32, codepoint: i32, color: u32) -> i32 {
        self.draw_cell(dst, x, y, TOFU_CELL, color);
        self.measure_tofu(codepoint)
    }

    /// Draw a line of text with its top-left at `(x, y)`. Returns the advance.
    pub fn render_string(&self, dst: &mut Surface<'_>, x: i32, y: i32, text: &[u8]) -> i32 {
        let mut advance = 0;
        for cp in TextDecoder::new(text, self.encoding.get()) {
            advance += if cp < 0 {
                self.render_tofu(dst, x + advance, y, cp, self.color_misencode.get())
            } else if let Some(w) = self.render_glyph(dst, x + advance, y, cp, self.color_normal.get()) {
                w
            } else {
                self.render_tofu(dst, x + advance, y, cp, self.color_missing.get())
            };
        }
        advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_must_be_16_by_7() {
        let bad = Image::new(100, 70, PixelFormat::Y8);
        assert!(Font::from_image(&bad).is_err());
        let good = Image::new(128, 112, PixelFormat::Y8);
        let font = Font::from_image(&good).unwrap();
        assert_eq!((font.glyph_width(), font.glyph_height()), (8, 16));
    }

    #[test]
    fn test_measure_counts_codepoints() {
        let font = Font::placeholder(6, 8);
        assert_eq!(font.measure_string(b"abc"), 18);
        assert_eq!(font.measure_string("\u{20ac}x".as_bytes()), 12);
        assert_eq!(font.measure_string(&[0xff, b'a']), 12);
    }

    #[test]
    fn test_render_colors_by_class() {
        let font = Font::placeholder(4, 4);
        font.set_color_normal(1);
        font.set_color_missing(2);
        font.set_color_misencode(3);
        let mut buf = vec![0u32; 12 * 4];
        let mut s = Surface::new(&mut buf, 12, 4, 12).unwrap();
        let adv = font.render_string(&mut s, 0, 0, &[0x7e, 0xc3, 0xa9, 0x80]);
        assert_eq!(adv, 12);
        // Tofu is a hollow box, so its corner pixel is always lit.
        assert_eq!(s.get_pixel(4, 0), Some(2));
        assert_eq!(s.get_pixel(8, 0), Some(3));
    }
}
