//! In-memory images: 1-bit masks, 8-bit gray and 32-bit RGBA.
//!
//! Decoding goes through the `image` crate; everything after that is ours.

use std::path::Path;

use super::Surface;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One bit per pixel, MSB first, 1 = opaque.
    A1,
    /// One byte per pixel.
    Y8,
    /// `0xRRGGBBAA` per pixel.
    Rgba32,
}

impl PixelFormat {
    pub fn bits(self) -> usize {
        match self {
            PixelFormat::A1 => 1,
            PixelFormat::Y8 => 8,
            PixelFormat::Rgba32 => 32,
        }
    }

    fn stride_for(self, w: u32) -> usize {
        (w as usize * self.bits()).div_ceil(8)
    }
}

#[derive(Debug, Clone)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Row pitch in bytes.
    pub stride: usize,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl Image {
    /// Blank (all zero) image.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let stride = format.stride_for(width);
        Self {
            width,
            height,
            stride,
            format,
            data: vec![0; stride * height as usize],
        }
    }

    /// Decode PNG (or any format the `image` crate recognizes) into RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let img = ::image::load_from_memory(bytes)?;
        Ok(Self::from_rgba(&img.to_rgba8()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    pub fn from_rgba(rgba: &::image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        let mut out = Self::new(width, height, PixelFormat::Rgba32);
        for (x, y, px) in rgba.enumerate_pixels() {
            out.set_pixel(x, y, u32::from_be_bytes(px.0));
        }
        out
    }

    /// Raw pixel value: 0/1 for A1, the byte for Y8, `0xRRGGBBAA` for RGBA.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let row = y as usize * self.stride;
        match self.format {
            PixelFormat::A1 => {
                let byte = self.data[row + (x as usize >> 3)];
                ((byte >> (7 - (x & 7))) & 1) as u32
            }
            PixelFormat::Y8 => self.data[row + x as usize] as u32,
            PixelFormat::Rgba32 => {
                let p = row + x as usize * 4;
                u32::from_be_bytes([self.data[p], self.data[p + 1], self.data[p + 2], self.data[p + 3]])
            }
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, value: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let row = y as usize * self.stride;
        match self.format {
            PixelFormat::A1 => {
                let mask = 0x80u8 >> (x & 7);
                let byte = &mut self.data[row + (x as usize >> 3)];
                if value != 0 {
                    *byte |= mask;
                } else {
                    *byte &= !mask;
                }
            }
            PixelFormat::Y8 => self.data[row + x as usize] = value as u8,
            PixelFormat::Rgba32 => {
                let p = row + x as usize * 4;
                self.data[p..p + 4].copy_from_slice(&value.to_be_bytes());
            }
        }
    }

    /// Collapse to a 1-bit mask; any nonzero source pixel is opaque.
    pub fn to_mask(&self) -> Image {
        if self.format == PixelFormat::A1 {
            return self.clone();
        }
        let mut out = Image::new(self.width, self.height, PixelFormat::A1);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) != 0 {
                    out.set_pixel(x, y, 1);
                }
            }
        }
        out
    }

    /// Copy onto a surface with the top-left corner at `(x, y)`. Only RGBA
    /// sources are drawn; pixels with zero alpha are skipped. Other formats
    /// are left alone.
    pub fn blit(&self, dst: &mut Surface<'_>, x: i32, y: i32) {
        if self.format != PixelFormat::Rgba32 {
            tracing::debug!("Image blit skipped for {:?} source", self.format);
            return;
        }
        for sy in 0..self.height {
            for sx in 0..self.width {
                let px = self.pixel(sx, sy);
                if px & 0xff != 0 {
                    dst.put_pixel(x + sx as i32, y + sy as i32, px);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_pixels_pack_msb_first() {
        let mut img = Image::new(10, 2, PixelFormat::A1);
        assert_eq!(img.stride, 2);
        img.set_pixel(0, 0, 1);
        img.set_pixel(9, 1, 1);
        assert_eq!(img.data[0], 0x80);
        assert_eq!(img.data[3], 0x40);
        assert_eq!(img.pixel(9, 1), 1);
        assert_eq!(img.pixel(8, 1), 0);
    }

    #[test]
    fn test_decode_png_round_trip() {
        let mut rgba = ::image::RgbaImage::new(3, 2);
        rgba.put_pixel(1, 1, ::image::Rgba([0x11, 0x22, 0x33, 0xff]));
        let mut bytes = Vec::new();
        rgba.write_to(&mut std::io::Cursor::new(&mut bytes), ::image::ImageFormat::Png)
            .unwrap();

        let img = Image::decode(&bytes).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixel(1, 1), 0x112233ff);
        assert_eq!(img.pixel(0, 0), 0);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(Image::decode(b"not an image").is_err());
    }

    #[test]
    fn test_blit_ignores_mask_source() {
        let mut mask = Image::new(2, 2, PixelFormat::A1);
        mask.set_pixel(0, 0, 1);
        let mut buf = vec![0u32; 4];
        let mut s = Surface::new(&mut buf, 2, 2, 2).unwrap();
        mask.blit(&mut s, 0, 0);
        assert_eq!(buf, vec![0; 4]);
    }
}
