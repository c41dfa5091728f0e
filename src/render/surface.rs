//! Clipped view into a 32-bit pixel buffer.
//!
//! Coordinates passed to drawing calls are local: `(x0, y0)` is added first,
//! then everything is clipped to `w x h`. A widget whose top-left corner lies
//! outside its parent gets a surface with negative `x0`/`y0` so it can keep
//! drawing as if its own origin were visible.

pub struct Surface<'a> {
    pixels: &'a mut [u32],
    w: i32,
    h: i32,
    /// Row pitch in pixels.
    stride: usize,
    x0: i32,
    y0: i32,
}

impl<'a> Surface<'a> {
    /// Wrap a framebuffer. Returns `None` if the buffer is too short for the
    /// given geometry or the geometry is empty.
    pub fn new(pixels: &'a mut [u32], w: i32, h: i32, stride: usize) -> Option<Self> {
        if w < 1 || h < 1 || stride < w as usize {
            return None;
        }
        let needed = stride * (h as usize - 1) + w as usize;
        if pixels.len() < needed {
            return None;
        }
        Some(Self { pixels, w, h, stride, x0: 0, y0: 0 })
    }

    pub fn width(&self) -> i32 {
        self.w
    }

    pub fn height(&self) -> i32 {
        self.h
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.x0, self.y0)
    }

    /// Translate and clip a local rectangle to buffer coordinates.
    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
        let (mut x, mut y, mut w, mut h) = (x + self.x0, y + self.y0, w, h);
        if x < 0 {
            w += x;
            x = 0;
        }
        if y < 0 {
            h += y;
            y = 0;
        }
        if x > self.w - w {
            w = self.w - x;
        }
        if y > self.h - h {
            h = self.h - y;
        }
        if w < 1 || h < 1 {
            return None;
        }
        Some((x as usize, y as usize, w as usize, h as usize))
    }

    fn rows(&mut self, x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, &mut [u32])> {
        let stride = self.stride;
        self.pixels
            .chunks_mut(stride)
            .enumerate()
            .skip(y)
            .take(h)
            .map(move |(row, line)| (row, &mut line[x..x + w]))
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        let (x, y, _, _) = self.clip(x, y, 1, 1)?;
        Some(self.pixels[y * self.stride + x])
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, pixel: u32) {
        if let Some((x, y, _, _)) = self.clip(x, y, 1, 1) {
            self.pixels[y * self.stride + x] = pixel;
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, pixel: u32) {
        let Some((x, y, w, h)) = self.clip(x, y, w, h) else { return };
        for (_, line) in self.rows(x, y, w, h) {
            line.fill(pixel);
        }
    }

    /// Checkerboard fill, every other pixel. Parity follows local coordinates.
    pub fn fill_rect_halftone(&mut self, x: i32, y: i32, w: i32, h: i32, pixel: u32) {
        let Some((bx, by, bw, bh)) = self.clip(x, y, w, h) else { return };
        let (x0, y0) = (self.x0, self.y0);
        for (row, line) in self.rows(bx, by, bw, bh) {
            let ly = row as i32 - y0;
            for (col, px) in line.iter_mut().enumerate() {
                let lx = (bx + col) as i32 - x0;
                if (lx + ly) & 1 == 0 {
                    *px = pixel;
                }
            }
        }
    }

    /// One-pixel outline.
    pub fn frame_rect(&mut self, x: i32, y: i32, w: i32, h: i32, pixel: u32) {
        if w < 1 || h < 1 {
            return;
        }
        self.fill_rect(x, y, w, 1, pixel);
        self.fill_rect(x, y + h - 1, w, 1, pixel);
        self.fill_rect(x, y + 1, 1, h - 2, pixel);
        self.fill_rect(x + w - 1, y + 1, 1, h - 2, pixel);
    }

    /// One-pixel outline drawn on alternating pixels.
    pub fn frame_rect_dotted(&mut self, x: i32, y: i32, w: i32, h: i32, pixel: u32) {
        if w < 1 || h < 1 {
            return;
        }
        for i in (0..w).step_by(2) {
            self.put_pixel(x + i, y, pixel);
            self.put_pixel(x + i, y + h - 1, pixel);
        }
        for j in (0..h).step_by(2) {
            self.put_pixel(x, y + j, pixel);
            self.put_pixel(x + w - 1, y + j, pixel);
        }
    }

    /// Sub-surface for the local rectangle `(x, y, w, h)`, clipped to this
    /// one. Returns `None` when nothing of it is visible.
    pub fn sub(&mut self, x: i32, y: i32, w: i32, h: i32) -> Option<Surface<'_>> {
        let (mut x, mut y, mut w, mut h) = (x + self.x0, y + self.y0, w, h);
        let (mut sx0, mut sy0) = (0, 0);
        if x < 0 {
            sx0 = x;
            w += x;
            x = 0;
        }
        if y < 0 {
            sy0 = y;
            h += y;
            y = 0;
        }
        if x > self.w - w {
            w = self.w - x;
        }
        if y > self.h - h {
            h = self.h - y;
        }
        if w < 1 || h < 1 {
            return None;
        }
        let start = y as usize * self.stride + x as usize;
        let end = start + (h as usize - 1) * self.stride + w as usize;
        Some(Surface {
            pixels: &mut self.pixels[start..end],
            w,
            h,
            stride: self.stride,
            x0: sx0,
            y0: sy0,
        })
    }
}
