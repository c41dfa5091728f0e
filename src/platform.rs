//! Window-system collaborator.
//!
//! The toolkit only needs a writable 32-bit framebuffer, a way to tell the
//! window which part of it changed, and a stream of input events. A real
//! backend (X11, a compositor, a terminal) implements [`Platform`];
//! [`HeadlessPlatform`] keeps everything in memory for tests and screenshots.

use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{EventQueue, PlatformEvent};
use crate::render::Rect;
use crate::{Error, Result};

/// Borrowed framebuffer: `h` rows of `stride` pixels, `w` of them visible.
pub struct Framebuffer<'a> {
    pub pixels: &'a mut [u32],
    pub w: i32,
    pub h: i32,
    pub stride: usize,
}

pub trait Platform {
    /// Collect pending input into `events`. An error ends the main loop.
    fn update(&mut self, events: &mut EventQueue) -> Result<()>;

    /// Current window size.
    fn size(&self) -> (i32, i32);

    fn framebuffer(&mut self) -> Option<Framebuffer<'_>>;

    /// Pixels inside `rect` changed and should reach the display.
    fn framebuffer_dirty(&mut self, rect: Rect);

    /// Convert `0xRRGGBBxx` to the framebuffer's native pixel format.
    fn pixel_from_rgbx(&self, rgbx: u32) -> u32 {
        rgbx
    }
}

/// What the "display" shows, shared with [`HeadlessHandle`].
#[derive(Default)]
struct HeadlessState {
    w: i32,
    h: i32,
    display: Vec<u32>,
    pending: Vec<PlatformEvent>,
    dirty: Vec<Rect>,
    updates: u64,
    fail_next: Option<String>,
}

/// In-memory backend. Pixels are `0xRRGGBBAA`. Drawing happens in a private
/// back buffer; dirty rectangles are copied to the shared display.
pub struct HeadlessPlatform {
    state: Rc<RefCell<HeadlessState>>,
    w: i32,
    h: i32,
    pixels: Vec<u32>,
}

/// Test-side handle onto a [`HeadlessPlatform`] that has been moved into a
/// context: inject events, inspect the framebuffer.
#[derive(Clone)]
pub struct HeadlessHandle {
    state: Rc<RefCell<HeadlessState>>,
}

/// Pixel count of a `w` x `h` buffer. Every index into the buffer is
/// computed in `i32`, so the product has to fit there too.
fn pixel_count(w: i32, h: i32) -> Result<usize> {
    w.checked_mul(h)
        .map(|n| n as usize)
        .ok_or_else(|| Error::Platform(format!("Window size {w}x{h} is too large")))
}

impl HeadlessPlatform {
    /// Sizes below 1 are raised to 1. Fails if the buffer would overflow.
    pub fn new(w: i32, h: i32) -> Result<Self> {
        let (w, h) = (w.max(1), h.max(1));
        let len = pixel_count(w, h)?;
        let state = HeadlessState {
            w,
            h,
            display: vec![0; len],
            ..Default::default()
        };
        Ok(Self {
            state: Rc::new(RefCell::new(state)),
            w,
            h,
            pixels: vec![0; len],
        })
    }

    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle { state: Rc::clone(&self.state) }
    }
}

impl Platform for HeadlessPlatform {
    fn update(&mut self, events: &mut EventQueue) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.updates += 1;
        if let Some(reason) = state.fail_next.take() {
            return Err(Error::Platform(reason));
        }
        if (state.w, state.h) != (self.w, self.h) {
            self.w = state.w;
            self.h = state.h;
            self.pixels = vec![0; state.display.len()];
        }
        for event in state.pending.drain(..) {
            events.push(event);
        }
        Ok(())
    }

    fn size(&self) -> (i32, i32) {
        (self.w, self.h)
    }

    fn framebuffer(&mut self) -> Option<Framebuffer<'_>> {
        Some(Framebuffer { pixels: &mut self.pixels, w: self.w, h: self.h, stride: self.w as usize })
    }

    fn framebuffer_dirty(&mut self, rect: Rect) {
        let mut state = self.state.borrow_mut();
        let clip = rect.intersect(&Rect::new(0, 0, self.w, self.h));
        if (state.w, state.h) == (self.w, self.h) && !clip.is_empty() {
            for y in clip.y..clip.y + clip.h {
                let row = (y * self.w) as usize;
                let (a, b) = (row + clip.x as usize, row + (clip.x + clip.w) as usize);
                state.display[a..b].copy_from_slice(&self.pixels[a..b]);
            }
        }
        state.dirty.push(rect);
    }
}

impl HeadlessHandle {
    pub fn push_event(&self, event: PlatformEvent) {
        self.state.borrow_mut().pending.push(event);
    }

    /// Change the window size and queue the matching resize event. The
    /// back buffer follows on the next `update`. An oversized request leaves
    /// the window as it was.
    pub fn resize(&self, w: i32, h: i32) -> Result<()> {
        let (w, h) = (w.max(1), h.max(1));
        let len = pixel_count(w, h)?;
        let mut state = self.state.borrow_mut();
        state.w = w;
        state.h = h;
        state.display = vec![0; len];
        state.pending.push(PlatformEvent::Resize { w, h });
        Ok(())
    }

    /// Make the next `update` fail with a platform error.
    pub fn fail_next_update(&self, reason: impl Into<String>) {
        self.state.borrow_mut().fail_next = Some(reason.into());
    }

    pub fn size(&self) -> (i32, i32) {
        let state = self.state.borrow();
        (state.w, state.h)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        let state = self.state.borrow();
        if x < 0 || y < 0 || x >= state.w || y >= state.h {
            return None;
        }
        state.display.get((y * state.w + x) as usize).copied()
    }

    /// Dirty rectangles reported since the last call.
    pub fn take_dirty(&self) -> Vec<Rect> {
        std::mem::take(&mut self.state.borrow_mut().dirty)
    }

    pub fn update_count(&self) -> u64 {
        self.state.borrow().updates
    }

    /// Copy the framebuffer out as an opaque RGBA image.
    pub fn screenshot(&self) -> image::RgbaImage {
        let state = self.state.borrow();
        image::RgbaImage::from_fn(state.w as u32, state.h as u32, |x, y| {
            let px = state.display[(y as i32 * state.w + x as i32) as usize];
            image::Rgba([(px >> 24) as u8, (px >> 16) as u8, (px >> 8) as u8, 0xff])
        })
    }
}
