//! Single-line text entry.
//!
//! The selection is an anchor `sel_p` plus a signed length `sel_c`. A
//! negative length means the active edge (the caret) is left of the anchor.
//! Every edit normalizes that to `(start, len)`, asks the pre-edit veto, splices
//! the bytes, puts the caret after the change and posts the post-edit
//! notification.

use std::rc::Rc;

use super::{WidgetArgs, WidgetId, WidgetType};
use crate::context::Context;
use crate::event::{
    KeyEvent, KEY_BACKSPACE, KEY_DELETE, KEY_DOWN, KEY_END, KEY_HOME, KEY_LEFT, KEY_RIGHT, KEY_UP,
};
use crate::render::{Font, Surface};
use crate::text::{TextDecoder, TextEncoder};
use crate::Result;

const WIDTH_IN_GLYPHS: i32 = 40;

/// Called before any edit with `(field, current text, start, len, incoming)`.
/// Return true to reject the edit.
pub type PreEditCallback = Rc<dyn Fn(WidgetId, &[u8], usize, usize, &[u8]) -> bool>;

/// Called after an edit with the final text and caret position.
pub type PostEditCallback = Rc<dyn Fn(&mut Context, WidgetId, &[u8], usize)>;

#[derive(Default)]
pub struct FieldArgs {
    pub text: String,
    pub font: Option<Rc<Font>>,
    pub pre_edit: Option<PreEditCallback>,
    pub post_edit: Option<PostEditCallback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Vetoed,
    /// Nothing to do: caret at an edge, or a rejected control character.
    Unchanged,
}

pub struct Field {
    text: TextEncoder,
    font: Option<Rc<Font>>,
    focused: bool,
    fgcolor: u32,
    highlight_color: u32,
    cursor_color: u32,
    sel_p: usize,
    sel_c: isize,
    /// Cached selection (x, w) in pixels; `None` when stale.
    sel_geom: Option<(i32, i32)>,
    pre_edit: Option<PreEditCallback>,
    post_edit: Option<PostEditCallback>,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            text: TextEncoder::new(&crate::text::UTF8),
            font: None,
            focused: false,
            fgcolor: 0x000000ff,
            highlight_color: 0x40c0ffff,
            cursor_color: 0x000000ff,
            sel_p: 0,
            sel_c: 0,
            sel_geom: None,
            pre_edit: None,
            post_edit: None,
        }
    }
}

fn is_control(codepoint: u32) -> bool {
    codepoint < 0x20 || (0x7f..0xa0).contains(&codepoint)
}

impl Field {
    /// Selection as `(start, len)`.
    pub fn selection_range(&self) -> (usize, usize) {
        if self.sel_c < 0 {
            let len = self.sel_c.unsigned_abs();
            (self.sel_p - len, len)
        } else {
            (self.sel_p, self.sel_c as usize)
        }
    }

    pub fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Nearest codepoint boundary at or before `pos`.
    fn snap_back(&self, pos: usize) -> usize {
        let bytes = self.text.as_bytes();
        let pos = pos.min(bytes.len());
        let mut dec = TextDecoder::new(bytes, self.text.encoding());
        let mut last = 0;
        while dec.position() < pos {
            last = dec.position();
            if dec.read().is_none() {
                break;
            }
        }
        if dec.position() == pos { pos } else { last }
    }

    /// Nearest codepoint boundary at or after `pos`.
    fn snap_forward(&self, pos: usize) -> usize {
        let bytes = self.text.as_bytes();
        let pos = pos.min(bytes.len());
        let mut dec = TextDecoder::new(bytes, self.text.encoding());
        while dec.position() < pos {
            if dec.read().is_none() {
                break;
            }
        }
        dec.position()
    }

    fn changed(&mut self, ctx: &mut Context) {
        self.sel_geom = None;
        ctx.render_soon();
    }

    fn splice(&mut self, ctx: &mut Context, id: WidgetId, start: usize, len: usize, incoming: &[u8]) -> Result<EditOutcome> {
        if let Some(veto) = &self.pre_edit {
            if veto(id, self.text.as_bytes(), start, len, incoming) {
                return Ok(EditOutcome::Vetoed);
            }
        }
        self.text.replace_raw(start, len, incoming)?;
        self.sel_p = start + incoming.len();
        self.sel_c = 0;
        self.changed(ctx);
        if let Some(cb) = self.post_edit.clone() {
            let text = self.text.as_bytes().to_vec();
            let caret = self.sel_p;
            ctx.post(move |ctx| cb(ctx, id, &text, caret));
        }
        Ok(EditOutcome::Applied)
    }

    fn replace_text(&mut self, ctx: &mut Context, text: &[u8]) {
        self.text = TextEncoder::with_bytes(self.text.encoding(), text.to_vec());
        self.sel_p = self.text.len();
        self.sel_c = 0;
        self.changed(ctx);
    }

    fn select(&mut self, ctx: &mut Context, p: usize, len: Option<usize>) {
        let total = self.text.len();
        let p = self.snap_back(p);
        let end = match len {
            Some(len) => self.snap_forward(p.saturating_add(len).min(total)),
            None => total,
        };
        self.sel_p = p;
        self.sel_c = (end - p) as isize;
        self.changed(ctx);
    }

    fn move_caret(&mut self, ctx: &mut Context, dx: i32, dy: i32, extend: bool) {
        let total = self.text.len();
        let active = (self.sel_p as isize + self.sel_c) as usize;
        let target = if dy < 0 {
            0
        } else if dy > 0 {
            total
        } else if dx == 0 {
            return;
        } else if !extend && self.sel_c != 0 {
            // First move out of a selection just collapses it onto that edge.
            let (start, len) = self.selection_range();
            self.sel_p = if dx < 0 { start } else { start + len };
            self.sel_c = 0;
            self.changed(ctx);
            return;
        } else if dx < 0 {
            active - self.text.prev_len(active)
        } else {
            active + self.text.next_len(active)
        };
        if extend {
            self.sel_c = target as isize - self.sel_p as isize;
        } else {
            self.sel_p = target;
            self.sel_c = 0;
        }
        self.changed(ctx);
    }

    fn erase_forward(&mut self, ctx: &mut Context, id: WidgetId) -> Result<EditOutcome> {
        if self.sel_c != 0 {
            let (start, len) = self.selection_range();
            return self.splice(ctx, id, start, len, &[]);
        }
        let len = self.text.next_len(self.sel_p);
        if len == 0 {
            return Ok(EditOutcome::Unchanged);
        }
        self.splice(ctx, id, self.sel_p, len, &[])
    }

    fn erase_backward(&mut self, ctx: &mut Context, id: WidgetId) -> Result<EditOutcome> {
        if self.sel_c != 0 {
            let (start, len) = self.selection_range();
            return self.splice(ctx, id, start, len, &[]);
        }
        let len = self.text.prev_len(self.sel_p);
        if len == 0 {
            return Ok(EditOutcome::Unchanged);
        }
        self.splice(ctx, id, self.sel_p - len, len, &[])
    }

    fn insert_cp(&mut self, ctx: &mut Context, id: WidgetId, codepoint: u32) -> Result<EditOutcome> {
        if is_control(codepoint) {
            return Ok(EditOutcome::Unchanged);
        }
        let mut buf = [0u8; 4];
        let Some(n) = i32::try_from(codepoint).ok().and_then(|cp| self.text.encoding().write(cp, &mut buf)) else {
            tracing::debug!("Field {} cannot encode U+{:04X}", id, codepoint);
            return Ok(EditOutcome::Unchanged);
        };
        let (start, len) = self.selection_range();
        self.splice(ctx, id, start, len, &buf[..n])
    }

    pub fn text(ctx: &mut Context, id: WidgetId) -> Result<Vec<u8>> {
        ctx.with_type::<Field, _>(id, |field, _| field.text.as_bytes().to_vec())
    }

    /// Replace the whole text without consulting the edit callbacks. The
    /// caret ends up at the end.
    pub fn set_text(ctx: &mut Context, id: WidgetId, text: impl AsRef<[u8]>) -> Result<()> {
        ctx.with_type::<Field, _>(id, |field, ctx| field.replace_text(ctx, text.as_ref()))
    }

    pub fn set_font(ctx: &mut Context, id: WidgetId, font: Rc<Font>) -> Result<()> {
        ctx.with_type::<Field, _>(id, |field, ctx| {
            field.font = Some(font);
            field.sel_geom = None;
            ctx.mark_tree_changed();
        })
    }

    pub fn set_pre_edit(ctx: &mut Context, id: WidgetId, cb: Option<PreEditCallback>) -> Result<()> {
        ctx.with_type::<Field, _>(id, |field, _| field.pre_edit = cb)
    }

    pub fn set_post_edit(ctx: &mut Context, id: WidgetId, cb: Option<PostEditCallback>) -> Result<()> {
        ctx.with_type::<Field, _>(id, |field, _| field.post_edit = cb)
    }

    /// `(start, len)` of the selection, normalized.
    pub fn selection(ctx: &mut Context, id: WidgetId) -> Result<(usize, usize)> {
        ctx.with_type::<Field, _>(id, |field, _| field.selection_range())
    }

    /// Select `len` bytes from `p`, or through the end if `len` is `None`.
    /// Both edges snap to codepoint boundaries.
    pub fn set_selection(ctx: &mut Context, id: WidgetId, p: usize, len: Option<usize>) -> Result<()> {
        ctx.with_type::<Field, _>(id, |field, ctx| field.select(ctx, p, len))
    }

    /// Move the caret one codepoint per unit of `dx`. Any vertical motion
    /// jumps to the start or end. With `extend`, the anchor stays put.
    pub fn move_cursor(ctx: &mut Context, id: WidgetId, dx: i32, dy: i32, extend: bool) -> Result<()> {
        ctx.with_type::<Field, _>(id, |field, ctx| field.move_caret(ctx, dx, dy, extend))
    }

    /// Delete the selection, or the codepoint after the caret.
    pub fn delete(ctx: &mut Context, id: WidgetId) -> Result<EditOutcome> {
        ctx.with_type::<Field, _>(id, |field, ctx| field.erase_forward(ctx, id))?
    }

    /// Delete the selection, or the codepoint before the caret.
    pub fn backspace(ctx: &mut Context, id: WidgetId) -> Result<EditOutcome> {
        ctx.with_type::<Field, _>(id, |field, ctx| field.erase_backward(ctx, id))?
    }

    /// Type one codepoint over the selection. Control characters are ignored.
    pub fn insert_codepoint(ctx: &mut Context, id: WidgetId, codepoint: u32) -> Result<EditOutcome> {
        ctx.with_type::<Field, _>(id, |field, ctx| field.insert_cp(ctx, id, codepoint))?
    }

    /// Replace the selection with raw encoded bytes. Control characters pass.
    pub fn replace_selection(ctx: &mut Context, id: WidgetId, text: impl AsRef<[u8]>) -> Result<EditOutcome> {
        ctx.with_type::<Field, _>(id, |field, ctx| {
            let (start, len) = field.selection_range();
            field.splice(ctx, id, start, len, text.as_ref())
        })?
    }
}

impl WidgetType for Field {
    fn name(&self) -> &'static str {
        "field"
    }

    fn init(&mut self, ctx: &mut Context, id: WidgetId, args: WidgetArgs) -> Result<()> {
        match args {
            WidgetArgs::Field(args) => {
                self.text = TextEncoder::with_bytes(ctx.encoding(), args.text.into_bytes());
                self.sel_p = self.text.len();
                self.font = args.font;
                self.pre_edit = args.pre_edit;
                self.post_edit = args.post_edit;
            }
            other => {
                ctx.unexpected_args(self.name(), &other)?;
                self.text = TextEncoder::new(ctx.encoding());
            }
        }
        if self.font.is_none() {
            self.font = Some(ctx.default_font()?);
        }
        if let Some(node) = ctx.widget_mut(id) {
            node.bgcolor = 0xffffffff;
            node.padx = 5;
            node.pady = 3;
            node.focusable = true;
        }
        Ok(())
    }

    fn measure(&mut self, ctx: &mut Context, id: WidgetId, _w: i32, _h: i32, _maxw: i32, _maxh: i32) -> Option<(i32, i32)> {
        let (padx, pady) = ctx.widget(id).map_or((0, 0), |n| (n.padx, n.pady));
        let font = self.font.as_ref()?;
        Some((font.glyph_width() * WIDTH_IN_GLYPHS + padx * 2, font.glyph_height() + pady * 2))
    }

    fn render(&mut self, ctx: &mut Context, id: WidgetId, dst: &mut Surface<'_>) {
        let (Some(font), Some(node)) = (&self.font, ctx.widget(id)) else { return };
        let (w, h, padx, pady) = (node.w, node.h, node.padx, node.pady);

        let (selx, selw) = match self.sel_geom {
            Some(geom) => geom,
            None => {
                let (start, len) = self.selection_range();
                let bytes = self.text.as_bytes();
                let geom = (font.measure_string(&bytes[..start]) + padx, font.measure_string(&bytes[start..start + len]));
                self.sel_geom = Some(geom);
                geom
            }
        };
        if selw > 0 {
            dst.fill_rect(selx, pady, selw, h - pady * 2, self.highlight_color);
        } else {
            dst.fill_rect(selx, pady, 1, h - pady * 2, self.cursor_color);
        }

        font.set_color_normal(self.fgcolor);
        font.render_string(dst, padx, pady, self.text.as_bytes());
        dst.frame_rect(0, 0, w, h, 0x00000000);
    }

    fn focus(&mut self, ctx: &mut Context, _id: WidgetId, focused: bool) {
        self.focused = focused;
        ctx.render_soon();
    }

    fn key(&mut self, ctx: &mut Context, id: WidgetId, event: &KeyEvent) -> bool {
        if !event.pressed {
            return false;
        }
        let extend = event.modifiers.shift();
        let result = match event.keycode {
            KEY_BACKSPACE => self.erase_backward(ctx, id).map(|_| ()),
            KEY_DELETE => self.erase_forward(ctx, id).map(|_| ()),
            KEY_HOME => Ok(self.move_caret(ctx, 0, -1, extend)),
            KEY_END => Ok(self.move_caret(ctx, 0, 1, extend)),
            KEY_RIGHT => Ok(self.move_caret(ctx, 1, 0, extend)),
            KEY_LEFT => Ok(self.move_caret(ctx, -1, 0, extend)),
            KEY_DOWN => Ok(self.move_caret(ctx, 0, 1, extend)),
            KEY_UP => Ok(self.move_caret(ctx, 0, -1, extend)),
            _ => {
                if event.codepoint == 0 || is_control(event.codepoint) {
                    return false;
                }
                self.insert_cp(ctx, id, event.codepoint).map(|_| ())
            }
        };
        if let Err(e) = result {
            tracing::warn!("Field {} edit failed: {}", id, e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_ranges() {
        assert!(is_control(0x09));
        assert!(is_control(0x7f));
        assert!(is_control(0x9f));
        assert!(!is_control(0xa0));
        assert!(!is_control(b'a' as u32));
    }

    #[test]
    fn test_selection_range_normalizes_negative() {
        let mut field = Field::default();
        field.text = TextEncoder::with_bytes(&crate::text::UTF8, b"hello".to_vec());
        field.sel_p = 4;
        field.sel_c = -3;
        assert_eq!(field.selection_range(), (1, 3));
    }

    #[test]
    fn test_snap_inside_multibyte() {
        let mut field = Field::default();
        field.text = TextEncoder::with_bytes(&crate::text::UTF8, "a\u{20ac}b".as_bytes().to_vec());
        assert_eq!(field.snap_back(2), 1);
        assert_eq!(field.snap_forward(2), 4);
        assert_eq!(field.snap_back(4), 4);
    }
}
