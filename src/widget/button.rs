//! Push button: text in a box that can be focused or clicked.

use std::rc::Rc;

use super::{WidgetArgs, WidgetId, WidgetType};
use crate::context::Context;
use crate::event::{KeyEvent, TrackState, KEY_ENTER, KEY_SPACE};
use crate::render::{Font, Surface};
use crate::Result;

const EXTRA_PAD_TOP: i32 = 2;
const BG_COLOR: u32 = 0xc0c0c0c0;
const PRESSED_COLOR: u32 = 0x20202020;
const BORDER_COLOR: u32 = 0x00000000;

/// Activation callback. Runs after the button's own hook has returned.
pub type ButtonCallback = Rc<dyn Fn(&mut Context, WidgetId)>;

#[derive(Default)]
pub struct ButtonArgs {
    pub text: String,
    pub font: Option<Rc<Font>>,
    pub on_click: Option<ButtonCallback>,
}

#[derive(Default)]
pub struct Button {
    text: Vec<u8>,
    font: Option<Rc<Font>>,
    string_w: i32,
    string_h: i32,
    focused: bool,
    pressed: bool,
    on_click: Option<ButtonCallback>,
}

impl Button {
    fn remeasure(&mut self) {
        if let Some(font) = &self.font {
            self.string_w = font.measure_string(&self.text);
            self.string_h = font.glyph_height();
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn set_text(ctx: &mut Context, id: WidgetId, text: impl AsRef<[u8]>) -> Result<()> {
        ctx.with_type::<Button, _>(id, |button, ctx| {
            button.text = text.as_ref().to_vec();
            button.remeasure();
            ctx.mark_tree_changed();
        })
    }

    pub fn set_font(ctx: &mut Context, id: WidgetId, font: Rc<Font>) -> Result<()> {
        ctx.with_type::<Button, _>(id, |button, ctx| {
            button.font = Some(font);
            button.remeasure();
            ctx.mark_tree_changed();
        })
    }

    pub fn set_callback(ctx: &mut Context, id: WidgetId, on_click: Option<ButtonCallback>) -> Result<()> {
        ctx.with_type::<Button, _>(id, |button, _| button.on_click = on_click)
    }
}

impl WidgetType for Button {
    fn name(&self) -> &'static str {
        "button"
    }

    fn init(&mut self, ctx: &mut Context, id: WidgetId, args: WidgetArgs) -> Result<()> {
        match args {
            WidgetArgs::Button(args) => {
                self.text = args.text.into_bytes();
                self.font = args.font;
                self.on_click = args.on_click;
            }
            other => ctx.unexpected_args(self.name(), &other)?,
        }
        if self.font.is_none() {
            self.font = Some(ctx.default_font()?);
        }
        self.remeasure();
        if let Some(node) = ctx.widget_mut(id) {
            node.bgcolor = BG_COLOR;
            node.padx = 5;
            node.pady = 2;
            node.focusable = true;
            node.clickable = true;
        }
        Ok(())
    }

    fn measure(&mut self, ctx: &mut Context, id: WidgetId, _w: i32, _h: i32, _maxw: i32, _maxh: i32) -> Option<(i32, i32)> {
        let (padx, pady) = ctx.widget(id).map_or((0, 0), |n| (n.padx, n.pady));
        Some((self.string_w + padx * 2, self.string_h + pady * 2 + EXTRA_PAD_TOP))
    }

    fn render(&mut self, ctx: &mut Context, id: WidgetId, dst: &mut Surface<'_>) {
        let Some(node) = ctx.widget(id) else { return };
        let (w, h) = (node.w, node.h);
        if self.pressed {
            dst.fill_rect(0, 0, w, h, PRESSED_COLOR);
        }
        if let Some(font) = self.font.as_ref().filter(|_| !self.text.is_empty()) {
            let x = (w >> 1) - (self.string_w >> 1);
            let y = (h >> 1) - (self.string_h >> 1) + EXTRA_PAD_TOP;
            font.set_color_normal(if self.pressed { 0xffffffff } else { 0x00000000 });
            font.render_string(dst, x, y, &self.text);
        }
        dst.frame_rect(0, 0, w, h, BORDER_COLOR);
        if self.focused {
            dst.frame_rect_dotted(2, 2, w - 4, h - 4, BORDER_COLOR);
        }
    }

    fn focus(&mut self, ctx: &mut Context, _id: WidgetId, focused: bool) {
        self.focused = focused;
        ctx.render_soon();
    }

    fn key(&mut self, ctx: &mut Context, id: WidgetId, event: &KeyEvent) -> bool {
        if event.pressed && matches!(event.keycode, KEY_ENTER | KEY_SPACE) {
            self.activate(ctx, id);
            return true;
        }
        false
    }

    fn track(&mut self, ctx: &mut Context, _id: WidgetId, state: TrackState) -> bool {
        match state {
            TrackState::Begin | TrackState::Reenter => {
                self.pressed = true;
                ctx.render_soon();
                true
            }
            TrackState::Exit | TrackState::EndIn => {
                self.pressed = false;
                ctx.render_soon();
                false
            }
            TrackState::EndOut => false,
        }
    }

    fn activate(&mut self, ctx: &mut Context, id: WidgetId) {
        if let Some(cb) = self.on_click.clone() {
            ctx.post(move |ctx| cb(ctx, id));
        }
    }
}
