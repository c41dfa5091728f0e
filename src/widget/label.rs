//! Static text.

use std::rc::Rc;

use super::{WidgetArgs, WidgetId, WidgetType};
use crate::context::Context;
use crate::render::{Font, Surface};
use crate::Result;

#[derive(Default)]
pub struct LabelArgs {
    pub text: String,
    pub font: Option<Rc<Font>>,
    /// `None` keeps the default (opaque black).
    pub fgcolor: Option<u32>,
}

pub struct Label {
    text: Vec<u8>,
    font: Option<Rc<Font>>,
    string_w: i32,
    string_h: i32,
    fgcolor: u32,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            text: Vec::new(),
            font: None,
            string_w: 0,
            string_h: 0,
            fgcolor: 0x000000ff,
        }
    }
}

impl Label {
    fn remeasure(&mut self) {
        if let Some(font) = &self.font {
            self.string_w = font.measure_string(&self.text);
            self.string_h = font.glyph_height();
        }
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn set_text(ctx: &mut Context, id: WidgetId, text: impl AsRef<[u8]>) -> Result<()> {
        ctx.with_type::<Label, _>(id, |label, ctx| {
            label.text = text.as_ref().to_vec();
            label.remeasure();
            ctx.mark_tree_changed();
        })
    }

    pub fn set_font(ctx: &mut Context, id: WidgetId, font: Rc<Font>) -> Result<()> {
        ctx.with_type::<Label, _>(id, |label, ctx| {
            label.font = Some(font);
            label.remeasure();
            ctx.mark_tree_changed();
        })
    }

    pub fn set_fgcolor(ctx: &mut Context, id: WidgetId, color: u32) -> Result<()> {
        ctx.with_type::<Label, _>(id, |label, ctx| {
            label.fgcolor = color;
            ctx.render_soon();
        })
    }
}

impl WidgetType for Label {
    fn name(&self) -> &'static str {
        "label"
    }

    fn init(&mut self, ctx: &mut Context, _id: WidgetId, args: WidgetArgs) -> Result<()> {
        match args {
            WidgetArgs::Label(args) => {
                self.text = args.text.into_bytes();
                self.font = args.font;
                if let Some(color) = args.fgcolor {
                    self.fgcolor = color;
                }
            }
            other => ctx.unexpected_args(self.name(), &other)?,
        }
        if self.font.is_none() {
            self.font = Some(ctx.default_font()?);
        }
        self.remeasure();
        Ok(())
    }

    fn measure(&mut self, ctx: &mut Context, id: WidgetId, _w: i32, _h: i32, _maxw: i32, _maxh: i32) -> Option<(i32, i32)> {
        let (padx, pady) = ctx.widget(id).map_or((0, 0), |n| (n.padx, n.pady));
        Some((self.string_w + padx * 2, self.string_h + pady * 2))
    }

    fn render(&mut self, ctx: &mut Context, id: WidgetId, dst: &mut Surface<'_>) {
        let (Some(font), Some(node)) = (&self.font, ctx.widget(id)) else { return };
        let x = (node.w >> 1) - (self.string_w >> 1);
        let y = (node.h >> 1) - (self.string_h >> 1);
        font.set_color_normal(self.fgcolor);
        font.render_string(dst, x, y, &self.text);
    }
}
