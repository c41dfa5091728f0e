//! Shared test helpers.

use std::cell::RefCell;
use std::rc::Rc;

use softgui::event::{KeyEvent, TrackState};
use softgui::render::{Font, Surface};
use softgui::{Context, GuiConfig, HeadlessHandle, HeadlessPlatform, Result, WidgetArgs, WidgetId, WidgetType};

/// Headless context with a placeholder font already installed.
#[allow(dead_code)]
pub fn headless(w: i32, h: i32) -> (Context, HeadlessHandle) {
    headless_with(w, h, GuiConfig::default())
}

#[allow(dead_code)]
pub fn headless_with(w: i32, h: i32, config: GuiConfig) -> (Context, HeadlessHandle) {
    let platform = HeadlessPlatform::new(w, h).expect("platform");
    let handle = platform.handle();
    let mut ctx = Context::new(platform, config).expect("context");
    ctx.install_font("test", Font::placeholder(8, 16));
    (ctx, handle)
}

/// Childless widget with a fixed preference. `None` takes the caller's
/// fallback on that axis.
#[derive(Default)]
pub struct Fixed {
    pub w: Option<i32>,
    pub h: Option<i32>,
}

impl Fixed {
    #[allow(dead_code)]
    pub fn boxed(w: Option<i32>, h: Option<i32>) -> Box<dyn WidgetType> {
        Box::new(Fixed { w, h })
    }
}

impl WidgetType for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn measure(&mut self, _ctx: &mut Context, _id: WidgetId, w: i32, h: i32, _maxw: i32, _maxh: i32) -> Option<(i32, i32)> {
        Some((self.w.unwrap_or(w), self.h.unwrap_or(h)))
    }
}

pub type Log = Rc<RefCell<Vec<String>>>;

#[allow(dead_code)]
pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

#[allow(dead_code)]
pub fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

/// Widget that records every hook call as `"<name>:<hook>"`.
pub struct Probe {
    pub name: &'static str,
    pub log: Log,
    pub focusable: bool,
    pub clickable: bool,
    /// Return value for `TrackState::Begin`.
    pub accept: bool,
    /// Return value for `TrackState::EndIn`.
    pub veto: bool,
    pub height: i32,
}

impl Probe {
    #[allow(dead_code)]
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Rc::clone(log),
            focusable: false,
            clickable: false,
            accept: true,
            veto: false,
            height: 20,
        }
    }

    #[allow(dead_code)]
    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }

    #[allow(dead_code)]
    pub fn clickable(mut self) -> Self {
        self.clickable = true;
        self
    }

    #[allow(dead_code)]
    pub fn vetoing(mut self) -> Self {
        self.veto = true;
        self
    }

    #[allow(dead_code)]
    pub fn boxed(self) -> Box<dyn WidgetType> {
        Box::new(self)
    }

    fn record(&self, what: impl std::fmt::Display) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, what));
    }
}

impl WidgetType for Probe {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn init(&mut self, ctx: &mut Context, id: WidgetId, args: WidgetArgs) -> Result<()> {
        ctx.unexpected_args(self.name(), &args)?;
        if let Some(node) = ctx.widget_mut(id) {
            node.focusable = self.focusable;
            node.clickable = self.clickable;
        }
        Ok(())
    }

    fn del(&mut self, _ctx: &mut Context, _id: WidgetId) {
        self.record("del");
    }

    fn render(&mut self, _ctx: &mut Context, _id: WidgetId, _dst: &mut Surface<'_>) {}

    fn measure(&mut self, _ctx: &mut Context, _id: WidgetId, w: i32, _h: i32, _maxw: i32, _maxh: i32) -> Option<(i32, i32)> {
        Some((w, self.height))
    }

    fn focus(&mut self, _ctx: &mut Context, _id: WidgetId, focused: bool) {
        self.record(if focused { "focus" } else { "blur" });
    }

    fn key(&mut self, _ctx: &mut Context, _id: WidgetId, event: &KeyEvent) -> bool {
        if event.pressed {
            self.record(format_args!("key {:x}", event.keycode));
        }
        false
    }

    fn track(&mut self, _ctx: &mut Context, _id: WidgetId, state: TrackState) -> bool {
        self.record(format_args!("{:?}", state));
        match state {
            TrackState::Begin => self.accept,
            TrackState::EndIn => self.veto,
            _ => false,
        }
    }

    fn activate(&mut self, _ctx: &mut Context, _id: WidgetId) {
        self.record("activate");
    }
}
