//! The GUI context: owner of the widget tree and everything around it.
//!
//! Only one context may be live per process. It owns the platform window,
//! the root widget, the font cache, the focus ring, the pointer-tracking
//! state and the deferred-task queue, and drives the fixed-rate main loop.
//!
//! Widget hooks receive `&mut Context`, so any hook may mutate the tree.
//! Structural changes only raise the `tree_changed` flag; layout, focus
//! repair and rendering happen once per [`update`](Context::update).

mod events;
mod focus;
mod tasks;
mod tree;

pub use tasks::{TaskCallback, TaskId};

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::clock::FrameClock;
use crate::config::GuiConfig;
use crate::event::{EventQueue, Modifiers};
use crate::platform::Platform;
use crate::render::{Font, Rect, Surface};
use crate::text::{self, TextEncoding};
use crate::widget::{layout, Widget, WidgetArgs, WidgetId, WidgetRegistry, WidgetType};
use crate::{Error, Result};

static CONTEXT_LIVE: AtomicBool = AtomicBool::new(false);

const PLACEHOLDER_GLYPH_W: u32 = 8;
const PLACEHOLDER_GLYPH_H: u32 = 16;

type Posted = Box<dyn FnOnce(&mut Context)>;

pub struct Context {
    pub(crate) tree: WidgetRegistry,
    /// Taken out while rendering into its framebuffer.
    platform: Option<Box<dyn Platform>>,
    config: GuiConfig,
    encoding: &'static dyn TextEncoding,
    root: Option<WidgetId>,
    w: i32,
    h: i32,
    render_soon: bool,
    tree_changed: bool,
    /// First entry is the default font.
    fonts: Vec<(String, Rc<Font>)>,
    focus: focus::FocusRing,
    track: events::Tracking,
    pointer: (i32, i32),
    modifiers: Modifiers,
    /// Logical seconds, advanced by `update`.
    clock: f64,
    tasks: tasks::TaskQueue,
    events: EventQueue,
    posted: VecDeque<Posted>,
    hook_depth: u32,
    draining: bool,
    terminate: Option<i32>,
}

impl Context {
    /// Open the context on `platform`. Fails if another context is live.
    pub fn new(platform: impl Platform + 'static, config: GuiConfig) -> Result<Self> {
        if CONTEXT_LIVE.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(Error::ContextExists);
        }
        let mut platform: Box<dyn Platform> = Box::new(platform);
        let encoding = match text::encoding_by_name(&config.encoding) {
            Ok(encoding) => encoding,
            Err(e) => {
                CONTEXT_LIVE.store(false, Ordering::Release);
                return Err(e);
            }
        };
        if platform.framebuffer().is_none() {
            CONTEXT_LIVE.store(false, Ordering::Release);
            return Err(Error::Platform("framebuffer unavailable".into()));
        }
        let (w, h) = platform.size();
        debug!("Context created: {}x{}, encoding {}", w, h, encoding.name());
        Ok(Self {
            tree: WidgetRegistry::new(),
            platform: Some(platform),
            config,
            encoding,
            root: None,
            w,
            h,
            render_soon: false,
            tree_changed: false,
            fonts: Vec::new(),
            focus: focus::FocusRing::default(),
            track: events::Tracking::default(),
            pointer: (0, 0),
            modifiers: Modifiers::default(),
            clock: 0.0,
            tasks: tasks::TaskQueue::default(),
            events: EventQueue::new(),
            posted: VecDeque::new(),
            hook_depth: 0,
            draining: false,
            terminate: None,
        })
    }

    pub fn config(&self) -> &GuiConfig {
        &self.config
    }

    pub fn tree(&self) -> &WidgetRegistry {
        &self.tree
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.tree.get(id)
    }

    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.tree.get_mut(id)
    }

    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// Window size as last reported by the platform.
    pub fn size(&self) -> (i32, i32) {
        (self.w, self.h)
    }

    /// Logical time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn encoding(&self) -> &'static dyn TextEncoding {
        self.encoding
    }

    /// Affects fields and fonts created from now on.
    pub fn set_encoding(&mut self, encoding: &'static dyn TextEncoding) {
        self.encoding = encoding;
    }

    pub fn mark_tree_changed(&mut self) {
        self.tree_changed = true;
    }

    pub fn render_soon(&mut self) {
        self.render_soon = true;
    }

    pub fn is_tree_changed(&self) -> bool {
        self.tree_changed
    }

    pub fn is_render_pending(&self) -> bool {
        self.render_soon
    }

    /// Ask the main loop to exit with `status` after the current tick.
    pub fn terminate_soon(&mut self, status: i32) {
        self.terminate = Some(status);
    }

    pub fn termination_status(&self) -> Option<i32> {
        self.terminate
    }

    /// Run `f` with the behavior of `id` taken out of its node.
    ///
    /// Fails with [`Error::WidgetBusy`] if that behavior is already running a
    /// hook further up the stack. If the widget is destroyed while `f` runs,
    /// its `del` hook runs here instead.
    pub fn with_behavior<R>(&mut self, id: WidgetId, f: impl FnOnce(&mut dyn WidgetType, &mut Context) -> R) -> Result<R> {
        let node = self.tree.node_mut(id)?;
        let mut behavior = node.behavior.take().ok_or(Error::WidgetBusy(id))?;
        self.hook_depth += 1;
        let result = f(behavior.as_mut(), self);
        match self.tree.get_mut(id) {
            Some(node) => node.behavior = Some(behavior),
            None => {
                debug!("Widget {} was deleted during its own hook", id);
                behavior.del(self, id);
            }
        }
        self.hook_depth -= 1;
        self.flush_posted();
        Ok(result)
    }

    /// Like [`with_behavior`](Self::with_behavior), downcast to a concrete type.
    /// A mismatch names both types by [`WidgetType::name`].
    pub fn with_type<T: WidgetType + Default, R>(&mut self, id: WidgetId, f: impl FnOnce(&mut T, &mut Context) -> R) -> Result<R> {
        let actual = self.tree.node(id)?.type_name();
        self.with_behavior(id, |behavior, ctx| match behavior.as_any_mut().downcast_mut::<T>() {
            Some(typed) => Ok(f(typed, ctx)),
            None => Err(Error::InvalidWidgetType { expected: T::default().name(), actual }),
        })?
    }

    /// Queue `f` to run once no hook is executing. User callbacks go through
    /// here so they can touch the widget that triggered them.
    pub fn post(&mut self, f: impl FnOnce(&mut Context) + 'static) {
        self.posted.push_back(Box::new(f));
        self.flush_posted();
    }

    fn flush_posted(&mut self) {
        if self.hook_depth > 0 || self.draining {
            return;
        }
        self.draining = true;
        while let Some(f) = self.posted.pop_front() {
            f(self);
        }
        self.draining = false;
    }

    /// Handle construction arguments meant for another widget type.
    pub fn unexpected_args(&self, widget_type: &'static str, args: &WidgetArgs) -> Result<()> {
        if matches!(args, WidgetArgs::None) {
            return Ok(());
        }
        if self.config.strict_args {
            return Err(Error::InvalidArgs {
                widget_type,
                reason: format!("got {} arguments", args.kind()),
            });
        }
        debug!("Ignoring {} arguments for {}", args.kind(), widget_type);
        Ok(())
    }

    /// Register an in-memory font. Replaces any font already under `name`.
    pub fn install_font(&mut self, name: impl Into<String>, font: Font) -> Rc<Font> {
        let name = name.into();
        let font = Rc::new(font);
        match self.fonts.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = Rc::clone(&font),
            None => self.fonts.push((name, Rc::clone(&font))),
        }
        font
    }

    /// Cached font, or `<font_dir>/<name>.png` loaded and cached.
    pub fn font(&mut self, name: &str) -> Result<Rc<Font>> {
        if name.is_empty() {
            return Err(Error::Font("empty font name".into()));
        }
        if let Some((_, font)) = self.fonts.iter().find(|(n, _)| n == name) {
            return Ok(Rc::clone(font));
        }
        let path = self.config.font_dir.join(format!("{name}.png"));
        let font = Font::from_path(&path)?;
        font.set_encoding(self.encoding);
        debug!("Loaded font {} from {}", name, path.display());
        Ok(self.install_font(name, font))
    }

    /// The first font registered. If there is none yet, the configured
    /// default is loaded, or a generated placeholder stands in for it.
    pub fn default_font(&mut self) -> Result<Rc<Font>> {
        if let Some((_, font)) = self.fonts.first() {
            return Ok(Rc::clone(font));
        }
        let name = self.config.default_font.clone();
        match self.font(&name) {
            Ok(font) => Ok(font),
            Err(e) => {
                warn!("Default font {} unavailable ({}), using placeholder glyphs", name, e);
                let font = Font::placeholder(PLACEHOLDER_GLYPH_W, PLACEHOLDER_GLYPH_H);
                font.set_encoding(self.encoding);
                Ok(self.install_font(name, font))
            }
        }
    }

    /// Advance logical time by `elapsed` seconds and service the dirty flags.
    pub fn update(&mut self, elapsed: f64) -> Result<()> {
        self.clock += elapsed;
        self.run_due_tasks();
        if self.tree_changed {
            self.tree_changed = false;
            if let Some(root) = self.root {
                layout::pack(self, root);
            }
            self.rebuild_focus_ring();
            self.render_soon = true;
        }
        if self.render_soon {
            self.render_soon = false;
            self.render()?;
        }
        Ok(())
    }

    /// Pull input from the platform and dispatch it.
    pub fn poll_platform(&mut self) -> Result<()> {
        let platform = self.platform.as_mut().ok_or_else(|| Error::Platform("platform is busy".into()))?;
        platform.update(&mut self.events)?;
        for event in self.events.drain() {
            self.dispatch_event(event);
        }
        Ok(())
    }

    /// One main-loop iteration without the frame clock.
    pub fn tick(&mut self, elapsed: f64) -> Result<()> {
        self.poll_platform()?;
        self.update(elapsed)
    }

    /// Run until [`terminate_soon`](Self::terminate_soon) or a platform
    /// failure. Returns the exit status.
    pub fn run(&mut self) -> i32 {
        let mut clock = FrameClock::new(self.config.effective_rate());
        loop {
            if let Some(status) = self.terminate {
                self.report_clock(&clock, self.config.log_clock_at_quit >= 1);
                return status;
            }
            if let Err(e) = self.poll_platform() {
                error!("Platform update failed: {}", e);
                self.report_clock(&clock, self.config.log_clock_at_quit > 1);
                return 1;
            }
            let elapsed = clock.tick();
            if let Err(e) = self.update(elapsed) {
                error!("Update failed: {}", e);
                self.report_clock(&clock, self.config.log_clock_at_quit > 1);
                return 1;
            }
        }
    }

    fn report_clock(&self, clock: &FrameClock, enabled: bool) {
        if !enabled {
            return;
        }
        if let Some(report) = clock.report() {
            info!("{}", report);
        }
    }

    /// Draw the whole tree into the platform framebuffer.
    fn render(&mut self) -> Result<()> {
        let Some(root) = self.root else { return Ok(()) };
        let mut platform = self.platform.take().ok_or_else(|| Error::Platform("platform is busy".into()))?;
        let result = self.render_into(platform.as_mut(), root);
        self.platform = Some(platform);
        result
    }

    fn render_into(&mut self, platform: &mut dyn Platform, root: WidgetId) -> Result<()> {
        let (rw, rh) = self.tree.get(root).map_or((0, 0), |n| (n.w, n.h));
        let fb = platform.framebuffer().ok_or_else(|| Error::Platform("framebuffer unavailable".into()))?;
        if (fb.w, fb.h) != (rw, rh) {
            debug!("Skipping render: root {}x{} vs framebuffer {}x{}", rw, rh, fb.w, fb.h);
            return Ok(());
        }
        let (w, h) = (fb.w, fb.h);
        let mut surface = Surface::new(fb.pixels, fb.w, fb.h, fb.stride)
            .ok_or_else(|| Error::Platform(format!("unusable framebuffer {}x{}", w, h)))?;
        layout::render(self, root, &mut surface);
        platform.framebuffer_dirty(Rect::new(0, 0, w, h));
        Ok(())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        for task in self.tasks.take_all().into_iter().rev() {
            if let Some(cleanup) = task.cleanup {
                cleanup(self, task.widget);
            }
            self.release(task.widget);
        }
        for id in std::mem::take(&mut self.focus.ring) {
            self.release(id);
        }
        if let Some(id) = self.track.target.take() {
            self.release(id);
        }
        if let Some(root) = self.root.take() {
            self.release(root);
        }
        self.posted.clear();
        if !self.tree.is_empty() {
            debug!("{} widgets still referenced at context drop", self.tree.len());
        }
        CONTEXT_LIVE.store(false, Ordering::Release);
    }
}
