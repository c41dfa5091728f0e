//! Platform event dispatch and pointer tracking.
//!
//! A press on a clickable widget that accepts [`TrackState::Begin`] captures
//! the pointer. Until release, motion only reports crossings of that widget's
//! visible bounds (`Exit`/`Reenter`). Release inside reports `EndIn` and then
//! activates unless the hook vetoed; release outside reports `EndOut`.

use tracing::debug;

use super::Context;
use crate::event::{KeyEvent, PlatformEvent, TrackState, KEY_TAB};
use crate::widget::WidgetId;
use crate::Result;

const WHEEL_STEP: i32 = 5;

#[derive(Debug, Default)]
pub(crate) struct Tracking {
    /// Holds a reference while set.
    pub(crate) target: Option<WidgetId>,
    inside: bool,
}

impl Context {
    pub fn dispatch_event(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Close => {
                debug!("Window closed");
                self.terminate_soon(0);
            }
            PlatformEvent::Resize { w, h } => self.on_resize(w, h),
            PlatformEvent::WindowFocus(focused) => debug!("Window focus: {}", focused),
            PlatformEvent::Expose { .. } => self.render_soon(),
            PlatformEvent::Key { keycode, pressed, codepoint } => self.on_key(keycode, pressed, codepoint),
            PlatformEvent::Motion { x, y } => self.on_motion(x, y),
            PlatformEvent::Button { button: 1, pressed: true } => self.on_press(),
            PlatformEvent::Button { button: 1, pressed: false } => self.on_release(),
            PlatformEvent::Button { button, pressed } => debug!("Ignoring button {} ({})", button, pressed),
            PlatformEvent::Wheel { dx, dy } => self.on_wheel(dx, dy),
        }
    }

    pub fn pointer(&self) -> (i32, i32) {
        self.pointer
    }

    pub fn modifiers(&self) -> crate::event::Modifiers {
        self.modifiers
    }

    /// Widget currently capturing the pointer.
    pub fn tracking(&self) -> Option<WidgetId> {
        self.track.target
    }

    /// Shift the drawn position of `id`'s children.
    pub fn scroll_by(&mut self, id: WidgetId, dx: i32, dy: i32) -> Result<()> {
        let node = self.tree.node_mut(id)?;
        node.scrollx += dx;
        node.scrolly += dy;
        self.render_soon();
        Ok(())
    }

    pub fn scroll_to(&mut self, id: WidgetId, x: i32, y: i32) -> Result<()> {
        let node = self.tree.node_mut(id)?;
        node.scrollx = x;
        node.scrolly = y;
        self.render_soon();
        Ok(())
    }

    fn on_resize(&mut self, w: i32, h: i32) {
        if w < 1 || h < 1 || (w, h) == (self.w, self.h) {
            return;
        }
        self.w = w;
        self.h = h;
        if let Some(node) = self.root.and_then(|r| self.tree.get_mut(r)) {
            node.w = w;
            node.h = h;
        }
        self.mark_tree_changed();
    }

    fn on_key(&mut self, keycode: u32, pressed: bool, codepoint: u32) {
        if self.modifiers.update(keycode, pressed) {
            return;
        }
        let event = KeyEvent { keycode, pressed, codepoint, modifiers: self.modifiers };
        let consumed = match self.focused() {
            Some(id) => self.with_behavior(id, |b, ctx| b.key(ctx, id, &event)).unwrap_or_else(|e| {
                debug!("key on {}: {}", id, e);
                false
            }),
            None => false,
        };
        if !consumed && pressed && keycode == KEY_TAB {
            self.navigate_focus(if self.modifiers.shift() { -1 } else { 1 });
        }
    }

    fn notify_track(&mut self, id: WidgetId, state: TrackState) -> bool {
        self.with_behavior(id, |b, ctx| b.track(ctx, id, state)).unwrap_or_else(|e| {
            debug!("track {:?} on {}: {}", state, id, e);
            false
        })
    }

    fn pointer_over(&self, id: WidgetId) -> bool {
        let (x, y) = self.pointer;
        self.tree.clip_rect(id).contains(x, y)
    }

    fn on_motion(&mut self, x: i32, y: i32) {
        self.pointer = (x, y);
        let Some(id) = self.track.target else { return };
        let inside = self.pointer_over(id);
        if inside == self.track.inside {
            return;
        }
        self.track.inside = inside;
        self.notify_track(id, if inside { TrackState::Reenter } else { TrackState::Exit });
    }

    fn on_press(&mut self) {
        if self.track.target.is_some() {
            return;
        }
        let Some(root) = self.root else { return };
        let (x, y) = self.pointer;
        let Some(hit) = self.tree.hit_test(root, x, y, &|w| w.clickable) else { return };
        if !self.notify_track(hit, TrackState::Begin) {
            return;
        }
        if self.retain(hit).is_err() {
            return;
        }
        self.track = Tracking { target: Some(hit), inside: true };
        if self.tree.get(hit).is_some_and(|n| n.focusable) {
            self.focus_widget(Some(hit));
        }
    }

    fn on_release(&mut self) {
        let Some(id) = self.track.target.take() else { return };
        if self.track.inside {
            let veto = self.notify_track(id, TrackState::EndIn);
            if !veto {
                if let Err(e) = self.with_behavior(id, |b, ctx| b.activate(ctx, id)) {
                    debug!("activate {}: {}", id, e);
                }
            }
        } else {
            self.notify_track(id, TrackState::EndOut);
        }
        self.track.inside = false;
        self.release(id);
    }

    fn on_wheel(&mut self, dx: i32, dy: i32) {
        let Some(root) = self.root else { return };
        let (x, y) = self.pointer;
        let Some(target) = self.tree.hit_test(root, x, y, &|w| w.scrollable) else { return };
        if let Err(e) = self.scroll_by(target, dx * WHEEL_STEP, dy * WHEEL_STEP) {
            debug!("wheel on {}: {}", target, e);
        }
    }
}
