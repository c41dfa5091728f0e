//! Keyboard focus ring.
//!
//! The ring is every focusable widget under the root in pre-order. Each entry
//! holds a reference, so a focused widget removed from the tree stays alive
//! until the next rebuild tells it that it lost focus.

use tracing::debug;

use super::Context;
use crate::widget::WidgetId;

#[derive(Debug, Default)]
pub(crate) struct FocusRing {
    pub(crate) ring: Vec<WidgetId>,
    pub(crate) current: Option<usize>,
}

impl FocusRing {
    fn focused(&self) -> Option<WidgetId> {
        self.current.and_then(|i| self.ring.get(i).copied())
    }
}

impl Context {
    pub fn focused(&self) -> Option<WidgetId> {
        self.focus.focused()
    }

    pub fn focus_ring(&self) -> &[WidgetId] {
        &self.focus.ring
    }

    fn notify_focus(&mut self, id: WidgetId, focused: bool) {
        if let Err(e) = self.with_behavior(id, |b, ctx| b.focus(ctx, id, focused)) {
            debug!("focus {} on {}: {}", focused, id, e);
        }
    }

    /// Recollect the ring after the tree changed. Focus stays where it was if
    /// that widget still qualifies; otherwise it is told it lost focus and
    /// the first entry takes over.
    pub fn rebuild_focus_ring(&mut self) {
        let previous = self.focus.focused();
        self.focus.current = None;
        for id in std::mem::take(&mut self.focus.ring) {
            // The previous focus keeps its reference until it has been told.
            if Some(id) != previous {
                self.release(id);
            }
        }

        let candidates = match self.root {
            Some(root) => self.tree.preorder(root),
            None => Vec::new(),
        };
        for id in candidates {
            if self.tree.get(id).is_some_and(|n| n.focusable) && self.retain(id).is_ok() {
                self.focus.ring.push(id);
            }
        }

        if let Some(prev) = previous {
            match self.focus.ring.iter().position(|&id| id == prev) {
                Some(index) => self.focus.current = Some(index),
                None => self.notify_focus(prev, false),
            }
            self.release(prev);
        }

        if self.focus.current.is_none() && !self.focus.ring.is_empty() {
            self.focus.current = Some(0);
            let first = self.focus.ring[0];
            self.notify_focus(first, true);
        }
    }

    /// Move focus through the ring and return the focused widget.
    ///
    /// `0` only queries. `1` and `-1` step with wrap-around. Larger positive
    /// values jump to the last entry, larger negative ones to the first.
    pub fn navigate_focus(&mut self, delta: i32) -> Option<WidgetId> {
        let len = self.focus.ring.len();
        let current = self.focus.current;
        let target = if len == 0 {
            None
        } else {
            match delta {
                d if d < -1 => Some(0),
                -1 => Some(match current {
                    Some(i) if i > 0 => i - 1,
                    _ => len - 1,
                }),
                0 => current,
                1 => Some(match current {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                }),
                _ => Some(len - 1),
            }
        };
        if target != current {
            self.move_focus(target);
        }
        self.focused()
    }

    /// Focus `target`, or blur everything for `None`. Returns `None` without
    /// changing anything if `target` is not in the ring.
    pub fn focus_widget(&mut self, target: Option<WidgetId>) -> Option<WidgetId> {
        let Some(id) = target else {
            self.move_focus(None);
            return None;
        };
        let index = self.focus.ring.iter().position(|&w| w == id)?;
        if self.focus.current != Some(index) {
            self.move_focus(Some(index));
        }
        Some(id)
    }

    fn move_focus(&mut self, index: Option<usize>) {
        if let Some(old) = self.focus.focused() {
            self.focus.current = None;
            self.notify_focus(old, false);
        }
        if let Some(new) = index.and_then(|i| self.focus.ring.get(i).copied()) {
            self.focus.current = index;
            self.notify_focus(new, true);
        }
    }
}
