//! Widget arena and the structural operations that need no hooks.

use std::collections::HashMap;

use super::{Widget, WidgetId};
use crate::render::Rect;
use crate::{Error, Result};

/// Registry of all live widgets.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: HashMap<WidgetId, Widget>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, widget: Widget) -> WidgetId {
        let id = widget.id();
        self.widgets.insert(id, widget);
        id
    }

    pub(crate) fn unregister(&mut self, id: WidgetId) -> Option<Widget> {
        self.widgets.remove(&id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(&id)
    }

    pub(crate) fn node(&self, id: WidgetId) -> Result<&Widget> {
        self.widgets.get(&id).ok_or(Error::WidgetNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: WidgetId) -> Result<&mut Widget> {
        self.widgets.get_mut(&id).ok_or(Error::WidgetNotFound(id))
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.widgets.get(&id).map(|w| w.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.widgets.get(&id).and_then(|w| w.parent())
    }

    /// True if `descendant` is `ancestor` or lies beneath it.
    pub fn is_ancestor(&self, ancestor: WidgetId, descendant: WidgetId) -> bool {
        let mut cur = Some(descendant);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    pub fn root_of(&self, id: WidgetId) -> WidgetId {
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            cur = parent;
        }
        cur
    }

    /// Link `child` under `parent` at `index`, or move it there if it is
    /// already a child of `parent`.
    ///
    /// Only [`LinkResult::Linked`] means the parent now needs its own
    /// reference; reorders and no-ops keep the existing one.
    pub(crate) fn link(&mut self, parent: WidgetId, index: usize, child: WidgetId) -> Result<LinkResult> {
        let current_parent = self.node(child)?.parent;
        let parent_node = self.node(parent)?;
        let len = parent_node.children.len();

        if current_parent == Some(parent) {
            let old = parent_node
                .children
                .iter()
                .position(|&c| c == child)
                .ok_or(Error::NotAChild { parent, child })?;
            if index > len {
                return Err(Error::IndexOutOfRange { index, len });
            }
            let dest = if index > old { index - 1 } else { index };
            if dest == old {
                return Ok(LinkResult::Unchanged);
            }
            let children = &mut self.node_mut(parent)?.children;
            children.remove(old);
            children.insert(dest, child);
            return Ok(LinkResult::Reordered);
        }

        if let Some(other) = current_parent {
            return Err(Error::AlreadyParented { child, parent: other });
        }
        if self.is_ancestor(child, parent) {
            return Err(Error::WouldCycle { parent, child });
        }
        if index > len {
            return Err(Error::IndexOutOfRange { index, len });
        }

        self.node_mut(parent)?.children.insert(index, child);
        let node = self.node_mut(child)?;
        node.parent = Some(parent);
        node.parent_use = 0;
        Ok(LinkResult::Linked)
    }

    /// Remove the child at `index` from `parent`'s list and clear its parent
    /// link. The parent's reference is not released here.
    pub(crate) fn unlink_at(&mut self, parent: WidgetId, index: usize) -> Result<WidgetId> {
        let children = &mut self.node_mut(parent)?.children;
        let len = children.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        let child = children.remove(index);
        if let Some(node) = self.widgets.get_mut(&child) {
            node.parent = None;
            node.parent_use = 0;
        }
        Ok(child)
    }

    pub fn child_index(&self, parent: WidgetId, child: WidgetId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Convert a point from `id`'s local space to global space.
    ///
    /// Each ancestor shifts its children by its scroll, so every hop above
    /// the widget itself contributes `position - scroll`.
    pub fn global_from_local(&self, id: WidgetId, x: i32, y: i32) -> (i32, i32) {
        let (mut x, mut y) = (x, y);
        let mut cur = self.get(id);
        let mut first = true;
        while let Some(node) = cur {
            x += node.x;
            y += node.y;
            if !first {
                x -= node.scrollx;
                y -= node.scrolly;
            }
            first = false;
            cur = node.parent.and_then(|p| self.get(p));
        }
        (x, y)
    }

    pub fn local_from_global(&self, id: WidgetId, x: i32, y: i32) -> (i32, i32) {
        let (ox, oy) = self.global_from_local(id, 0, 0);
        (x - ox, y - oy)
    }

    /// Visible rectangle of `id` in global coordinates: its own bounds
    /// intersected with every ancestor's. Non-positive size means hidden.
    pub fn clip_rect(&self, id: WidgetId) -> Rect {
        let Some(node) = self.get(id) else {
            return Rect::default();
        };
        let (gx, gy) = self.global_from_local(id, 0, 0);
        let mut clip = Rect::new(gx, gy, node.w, node.h);
        let mut cur = node.parent;
        while let Some(pid) = cur {
            let Some(parent) = self.get(pid) else { break };
            let (px, py) = self.global_from_local(pid, 0, 0);
            clip = clip.intersect(&Rect::new(px, py, parent.w, parent.h));
            cur = parent.parent;
        }
        clip
    }

    /// Pre-order walk starting at `root`: parent first, children in order.
    pub fn preorder(&self, root: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Deepest widget under `(x, y)` (in `id`'s parent space) matching
    /// `pred`. Children are tested before the widget itself, topmost first.
    pub fn hit_test(&self, id: WidgetId, x: i32, y: i32, pred: &dyn Fn(&Widget) -> bool) -> Option<WidgetId> {
        let node = self.get(id)?;
        if !node.bounds().contains(x, y) {
            return None;
        }
        let lx = x - node.x + node.scrollx;
        let ly = y - node.y + node.scrolly;
        for &child in node.children.iter().rev() {
            if let Some(hit) = self.hit_test(child, lx, ly, pred) {
                return Some(hit);
            }
        }
        pred(node).then_some(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkResult {
    Linked,
    Reordered,
    Unchanged,
}
