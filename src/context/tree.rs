//! Widget lifecycle and structural edits.
//!
//! Every widget starts with one reference held by its creator. Inserting it
//! under a parent adds the parent's reference; removing it drops that one
//! again. When the count reaches zero the widget is destroyed: children are
//! released last-first, then the type's `del` hook runs, then the node goes.

use tracing::{debug, warn};

use super::Context;
use crate::widget::{layout, next_widget_id, LinkResult, Widget, WidgetArgs, WidgetId, WidgetType};
use crate::{Error, Result};

impl Context {
    /// Create a detached widget of type `T`. The caller owns the returned
    /// reference.
    pub fn create<T: WidgetType + Default>(&mut self, args: WidgetArgs) -> Result<WidgetId> {
        self.create_with(Box::new(T::default()), args)
    }

    /// Create a detached widget around an already-built behavior.
    pub fn create_with(&mut self, behavior: Box<dyn WidgetType>, args: WidgetArgs) -> Result<WidgetId> {
        let id = next_widget_id();
        let type_name = behavior.name();
        self.tree.register(Widget::new(id, behavior));
        match self.with_behavior(id, |b, ctx| b.init(ctx, id, args)).and_then(|r| r) {
            Ok(()) => {
                debug!("Created {} {}", type_name, id);
                Ok(id)
            }
            Err(e) => {
                debug!("Init of {} {} failed: {}", type_name, id, e);
                self.release(id);
                Err(e)
            }
        }
    }

    /// Create a widget and append it to `parent`. The parent holds the only
    /// reference; the returned id is borrowed.
    pub fn spawn<T: WidgetType + Default>(&mut self, parent: WidgetId, args: WidgetArgs) -> Result<WidgetId> {
        self.spawn_with(parent, Box::new(T::default()), args)
    }

    pub fn spawn_with(&mut self, parent: WidgetId, behavior: Box<dyn WidgetType>, args: WidgetArgs) -> Result<WidgetId> {
        if !self.tree.contains(parent) {
            return Err(Error::WidgetNotFound(parent));
        }
        let child = self.create_with(behavior, args)?;
        let result = self.append(parent, child);
        self.release(child);
        result.map(|()| child)
    }

    /// Create the root widget, sized to the window. The context owns it.
    pub fn create_root<T: WidgetType + Default>(&mut self, args: WidgetArgs) -> Result<WidgetId> {
        self.create_root_with(Box::new(T::default()), args)
    }

    pub fn create_root_with(&mut self, behavior: Box<dyn WidgetType>, args: WidgetArgs) -> Result<WidgetId> {
        if self.root.is_some() {
            return Err(Error::RootExists);
        }
        let id = self.create_with(behavior, args)?;
        let (w, h) = (self.w, self.h);
        if let Some(node) = self.tree.get_mut(id) {
            node.x = 0;
            node.y = 0;
            node.w = w;
            node.h = h;
        }
        self.root = Some(id);
        layout::pack(self, id);
        self.tree_changed = true;
        Ok(id)
    }

    /// Insert `child` into `parent` at `index`, or move it there if it is
    /// already a child of `parent` (`index` counts positions before the move).
    pub fn insert(&mut self, parent: WidgetId, index: usize, child: WidgetId) -> Result<()> {
        match self.tree.link(parent, index, child)? {
            LinkResult::Linked => {
                self.tree.node_mut(child)?.refcount += 1;
                self.tree_changed = true;
            }
            LinkResult::Reordered => self.tree_changed = true,
            LinkResult::Unchanged => {}
        }
        Ok(())
    }

    /// Insert as the last child. Moves `child` to the end if it is already
    /// a child of `parent`.
    pub fn append(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        let len = self.tree.node(parent)?.children().len();
        self.insert(parent, len, child)
    }

    /// Detach `child` from `parent` and drop the parent's reference. Retain
    /// the child first to keep using it.
    pub fn remove(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        let index = self.tree.child_index(parent, child).ok_or(Error::NotAChild { parent, child })?;
        self.remove_at(parent, index)
    }

    pub fn remove_at(&mut self, parent: WidgetId, index: usize) -> Result<()> {
        let child = self.tree.unlink_at(parent, index)?;
        self.tree_changed = true;
        self.release(child);
        Ok(())
    }

    /// Take an extra reference.
    pub fn retain(&mut self, id: WidgetId) -> Result<()> {
        let node = self.tree.node_mut(id)?;
        node.refcount = node.refcount.checked_add(1).ok_or_else(|| Error::Other(format!("refcount overflow on {id}")))?;
        Ok(())
    }

    /// Drop a reference, destroying the widget when it was the last one.
    pub fn release(&mut self, id: WidgetId) {
        let Some(node) = self.tree.get_mut(id) else { return };
        if node.refcount > 1 {
            node.refcount -= 1;
            return;
        }
        self.destroy(id);
    }

    fn destroy(&mut self, id: WidgetId) {
        let Some(node) = self.tree.get_mut(id) else { return };
        node.refcount = 0;
        if let Some(parent) = node.parent {
            warn!("Deleting widget {} which is still a child of {}", id, parent);
            if let Some(index) = self.tree.child_index(parent, id) {
                let _ = self.tree.unlink_at(parent, index);
            }
        }
        while let Some(index) = self.tree.children(id).len().checked_sub(1) {
            match self.tree.unlink_at(id, index) {
                Ok(child) => self.release(child),
                Err(_) => break,
            }
        }
        let behavior = self.tree.get_mut(id).and_then(|n| n.behavior.take());
        if let Some(mut behavior) = behavior {
            self.hook_depth += 1;
            behavior.del(self, id);
            self.hook_depth -= 1;
        }
        // A behavior that is out running a hook gets its del call when it
        // comes back, see with_behavior.
        self.tree.unregister(id);
        if self.root == Some(id) {
            self.root = None;
        }
        debug!("Deleted widget {}", id);
        self.flush_posted();
    }
}
