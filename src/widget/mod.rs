//! Retained widget tree.
//!
//! Widgets live in an arena ([`WidgetRegistry`]) keyed by [`WidgetId`]. Each
//! node carries the generic header (geometry, scroll, padding, flags,
//! parent/children links, reference count) and a boxed [`WidgetType`] holding
//! the type-specific state and hooks.

mod button;
mod field;
mod label;
pub mod layout;
mod packer;
mod registry;

pub use button::{Button, ButtonArgs, ButtonCallback};
pub use field::{EditOutcome, Field, FieldArgs, PostEditCallback, PreEditCallback};
pub use label::{Label, LabelArgs};
pub use packer::{Align, Flex, Orientation, Packer, PackerArgs};
pub use registry::WidgetRegistry;
pub(crate) use registry::LinkResult;

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::Context;
use crate::event::{KeyEvent, TrackState};
use crate::render::{Rect, Surface};
use crate::Result;

static NEXT_WIDGET_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a widget. Ids are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Generate a unique widget ID.
pub fn next_widget_id() -> WidgetId {
    WidgetId(NEXT_WIDGET_ID.fetch_add(1, Ordering::Relaxed))
}

/// Downcast support for [`WidgetType`] objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior of one kind of widget.
///
/// Every hook is optional. While a hook runs, the behavior object is taken out
/// of its node, so the hook gets `&mut Context` and may freely touch the rest
/// of the tree; touching its own behavior again through the context fails
/// with [`Error::WidgetBusy`](crate::Error::WidgetBusy).
pub trait WidgetType: AsAny {
    /// Short lowercase type name, e.g. `"button"`.
    fn name(&self) -> &'static str;

    /// Consume construction arguments. The node already exists. The default
    /// accepts [`WidgetArgs::None`] and reports anything else as a mismatch.
    fn init(&mut self, ctx: &mut Context, id: WidgetId, args: WidgetArgs) -> Result<()> {
        let _ = id;
        ctx.unexpected_args(self.name(), &args)
    }

    /// Type-specific teardown. Children are already gone.
    fn del(&mut self, _ctx: &mut Context, _id: WidgetId) {}

    /// If true, the background fill and children are drawn around
    /// [`render`](Self::render) automatically.
    fn auto_render(&self) -> bool {
        true
    }

    fn render(&mut self, _ctx: &mut Context, _id: WidgetId, _dst: &mut Surface<'_>) {}

    /// Preferred size. `(w, h)` is the caller's fallback. Return `None` to use
    /// the generic measurement.
    fn measure(&mut self, _ctx: &mut Context, _id: WidgetId, _w: i32, _h: i32, _maxw: i32, _maxh: i32) -> Option<(i32, i32)> {
        None
    }

    /// Assign child bounds. Return `false` to use the generic packing.
    fn pack(&mut self, _ctx: &mut Context, _id: WidgetId) -> bool {
        false
    }

    fn focus(&mut self, _ctx: &mut Context, _id: WidgetId, _focused: bool) {}

    /// Return true if the key was consumed.
    fn key(&mut self, _ctx: &mut Context, _id: WidgetId, _event: &KeyEvent) -> bool {
        false
    }

    /// Pointer tracking notification. For [`TrackState::Begin`] return true to
    /// accept the capture; for [`TrackState::EndIn`] return true to suppress
    /// activation. Other return values are ignored.
    fn track(&mut self, _ctx: &mut Context, _id: WidgetId, _state: TrackState) -> bool {
        false
    }

    fn activate(&mut self, _ctx: &mut Context, _id: WidgetId) {}
}

/// Tagged construction arguments, one variant per standard widget type.
#[derive(Default)]
pub enum WidgetArgs {
    #[default]
    None,
    Packer(PackerArgs),
    Label(LabelArgs),
    Button(ButtonArgs),
    Field(FieldArgs),
}

impl WidgetArgs {
    pub fn kind(&self) -> &'static str {
        match self {
            WidgetArgs::None => "none",
            WidgetArgs::Packer(_) => "packer",
            WidgetArgs::Label(_) => "label",
            WidgetArgs::Button(_) => "button",
            WidgetArgs::Field(_) => "field",
        }
    }
}

/// Generic widget header.
pub struct Widget {
    id: WidgetId,
    type_name: &'static str,
    pub(crate) behavior: Option<Box<dyn WidgetType>>,
    pub(crate) refcount: u32,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    /// Bounds relative to the parent.
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Shifts where children are drawn, not where they are.
    pub scrollx: i32,
    pub scrolly: i32,
    pub padx: i32,
    pub pady: i32,
    /// Background fill; 0 means none.
    pub bgcolor: u32,
    pub focusable: bool,
    pub clickable: bool,
    /// Receives wheel scrolling.
    pub scrollable: bool,
    /// Scratch space owned by the parent's layout. Zeroed on reparent.
    pub parent_use: u32,
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("type", &self.type_name)
            .field("refcount", &self.refcount)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("bounds", &self.bounds())
            .finish_non_exhaustive()
    }
}

impl Widget {
    pub(crate) fn new(id: WidgetId, behavior: Box<dyn WidgetType>) -> Self {
        Self {
            id,
            type_name: behavior.name(),
            behavior: Some(behavior),
            refcount: 1,
            parent: None,
            children: Vec::new(),
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            scrollx: 0,
            scrolly: 0,
            padx: 0,
            pady: 0,
            bgcolor: 0,
            focusable: false,
            clickable: false,
            scrollable: false,
            parent_use: 0,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn refcount(&self) -> u32 {
        self.refcount
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn set_bounds(&mut self, r: Rect) {
        self.x = r.x;
        self.y = r.y;
        self.w = r.w;
        self.h = r.h;
    }
}
