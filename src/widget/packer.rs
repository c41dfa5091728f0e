//! One-dimensional flexible layout.
//!
//! Children are laid out along the major axis in order (or reversed). When
//! they don't fit, every child gives up an equal share of the overflow; when
//! there is room to spare and the major alignment is [`Align::Fill`], the
//! excess goes to children marked [`Flex::Grow`], or failing that to the
//! unmarked ones. Other alignments translate the whole block at once.

use super::{layout, WidgetArgs, WidgetId, WidgetType};
use crate::context::Context;
use crate::{Error, Result};

const FLEX_YES: u32 = 0x0001;
const FLEX_NO: u32 = 0x0002;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    Row,
    #[default]
    Column,
}

impl Orientation {
    fn major(self) -> usize {
        match self {
            Orientation::Row => 0,
            Orientation::Column => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Grow children to fill the axis.
    Fill,
    #[default]
    Start,
    Center,
    End,
}

/// Per-child growth marker, see [`Packer::flex_child`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flex {
    #[default]
    Default,
    Grow,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackerArgs {
    pub orientation: Orientation,
    pub reverse: bool,
    pub major: Align,
    pub minor: Align,
    /// Gap between consecutive children.
    pub spacing: i32,
}

#[derive(Debug, Default)]
pub struct Packer {
    args: PackerArgs,
}

struct Slot {
    id: WidgetId,
    pos: [i32; 2],
    size: [i32; 2],
    flex: u32,
}

struct Premeasure {
    pad: [i32; 2],
    /// Space left after padding, spacing and every child's preference.
    avail: [i32; 2],
    /// Sum along the major axis, max along the minor.
    kids: [i32; 2],
    slots: Vec<Slot>,
}

impl Packer {
    pub fn new(args: PackerArgs) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &PackerArgs {
        &self.args
    }

    /// Mark how `child` takes part in [`Align::Fill`] growth.
    pub fn flex_child(ctx: &mut Context, packer: WidgetId, child: WidgetId, flex: Flex) -> Result<()> {
        ctx.with_type::<Packer, _>(packer, |_, _| ())?;
        let node = ctx.widget_mut(child).ok_or(Error::WidgetNotFound(child))?;
        if node.parent != Some(packer) {
            return Err(Error::NotAChild { parent: packer, child });
        }
        node.parent_use = match flex {
            Flex::Default => 0,
            Flex::Grow => FLEX_YES,
            Flex::Fixed => FLEX_NO,
        };
        ctx.mark_tree_changed();
        Ok(())
    }

    fn spacing_total(&self, count: usize) -> i32 {
        if count > 1 { self.args.spacing * (count as i32 - 1) } else { 0 }
    }

    /// Measure every child against what's left so far. Later children see
    /// less room than earlier ones.
    fn premeasure(&self, ctx: &mut Context, id: WidgetId, maxw: i32, maxh: i32) -> Option<Premeasure> {
        let node = ctx.tree.get(id)?;
        let pad = [node.padx, node.pady];
        let children = node.children.clone();
        let major = self.args.orientation.major();
        let minor = 1 - major;

        let mut avail = [maxw - pad[0] * 2, maxh - pad[1] * 2];
        avail[major] -= self.spacing_total(children.len());
        let mut kids = [0, 0];
        let mut slots = Vec::with_capacity(children.len());
        for child in children {
            let (cw, ch) = layout::measure(ctx, child, avail[0], avail[1], avail[0], avail[1]);
            let size = [cw, ch];
            kids[major] += size[major];
            kids[minor] = kids[minor].max(size[minor]);
            avail[major] -= size[major];
            let flex = ctx.tree.get(child).map_or(0, |c| c.parent_use);
            slots.push(Slot { id: child, pos: [0, 0], size, flex });
        }
        Some(Premeasure { pad, avail, kids, slots })
    }

    /// Take `excess` pixels away, evenly, the first `excess % n` children
    /// giving one more.
    fn trim(slots: &mut [Slot], axis: usize, excess: i32) {
        let n = slots.len() as i32;
        let each = excess / n;
        let mut more = excess % n;
        for s in slots {
            s.size[axis] -= each;
            if more > 0 {
                s.size[axis] -= 1;
                more -= 1;
            }
        }
    }

    fn spread(slots: &mut [Slot], axis: usize, excess: i32) {
        let yes = slots.iter().filter(|s| s.flex & FLEX_YES != 0).count() as i32;
        let maybe = slots.iter().filter(|s| s.flex & (FLEX_YES | FLEX_NO) == 0).count() as i32;
        let (require, n) = if yes > 0 {
            (FLEX_YES, yes)
        } else if maybe > 0 {
            (0, maybe)
        } else {
            tracing::debug!("Packer has {} excess pixels and no flexible children", excess);
            return;
        };
        let each = excess / n;
        let mut more = excess % n;
        for s in slots.iter_mut().filter(|s| s.flex == require) {
            s.size[axis] += each;
            if more > 0 {
                s.size[axis] += 1;
                more -= 1;
            }
        }
    }

    /// Shift the whole block so it honors the major alignment.
    fn realign(&self, slots: &mut [Slot], axis: usize, container: i32, pad: i32) {
        let total = self.spacing_total(slots.len()) + slots.iter().map(|s| s.size[axis]).sum::<i32>();
        let start = slots.iter().map(|s| s.pos[axis]).fold(container, i32::min);
        let target = match self.args.major {
            Align::Center => (container >> 1) - (total >> 1),
            Align::End => container - pad - total,
            Align::Start | Align::Fill => pad,
        };
        let d = target - start;
        if d != 0 {
            for s in slots {
                s.pos[axis] += d;
            }
        }
    }

    fn pack_children(&self, ctx: &mut Context, id: WidgetId) {
        let Some(node) = ctx.tree.get(id) else { return };
        if node.children.is_empty() {
            return;
        }
        let bounds = [node.w, node.h];
        let Some(Premeasure { pad, avail, mut slots, .. }) = self.premeasure(ctx, id, bounds[0], bounds[1]) else {
            return;
        };
        let major = self.args.orientation.major();
        let minor = 1 - major;
        let spacing = self.args.spacing;

        if avail[major] < 0 {
            Self::trim(&mut slots, major, -avail[major]);
        } else if avail[major] > 0 && self.args.major == Align::Fill {
            Self::spread(&mut slots, major, avail[major]);
        }

        for s in &mut slots {
            if self.args.minor == Align::Fill {
                s.size[minor] = avail[minor];
            } else if s.size[minor] > avail[minor] {
                s.size[minor] = avail[minor];
            }
        }

        if self.args.reverse {
            let mut p = bounds[major] - pad[major];
            for s in &mut slots {
                p -= s.size[major];
                s.pos[major] = p;
                p -= spacing;
            }
            if matches!(self.args.major, Align::Start | Align::Center) {
                self.realign(&mut slots, major, bounds[major], pad[major]);
            }
        } else {
            let mut p = pad[major];
            for s in &mut slots {
                s.pos[major] = p;
                p += s.size[major] + spacing;
            }
            if matches!(self.args.major, Align::Center | Align::End) {
                self.realign(&mut slots, major, bounds[major], pad[major]);
            }
        }

        for s in &mut slots {
            s.pos[minor] = match self.args.minor {
                Align::Center => (bounds[minor] >> 1) - (s.size[minor] >> 1),
                Align::End => bounds[minor] - pad[minor] - s.size[minor],
                Align::Start | Align::Fill => pad[minor],
            };
        }

        for s in &slots {
            if let Some(c) = ctx.tree.get_mut(s.id) {
                c.x = s.pos[0];
                c.y = s.pos[1];
                c.w = s.size[0];
                c.h = s.size[1];
            }
        }
        for s in slots {
            layout::pack(ctx, s.id);
        }
    }
}

impl WidgetType for Packer {
    fn name(&self) -> &'static str {
        "packer"
    }

    fn init(&mut self, ctx: &mut Context, _id: WidgetId, args: WidgetArgs) -> Result<()> {
        match args {
            WidgetArgs::Packer(args) => {
                self.args = args;
                Ok(())
            }
            other => ctx.unexpected_args(self.name(), &other),
        }
    }

    fn measure(&mut self, ctx: &mut Context, id: WidgetId, w: i32, h: i32, maxw: i32, maxh: i32) -> Option<(i32, i32)> {
        let Some(pre) = self.premeasure(ctx, id, maxw, maxh) else {
            return Some((w, h));
        };
        let mut size = [pre.kids[0] + pre.pad[0] * 2, pre.kids[1] + pre.pad[1] * 2];
        size[self.args.orientation.major()] += self.spacing_total(pre.slots.len());
        Some((size[0], size[1]))
    }

    fn pack(&mut self, ctx: &mut Context, id: WidgetId) -> bool {
        self.pack_children(ctx, id);
        true
    }
}
