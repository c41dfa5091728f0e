//! Generic measure, pack and render dispatch.
//!
//! Layout is two passes per subtree: a parent measures its children to learn
//! their preferences, then packs them by assigning final bounds and recursing.
//! Types override either step through their [`WidgetType`](super::WidgetType)
//! hooks; these functions supply the defaults.

use super::WidgetId;
use crate::context::Context;
use crate::render::Surface;

/// Preferred size of `id`. `(w, h)` is the caller's fallback and is returned
/// unchanged by childless widgets with no measure hook.
pub fn measure(ctx: &mut Context, id: WidgetId, w: i32, h: i32, maxw: i32, maxh: i32) -> (i32, i32) {
    match ctx.with_behavior(id, |b, ctx| b.measure(ctx, id, w, h, maxw, maxh)) {
        Ok(Some(size)) => size,
        Ok(None) => default_measure(ctx, id, w, h, maxw, maxh),
        Err(e) => {
            tracing::debug!("measure {}: {}", id, e);
            (w, h)
        }
    }
}

/// Largest child preference plus padding.
fn default_measure(ctx: &mut Context, id: WidgetId, w: i32, h: i32, maxw: i32, maxh: i32) -> (i32, i32) {
    let Some(node) = ctx.tree.get(id) else { return (w, h) };
    if node.children.is_empty() {
        return (w, h);
    }
    let (padx, pady) = (node.padx, node.pady);
    let children = node.children.clone();
    let defw = (w - padx * 2).max(0);
    let defh = (h - pady * 2).max(0);
    let cmaxw = (maxw - padx * 2).max(0);
    let cmaxh = (maxh - pady * 2).max(0);
    let (mut whi, mut hhi) = (0, 0);
    for child in children {
        let (cw, ch) = measure(ctx, child, defw, defh, cmaxw, cmaxh);
        whi = whi.max(cw);
        hhi = hhi.max(ch);
    }
    (whi + padx * 2, hhi + pady * 2)
}

/// Assign bounds to the children of `id`, whose own bounds are already set.
pub fn pack(ctx: &mut Context, id: WidgetId) {
    match ctx.with_behavior(id, |b, ctx| b.pack(ctx, id)) {
        Ok(true) => {}
        Ok(false) => default_pack(ctx, id),
        Err(e) => tracing::debug!("pack {}: {}", id, e),
    }
}

/// Every child gets the whole interior.
fn default_pack(ctx: &mut Context, id: WidgetId) {
    let Some(node) = ctx.tree.get(id) else { return };
    let (padx, pady) = (node.padx, node.pady);
    let chw = (node.w - padx * 2).max(0);
    let chh = (node.h - pady * 2).max(0);
    let children = node.children.clone();
    for child in children {
        if let Some(c) = ctx.tree.get_mut(child) {
            c.x = padx;
            c.y = pady;
            c.w = chw;
            c.h = chh;
        }
        pack(ctx, child);
    }
}

/// Draw `id` into a surface already clipped and offset to its bounds.
///
/// Auto-render types get their background filled first and their children
/// drawn after the render hook.
pub fn render(ctx: &mut Context, id: WidgetId, dst: &mut Surface<'_>) {
    let Some(node) = ctx.tree.get(id) else { return };
    let (w, h, bg) = (node.w, node.h, node.bgcolor);
    let result = ctx.with_behavior(id, |b, ctx| {
        if b.auto_render() {
            if bg != 0 {
                dst.fill_rect(0, 0, w, h, bg);
            }
            b.render(ctx, id, dst);
            render_children(ctx, id, dst);
        } else {
            b.render(ctx, id, dst);
        }
    });
    if let Err(e) = result {
        tracing::debug!("render {}: {}", id, e);
    }
}

/// Draw each child of `id` into its own slice of `dst`, shifted by the
/// parent's scroll. Children clipped to nothing are skipped.
pub fn render_children(ctx: &mut Context, id: WidgetId, dst: &mut Surface<'_>) {
    let Some(node) = ctx.tree.get(id) else { return };
    let (sx, sy) = (node.scrollx, node.scrolly);
    let children = node.children.clone();
    for child in children {
        let Some(c) = ctx.tree.get(child) else { continue };
        let (x, y, w, h) = (c.x - sx, c.y - sy, c.w, c.h);
        if let Some(mut sub) = dst.sub(x, y, w, h) {
            render(ctx, child, &mut sub);
        }
    }
}
