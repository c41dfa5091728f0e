//! Widget tree dump for debugging and snapshot tests.

use std::fmt::Write;

use crate::context::Context;
use crate::widget::{Widget, WidgetId, WidgetRegistry};

/// One line per widget, children indented two spaces under their parent.
///
/// Ids are left out so dumps compare equal across runs; `focused` is
/// flagged instead.
pub fn build_tree(widgets: &WidgetRegistry, root: WidgetId, focused: Option<WidgetId>) -> String {
    let mut out = String::new();
    dump_widget(widgets, root, 0, focused, &mut out);
    out
}

/// Dump the context's whole tree, or an empty string without a root.
pub fn build_context_tree(ctx: &Context) -> String {
    match ctx.root() {
        Some(root) => build_tree(ctx.tree(), root, ctx.focused()),
        None => String::new(),
    }
}

/// Dump the tree to stderr.
pub fn print_tree(ctx: &Context) {
    eprintln!("\n=== Widget Tree ===\n");
    eprint!("{}", build_context_tree(ctx));
}

fn dump_widget(widgets: &WidgetRegistry, id: WidgetId, depth: usize, focused: Option<WidgetId>, out: &mut String) {
    let Some(w) = widgets.get(id) else { return };
    let _ = writeln!(out, "{:indent$}{}", "", describe(w, focused == Some(id)), indent = depth * 2);
    for &child in w.children() {
        dump_widget(widgets, child, depth + 1, focused, out);
    }
}

fn describe(w: &Widget, focused: bool) -> String {
    let mut line = format!("{} ({},{} {}x{})", w.type_name(), w.x, w.y, w.w, w.h);
    if w.padx != 0 || w.pady != 0 {
        let _ = write!(line, " pad={},{}", w.padx, w.pady);
    }
    if w.scrollx != 0 || w.scrolly != 0 {
        let _ = write!(line, " scroll={},{}", w.scrollx, w.scrolly);
    }
    if w.bgcolor != 0 {
        let _ = write!(line, " bg={:08x}", w.bgcolor);
    }
    let flags: Vec<&str> = [
        (w.focusable, "focusable"),
        (w.clickable, "clickable"),
        (w.scrollable, "scrollable"),
        (focused, "[focused]"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();
    if !flags.is_empty() {
        line.push(' ');
        line.push_str(&flags.join(" "));
    }
    line
}
