mod common;

use common::{headless, Fixed};
use serial_test::serial;
use softgui::render::Rect;
use softgui::widget::{Align, Flex, Orientation, Packer, PackerArgs};
use softgui::{Context, WidgetArgs, WidgetId};

fn packed_root(ctx: &mut Context, args: PackerArgs, pad: i32) -> WidgetId {
    let root = ctx.create_root::<Packer>(WidgetArgs::Packer(args)).unwrap();
    let node = ctx.widget_mut(root).unwrap();
    node.padx = pad;
    node.pady = pad;
    root
}

fn add(ctx: &mut Context, parent: WidgetId, w: Option<i32>, h: Option<i32>) -> WidgetId {
    ctx.spawn_with(parent, Fixed::boxed(w, h), WidgetArgs::None).unwrap()
}

fn bounds(ctx: &Context, ids: &[WidgetId]) -> Vec<Rect> {
    ids.iter().map(|&id| ctx.widget(id).unwrap().bounds()).collect()
}

fn row(major: Align, spacing: i32) -> PackerArgs {
    PackerArgs { orientation: Orientation::Row, major, spacing, ..Default::default() }
}

#[test]
#[serial]
fn test_column_stacks_with_padding_and_spacing() {
    let (mut ctx, _) = headless(100, 200);
    let root = packed_root(&mut ctx, PackerArgs { spacing: 5, ..Default::default() }, 5);
    let kids: Vec<_> = [20, 30, 40].iter().map(|&h| add(&mut ctx, root, None, Some(h))).collect();
    ctx.update(0.0).unwrap();

    assert_eq!(
        bounds(&ctx, &kids),
        vec![Rect::new(5, 5, 90, 20), Rect::new(5, 30, 90, 30), Rect::new(5, 65, 90, 40)]
    );
}

#[test]
#[serial]
fn test_overflow_is_shared_evenly() {
    let (mut ctx, _) = headless(100, 20);
    let root = packed_root(&mut ctx, row(Align::Start, 2), 0);
    let kids: Vec<_> = [50, 40, 31].iter().map(|&w| add(&mut ctx, root, Some(w), None)).collect();
    ctx.update(0.0).unwrap();

    let widths: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.w).collect();
    assert_eq!(widths, vec![41, 32, 23]);
    let xs: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.x).collect();
    assert_eq!(xs, vec![0, 43, 77]);
}

#[test]
#[serial]
fn test_fill_prefers_grow_children() {
    let (mut ctx, _) = headless(100, 20);
    let root = packed_root(&mut ctx, row(Align::Fill, 0), 0);
    let kids: Vec<_> = (0..3).map(|_| add(&mut ctx, root, Some(10), None)).collect();
    Packer::flex_child(&mut ctx, root, kids[1], Flex::Grow).unwrap();
    ctx.update(0.0).unwrap();

    let widths: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.w).collect();
    assert_eq!(widths, vec![10, 80, 10]);
}

#[test]
#[serial]
fn test_fill_without_markers_spreads_over_everyone() {
    let (mut ctx, _) = headless(100, 20);
    let root = packed_root(&mut ctx, row(Align::Fill, 0), 0);
    let kids: Vec<_> = (0..3).map(|_| add(&mut ctx, root, Some(10), None)).collect();
    ctx.update(0.0).unwrap();

    let widths: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.w).collect();
    assert_eq!(widths, vec![34, 33, 33]);
}

#[test]
#[serial]
fn test_fixed_children_skip_growth() {
    let (mut ctx, _) = headless(100, 20);
    let root = packed_root(&mut ctx, row(Align::Fill, 0), 0);
    let kids: Vec<_> = (0..2).map(|_| add(&mut ctx, root, Some(10), None)).collect();
    Packer::flex_child(&mut ctx, root, kids[0], Flex::Fixed).unwrap();
    ctx.update(0.0).unwrap();

    let widths: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.w).collect();
    assert_eq!(widths, vec![10, 90]);
}

#[test]
#[serial]
fn test_end_alignment_shifts_the_block() {
    let (mut ctx, _) = headless(100, 20);
    let root = packed_root(&mut ctx, row(Align::End, 3), 5);
    let kids = vec![add(&mut ctx, root, Some(10), None), add(&mut ctx, root, Some(20), None)];
    ctx.update(0.0).unwrap();

    let xs: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.x).collect();
    assert_eq!(xs, vec![62, 75]);
}

#[test]
#[serial]
fn test_reverse_start_packs_from_the_left() {
    let (mut ctx, _) = headless(100, 20);
    let args = PackerArgs { reverse: true, ..row(Align::Start, 0) };
    let root = packed_root(&mut ctx, args, 0);
    let kids = vec![add(&mut ctx, root, Some(10), None), add(&mut ctx, root, Some(20), None)];
    ctx.update(0.0).unwrap();

    let xs: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.x).collect();
    assert_eq!(xs, vec![20, 0]);
}

#[test]
#[serial]
fn test_minor_center() {
    let (mut ctx, _) = headless(100, 60);
    let args = PackerArgs { minor: Align::Center, ..row(Align::Start, 0) };
    let root = packed_root(&mut ctx, args, 0);
    let kid = add(&mut ctx, root, Some(10), Some(20));
    ctx.update(0.0).unwrap();

    assert_eq!(ctx.widget(kid).unwrap().bounds(), Rect::new(0, 20, 10, 20));
}

#[test]
#[serial]
fn test_nested_packer_measures_its_children() {
    let (mut ctx, _) = headless(100, 100);
    let root = packed_root(&mut ctx, PackerArgs::default(), 0);
    let inner = ctx.spawn::<Packer>(root, WidgetArgs::Packer(row(Align::Start, 2))).unwrap();
    let node = ctx.widget_mut(inner).unwrap();
    node.padx = 1;
    node.pady = 1;
    let kids = vec![add(&mut ctx, inner, Some(10), Some(10)), add(&mut ctx, inner, Some(10), Some(8))];
    ctx.update(0.0).unwrap();

    assert_eq!(ctx.widget(inner).unwrap().bounds(), Rect::new(0, 0, 24, 12));
    assert_eq!(bounds(&ctx, &kids), vec![Rect::new(1, 1, 10, 10), Rect::new(13, 1, 10, 8)]);
}

#[test]
#[serial]
fn test_flex_child_requires_membership() {
    let (mut ctx, _) = headless(100, 20);
    let root = packed_root(&mut ctx, PackerArgs::default(), 0);
    let loose = ctx.create_with(Fixed::boxed(None, None), WidgetArgs::None).unwrap();
    assert!(Packer::flex_child(&mut ctx, root, loose, Flex::Grow).is_err());
    ctx.release(loose);
}

#[test]
#[serial]
fn test_minor_fill_forces_interior_size() {
    let (mut ctx, _) = headless(100, 40);
    let args = PackerArgs { minor: Align::Fill, ..row(Align::Start, 0) };
    let root = packed_root(&mut ctx, args, 5);
    let kids = vec![add(&mut ctx, root, Some(10), Some(10)), add(&mut ctx, root, Some(10), Some(60))];
    ctx.update(0.0).unwrap();

    assert_eq!(bounds(&ctx, &kids), vec![Rect::new(5, 5, 10, 30), Rect::new(15, 5, 10, 30)]);
}

#[test]
#[serial]
fn test_minor_end_hugs_the_far_edge() {
    let (mut ctx, _) = headless(100, 60);
    let args = PackerArgs { minor: Align::End, ..row(Align::Start, 0) };
    let root = packed_root(&mut ctx, args, 4);
    let kids = vec![add(&mut ctx, root, Some(10), Some(20)), add(&mut ctx, root, Some(10), Some(80))];
    ctx.update(0.0).unwrap();

    // The tall child is clipped to the interior before it is placed.
    assert_eq!(bounds(&ctx, &kids), vec![Rect::new(4, 36, 10, 20), Rect::new(14, 4, 10, 52)]);
}

#[test]
#[serial]
fn test_major_center_moves_the_block() {
    let (mut ctx, _) = headless(100, 20);
    let root = packed_root(&mut ctx, row(Align::Center, 4), 0);
    let kids = vec![add(&mut ctx, root, Some(10), None), add(&mut ctx, root, Some(20), None)];
    ctx.update(0.0).unwrap();

    let xs: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.x).collect();
    assert_eq!(xs, vec![33, 47]);
}

#[test]
#[serial]
fn test_reverse_column_stacks_bottom_to_top() {
    let (mut ctx, _) = headless(50, 100);
    let args = PackerArgs { reverse: true, spacing: 2, major: Align::Start, ..Default::default() };
    let root = packed_root(&mut ctx, args, 5);
    let kids = vec![add(&mut ctx, root, Some(10), Some(10)), add(&mut ctx, root, Some(10), Some(20))];
    ctx.update(0.0).unwrap();

    // First child lowest, block pulled up against the top padding.
    assert_eq!(bounds(&ctx, &kids), vec![Rect::new(5, 27, 10, 10), Rect::new(5, 5, 10, 20)]);
}

#[test]
#[serial]
fn test_reverse_end_row_needs_no_realign() {
    let (mut ctx, _) = headless(100, 20);
    let args = PackerArgs { reverse: true, ..row(Align::End, 3) };
    let root = packed_root(&mut ctx, args, 5);
    let kids = vec![add(&mut ctx, root, Some(10), None), add(&mut ctx, root, Some(20), None)];
    ctx.update(0.0).unwrap();

    let spans: Vec<(i32, i32)> = bounds(&ctx, &kids).iter().map(|r| (r.x, r.x + r.w)).collect();
    assert_eq!(spans, vec![(85, 95), (62, 82)]);
}

#[test]
#[serial]
fn test_reverse_end_column_rests_on_the_bottom() {
    let (mut ctx, _) = headless(50, 100);
    let args = PackerArgs { reverse: true, spacing: 2, major: Align::End, ..Default::default() };
    let root = packed_root(&mut ctx, args, 5);
    let kids = vec![add(&mut ctx, root, Some(10), Some(10)), add(&mut ctx, root, Some(10), Some(20))];
    ctx.update(0.0).unwrap();

    let ys: Vec<i32> = bounds(&ctx, &kids).iter().map(|r| r.y).collect();
    assert_eq!(ys, vec![85, 63]);
}
