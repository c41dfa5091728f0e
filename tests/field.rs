mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{headless, headless_with};
use serial_test::serial;
use softgui::event::{PlatformEvent, KEY_BACKSPACE, KEY_HOME, KEY_LEFT, KEY_LEFT_SHIFT, KEY_TAB};
use softgui::widget::{EditOutcome, Field, FieldArgs, Label, Packer};
use softgui::{Context, Error, GuiConfig, HeadlessHandle, WidgetArgs, WidgetId};

fn field_with(ctx: &mut Context, args: FieldArgs) -> WidgetId {
    let root = ctx.create_root::<Packer>(WidgetArgs::None).unwrap();
    ctx.spawn::<Field>(root, WidgetArgs::Field(args)).unwrap()
}

fn field(ctx: &mut Context, text: &str) -> WidgetId {
    field_with(ctx, FieldArgs { text: text.into(), ..Default::default() })
}

fn text(ctx: &mut Context, id: WidgetId) -> String {
    String::from_utf8(Field::text(ctx, id).unwrap()).unwrap()
}

fn type_chars(handle: &HeadlessHandle, s: &str) {
    for ch in s.chars() {
        handle.push_event(PlatformEvent::Key { keycode: 0, pressed: true, codepoint: ch as u32 });
        handle.push_event(PlatformEvent::Key { keycode: 0, pressed: false, codepoint: 0 });
    }
}

fn press(handle: &HeadlessHandle, keycode: u32) {
    handle.push_event(PlatformEvent::Key { keycode, pressed: true, codepoint: 0 });
}

#[test]
#[serial]
fn test_multibyte_insert_and_backspace() {
    let (mut ctx, _) = headless(400, 100);
    let id = field(&mut ctx, "");
    assert_eq!(Field::insert_codepoint(&mut ctx, id, 0x20ac).unwrap(), EditOutcome::Applied);
    assert_eq!(Field::text(&mut ctx, id).unwrap(), vec![0xe2, 0x82, 0xac]);
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (3, 0));

    assert_eq!(Field::backspace(&mut ctx, id).unwrap(), EditOutcome::Applied);
    assert!(Field::text(&mut ctx, id).unwrap().is_empty());
    assert_eq!(Field::backspace(&mut ctx, id).unwrap(), EditOutcome::Unchanged);
}

#[test]
#[serial]
fn test_insert_after_ascii() {
    let (mut ctx, _) = headless(400, 100);
    let id = field(&mut ctx, "ab");
    Field::insert_codepoint(&mut ctx, id, 0xe9).unwrap();
    assert_eq!(text(&mut ctx, id), "ab\u{e9}");
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (4, 0));

    Field::move_cursor(&mut ctx, id, -1, 0, false).unwrap();
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (2, 0));
    assert_eq!(Field::delete(&mut ctx, id).unwrap(), EditOutcome::Applied);
    assert_eq!(text(&mut ctx, id), "ab");
    assert_eq!(Field::delete(&mut ctx, id).unwrap(), EditOutcome::Unchanged);
}

#[test]
#[serial]
fn test_control_characters() {
    let (mut ctx, _) = headless(400, 100);
    let id = field(&mut ctx, "a");
    assert_eq!(Field::insert_codepoint(&mut ctx, id, 0x09).unwrap(), EditOutcome::Unchanged);
    assert_eq!(Field::insert_codepoint(&mut ctx, id, 0x85).unwrap(), EditOutcome::Unchanged);
    assert_eq!(text(&mut ctx, id), "a");

    assert_eq!(Field::replace_selection(&mut ctx, id, b"\t").unwrap(), EditOutcome::Applied);
    assert_eq!(text(&mut ctx, id), "a\t");
}

#[test]
#[serial]
fn test_pre_edit_veto() {
    let (mut ctx, _) = headless(400, 100);
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let id = field_with(&mut ctx, FieldArgs {
        text: "hi".into(),
        pre_edit: Some(Rc::new(move |_: WidgetId, current: &[u8], start: usize, len: usize, incoming: &[u8]| {
            seen.borrow_mut().push((current.to_vec(), start, len, incoming.to_vec()));
            incoming.contains(&b'x')
        })),
        ..Default::default()
    });

    assert_eq!(Field::insert_codepoint(&mut ctx, id, 'x' as u32).unwrap(), EditOutcome::Vetoed);
    assert_eq!(text(&mut ctx, id), "hi");
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (2, 0));

    Field::set_selection(&mut ctx, id, 0, Some(1)).unwrap();
    assert_eq!(Field::insert_codepoint(&mut ctx, id, 'o' as u32).unwrap(), EditOutcome::Applied);
    assert_eq!(text(&mut ctx, id), "oi");
    assert_eq!(
        *calls.borrow(),
        vec![(b"hi".to_vec(), 2, 0, b"x".to_vec()), (b"hi".to_vec(), 0, 1, b"o".to_vec())]
    );

    // set_text bypasses the callbacks.
    Field::set_text(&mut ctx, id, "xxx").unwrap();
    assert_eq!(text(&mut ctx, id), "xxx");
    assert_eq!(calls.borrow().len(), 2);
}

#[test]
#[serial]
fn test_post_edit_runs_after_the_hook() {
    let (mut ctx, _) = headless(400, 100);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = field(&mut ctx, "");
    Field::set_post_edit(&mut ctx, id, Some(Rc::new(move |ctx: &mut Context, id: WidgetId, text: &[u8], caret: usize| {
        // The field is no longer busy here.
        let current = Field::text(ctx, id).unwrap();
        sink.borrow_mut().push((text.to_vec(), caret, current));
    })))
    .unwrap();

    Field::insert_codepoint(&mut ctx, id, 'a' as u32).unwrap();
    Field::insert_codepoint(&mut ctx, id, 'b' as u32).unwrap();
    Field::move_cursor(&mut ctx, id, -1, 0, false).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![(b"a".to_vec(), 1, b"a".to_vec()), (b"ab".to_vec(), 2, b"ab".to_vec())]
    );
}

#[test]
#[serial]
fn test_cursor_motion_and_selection() {
    let (mut ctx, _) = headless(400, 100);
    let id = field(&mut ctx, "hello");
    let sel = |ctx: &mut Context| Field::selection(ctx, id).unwrap();
    assert_eq!(sel(&mut ctx), (5, 0));

    Field::move_cursor(&mut ctx, id, -1, 0, true).unwrap();
    assert_eq!(sel(&mut ctx), (4, 1));
    Field::move_cursor(&mut ctx, id, -1, 0, true).unwrap();
    assert_eq!(sel(&mut ctx), (3, 2));
    Field::move_cursor(&mut ctx, id, 1, 0, false).unwrap();
    assert_eq!(sel(&mut ctx), (5, 0));
    Field::move_cursor(&mut ctx, id, 0, -1, false).unwrap();
    assert_eq!(sel(&mut ctx), (0, 0));
    Field::move_cursor(&mut ctx, id, -1, 0, false).unwrap();
    assert_eq!(sel(&mut ctx), (0, 0));
    Field::move_cursor(&mut ctx, id, 0, 1, true).unwrap();
    assert_eq!(sel(&mut ctx), (0, 5));

    assert_eq!(Field::delete(&mut ctx, id).unwrap(), EditOutcome::Applied);
    assert_eq!(text(&mut ctx, id), "");
}

#[test]
#[serial]
fn test_selection_snaps_to_codepoints() {
    let (mut ctx, _) = headless(400, 100);
    let id = field(&mut ctx, "a\u{20ac}b");
    Field::set_selection(&mut ctx, id, 2, Some(1)).unwrap();
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (1, 3));

    Field::set_selection(&mut ctx, id, 1, None).unwrap();
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (1, 4));
    Field::set_selection(&mut ctx, id, 99, Some(3)).unwrap();
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (5, 0));

    Field::set_selection(&mut ctx, id, 1, Some(0)).unwrap();
    Field::move_cursor(&mut ctx, id, 1, 0, false).unwrap();
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (4, 0));
    Field::backspace(&mut ctx, id).unwrap();
    assert_eq!(text(&mut ctx, id), "ab");
}

#[test]
#[serial]
fn test_keyboard_editing() {
    let (mut ctx, handle) = headless(400, 100);
    let id = field(&mut ctx, "");
    ctx.update(0.0).unwrap();
    assert_eq!(ctx.focused(), Some(id));

    type_chars(&handle, "hey");
    press(&handle, KEY_LEFT);
    press(&handle, KEY_BACKSPACE);
    ctx.tick(0.0).unwrap();
    assert_eq!(text(&mut ctx, id), "hy");

    press(&handle, KEY_LEFT_SHIFT);
    press(&handle, KEY_HOME);
    ctx.tick(0.0).unwrap();
    assert_eq!(Field::selection(&mut ctx, id).unwrap(), (0, 1));

    // Shift+Tab falls through to focus navigation; a one-entry ring stays put.
    press(&handle, KEY_TAB);
    type_chars(&handle, "J");
    ctx.tick(0.0).unwrap();
    assert_eq!(text(&mut ctx, id), "Jy");
    assert!(ctx.modifiers().shift());
}

#[test]
#[serial]
fn test_latin1_field() {
    let config = GuiConfig { encoding: "ISO-8859-1".into(), ..Default::default() };
    let (mut ctx, _) = headless_with(400, 100, config);
    let id = field(&mut ctx, "");
    assert_eq!(Field::insert_codepoint(&mut ctx, id, 0xe9).unwrap(), EditOutcome::Applied);
    assert_eq!(Field::text(&mut ctx, id).unwrap(), vec![0xe9]);
    assert_eq!(Field::insert_codepoint(&mut ctx, id, 0x20ac).unwrap(), EditOutcome::Unchanged);
    assert_eq!(Field::text(&mut ctx, id).unwrap(), vec![0xe9]);
}

#[test]
#[serial]
fn test_field_calls_on_other_types_fail() {
    let (mut ctx, _) = headless(400, 100);
    let root = ctx.create_root::<Packer>(WidgetArgs::None).unwrap();
    let label = ctx.spawn::<Label>(root, WidgetArgs::None).unwrap();
    let err = Field::text(&mut ctx, label).unwrap_err();
    assert!(matches!(err, Error::InvalidWidgetType { expected: "field", actual: "label" }));
    assert!(matches!(Field::delete(&mut ctx, root), Err(Error::InvalidWidgetType { .. })));
}
