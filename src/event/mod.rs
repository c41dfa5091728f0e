//! Input and window events delivered by the platform layer.

/// USB-HID usage ids (page 7) for the keys the toolkit handles by code.
pub mod keys {
    pub const KEY_ENTER: u32 = 0x70028;
    pub const KEY_ESCAPE: u32 = 0x70029;
    pub const KEY_BACKSPACE: u32 = 0x7002a;
    pub const KEY_TAB: u32 = 0x7002b;
    pub const KEY_SPACE: u32 = 0x7002c;
    pub const KEY_HOME: u32 = 0x7004a;
    pub const KEY_DELETE: u32 = 0x7004c;
    pub const KEY_END: u32 = 0x7004d;
    pub const KEY_RIGHT: u32 = 0x7004f;
    pub const KEY_LEFT: u32 = 0x70050;
    pub const KEY_DOWN: u32 = 0x70051;
    pub const KEY_UP: u32 = 0x70052;

    pub const KEY_LEFT_CTRL: u32 = 0x700e0;
    pub const KEY_LEFT_SHIFT: u32 = 0x700e1;
    pub const KEY_LEFT_ALT: u32 = 0x700e2;
    pub const KEY_LEFT_META: u32 = 0x700e3;
    pub const KEY_RIGHT_CTRL: u32 = 0x700e4;
    pub const KEY_RIGHT_SHIFT: u32 = 0x700e5;
    pub const KEY_RIGHT_ALT: u32 = 0x700e6;
    pub const KEY_RIGHT_META: u32 = 0x700e7;
}

pub use keys::*;

/// Bitmask of held modifier keys, one bit per key in `0x700E0..=0x700E7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    /// Bit for a modifier keycode, or `None` for ordinary keys.
    pub fn bit_for(keycode: u32) -> Option<u8> {
        (KEY_LEFT_CTRL..=KEY_RIGHT_META)
            .contains(&keycode)
            .then(|| 1 << (keycode - KEY_LEFT_CTRL))
    }

    /// Track a modifier press or release. Returns false for ordinary keys.
    pub fn update(&mut self, keycode: u32, pressed: bool) -> bool {
        let Some(bit) = Self::bit_for(keycode) else { return false };
        if pressed {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
        true
    }

    pub fn ctrl(self) -> bool {
        self.0 & 0x11 != 0
    }

    pub fn shift(self) -> bool {
        self.0 & 0x22 != 0
    }

    pub fn alt(self) -> bool {
        self.0 & 0x44 != 0
    }

    pub fn meta(self) -> bool {
        self.0 & 0x88 != 0
    }
}

/// Key press or release as seen by widget key hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub keycode: u32,
    pub pressed: bool,
    /// Resolved Unicode codepoint, 0 if none.
    pub codepoint: u32,
    /// Modifiers held when the key event arrived.
    pub modifiers: Modifiers,
}

/// Pointer tracking notification, see [`WidgetType::track`](crate::WidgetType::track).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Button pressed over the widget.
    Begin,
    /// Pointer left the widget mid-gesture.
    Exit,
    /// Pointer came back.
    Reenter,
    /// Released while inside.
    EndIn,
    /// Released while outside.
    EndOut,
}

/// Raw event from the window layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlatformEvent {
    Close,
    Resize { w: i32, h: i32 },
    WindowFocus(bool),
    Expose { x: i32, y: i32, w: i32, h: i32 },
    Key { keycode: u32, pressed: bool, codepoint: u32 },
    Motion { x: i32, y: i32 },
    Button { button: u8, pressed: bool },
    /// Click units.
    Wheel { dx: i32, dy: i32 },
}

/// Event queue for pending platform events.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<PlatformEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PlatformEvent) {
        self.pending.push(event);
    }

    pub fn drain(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
