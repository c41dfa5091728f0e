//! softgui
//!
//! A small pure-software widget toolkit. Owns a retained widget tree with
//! measure/pack layout, a one-dimensional flex packer, focus management,
//! pointer tracking and a bitmap font renderer drawing into raw 32-bit
//! framebuffers. The window system is reached through the [`Platform`] trait.

pub mod clock;
pub mod config;
pub mod context;
pub mod dump;
pub mod error;
pub mod event;
pub mod platform;
pub mod render;
pub mod text;
pub mod widget;

pub use config::GuiConfig;
pub use context::{Context, TaskId};
pub use error::{Error, Result};
pub use platform::{HeadlessHandle, HeadlessPlatform, Platform};
pub use widget::{WidgetArgs, WidgetId, WidgetType};
