use thiserror::Error;

use crate::context::TaskId;
use crate::widget::WidgetId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("A GUI context is already live")]
    ContextExists,

    #[error("Root widget is already set")]
    RootExists,

    #[error("Widget not found: {0}")]
    WidgetNotFound(WidgetId),

    #[error("Invalid widget type: expected {expected}, got {actual}")]
    InvalidWidgetType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Widget {0} is busy running one of its own hooks")]
    WidgetBusy(WidgetId),

    #[error("Widget {child} already belongs to {parent}")]
    AlreadyParented { child: WidgetId, parent: WidgetId },

    #[error("Inserting {child} under {parent} would create a cycle")]
    WouldCycle { parent: WidgetId, child: WidgetId },

    #[error("Child index {index} out of range ({len} children)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Widget {child} is not a child of {parent}")]
    NotAChild { parent: WidgetId, child: WidgetId },

    #[error("Construction arguments rejected by {widget_type}: {reason}")]
    InvalidArgs {
        widget_type: &'static str,
        reason: String,
    },

    #[error("Font error: {0}")]
    Font(String),

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    #[error("Codepoint {codepoint:#x} cannot be written as {encoding}")]
    Unencodable {
        codepoint: i32,
        encoding: &'static str,
    },

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Task delay out of range: {0}s")]
    TaskDelay(f64),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
