//! Deferred widget tasks.
//!
//! A task keeps its widget alive until it has fired or been cancelled. Due
//! tasks fire in the order they were scheduled. The set of due tasks is
//! taken before any of them run, so a task scheduled from a callback waits
//! for the next update even with zero delay.

use std::fmt;

use tracing::debug;

use super::Context;
use crate::widget::WidgetId;
use crate::{Error, Result};

const MAX_DELAY: f64 = 60.0;

/// Task or cleanup callback, given the task's widget.
pub type TaskCallback = Box<dyn FnOnce(&mut Context, WidgetId)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {}", self.0)
    }
}

pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) widget: WidgetId,
    when: f64,
    callback: TaskCallback,
    pub(crate) cleanup: Option<TaskCallback>,
}

#[derive(Default)]
pub(crate) struct TaskQueue {
    tasks: Vec<Task>,
    next_id: u64,
}

impl TaskQueue {
    fn next_id(&mut self) -> TaskId {
        self.next_id = self.next_id.max(1);
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    fn take(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub(crate) fn take_all(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl Context {
    /// Run `callback` on `widget` after `delay_s` seconds of logical time.
    /// Negative delays mean the next update; more than a minute is refused.
    pub fn defer_task(
        &mut self,
        widget: WidgetId,
        delay_s: f64,
        callback: impl FnOnce(&mut Context, WidgetId) + 'static,
    ) -> Result<TaskId> {
        if delay_s.is_nan() || delay_s > MAX_DELAY {
            return Err(Error::TaskDelay(delay_s));
        }
        let delay = delay_s.max(0.0);
        self.retain(widget)?;
        let id = self.tasks.next_id();
        self.tasks.tasks.push(Task {
            id,
            widget,
            when: self.clock + delay,
            callback: Box::new(callback),
            cleanup: None,
        });
        debug!("Scheduled {} on {} in {:.3}s", id, widget, delay);
        Ok(id)
    }

    /// Attach a callback that runs after the task fires or when it is
    /// cancelled, whichever comes first.
    pub fn set_task_cleanup(
        &mut self,
        id: TaskId,
        cleanup: impl FnOnce(&mut Context, WidgetId) + 'static,
    ) -> Result<()> {
        let task = self.tasks.tasks.iter_mut().find(|t| t.id == id).ok_or(Error::TaskNotFound(id))?;
        task.cleanup = Some(Box::new(cleanup));
        Ok(())
    }

    /// Drop a pending task, running its cleanup. Returns false if it already
    /// fired or never existed.
    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.take(id) else { return false };
        debug!("Cancelled {}", id);
        if let Some(cleanup) = task.cleanup {
            cleanup(self, task.widget);
        }
        self.release(task.widget);
        true
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn run_due_tasks(&mut self) {
        let now = self.clock;
        let due: Vec<TaskId> = self.tasks.tasks.iter().filter(|t| t.when <= now).map(|t| t.id).collect();
        for id in due {
            // An earlier callback may have cancelled it.
            let Some(task) = self.tasks.take(id) else { continue };
            (task.callback)(self, task.widget);
            if let Some(cleanup) = task.cleanup {
                cleanup(self, task.widget);
            }
            self.release(task.widget);
        }
    }
}
