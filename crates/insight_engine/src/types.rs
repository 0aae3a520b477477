use std::sync::mpsc;

use insight_core::Task;
use insight_logging::{insight_info, insight_warn};

/// Lifecycle notifications for a front end.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    Created(Task),
    Completed(Task),
    Failed(Task),
}

impl TaskEvent {
    pub fn task(&self) -> &Task {
        match self {
            TaskEvent::Created(task) | TaskEvent::Completed(task) | TaskEvent::Failed(task) => task,
        }
    }
}

pub trait TaskEventSink: Send + Sync {
    fn emit(&self, event: TaskEvent);
}

/// Writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl TaskEventSink for LogEventSink {
    fn emit(&self, event: TaskEvent) {
        match &event {
            TaskEvent::Created(task) => {
                insight_info!("Task {} created for {}", task.id(), task.url());
            }
            TaskEvent::Completed(task) => {
                insight_info!("Task {} completed", task.id());
            }
            TaskEvent::Failed(task) => {
                insight_warn!(
                    "Task {} failed: {}",
                    task.id(),
                    task.error().unwrap_or_default()
                );
            }
        }
    }
}

/// Forwards events over a channel; a dropped receiver is ignored.
pub struct ChannelEventSink {
    tx: mpsc::Sender<TaskEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<TaskEvent>) -> Self {
        Self { tx }
    }
}

impl TaskEventSink for ChannelEventSink {
    fn emit(&self, event: TaskEvent) {
        let _ = self.tx.send(event);
    }
}
