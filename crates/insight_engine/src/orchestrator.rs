use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use insight_core::{parse_submission, SubmissionError, Task, TaskCollection, TaskId, TaskUpdate};
use insight_logging::{insight_error, insight_info};

use crate::persist::PersistError;
use crate::types::{LogEventSink, TaskEvent, TaskEventSink};
use crate::{AnalysisClient, TaskStore};

/// Epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;
pub type IdSource = Arc<dyn Fn() -> TaskId + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("another analysis is already in progress")]
    Busy,
    #[error(transparent)]
    InvalidUrl(#[from] SubmissionError),
}

pub fn system_clock() -> Clock {
    Arc::new(|| Utc::now().timestamp_millis())
}

pub fn uuid_ids() -> IdSource {
    Arc::new(|| uuid::Uuid::new_v4().to_string())
}

/// Runs one analysis at a time: create the task, call the provider, record
/// the outcome. Every step is committed through the shared [`TaskStore`].
pub struct Orchestrator {
    client: AnalysisClient,
    store: Arc<TaskStore>,
    sink: Arc<dyn TaskEventSink>,
    clock: Clock,
    ids: IdSource,
    in_flight: AtomicBool,
}

impl Orchestrator {
    pub fn new(client: AnalysisClient, store: Arc<TaskStore>) -> Self {
        Self {
            client,
            store,
            sink: Arc::new(LogEventSink),
            clock: system_clock(),
            ids: uuid_ids(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn TaskEventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_source(mut self, ids: IdSource) -> Self {
        self.ids = ids;
        self
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Analyzes `raw_url` and returns the task in its terminal state.
    ///
    /// Rejected submissions (bad URL, another analysis running) create no
    /// task. Provider and parsing failures are not errors here: they produce
    /// a FAILED task.
    pub async fn submit(&self, raw_url: &str) -> Result<Task, SubmitError> {
        let url = parse_submission(raw_url)?;
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(SubmitError::Busy)?;

        let task = Task::processing((self.ids)(), url, (self.clock)());
        self.commit("create", |tasks| tasks.append(task.clone()));
        self.sink.emit(TaskEvent::Created(task.clone()));

        let update = match self.client.analyze(task.url()).await {
            Ok(result) => TaskUpdate::Completed(result),
            Err(err) => TaskUpdate::Failed(err.to_string()),
        };

        let tasks = self.commit("finish", |tasks| {
            tasks.update_status(task.id(), update.clone())
        });
        if tasks.get(task.id()).is_none() {
            insight_info!("Task {} was deleted while it was processing", task.id());
        }

        // A fresh task is never terminal, so `finish` always yields a copy.
        let finished = task.finish(update).unwrap_or(task);
        let event = match finished.error() {
            Some(_) => TaskEvent::Failed(finished.clone()),
            None => TaskEvent::Completed(finished.clone()),
        };
        self.sink.emit(event);
        Ok(finished)
    }

    /// Removes a task, even one still processing; its outcome is then dropped.
    pub fn delete(&self, id: &str) -> Result<bool, PersistError> {
        self.store.remove(id)
    }

    fn commit<F>(&self, step: &str, op: F) -> TaskCollection
    where
        F: FnOnce(&TaskCollection) -> TaskCollection,
    {
        match self.store.commit(op) {
            Ok(tasks) => tasks,
            Err(err) => {
                insight_error!("Failed to persist tasks after {}: {}", step, err);
                self.store.snapshot()
            }
        }
    }
}

struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
