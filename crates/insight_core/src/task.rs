use serde::{Deserialize, Serialize};

use crate::AnalysisResult;

pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Never produced; tasks are created directly in `Processing`.
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Processing => "PROCESSING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
        }
    }
}

/// Terminal outcome applied to a processing task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    Completed(AnalysisResult),
    Failed(String),
}

impl TaskUpdate {
    pub fn status(&self) -> TaskStatus {
        match self {
            TaskUpdate::Completed(_) => TaskStatus::Completed,
            TaskUpdate::Failed(_) => TaskStatus::Failed,
        }
    }
}

/// One analysis request and its outcome.
///
/// Fields are private so that `result` is present exactly when the task is
/// completed and `error` exactly when it failed. Deserialized tasks can still
/// break this; check [`Task::is_consistent`] before trusting stored data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    url: String,
    created_at: i64,
    status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Task {
    pub fn processing(id: impl Into<TaskId>, url: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            created_at,
            status: TaskStatus::Processing,
            result: None,
            error: None,
        }
    }

    pub fn completed(
        id: impl Into<TaskId>,
        url: impl Into<String>,
        created_at: i64,
        result: AnalysisResult,
    ) -> Self {
        Self::processing(id, url, created_at).with_update(TaskUpdate::Completed(result))
    }

    /// Copy of this task carrying `update`, or `None` if it already finished.
    pub fn finish(&self, update: TaskUpdate) -> Option<Self> {
        if self.status.is_terminal() {
            return None;
        }
        Some(self.clone().with_update(update))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Creation time in epoch milliseconds.
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_consistent(&self) -> bool {
        match self.status {
            TaskStatus::Completed => self.result.is_some() && self.error.is_none(),
            TaskStatus::Failed => self.error.is_some() && self.result.is_none(),
            TaskStatus::Pending | TaskStatus::Processing => {
                self.result.is_none() && self.error.is_none()
            }
        }
    }

    fn with_update(self, update: TaskUpdate) -> Self {
        let status = update.status();
        let (result, error) = match update {
            TaskUpdate::Completed(result) => (Some(result), None),
            TaskUpdate::Failed(message) => (None, Some(message)),
        };
        Self {
            status,
            result,
            error,
            ..self
        }
    }
}
