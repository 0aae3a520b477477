use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Task, TaskStatus, TaskUpdate};

/// Why a stored collection cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionIssue {
    #[error("collection is empty")]
    Empty,
    #[error("duplicate task id {0}")]
    DuplicateId(String),
    #[error("task {id} in status {status} has inconsistent result/error fields")]
    Inconsistent { id: String, status: &'static str },
}

/// Insertion-ordered tasks, unique by id.
///
/// Every operation returns a new collection and leaves `self` untouched, so a
/// holder of an older value never observes a change.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn completed(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(|task| task.status() == TaskStatus::Completed)
    }

    /// Checks the invariants a freshly loaded collection must satisfy.
    pub fn validate(&self) -> Result<(), CollectionIssue> {
        if self.tasks.is_empty() {
            return Err(CollectionIssue::Empty);
        }
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !seen.insert(task.id()) {
                return Err(CollectionIssue::DuplicateId(task.id().to_string()));
            }
            if !task.is_consistent() {
                return Err(CollectionIssue::Inconsistent {
                    id: task.id().to_string(),
                    status: task.status().label(),
                });
            }
        }
        Ok(())
    }

    /// Appends `task`; a task whose id is already present is ignored.
    pub fn append(&self, task: Task) -> Self {
        if self.get(task.id()).is_some() {
            return self.clone();
        }
        let mut tasks = Vec::with_capacity(self.tasks.len() + 1);
        tasks.extend(self.tasks.iter().cloned());
        tasks.push(task);
        Self { tasks }
    }

    /// Moves the task with `id` into the terminal state carried by `update`.
    ///
    /// Unknown ids and tasks that already finished leave the collection
    /// unchanged; a task deleted while its analysis was running is not an
    /// error.
    pub fn update_status(&self, id: &str, update: TaskUpdate) -> Self {
        let Some(index) = self.tasks.iter().position(|task| task.id() == id) else {
            return self.clone();
        };
        let Some(updated) = self.tasks[index].finish(update) else {
            return self.clone();
        };
        let mut tasks = self.tasks.clone();
        tasks[index] = updated;
        Self { tasks }
    }

    /// Removes the task with `id`, if any.
    pub fn remove(&self, id: &str) -> Self {
        Self {
            tasks: self
                .tasks
                .iter()
                .filter(|task| task.id() != id)
                .cloned()
                .collect(),
        }
    }
}

impl FromIterator<Task> for TaskCollection {
    /// Builds a collection by appending in order, so later duplicates are dropped.
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut tasks: Vec<Task> = Vec::new();
        for task in iter {
            if !tasks.iter().any(|existing| existing.id() == task.id()) {
                tasks.push(task);
            }
        }
        Self { tasks }
    }
}

impl<'a> IntoIterator for &'a TaskCollection {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
