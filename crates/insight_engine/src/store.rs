use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use insight_core::{seed_tasks, TaskCollection};
use insight_logging::{insight_info, insight_warn};

use crate::persist::{AtomicFileWriter, PersistError};

pub const TASKS_FILENAME: &str = "tasks.json";

/// One named slot of durable storage holding the serialized collection.
pub trait StorageSlot: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, PersistError>;
    fn write(&self, contents: &str) -> Result<(), PersistError>;
}

impl<T: StorageSlot + ?Sized> StorageSlot for Arc<T> {
    fn read(&self) -> Result<Option<String>, PersistError> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<(), PersistError> {
        (**self).write(contents)
    }
}

/// Slot backed by a single file, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileSlot {
    writer: AtomicFileWriter,
    filename: String,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            filename: filename.into(),
        }
    }

    /// `tasks.json` inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, TASKS_FILENAME)
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(&self.filename)
    }
}

impl StorageSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path()) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<(), PersistError> {
        self.writer.write(&self.filename, contents)?;
        Ok(())
    }
}

/// In-process slot, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, PersistError> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<(), PersistError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.to_string());
        Ok(())
    }
}

/// Reads the stored collection, falling back to the seed set when storage is
/// missing, unreadable, empty or inconsistent. Never fails.
pub fn load_collection(slot: &dyn StorageSlot, now_ms: i64) -> TaskCollection {
    let text = match slot.read() {
        Ok(Some(text)) => text,
        Ok(None) => {
            insight_info!("No stored tasks found, starting from the demo set");
            return seed_tasks(now_ms);
        }
        Err(err) => {
            insight_warn!("Failed to read stored tasks: {}", err);
            return seed_tasks(now_ms);
        }
    };

    let tasks: TaskCollection = match serde_json::from_str(&text) {
        Ok(tasks) => tasks,
        Err(err) => {
            insight_warn!("Failed to parse stored tasks: {}", err);
            return seed_tasks(now_ms);
        }
    };

    if let Err(issue) = tasks.validate() {
        insight_warn!("Stored tasks rejected ({}), starting from the demo set", issue);
        return seed_tasks(now_ms);
    }

    insight_info!("Loaded {} stored tasks", tasks.len());
    tasks
}

/// Owns the current task collection and the slot it is persisted to.
///
/// The collection is replaced wholesale on each change; the lock is held
/// only for the synchronous replace-and-write, so writes land in order.
pub struct TaskStore {
    slot: Box<dyn StorageSlot>,
    tasks: Mutex<TaskCollection>,
}

impl TaskStore {
    /// Loads from `slot` (see [`load_collection`]).
    pub fn open(slot: Box<dyn StorageSlot>, now_ms: i64) -> Self {
        let tasks = load_collection(slot.as_ref(), now_ms);
        Self {
            slot,
            tasks: Mutex::new(tasks),
        }
    }

    pub fn snapshot(&self) -> TaskCollection {
        self.lock().clone()
    }

    /// Overwrites durable storage with `tasks`.
    pub fn save(&self, tasks: &TaskCollection) -> Result<(), PersistError> {
        let text = serde_json::to_string(tasks)?;
        self.slot.write(&text)
    }

    /// Applies `op`, installs the new collection and persists it.
    ///
    /// The in-memory collection advances even if the write fails; the error
    /// is returned so the caller can report it.
    pub fn commit<F>(&self, op: F) -> Result<TaskCollection, PersistError>
    where
        F: FnOnce(&TaskCollection) -> TaskCollection,
    {
        let mut guard = self.lock();
        let next = op(&*guard);
        *guard = next.clone();
        self.save(&next)?;
        Ok(next)
    }

    /// Removes a task permanently. Returns whether it existed.
    pub fn remove(&self, id: &str) -> Result<bool, PersistError> {
        let mut existed = false;
        self.commit(|tasks| {
            existed = tasks.get(id).is_some();
            tasks.remove(id)
        })?;
        Ok(existed)
    }

    fn lock(&self) -> MutexGuard<'_, TaskCollection> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
