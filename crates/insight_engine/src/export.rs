use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use insight_core::{Task, TaskCollection};
use insight_logging::{insight_error, insight_info, insight_warn};

use crate::filename::{backup_filename, export_filename};
use crate::persist::{ensure_dir, AtomicFileWriter, PersistError};

/// Folder created inside a granted directory to hold exported results.
pub const EXPORT_SUBFOLDER: &str = "scraped_data";

const SAVE_FAILED_MESSAGE: &str = "Failed to save file. Check permissions.";

/// Write access to a folder the user chose explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryHandle {
    root: PathBuf,
}

impl DirectoryHandle {
    /// Grants access to `root`, creating it if needed.
    pub fn grant(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        ensure_dir(&root)?;
        insight_info!("Export folder granted: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self, filename: &str, contents: &[u8]) -> Result<PathBuf, PersistError> {
        AtomicFileWriter::new(self.root.join(EXPORT_SUBFOLDER)).write(filename, contents)
    }
}

/// Fallback delivery when no folder is granted: save bytes under a name.
pub trait Downloader: Send + Sync {
    fn deliver(&self, filename: &str, contents: &[u8]) -> Result<PathBuf, PersistError>;
}

/// Delivers downloads into a fixed directory, such as the user's downloads folder.
#[derive(Debug, Clone)]
pub struct DownloadDir {
    writer: AtomicFileWriter,
}

impl DownloadDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }
}

impl Downloader for DownloadDir {
    fn deliver(&self, filename: &str, contents: &[u8]) -> Result<PathBuf, PersistError> {
        self.writer.write(filename, contents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportDestination {
    Folder,
    Download,
}

/// Outcome of an export, meant to be shown to the user and then forgotten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Skipped {
        message: String,
    },
    Saved {
        destination: ExportDestination,
        paths: Vec<PathBuf>,
        message: String,
    },
    Failed {
        message: String,
    },
}

impl ExportStatus {
    pub fn message(&self) -> &str {
        match self {
            ExportStatus::Skipped { message }
            | ExportStatus::Saved { message, .. }
            | ExportStatus::Failed { message } => message,
        }
    }

    fn saved(destination: ExportDestination, path: PathBuf, message: String) -> Self {
        ExportStatus::Saved {
            destination,
            paths: vec![path],
            message,
        }
    }
}

/// Writes results to the granted folder, or hands them to the downloader.
///
/// Export never returns an error; failures end up in [`ExportStatus`].
pub struct Exporter {
    folder: Option<DirectoryHandle>,
    downloader: Arc<dyn Downloader>,
    today: Arc<dyn Fn() -> NaiveDate + Send + Sync>,
}

impl Exporter {
    pub fn new(downloader: Arc<dyn Downloader>) -> Self {
        Self {
            folder: None,
            downloader,
            today: Arc::new(|| Utc::now().date_naive()),
        }
    }

    pub fn with_folder(mut self, folder: DirectoryHandle) -> Self {
        self.folder = Some(folder);
        self
    }

    pub fn with_today(mut self, today: Arc<dyn Fn() -> NaiveDate + Send + Sync>) -> Self {
        self.today = today;
        self
    }

    pub fn folder(&self) -> Option<&DirectoryHandle> {
        self.folder.as_ref()
    }

    /// Writes the pretty-printed result of one completed task.
    pub fn export_one(&self, task: &Task) -> ExportStatus {
        let Some(result) = task.result() else {
            return ExportStatus::Skipped {
                message: format!("Task {} has no result to export", task.id()),
            };
        };
        let filename = export_filename(&result.title, task.id());
        let contents = match serde_json::to_string_pretty(result) {
            Ok(text) => text,
            Err(err) => {
                insight_error!("Failed to serialize result of task {}: {}", task.id(), err);
                return ExportStatus::Failed {
                    message: SAVE_FAILED_MESSAGE.to_string(),
                };
            }
        };

        if let Some(folder) = &self.folder {
            match folder.write(&filename, contents.as_bytes()) {
                Ok(path) => {
                    insight_info!("Saved {} to {}", filename, path.display());
                    return ExportStatus::saved(
                        ExportDestination::Folder,
                        path,
                        format!("Saved {filename} to disk!"),
                    );
                }
                Err(err) => {
                    insight_warn!(
                        "Writing {} to {} failed ({}), falling back to download",
                        filename,
                        folder.root().display(),
                        err
                    );
                }
            }
        }

        self.download(&filename, contents.as_bytes())
    }

    /// With a folder: one file per completed task, each falling back to the
    /// downloader on its own. Without: one backup file holding the whole
    /// collection, dated by the UTC calendar day.
    pub fn export_all(&self, tasks: &TaskCollection) -> ExportStatus {
        if self.folder.is_none() {
            let filename = backup_filename((self.today)());
            return match serde_json::to_string_pretty(tasks) {
                Ok(contents) => self.download(&filename, contents.as_bytes()),
                Err(err) => {
                    insight_error!("Failed to serialize task collection: {}", err);
                    ExportStatus::Failed {
                        message: SAVE_FAILED_MESSAGE.to_string(),
                    }
                }
            };
        }

        let mut in_folder = Vec::new();
        let mut downloaded = Vec::new();
        let mut failures = 0usize;
        for task in tasks.completed() {
            match self.export_one(task) {
                ExportStatus::Saved {
                    destination: ExportDestination::Folder,
                    paths,
                    ..
                } => in_folder.extend(paths),
                ExportStatus::Saved {
                    destination: ExportDestination::Download,
                    paths,
                    ..
                } => downloaded.extend(paths),
                ExportStatus::Failed { .. } => failures += 1,
                ExportStatus::Skipped { .. } => {}
            }
        }

        if in_folder.is_empty() && downloaded.is_empty() && failures > 0 {
            return ExportStatus::Failed {
                message: SAVE_FAILED_MESSAGE.to_string(),
            };
        }

        let mut parts = Vec::new();
        if !in_folder.is_empty() || downloaded.is_empty() {
            parts.push(format!("Batch saved {} files to folder!", in_folder.len()));
        }
        if !downloaded.is_empty() {
            parts.push(format!(
                "{} files could not be written to the folder and were downloaded instead.",
                downloaded.len()
            ));
        }
        if failures > 0 {
            parts.push(format!("{failures} could not be saved."));
        }
        let destination = if in_folder.is_empty() && !downloaded.is_empty() {
            ExportDestination::Download
        } else {
            ExportDestination::Folder
        };
        in_folder.extend(downloaded);
        ExportStatus::Saved {
            destination,
            paths: in_folder,
            message: parts.join(" "),
        }
    }

    fn download(&self, filename: &str, contents: &[u8]) -> ExportStatus {
        match self.downloader.deliver(filename, contents) {
            Ok(path) => {
                insight_info!("Downloaded {} to {}", filename, path.display());
                ExportStatus::saved(
                    ExportDestination::Download,
                    path,
                    format!("Downloaded {filename}"),
                )
            }
            Err(err) => {
                insight_error!("Saving {} failed: {}", filename, err);
                ExportStatus::Failed {
                    message: SAVE_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }
}
