//! Insight engine: provider IO, output parsing, task persistence and export.
mod citations;
mod client;
mod export;
mod filename;
mod orchestrator;
mod parse;
mod persist;
mod provider;
mod store;
mod types;

pub use citations::{collect_sources, DEFAULT_SOURCE_TITLE};
pub use client::{analysis_prompt, AnalysisClient, AnalysisError};
pub use export::{
    DirectoryHandle, DownloadDir, Downloader, ExportDestination, ExportStatus, Exporter,
    EXPORT_SUBFOLDER,
};
pub use filename::{backup_filename, export_filename};
pub use orchestrator::{system_clock, uuid_ids, Clock, IdSource, Orchestrator, SubmitError};
pub use parse::{parse_analysis, strip_code_fences};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use provider::{
    GeminiProvider, Provider, ProviderError, ProviderFailure, ProviderResponse, ProviderSettings,
    WebReference, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use store::{load_collection, FileSlot, MemorySlot, StorageSlot, TaskStore, TASKS_FILENAME};
pub use types::{ChannelEventSink, LogEventSink, TaskEvent, TaskEventSink};
