//! Insight core: task model, pure collection operations and view-model helpers.
mod analysis;
mod collection;
mod seed;
mod submission;
mod task;
mod view_model;

pub use analysis::{AnalysisResult, Sentiment, Source};
pub use collection::{CollectionIssue, TaskCollection};
pub use seed::seed_tasks;
pub use submission::{parse_submission, SubmissionError};
pub use task::{Task, TaskId, TaskStatus, TaskUpdate};
pub use view_model::{
    history_rows, overview, DailyActivity, HistoryRow, OverviewView, SentimentCounts,
    ACTIVITY_WINDOW_DAYS,
};
