use chrono::{DateTime, Datelike, Days, NaiveDate, Weekday};

use crate::{Sentiment, TaskCollection, TaskId, TaskStatus};

/// Number of days covered by [`OverviewView::activity`], ending today.
pub const ACTIVITY_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    fn bump(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub tasks: usize,
}

/// Statistics for the overview screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverviewView {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub processing: usize,
    /// Completed share of all tasks, rounded to a whole percent.
    pub success_rate_percent: u32,
    pub sentiment: SentimentCounts,
    /// Oldest day first. Days are UTC calendar days.
    pub activity: Vec<DailyActivity>,
}

/// One line of the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: TaskId,
    pub url: String,
    pub created_at: i64,
    pub status: TaskStatus,
    pub title: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub error: Option<String>,
}

pub fn overview(tasks: &TaskCollection, today: NaiveDate) -> OverviewView {
    let mut view = OverviewView {
        total: tasks.len(),
        ..OverviewView::default()
    };

    for task in tasks {
        match task.status() {
            TaskStatus::Completed => view.completed += 1,
            TaskStatus::Failed => view.failed += 1,
            TaskStatus::Pending | TaskStatus::Processing => view.processing += 1,
        }
        if let Some(result) = task.result() {
            view.sentiment.bump(result.sentiment);
        }
    }

    if view.total > 0 {
        let rate = view.completed as f64 / view.total as f64 * 100.0;
        view.success_rate_percent = rate.round() as u32;
    }

    view.activity = activity_window(tasks, today);
    view
}

/// Newest first.
pub fn history_rows(tasks: &TaskCollection) -> Vec<HistoryRow> {
    tasks
        .iter()
        .rev()
        .map(|task| HistoryRow {
            id: task.id().to_string(),
            url: task.url().to_string(),
            created_at: task.created_at(),
            status: task.status(),
            title: task.result().map(|r| r.title.clone()),
            sentiment: task.result().map(|r| r.sentiment),
            error: task.error().map(str::to_string),
        })
        .collect()
}

fn activity_window(tasks: &TaskCollection, today: NaiveDate) -> Vec<DailyActivity> {
    let days: Vec<NaiveDate> = (0..ACTIVITY_WINDOW_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect();

    let mut activity: Vec<DailyActivity> = days
        .into_iter()
        .map(|date| DailyActivity {
            date,
            weekday: date.weekday(),
            tasks: 0,
        })
        .collect();

    for task in tasks {
        let Some(created) = DateTime::from_timestamp_millis(task.created_at()) else {
            continue;
        };
        let date = created.date_naive();
        if let Some(day) = activity.iter_mut().find(|day| day.date == date) {
            day.tasks += 1;
        }
    }
    activity
}
