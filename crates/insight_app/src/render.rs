//! Plain-text rendering of the views for the terminal.

use std::fmt::Write as _;

use chrono::DateTime;
use insight_core::{HistoryRow, OverviewView, Sentiment, Task, TaskStatus};
use insight_engine::ExportStatus;

const BAR: char = '#';

fn timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

pub fn overview(view: &OverviewView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total analyses   {}", view.total);
    let _ = writeln!(out, "Success rate     {}%", view.success_rate_percent);
    let _ = writeln!(out, "Processing       {}", view.processing);
    let _ = writeln!(out, "Failed           {}", view.failed);
    let _ = writeln!(out);
    let _ = writeln!(out, "Sentiment");
    for sentiment in Sentiment::ALL {
        let _ = writeln!(out, "  {:<9} {}", sentiment.as_str(), view.sentiment.get(sentiment));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Activity");
    for day in &view.activity {
        let _ = writeln!(
            out,
            "  {} {} {:>3} {}",
            day.weekday,
            day.date.format("%m-%d"),
            day.tasks,
            BAR.to_string().repeat(day.tasks)
        );
    }
    out
}

pub fn history(rows: &[HistoryRow]) -> String {
    if rows.is_empty() {
        return "No analyses yet.\n".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let label = row.title.as_deref().unwrap_or(&row.url);
        let _ = write!(
            out,
            "{:<10} {}  {}  {}",
            row.status.label(),
            timestamp(row.created_at),
            row.id,
            label
        );
        if let Some(sentiment) = row.sentiment {
            let _ = write!(out, " [{sentiment}]");
        }
        if let Some(error) = &row.error {
            let _ = write!(out, " ({error})");
        }
        out.push('\n');
    }
    out
}

pub fn task(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Task     {}", task.id());
    let _ = writeln!(out, "URL      {}", task.url());
    let _ = writeln!(out, "Created  {}", timestamp(task.created_at()));
    let _ = writeln!(out, "Status   {}", task.status().label());

    if let Some(error) = task.error() {
        let _ = writeln!(out, "Error    {error}");
    }
    let Some(result) = task.result() else {
        if task.status() == TaskStatus::Processing {
            let _ = writeln!(out, "Analysis still in progress.");
        }
        return out;
    };

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", result.title);
    let _ = writeln!(out, "{}", result.summary);
    let _ = writeln!(out);
    let _ = writeln!(out, "Sentiment     {}", result.sentiment);
    let _ = writeln!(
        out,
        "Reading time  {} min",
        result.estimated_reading_time_minutes
    );
    let _ = writeln!(out, "Keywords      {}", result.keywords.join(", "));
    let _ = writeln!(out, "Entities      {}", result.main_entities.join(", "));
    if !result.sources.is_empty() {
        let _ = writeln!(out, "Sources");
        for source in &result.sources {
            let _ = writeln!(out, "  {} <{}>", source.title, source.uri);
        }
    }
    out
}

pub fn export(status: &ExportStatus) -> String {
    let mut out = format!("{}\n", status.message());
    if let ExportStatus::Saved { paths, .. } = status {
        for path in paths {
            let _ = writeln!(out, "  {}", path.display());
        }
    }
    out
}
