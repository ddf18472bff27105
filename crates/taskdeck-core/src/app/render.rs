//! Plain-text rendering of the dashboard.

use std::fmt;

use chrono::{DateTime, Utc};

use super::dashboard::{ActivityItem, DashboardModel, DashboardView, ProjectRow, TaskProgress};
use crate::domain::TaskStatus;

const BAR_WIDTH: usize = 20;

impl fmt::Display for DashboardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardModel::Loading => writeln!(f, "Loading dashboard..."),
            DashboardModel::Ready(view) => view.fmt(f),
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.greeting)?;
        writeln!(f, "Here's what's happening with your projects today")?;

        for error in &self.errors {
            writeln!(f, "! {error}")?;
        }
        writeln!(f)?;

        for card in &self.cards {
            writeln!(f, "{:<16} {:>5}   {}", card.title, card.value, card.trend)?;
        }

        if let Some(progress) = &self.progress {
            writeln!(f)?;
            write_progress(f, progress)?;
        }

        if let Some(items) = &self.recent_activity {
            writeln!(f)?;
            writeln!(f, "Recent Activity")?;
            for item in items {
                write_activity(f, item)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Projects Overview")?;
        writeln!(
            f,
            "  {:<24} {:<10} {:>6}  {:<11} Team",
            "Project Name", "Status", "Tasks", "Due Date"
        )?;
        for row in &self.projects {
            write_project(f, row)?;
        }
        Ok(())
    }
}

fn write_progress(f: &mut fmt::Formatter<'_>, progress: &TaskProgress) -> fmt::Result {
    let filled = (progress.percent as usize * BAR_WIDTH / 100).min(BAR_WIDTH);
    writeln!(
        f,
        "Task Progress  {:>3}%  [{}{}]",
        progress.percent,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )?;
    writeln!(
        f,
        "Completed: {}  Total: {}",
        progress.completed, progress.total
    )
}

fn write_activity(f: &mut fmt::Formatter<'_>, item: &ActivityItem) -> fmt::Result {
    let marker = match item.status {
        TaskStatus::Completed => "[x]",
        TaskStatus::InProgress => "[~]",
        _ => "[ ]",
    };
    let due = item
        .due_date
        .map(format_date)
        .unwrap_or_else(|| "No due date".to_string());
    writeln!(f, "  {marker} {:<28} {:<12} Due: {due}", item.title, item.status)
}

fn write_project(f: &mut fmt::Formatter<'_>, row: &ProjectRow) -> fmt::Result {
    let status = row.status.as_ref().map(|s| s.as_str()).unwrap_or("-");
    let due = row.due_date.map(format_date).unwrap_or_else(|| "-".to_string());
    let mut team: String = row.avatars.iter().collect();
    if row.more_members > 0 {
        team.push_str(&format!(" +{}", row.more_members));
    }
    writeln!(
        f,
        "  {:<24} {:<10} {:>6}  {:<11} {team}",
        row.name,
        status,
        format!("{} tasks", row.task_count),
        due
    )
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
