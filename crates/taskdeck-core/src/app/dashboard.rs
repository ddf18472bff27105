//! Dashboard - スライスから表示用の値を導出する
//!
//! すべて純粋関数。描画のたびに呼び直し、キャッシュはしない。
//! 入力が未取得 (`None`) の場合は空として扱う。

use chrono::{DateTime, Utc};

use crate::domain::{Project, ProjectStatus, Task, TaskStatus, User};
use crate::store::{AppState, SliceControl, SliceError};

/// Rows shown in "Recent Activity" and "Projects Overview".
pub const PREVIEW_LIMIT: usize = 5;

/// Team avatars shown per project before collapsing into "+N".
pub const AVATAR_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

/// Per-status counts by exact match. Unknown statuses count toward `total` only.
pub fn task_stats(tasks: Option<&[Task]>) -> TaskStats {
    let tasks = tasks.unwrap_or_default();
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.has_status(&status)).count();
    TaskStats {
        total: tasks.len(),
        completed: count(TaskStatus::Completed),
        in_progress: count(TaskStatus::InProgress),
        pending: count(TaskStatus::Pending),
    }
}

pub fn project_stats(projects: Option<&[Project]>) -> ProjectStats {
    let projects = projects.unwrap_or_default();
    let count = |status: ProjectStatus| projects.iter().filter(|p| p.has_status(&status)).count();
    ProjectStats {
        total: projects.len(),
        active: count(ProjectStatus::Active),
        completed: count(ProjectStatus::Completed),
    }
}

/// `round(completed / total * 100)`, 0 when `total` is 0.
pub fn completion_percentage(total: usize, completed: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

/// Users whose role is exactly `admin`.
pub fn admin_count(users: Option<&[User]>) -> usize {
    users.unwrap_or_default().iter().filter(|u| u.is_admin()).count()
}

/// Share of projects that are active, 0 when none are.
pub fn active_project_percentage(stats: &ProjectStats) -> u32 {
    if stats.active == 0 {
        return 0;
    }
    completion_percentage(stats.total, stats.active)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: usize,
    pub trend: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProgress {
    pub percent: u32,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityItem {
    pub title: String,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub name: String,
    pub status: Option<ProjectStatus>,
    pub task_count: usize,
    pub due_date: Option<DateTime<Utc>>,
    /// First letters of the first few team members.
    pub avatars: Vec<char>,
    /// Members not shown as avatars.
    pub more_members: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub greeting: String,
    pub cards: Vec<StatCard>,
    /// `None` until tasks have been loaded.
    pub progress: Option<TaskProgress>,
    /// `None` until tasks have been loaded.
    pub recent_activity: Option<Vec<ActivityItem>>,
    pub projects: Vec<ProjectRow>,
    /// Last error of each slice, in projects/tasks/users order.
    pub errors: Vec<SliceError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardModel {
    /// At least one of the three dashboard fetches is outstanding.
    Loading,
    Ready(DashboardView),
}

impl DashboardModel {
    /// Derive everything the dashboard shows from one store snapshot.
    pub fn derive(state: &AppState, user_name: &str) -> Self {
        if state.tasks.is_loading() || state.projects.is_loading() || state.users.is_loading() {
            return DashboardModel::Loading;
        }

        let tasks = state.tasks.data();
        let users = state.users.data();
        let task_stats = task_stats(tasks);
        let project_stats = project_stats(state.projects.data());
        let completion = completion_percentage(task_stats.total, task_stats.completed);

        let cards = vec![
            StatCard {
                title: "Total Tasks",
                value: task_stats.total,
                trend: format!("{completion}% completed"),
            },
            StatCard {
                title: "Active Projects",
                value: project_stats.total,
                trend: format!("{}% completed", active_project_percentage(&project_stats)),
            },
            StatCard {
                title: "Team Members",
                value: users.map_or(0, <[User]>::len),
                trend: format!("{} admins", admin_count(users)),
            },
            StatCard {
                title: "Tasks Completed",
                value: task_stats.completed,
                trend: format!("{completion}% of total"),
            },
        ];

        let progress = tasks.map(|_| TaskProgress {
            percent: completion,
            completed: task_stats.completed,
            total: task_stats.total,
        });

        let recent_activity = tasks.map(|tasks| {
            tasks
                .iter()
                .take(PREVIEW_LIMIT)
                .map(|task| ActivityItem {
                    title: task.title.clone(),
                    status: task.display_status(),
                    due_date: task.due_date,
                })
                .collect()
        });

        let projects = state
            .projects
            .items()
            .iter()
            .take(PREVIEW_LIMIT)
            .map(project_row)
            .collect();

        let errors = [
            state.projects.error(),
            state.tasks.error(),
            state.users.error(),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

        DashboardModel::Ready(DashboardView {
            greeting: format!("Welcome back, {user_name}!"),
            cards,
            progress,
            recent_activity,
            projects,
            errors,
        })
    }
}

fn project_row(project: &Project) -> ProjectRow {
    ProjectRow {
        name: project.name.clone(),
        status: project.status.clone(),
        task_count: project.task_count(),
        due_date: project.due_date,
        avatars: project
            .team
            .iter()
            .take(AVATAR_LIMIT)
            .map(|m| m.initial())
            .collect(),
        more_members: project.team.len().saturating_sub(AVATAR_LIMIT),
    }
}
