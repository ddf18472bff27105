//! InMemoryBackend - 開発・テスト用のサーバー代役
//!
//! # 学習ポイント
//! - サーバーが返すはずのレスポンスをプロセス内で再現する
//! - エンドポイント単位で失敗を注入できる（`fail_next`）
//! - 遅延を入れてキャンセルの挙動を確かめられる（`with_latency`）
//!
//! 状態は std の Mutex で守ります。ロックを持ったまま await しないこと。

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};

use crate::domain::{
    ApiError, Id, Milestone, MilestoneDraft, MilestoneId, MilestoneStatus, Project, ProjectDraft,
    ProjectId, ProjectPatch, ProjectRef, ProjectStatus, Role, Task, TaskRef, TaskStatus,
    TeamMember, User, UserId,
};
use crate::ports::{IdGenerator, ProjectApi, SystemClock, TaskApi, UlidGenerator, UserApi};

/// Endpoint は失敗注入のキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListProjects,
    ListUserProjects,
    CreateProject,
    UpdateProject,
    DeleteProject,
    AddTeamMember,
    RemoveTeamMember,
    AddMilestone,
    UpdateMilestoneStatus,
    ListTasks,
    ListUsers,
}

#[derive(Default)]
struct InMemoryState {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    users: Vec<User>,
    /// Whose projects `GET /projects/user` returns.
    current_user: Option<UserId>,
    /// One-shot failures, consumed by the next call to the endpoint.
    failures: HashMap<Endpoint, ApiError>,
}

pub struct InMemoryBackend {
    state: Mutex<InMemoryState>,
    ids: Box<dyn IdGenerator>,
    latency: Option<Duration>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState::default()),
            ids: Box::new(UlidGenerator::new(SystemClock)),
            latency: None,
        }
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.lock().projects = projects;
        self
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.lock().tasks = tasks;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        self.lock().users = users;
        self
    }

    pub fn signed_in_as(self, user_id: UserId) -> Self {
        self.lock().current_user = Some(user_id);
        self
    }

    /// Make the next call to `endpoint` fail with `error`.
    pub fn fail_next(&self, endpoint: Endpoint, error: ApiError) {
        self.lock().failures.insert(endpoint, error);
    }

    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    /// Demo data: a small team with a handful of projects and tasks.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let user = |id: &str, name: &str, role: Role| User {
            id: UserId::new(id),
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            role: Some(role),
            avatar: None,
        };
        let users = vec![
            user("u1", "Ada", Role::Admin),
            user("u2", "Brian", Role::Member),
            user("u3", "Chen", Role::Member),
            user("u4", "Dana", Role::Member),
            user("u5", "Eve", Role::Admin),
        ];

        let task = |id: &str, title: &str, status: TaskStatus, project: &str, days: i64| Task {
            id: Id::new(id),
            title: title.to_string(),
            status: Some(status),
            due_date: Some(now + ChronoDuration::days(days)),
            project: Some(ProjectRef::Id(ProjectId::new(project))),
        };
        let tasks = vec![
            task("t1", "Draft landing copy", TaskStatus::Completed, "p1", -3),
            task("t2", "Wire up checkout", TaskStatus::InProgress, "p1", 4),
            task("t3", "Accessibility pass", TaskStatus::Pending, "p1", 9),
            task("t4", "Crash reporting", TaskStatus::Completed, "p2", -1),
            task("t5", "Offline mode", TaskStatus::InProgress, "p2", 12),
            task("t6", "Quarterly report", TaskStatus::Completed, "p3", -20),
        ];

        let members = |ids: &[usize]| -> Vec<TeamMember> {
            ids.iter()
                .map(|&i| TeamMember::Populated(users[i].clone()))
                .collect()
        };
        let refs = |ids: &[&str]| -> Vec<TaskRef> {
            ids.iter().map(|id| TaskRef::Id(Id::new(*id))).collect()
        };
        let projects = vec![
            Project {
                id: ProjectId::new("p1"),
                name: "Website relaunch".to_string(),
                description: Some("New marketing site".to_string()),
                status: Some(ProjectStatus::Active),
                due_date: Some(now + ChronoDuration::days(30)),
                tasks: refs(&["t1", "t2", "t3"]),
                team: members(&[0, 1, 2, 3]),
                milestones: vec![Milestone {
                    id: MilestoneId::new("m1"),
                    title: "Content freeze".to_string(),
                    description: None,
                    status: Some(MilestoneStatus::InProgress),
                    due_date: Some(now + ChronoDuration::days(10)),
                }],
            },
            Project {
                id: ProjectId::new("p2"),
                name: "Mobile app".to_string(),
                description: None,
                status: Some(ProjectStatus::Active),
                due_date: Some(now + ChronoDuration::days(60)),
                tasks: refs(&["t4", "t5"]),
                team: members(&[1, 4]),
                milestones: vec![],
            },
            Project {
                id: ProjectId::new("p3"),
                name: "Annual report".to_string(),
                description: None,
                status: Some(ProjectStatus::Completed),
                due_date: Some(now - ChronoDuration::days(14)),
                tasks: refs(&["t6"]),
                team: members(&[0]),
                milestones: vec![],
            },
        ];

        Self::new()
            .with_users(users)
            .with_tasks(tasks)
            .with_projects(projects)
            .signed_in_as(UserId::new("u1"))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulated latency, then any injected failure.
    async fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.lock().failures.remove(&endpoint) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn with_project<R>(
        &self,
        id: &ProjectId,
        f: impl FnOnce(&mut Project, &[User]) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let mut state = self.lock();
        let InMemoryState {
            projects, users, ..
        } = &mut *state;
        let project = projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| ApiError::status(404, "Project not found"))?;
        f(project, users)
    }
}

fn member_for(users: &[User], user_id: &UserId) -> TeamMember {
    users
        .iter()
        .find(|u| &u.id == user_id)
        .map(|u| TeamMember::Populated(u.clone()))
        .unwrap_or_else(|| TeamMember::Id(user_id.clone()))
}

#[async_trait]
impl ProjectApi for InMemoryBackend {
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.enter(Endpoint::ListProjects).await?;
        Ok(self.lock().projects.clone())
    }

    async fn list_user_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.enter(Endpoint::ListUserProjects).await?;
        let state = self.lock();
        let Some(me) = &state.current_user else {
            return Err(ApiError::status(401, "Not authorized, no token"));
        };
        Ok(state
            .projects
            .iter()
            .filter(|p| p.team.iter().any(|m| m.user_id() == me))
            .cloned()
            .collect())
    }

    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError> {
        self.enter(Endpoint::CreateProject).await?;
        if draft.name.trim().is_empty() {
            return Err(ApiError::status(400, "Project name is required"));
        }
        let mut state = self.lock();
        let team = draft
            .team
            .iter()
            .map(|id| member_for(&state.users, id))
            .collect();
        let project = Project {
            id: Id::new(self.ids.next_raw()),
            name: draft.name.clone(),
            description: draft.description.clone(),
            status: Some(draft.status.clone().unwrap_or(ProjectStatus::Active)),
            due_date: draft.due_date,
            tasks: vec![],
            team,
            milestones: vec![],
        };
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ApiError> {
        self.enter(Endpoint::UpdateProject).await?;
        self.with_project(id, |project, _| {
            patch.apply_to(project);
            Ok(project.clone())
        })
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), ApiError> {
        self.enter(Endpoint::DeleteProject).await?;
        let mut state = self.lock();
        let before = state.projects.len();
        state.projects.retain(|p| &p.id != id);
        if state.projects.len() == before {
            return Err(ApiError::status(404, "Project not found"));
        }
        Ok(())
    }

    async fn add_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, ApiError> {
        self.enter(Endpoint::AddTeamMember).await?;
        self.with_project(id, |project, users| {
            if !users.iter().any(|u| &u.id == user_id) {
                return Err(ApiError::status(404, "User not found"));
            }
            if project.team.iter().any(|m| m.user_id() == user_id) {
                return Err(ApiError::status(400, "User is already a team member"));
            }
            project.team.push(member_for(users, user_id));
            Ok(project.clone())
        })
    }

    async fn remove_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, ApiError> {
        self.enter(Endpoint::RemoveTeamMember).await?;
        self.with_project(id, |project, _| {
            project.team.retain(|m| m.user_id() != user_id);
            Ok(project.clone())
        })
    }

    async fn add_milestone(
        &self,
        id: &ProjectId,
        milestone: &MilestoneDraft,
    ) -> Result<Project, ApiError> {
        self.enter(Endpoint::AddMilestone).await?;
        let milestone_id: MilestoneId = Id::new(self.ids.next_raw());
        self.with_project(id, |project, _| {
            project.milestones.push(Milestone {
                id: milestone_id,
                title: milestone.title.clone(),
                description: milestone.description.clone(),
                status: Some(milestone.status.clone().unwrap_or(MilestoneStatus::Pending)),
                due_date: milestone.due_date,
            });
            Ok(project.clone())
        })
    }

    async fn update_milestone_status(
        &self,
        id: &ProjectId,
        milestone_id: &MilestoneId,
        status: &MilestoneStatus,
    ) -> Result<Project, ApiError> {
        self.enter(Endpoint::UpdateMilestoneStatus).await?;
        self.with_project(id, |project, _| {
            let milestone = project
                .milestones
                .iter_mut()
                .find(|m| &m.id == milestone_id)
                .ok_or_else(|| ApiError::status(404, "Milestone not found"))?;
            milestone.status = Some(status.clone());
            Ok(project.clone())
        })
    }
}

#[async_trait]
impl TaskApi for InMemoryBackend {
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.enter(Endpoint::ListTasks).await?;
        Ok(self.lock().tasks.clone())
    }
}

#[async_trait]
impl UserApi for InMemoryBackend {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.enter(Endpoint::ListUsers).await?;
        Ok(self.lock().users.clone())
    }
}
