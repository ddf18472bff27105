//! API ports - リモート REST API の抽象化
//!
//! 各メソッドは HTTP 呼び出し 1 回に 1:1 で対応します。
//! 戻り値はサーバーのレスポンス本文そのもので、加工はしません。
//!
//! # 実装
//! - `impls::HttpBackend`: reqwest による本番実装
//! - `impls::InMemoryBackend`: テスト・デモ用のサーバー代役

use async_trait::async_trait;

use crate::domain::{
    ApiError, MilestoneDraft, MilestoneId, MilestoneStatus, Project, ProjectDraft, ProjectId,
    ProjectPatch, Task, User, UserId,
};

/// `/projects` 配下のエンドポイント
#[async_trait]
pub trait ProjectApi: Send + Sync {
    /// `GET /projects`
    async fn list_projects(&self) -> Result<Vec<Project>, ApiError>;

    /// `GET /projects/user`: projects the current user belongs to.
    async fn list_user_projects(&self) -> Result<Vec<Project>, ApiError>;

    /// `POST /projects`
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, ApiError>;

    /// `PUT /projects/:id`
    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, ApiError>;

    /// `DELETE /projects/:id`
    async fn delete_project(&self, id: &ProjectId) -> Result<(), ApiError>;

    /// `POST /projects/:id/team` with `{ userId }`
    async fn add_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, ApiError>;

    /// `DELETE /projects/:id/team/:userId`
    async fn remove_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, ApiError>;

    /// `POST /projects/:id/milestones`
    async fn add_milestone(
        &self,
        id: &ProjectId,
        milestone: &MilestoneDraft,
    ) -> Result<Project, ApiError>;

    /// `PUT /projects/:id/milestones/:milestoneId` with `{ status }`
    async fn update_milestone_status(
        &self,
        id: &ProjectId,
        milestone_id: &MilestoneId,
        status: &MilestoneStatus,
    ) -> Result<Project, ApiError>;
}

/// `/tasks` 配下のエンドポイント
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /tasks`
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;
}

/// `/users` 配下のエンドポイント
#[async_trait]
pub trait UserApi: Send + Sync {
    /// `GET /users`
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
}

/// Backend は 3 つの API をまとめたもの（Dispatcher が保持する）
pub trait Backend: ProjectApi + TaskApi + UserApi {}

impl<T: ProjectApi + TaskApi + UserApi> Backend for T {}
