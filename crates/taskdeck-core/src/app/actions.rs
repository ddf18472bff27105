//! Dispatcher - アクション (thunk) の実行
//!
//! # 流れ
//! 1. pending: 対象スライスの pending を 1 増やす (loading = true)
//! 2. backend を 1 回だけ呼ぶ
//! 3. fulfilled: レスポンスでデータを置き換え/マージし、error をクリア
//!    rejected: error を記録し、データはそのまま
//!
//! リクエスト途中で future が drop された場合 (セッションの unmount など) は
//! `PendingGuard` が pending を戻すので、loading が true のまま残ることはない。
//!
//! 削除は楽観的に行わない。サーバーが 2xx を返してから一覧から外す。

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::operation::Operation;
use crate::domain::{
    ApiError, MilestoneDraft, MilestoneId, MilestoneStatus, Project, ProjectDraft, ProjectId,
    ProjectPatch, Task, User, UserId,
};
use crate::ports::Backend;
use crate::store::{AppState, SliceControl, SliceError, Store};

/// Runs actions against a backend and records their phases in the store.
#[derive(Clone)]
pub struct Dispatcher {
    store: Store,
    backend: Arc<dyn Backend>,
}

impl Dispatcher {
    pub fn new(store: Store, backend: Arc<dyn Backend>) -> Self {
        Self { store, backend }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn fetch_projects(&self) -> Result<Vec<Project>, SliceError> {
        self.run(
            Operation::FetchProjects,
            self.backend.list_projects(),
            |state, projects| state.projects.replace_all(projects),
        )
        .await
    }

    pub async fn fetch_user_projects(&self) -> Result<Vec<Project>, SliceError> {
        self.run(
            Operation::FetchUserProjects,
            self.backend.list_user_projects(),
            |state, projects| state.user_projects.replace_all(projects),
        )
        .await
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> Result<Project, SliceError> {
        self.run(
            Operation::CreateProject,
            self.backend.create_project(draft),
            AppState::apply_project,
        )
        .await
    }

    pub async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<Project, SliceError> {
        self.run(
            Operation::UpdateProject,
            self.backend.update_project(id, patch),
            AppState::apply_project,
        )
        .await
    }

    /// Resolves to the deleted id once the server confirms.
    pub async fn delete_project(&self, id: &ProjectId) -> Result<ProjectId, SliceError> {
        let request = async {
            self.backend.delete_project(id).await?;
            Ok::<_, ApiError>(id.clone())
        };
        self.run(Operation::DeleteProject, request, |state, id| {
            state.apply_project_removed(&id)
        })
        .await
    }

    pub async fn add_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, SliceError> {
        self.run(
            Operation::AddTeamMember,
            self.backend.add_team_member(id, user_id),
            AppState::apply_project,
        )
        .await
    }

    pub async fn remove_team_member(
        &self,
        id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Project, SliceError> {
        self.run(
            Operation::RemoveTeamMember,
            self.backend.remove_team_member(id, user_id),
            AppState::apply_project,
        )
        .await
    }

    pub async fn add_milestone(
        &self,
        id: &ProjectId,
        milestone: &MilestoneDraft,
    ) -> Result<Project, SliceError> {
        self.run(
            Operation::AddMilestone,
            self.backend.add_milestone(id, milestone),
            AppState::apply_project,
        )
        .await
    }

    pub async fn update_milestone_status(
        &self,
        id: &ProjectId,
        milestone_id: &MilestoneId,
        status: &MilestoneStatus,
    ) -> Result<Project, SliceError> {
        self.run(
            Operation::UpdateMilestoneStatus,
            self.backend.update_milestone_status(id, milestone_id, status),
            AppState::apply_project,
        )
        .await
    }

    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, SliceError> {
        self.run(
            Operation::FetchTasks,
            self.backend.list_tasks(),
            |state, tasks| state.tasks.replace_all(tasks),
        )
        .await
    }

    pub async fn fetch_users(&self) -> Result<Vec<User>, SliceError> {
        self.run(
            Operation::FetchUsers,
            self.backend.list_users(),
            |state, users| state.users.replace_all(users),
        )
        .await
    }

    /// pending -> (request) -> fulfilled | rejected
    ///
    /// `fulfill` must settle the operation's slice.
    async fn run<T, Fut>(
        &self,
        op: Operation,
        request: Fut,
        fulfill: impl FnOnce(&mut AppState, T),
    ) -> Result<T, SliceError>
    where
        T: Clone,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let kind = op.slice();
        self.store.update(|state| state.slice_mut(kind).begin());
        debug!(action = op.type_name(), "pending");

        let guard = PendingGuard {
            store: &self.store,
            op,
            armed: true,
        };
        let outcome = request.await;
        guard.disarm();

        match outcome {
            Ok(value) => {
                self.store.update(|state| fulfill(state, value.clone()));
                info!(action = op.type_name(), "fulfilled");
                Ok(value)
            }
            Err(err) => {
                let rejected = op.reject_with(&err);
                warn!(
                    action = op.type_name(),
                    kind = ?rejected.kind,
                    error = %err,
                    message = %rejected.message,
                    "rejected"
                );
                self.store
                    .update(|state| state.slice_mut(kind).reject(rejected.clone()));
                Err(rejected)
            }
        }
    }
}

/// Settles the pending counter when an in-flight action is dropped.
struct PendingGuard<'a> {
    store: &'a Store,
    op: Operation,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let kind = self.op.slice();
            self.store.update(|state| state.slice_mut(kind).cancel());
            debug!(action = self.op.type_name(), "cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{ErrorKind, ProjectStatus};
    use crate::impls::{Endpoint, InMemoryBackend};

    fn dispatcher_with(backend: InMemoryBackend) -> (Dispatcher, Arc<InMemoryBackend>) {
        let backend = Arc::new(backend);
        let dispatcher = Dispatcher::new(Store::new(), backend.clone());
        (dispatcher, backend)
    }

    #[tokio::test]
    async fn successful_fetch_stores_exact_payload() {
        let (dispatcher, backend) = dispatcher_with(InMemoryBackend::seeded());

        let projects = dispatcher.fetch_projects().await.unwrap();

        let state = dispatcher.store().snapshot();
        assert!(!state.projects.is_loading());
        assert_eq!(state.projects.data(), Some(backend.projects().as_slice()));
        assert_eq!(projects.len(), 3);
        assert!(state.projects.error().is_none());
    }

    #[tokio::test]
    async fn failed_fetch_records_server_message() {
        let (dispatcher, backend) = dispatcher_with(InMemoryBackend::seeded());
        backend.fail_next(Endpoint::ListProjects, ApiError::status(500, "boom"));

        let err = dispatcher.fetch_projects().await.unwrap_err();

        assert_eq!(err.message, "boom");
        let state = dispatcher.store().snapshot();
        assert!(!state.projects.is_loading());
        assert_eq!(state.projects.error().map(|e| e.message.as_str()), Some("boom"));
        assert_eq!(state.projects.data(), None);
    }

    #[tokio::test]
    async fn failed_fetch_without_body_uses_fallback() {
        let (dispatcher, backend) = dispatcher_with(InMemoryBackend::seeded());
        backend.fail_next(Endpoint::ListTasks, ApiError::bare_status(500));
        backend.fail_next(Endpoint::ListUsers, ApiError::Decode("expected a list".into()));

        let tasks = dispatcher.fetch_tasks().await.unwrap_err();
        let users = dispatcher.fetch_users().await.unwrap_err();

        assert_eq!(tasks.message, "Failed to fetch tasks");
        assert_eq!(users.message, "Failed to fetch users");
        assert_eq!(users.kind, ErrorKind::Decode);
    }

    #[tokio::test]
    async fn next_success_clears_error() {
        let (dispatcher, backend) = dispatcher_with(InMemoryBackend::seeded());
        backend.fail_next(Endpoint::ListUsers, ApiError::status(503, "down"));
        dispatcher.fetch_users().await.unwrap_err();

        dispatcher.fetch_users().await.unwrap();

        let state = dispatcher.store().snapshot();
        assert!(state.users.error().is_none());
        assert_eq!(state.users.items().len(), 5);
    }

    #[tokio::test]
    async fn user_projects_go_to_their_own_slice() {
        let (dispatcher, _) = dispatcher_with(InMemoryBackend::seeded());

        let mine = dispatcher.fetch_user_projects().await.unwrap();

        let ids: Vec<&str> = mine.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        let state = dispatcher.store().snapshot();
        assert_eq!(state.user_projects.items().len(), 2);
        assert_eq!(state.projects.data(), None);
    }

    #[tokio::test]
    async fn delete_removes_only_after_confirmation() {
        let (dispatcher, backend) = dispatcher_with(InMemoryBackend::seeded());
        dispatcher.fetch_projects().await.unwrap();
        let p2 = ProjectId::new("p2");

        backend.fail_next(Endpoint::DeleteProject, ApiError::status(403, "Not allowed"));
        let err = dispatcher.delete_project(&p2).await.unwrap_err();
        assert_eq!(err.message, "Not allowed");
        assert!(dispatcher.store().read(|s| s.projects.get(&p2).is_some()));

        let deleted = dispatcher.delete_project(&p2).await.unwrap();
        assert_eq!(deleted, p2);
        let state = dispatcher.store().snapshot();
        assert!(state.projects.get(&p2).is_none());
        assert_eq!(state.projects.items().len(), 2);
        assert!(state.projects.error().is_none());
    }

    #[tokio::test]
    async fn mutations_merge_the_returned_project() {
        let (dispatcher, _) = dispatcher_with(InMemoryBackend::seeded());
        dispatcher.fetch_projects().await.unwrap();
        dispatcher.fetch_user_projects().await.unwrap();
        let p1 = ProjectId::new("p1");

        let patch = ProjectPatch {
            status: Some(ProjectStatus::OnHold),
            ..ProjectPatch::default()
        };
        dispatcher.update_project(&p1, &patch).await.unwrap();
        dispatcher
            .remove_team_member(&p1, &UserId::new("u4"))
            .await
            .unwrap();
        dispatcher
            .update_milestone_status(&p1, &MilestoneId::new("m1"), &MilestoneStatus::Completed)
            .await
            .unwrap();

        let state = dispatcher.store().snapshot();
        let project = state.projects.get(&p1).unwrap();
        assert_eq!(project.status, Some(ProjectStatus::OnHold));
        assert_eq!(project.team.len(), 3);
        assert_eq!(
            project.milestone(&MilestoneId::new("m1")).unwrap().status,
            Some(MilestoneStatus::Completed)
        );
        assert_eq!(state.user_projects.get(&p1), Some(project));
        assert!(!state.projects.is_loading());
    }

    #[tokio::test]
    async fn create_appends_and_add_member_rejects_duplicates() {
        let (dispatcher, _) = dispatcher_with(InMemoryBackend::seeded());
        dispatcher.fetch_projects().await.unwrap();

        let created = dispatcher
            .create_project(&ProjectDraft::new("Docs site"))
            .await
            .unwrap();
        let err = dispatcher
            .add_team_member(&created.id, &UserId::new("u9"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "User not found");

        dispatcher
            .add_team_member(&created.id, &UserId::new("u2"))
            .await
            .unwrap();
        let dup = dispatcher
            .add_team_member(&created.id, &UserId::new("u2"))
            .await
            .unwrap_err();
        assert_eq!(dup.message, "User is already a team member");

        let state = dispatcher.store().snapshot();
        assert_eq!(state.projects.items().len(), 4);
        assert_eq!(state.projects.get(&created.id).unwrap().team.len(), 1);
        assert_eq!(
            state.projects.error().map(|e| e.operation),
            Some("projects/addTeamMember")
        );
    }

    #[tokio::test]
    async fn add_milestone_to_missing_project_is_rejected() {
        let (dispatcher, _) = dispatcher_with(InMemoryBackend::seeded());
        let err = dispatcher
            .add_milestone(&ProjectId::new("nope"), &MilestoneDraft::new("Beta"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Project not found");
        assert_eq!(err.kind, ErrorKind::Status);
    }

    #[tokio::test]
    async fn dropped_action_settles_loading_without_touching_data() {
        let backend = InMemoryBackend::seeded().with_latency(Duration::from_secs(60));
        let (dispatcher, _) = dispatcher_with(backend);

        let inflight = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.fetch_tasks().await })
        };
        while !dispatcher.store().read(|s| s.tasks.is_loading()) {
            tokio::task::yield_now().await;
        }

        inflight.abort();
        assert!(inflight.await.unwrap_err().is_cancelled());

        let state = dispatcher.store().snapshot();
        assert!(!state.tasks.is_loading());
        assert_eq!(state.tasks.data(), None);
        assert!(state.tasks.error().is_none());
    }
}
