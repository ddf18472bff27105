//! AppState: every slice the client holds.

use crate::domain::{Project, Task, User};

use super::slice::{Slice, SliceControl};

/// Which slice an action drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceKind {
    Projects,
    /// Result of `GET /projects/user`.
    UserProjects,
    Tasks,
    Users,
}

impl SliceKind {
    pub fn name(self) -> &'static str {
        match self {
            SliceKind::Projects => "projects",
            SliceKind::UserProjects => "userProjects",
            SliceKind::Tasks => "tasks",
            SliceKind::Users => "users",
        }
    }
}

/// Created empty at store initialization and lives as long as the store.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub projects: Slice<Project>,
    pub user_projects: Slice<Project>,
    pub tasks: Slice<Task>,
    pub users: Slice<User>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice_mut(&mut self, kind: SliceKind) -> &mut dyn SliceControl {
        match kind {
            SliceKind::Projects => &mut self.projects,
            SliceKind::UserProjects => &mut self.user_projects,
            SliceKind::Tasks => &mut self.tasks,
            SliceKind::Users => &mut self.users,
        }
    }

    pub fn is_loading(&self, kind: SliceKind) -> bool {
        match kind {
            SliceKind::Projects => self.projects.is_loading(),
            SliceKind::UserProjects => self.user_projects.is_loading(),
            SliceKind::Tasks => self.tasks.is_loading(),
            SliceKind::Users => self.users.is_loading(),
        }
    }

    /// Server-confirmed project change, mirrored into both project lists.
    pub fn apply_project(&mut self, project: Project) {
        self.user_projects.merge_existing(&project);
        self.projects.upsert(project);
    }

    /// Server-confirmed project deletion, mirrored into both project lists.
    pub fn apply_project_removed(&mut self, id: &crate::domain::ProjectId) {
        self.user_projects.drop_item(id);
        self.projects.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProjectId;

    fn project(id: &str, name: &str) -> Project {
        serde_json::from_value(serde_json::json!({ "_id": id, "name": name })).unwrap()
    }

    #[test]
    fn project_changes_reach_both_lists() {
        let mut state = AppState::new();
        state.projects.begin();
        state.projects.replace_all(vec![project("p1", "A"), project("p2", "B")]);
        state.user_projects.begin();
        state.user_projects.replace_all(vec![project("p2", "B")]);

        state.projects.begin();
        state.apply_project(project("p2", "B2"));
        assert_eq!(state.projects.items()[1].name, "B2");
        assert_eq!(state.user_projects.items()[0].name, "B2");

        state.projects.begin();
        state.apply_project_removed(&ProjectId::new("p2"));
        assert_eq!(state.projects.items().len(), 1);
        assert!(state.user_projects.items().is_empty());
        assert!(!state.is_loading(SliceKind::Projects));
    }

    #[test]
    fn slice_mut_targets_the_named_slice() {
        let mut state = AppState::new();
        state.slice_mut(SliceKind::Tasks).begin();
        assert!(state.is_loading(SliceKind::Tasks));
        assert!(!state.is_loading(SliceKind::Users));
        assert!(!state.is_loading(SliceKind::Projects));
    }
}
