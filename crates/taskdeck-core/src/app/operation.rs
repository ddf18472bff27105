//! Operation - アクションの一覧
//!
//! 1 Operation = 1 REST 呼び出し。型名・対象スライス・失敗時の既定メッセージを持つ。

use std::fmt;

use crate::domain::ApiError;
use crate::store::{SliceError, SliceKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchProjects,
    FetchUserProjects,
    CreateProject,
    UpdateProject,
    DeleteProject,
    AddTeamMember,
    RemoveTeamMember,
    AddMilestone,
    UpdateMilestoneStatus,
    FetchTasks,
    FetchUsers,
}

impl Operation {
    /// Action type name, `<slice>/<action>`.
    pub fn type_name(self) -> &'static str {
        match self {
            Operation::FetchProjects => "projects/fetchProjects",
            Operation::FetchUserProjects => "projects/fetchUserProjects",
            Operation::CreateProject => "projects/createProject",
            Operation::UpdateProject => "projects/updateProject",
            Operation::DeleteProject => "projects/deleteProject",
            Operation::AddTeamMember => "projects/addTeamMember",
            Operation::RemoveTeamMember => "projects/removeTeamMember",
            Operation::AddMilestone => "projects/addMilestone",
            Operation::UpdateMilestoneStatus => "projects/updateMilestoneStatus",
            Operation::FetchTasks => "tasks/fetchTasks",
            Operation::FetchUsers => "users/fetchUsers",
        }
    }

    /// Slice whose loading/error this operation drives.
    pub fn slice(self) -> SliceKind {
        match self {
            Operation::FetchUserProjects => SliceKind::UserProjects,
            Operation::FetchTasks => SliceKind::Tasks,
            Operation::FetchUsers => SliceKind::Users,
            _ => SliceKind::Projects,
        }
    }

    /// Message recorded when the server gave none.
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::FetchProjects => "Failed to fetch projects",
            Operation::FetchUserProjects => "Failed to fetch user projects",
            Operation::CreateProject => "Failed to create project",
            Operation::UpdateProject => "Failed to update project",
            Operation::DeleteProject => "Failed to delete project",
            Operation::AddTeamMember => "Failed to add team member",
            Operation::RemoveTeamMember => "Failed to remove team member",
            Operation::AddMilestone => "Failed to add milestone",
            Operation::UpdateMilestoneStatus => "Failed to update milestone status",
            Operation::FetchTasks => "Failed to fetch tasks",
            Operation::FetchUsers => "Failed to fetch users",
        }
    }

    /// Collapse a request failure into what the slice records.
    pub fn reject_with(self, err: &ApiError) -> SliceError {
        SliceError {
            message: err.message_or(self.fallback_message()),
            kind: err.kind(),
            operation: self.type_name(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(Operation::FetchProjects, SliceKind::Projects)]
    #[case(Operation::FetchUserProjects, SliceKind::UserProjects)]
    #[case(Operation::DeleteProject, SliceKind::Projects)]
    #[case(Operation::UpdateMilestoneStatus, SliceKind::Projects)]
    #[case(Operation::FetchTasks, SliceKind::Tasks)]
    #[case(Operation::FetchUsers, SliceKind::Users)]
    fn operations_target_their_slice(#[case] op: Operation, #[case] expected: SliceKind) {
        assert_eq!(op.slice(), expected);
    }

    #[test]
    fn server_message_or_fallback() {
        let with_message = Operation::FetchProjects.reject_with(&ApiError::status(500, "boom"));
        assert_eq!(with_message.message, "boom");
        assert_eq!(with_message.kind, ErrorKind::Status);
        assert_eq!(with_message.operation, "projects/fetchProjects");

        let bare = Operation::FetchProjects.reject_with(&ApiError::bare_status(500));
        assert_eq!(bare.message, "Failed to fetch projects");

        let transport = Operation::FetchUsers.reject_with(&ApiError::Transport("refused".into()));
        assert_eq!(transport.message, "Failed to fetch users");
        assert_eq!(transport.kind, ErrorKind::Transport);
    }
}
