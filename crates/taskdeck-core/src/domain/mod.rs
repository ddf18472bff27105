//! Domain model (IDs, entities, statuses, errors).
//!
//! すべてサーバーが所有するリソースのクライアント側の写しです。
//! クライアントは古いかもしれないコピーを保持するだけで、正本はサーバーにあります。

pub mod errors;
pub mod ids;
pub mod project;
pub mod state;
pub mod task;
pub mod user;

pub use self::errors::{ApiError, ErrorKind};
pub use self::ids::{Id, IdMarker, MilestoneId, ProjectId, TaskId, UserId};
pub use self::project::{
    Milestone, MilestoneDraft, Project, ProjectDraft, ProjectPatch, TaskRef, TeamMember,
    parse_date,
};
pub use self::state::{MilestoneStatus, ProjectStatus, Role, TaskStatus};
pub use self::task::{ProjectRef, Task};
pub use self::user::User;

/// Entity は ID を持つリソース（スライスの要素）
pub trait Entity: Clone + Send + Sync + 'static {
    type Marker: IdMarker;

    fn id(&self) -> &Id<Self::Marker>;
}

impl Entity for Project {
    type Marker = ids::ProjectMarker;

    fn id(&self) -> &ProjectId {
        &self.id
    }
}

impl Entity for Task {
    type Marker = ids::TaskMarker;

    fn id(&self) -> &TaskId {
        &self.id
    }
}

impl Entity for User {
    type Marker = ids::UserMarker;

    fn id(&self) -> &UserId {
        &self.id
    }
}
