//! Task model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ProjectId, TaskId};
use super::project::lenient_date;
use super::state::{TaskStatus, lenient_status};

/// A task as last returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

impl Task {
    pub fn has_status(&self, status: &TaskStatus) -> bool {
        self.status.as_ref() == Some(status)
    }

    /// Status used for display; a task without one is shown as pending.
    pub fn display_status(&self) -> TaskStatus {
        self.status.clone().unwrap_or(TaskStatus::Pending)
    }
}

/// The owning project: bare id, or a populated `{ _id, name }` stub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    Id(ProjectId),
    Populated {
        #[serde(rename = "_id")]
        id: ProjectId,
        #[serde(default)]
        name: Option<String>,
    },
}

impl ProjectRef {
    pub fn project_id(&self) -> &ProjectId {
        match self {
            ProjectRef::Id(id) => id,
            ProjectRef::Populated { id, .. } => id,
        }
    }
}
