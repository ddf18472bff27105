//! Project model and request bodies.
//!
//! Wire format follows the API: camelCase keys, id under `_id`.
//! References the server may or may not populate (`tasks`, `team`) are
//! typed as "id or object" so neither shape is guarded ad hoc at use sites.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::ids::{MilestoneId, ProjectId, UserId};
use super::state::{MilestoneStatus, ProjectStatus, lenient_status};
use super::task::Task;
use super::user::User;

/// A project as last returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: ProjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<TaskRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team: Vec<TeamMember>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub milestones: Vec<Milestone>,
}

impl Project {
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn has_status(&self, status: &ProjectStatus) -> bool {
        self.status.as_ref() == Some(status)
    }

    pub fn milestone(&self, id: &MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| &m.id == id)
    }
}

/// A task reference inside a project: bare id, or the populated task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskRef {
    Id(super::ids::TaskId),
    Populated(Box<Task>),
}

/// A team member: bare user id, or the populated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamMember {
    Id(UserId),
    Populated(User),
}

impl TeamMember {
    pub fn user_id(&self) -> &UserId {
        match self {
            TeamMember::Id(id) => id,
            TeamMember::Populated(user) => &user.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            TeamMember::Id(_) => None,
            TeamMember::Populated(user) => Some(user.name.as_str()),
        }
    }

    /// First character of the member's name, `?` when unknown.
    pub fn initial(&self) -> char {
        self.name()
            .and_then(|name| name.chars().next())
            .unwrap_or('?')
    }
}

/// A named sub-goal attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(rename = "_id")]
    pub id: MilestoneId,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<MilestoneStatus>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team: Vec<UserId>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Body of `PUT /projects/:id`. Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }

    /// Apply the patch to a local copy (used by the in-memory backend).
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = Some(description.clone());
        }
        if let Some(status) = &self.status {
            project.status = Some(status.clone());
        }
        if let Some(due_date) = self.due_date {
            project.due_date = Some(due_date);
        }
    }
}

/// Body of `POST /projects/:id/milestones`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MilestoneStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl MilestoneDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// `null` decodes like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates.
/// Anything else (including `null`) becomes `None` instead of failing the whole payload.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(parse_date))
}

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use serde_json::json;

    #[test]
    fn decodes_populated_and_bare_references() {
        let project: Project = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Website",
            "status": "active",
            "dueDate": "2024-06-01T00:00:00.000Z",
            "tasks": ["t1", { "_id": "t2", "title": "Copy", "status": "pending" }],
            "team": [{ "_id": "u1", "name": "Ada", "role": "admin" }, "u2"],
            "milestones": [{ "_id": "m1", "title": "Beta", "status": "in-progress" }]
        }))
        .unwrap();

        assert_eq!(project.task_count(), 2);
        assert!(matches!(&project.tasks[0], TaskRef::Id(id) if id.as_str() == "t1"));
        match &project.tasks[1] {
            TaskRef::Populated(task) => assert_eq!(task.status, Some(TaskStatus::Pending)),
            other => panic!("expected populated task, got {other:?}"),
        }
        assert_eq!(project.team[0].initial(), 'A');
        assert_eq!(project.team[1].initial(), '?');
        assert_eq!(project.team[1].user_id().as_str(), "u2");
        assert!(project.has_status(&ProjectStatus::Active));
        assert_eq!(
            project.milestone(&MilestoneId::new("m1")).and_then(|m| m.status.clone()),
            Some(MilestoneStatus::InProgress)
        );
    }

    #[test]
    fn missing_and_null_collections_decode_as_empty() {
        let project: Project = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Bare",
            "team": null,
            "dueDate": "not a date"
        }))
        .unwrap();

        assert!(project.tasks.is_empty());
        assert!(project.team.is_empty());
        assert!(project.milestones.is_empty());
        assert_eq!(project.status, None);
        assert_eq!(project.due_date, None);
    }

    #[test]
    fn one_incomplete_record_does_not_fail_the_list() {
        let projects: Vec<Project> = serde_json::from_value(json!([
            { "_id": "p1", "name": "ok" },
            { "_id": "p2", "status": "active" },
            { "_id": "p3", "name": "Odd", "status": 7, "milestones": [{ "_id": "m1", "status": {} }] }
        ]))
        .unwrap();

        assert_eq!(projects.len(), 3);
        assert_eq!(projects[1].name, "");
        assert!(projects[1].has_status(&ProjectStatus::Active));
        assert_eq!(projects[2].status, None);
        assert_eq!(projects[2].milestones[0].title, "");
        assert_eq!(projects[2].milestones[0].status, None);
    }

    #[test]
    fn parse_date_accepts_date_only() {
        let parsed = parse_date("2024-03-09").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-09T00:00:00+00:00");
        assert!(parse_date("09/03/2024").is_none());
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = ProjectPatch {
            status: Some(ProjectStatus::Completed),
            ..ProjectPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({ "status": "completed" })
        );
        assert!(!patch.is_empty());
        assert!(ProjectPatch::default().is_empty());
    }

    #[test]
    fn draft_uses_camel_case_keys() {
        let draft = ProjectDraft {
            due_date: parse_date("2024-07-01"),
            ..ProjectDraft::new("Launch")
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["name"], "Launch");
        assert!(body.get("dueDate").is_some());
        assert!(body.get("team").is_none());
    }
}
