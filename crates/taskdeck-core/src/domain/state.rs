//! State - タスク・プロジェクト・マイルストーンの状態と役割
//!
//! サーバーは状態を文字列で返すため、既知の値は列挙子に、
//! 未知の値は `Other(String)` に落とします（黙って捨てない）。
//! 集計は列挙子の完全一致で行うので、`"Completed"` のような大文字違いは
//! `Other` 扱いになります。
//! 文字列ですらない値 (数値や null) は状態なしとして読みます。

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// `Option<状態>` を読む。文字列以外は `None` にして、レコード全体は失敗させない。
pub(crate) fn lenient_status<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => Some(T::from(s)),
        _ => None,
    })
}

/// TaskStatus はタスクの状態
///
/// # 既知の値
/// - `completed`
/// - `in-progress`
/// - `pending`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Completed,
    InProgress,
    Pending,
    Other(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Pending => "pending",
            TaskStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "completed" => TaskStatus::Completed,
            "in-progress" => TaskStatus::InProgress,
            "pending" => TaskStatus::Pending,
            _ => TaskStatus::Other(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

/// ProjectStatus はプロジェクトの状態
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
    Other(String),
}

impl ProjectStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on-hold",
            ProjectStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for ProjectStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "active" => ProjectStatus::Active,
            "completed" => ProjectStatus::Completed,
            "on-hold" => ProjectStatus::OnHold,
            _ => ProjectStatus::Other(raw),
        }
    }
}

impl From<ProjectStatus> for String {
    fn from(status: ProjectStatus) -> Self {
        status.as_str().to_string()
    }
}

/// MilestoneStatus はマイルストーンの状態
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MilestoneStatus {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in-progress",
            MilestoneStatus::Completed => "completed",
            MilestoneStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for MilestoneStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => MilestoneStatus::Pending,
            "in-progress" => MilestoneStatus::InProgress,
            "completed" => MilestoneStatus::Completed,
            _ => MilestoneStatus::Other(raw),
        }
    }
}

impl From<MilestoneStatus> for String {
    fn from(status: MilestoneStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Role はユーザーの役割
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Member,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Other(raw) => raw,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "admin" => Role::Admin,
            "member" => Role::Member,
            _ => Role::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
