//! Domain identifiers (strongly-typed IDs).
//!
//! サーバーが発行する `_id` はただの文字列ですが、クライアント側では
//! Phantom type パターンで型を分けて扱います。
//!
//! ## Phantom Type パターン
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わない（PhantomData）マーカー型として、
//! コンパイル時の型安全性を提供します。
//! - ProjectId と UserId は同じ文字列表現でも混同できない
//! - JSON 上は素の文字列として (de)serialize される

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// IdMarker は各 ID 型のマーカー trait
///
/// ログ出力で使うリソース名（"project", "task" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn resource() -> &'static str;
}

/// ジェネリック ID 型
///
/// # 例
/// ```ignore
/// let project_id = ProjectId::new("65f0c2...");
/// let user_id = UserId::new("65f0c2...");
/// // project_id と user_id は異なる型なので、混同できない
/// ```
pub struct Id<T: IdMarker> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

// derive だと `T: Clone` などが要求されるので手で実装する
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: IdMarker> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: IdMarker> Eq for Id<T> {}

impl<T: IdMarker> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdMarker> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::resource(), self.value)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Project のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectMarker {}

impl IdMarker for ProjectMarker {
    fn resource() -> &'static str {
        "project"
    }
}

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskMarker {}

impl IdMarker for TaskMarker {
    fn resource() -> &'static str {
        "task"
    }
}

/// User のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserMarker {}

impl IdMarker for UserMarker {
    fn resource() -> &'static str {
        "user"
    }
}

/// Milestone のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MilestoneMarker {}

impl IdMarker for MilestoneMarker {
    fn resource() -> &'static str {
        "milestone"
    }
}

/// Identifier of a Project.
pub type ProjectId = Id<ProjectMarker>;

/// Identifier of a Task.
pub type TaskId = Id<TaskMarker>;

/// Identifier of a User (also used for team members).
pub type UserId = Id<UserMarker>;

/// Identifier of a Milestone inside a Project.
pub type MilestoneId = Id<MilestoneMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ProjectId::new("p-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"p-1\"");

        let back: ProjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn debug_shows_resource_name() {
        let id = UserId::new("u-7");
        assert_eq!(format!("{id:?}"), "user(u-7)");
        assert_eq!(id.to_string(), "u-7");

        // ProjectId と UserId は別の型（コンパイル時の性質なのでコメントのみ）
        // let _: ProjectId = id; // <- does not compile
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<ProjectId>(), size_of::<String>());
        assert_eq!(size_of::<MilestoneId>(), size_of::<String>());
    }
}
