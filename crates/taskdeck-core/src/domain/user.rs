//! User model.

use serde::{Deserialize, Serialize};

use super::ids::UserId;
use super::state::{Role, lenient_status};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub role: Option<Role>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_string_role_is_not_an_admin() {
        let users: Vec<User> = serde_json::from_value(json!([
            { "_id": "u1", "name": "Ada", "role": "admin" },
            { "_id": "u2", "role": ["admin"] }
        ]))
        .unwrap();

        assert!(users[0].is_admin());
        assert_eq!(users[1].role, None);
        assert_eq!(users[1].name, "");
    }
}
