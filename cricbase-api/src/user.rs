use crate::{Time, UserId};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, with = "crate::time::option")]
    pub created_at: Option<Time>,
}

impl User {
    pub fn stub() -> User {
        User {
            id: UserId::from("1"),
            username: String::from("current_user"),
            email: String::from("user@example.com"),
            avatar: None,
            created_at: None,
        }
    }

    /// Single character shown in place of a missing avatar
    pub fn initial(&self) -> Option<char> {
        self.username.chars().next().map(|c| c.to_ascii_uppercase())
    }
}
