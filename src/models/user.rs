use serde::{Deserialize, Serialize};

/// Controls who can see a user's event attendance
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// Attendance is hidden from everyone
    Ghost,
    /// Attendance is visible to accepted friends
    Friends,
    /// Attendance is visible to everyone
    #[default]
    All,
}

impl VisibilityMode {
    /// Whether a friend may see this user's attendance
    pub fn visible_to_friends(self) -> bool {
        matches!(self, VisibilityMode::Friends | VisibilityMode::All)
    }
}

/// Lifecycle of a friendship request
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    #[default]
    Accepted,
    Blocked,
}

/// A user as resolved by the user directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Creates a user with only an id and username
    pub fn new(id: impl Into<String>, username: Option<&str>) -> Self {
        Self {
            id: id.into(),
            username: username.map(str::to_string),
            first_name: None,
            last_name: None,
        }
    }

    /// Username when present, otherwise a `u<id>` placeholder
    pub fn display_name(&self) -> String {
        match self.username.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("u{}", self.id),
        }
    }
}

/// Minimal reference to a person used while building the graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendRef {
    pub id: String,
    pub label: String,
}

impl From<&User> for FriendRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            label: user.display_name(),
        }
    }
}
