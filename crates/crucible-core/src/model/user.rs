use serde::{Deserialize, Serialize};

/// A Player-wide user, managed independently of any view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUser {
    pub id: String,
    pub name: String,
    /// Role name, resolved to a role id on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
