// ── View aggregate ──
//
// A view owns its applications and teams; teams own their user
// associations and application instances. The same types serve as the
// desired declaration and as the remembered state, so every field
// round-trips through serde with its native JSON type.

use serde::{Deserialize, Serialize};

pub const DEFAULT_VIEW_STATUS: &str = "Active";
pub const DEFAULT_TEAM_ROLE: &str = "View Member";
/// Name of the team Player creates when `create_admin_team` is set.
pub const ADMIN_TEAM_NAME: &str = "Admin";

fn default_status() -> String {
    DEFAULT_VIEW_STATUS.into()
}

fn default_team_role() -> String {
    DEFAULT_TEAM_ROLE.into()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Server-assigned; absent until the view is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    /// Creation-time only; Player never reports it back.
    #[serde(default = "default_true")]
    pub create_admin_team: bool,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            status: default_status(),
            create_admin_team: true,
            applications: Vec::new(),
            teams: Vec::new(),
        }
    }

    /// Name, description, or status differ.
    pub fn metadata_differs(&self, other: &Self) -> bool {
        self.name != other.name
            || self.description != other.description
            || self.status != other.status
    }

    pub fn application(&self, name: &str) -> Option<&Application> {
        self.applications.iter().find(|a| a.name == name)
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }
}

/// A view-scoped application.
///
/// The optional fields are optional-and-computed: when a template supplies
/// them the declaration may leave them unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default, rename = "app_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_in_background: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_template_id: Option<String>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            url: None,
            icon: None,
            embeddable: None,
            load_in_background: None,
            app_template_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, rename = "team_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Role name; empty means no role.
    #[serde(default = "default_team_role")]
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub users: Vec<TeamUser>,
    #[serde(default)]
    pub app_instances: Vec<AppInstance>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            role: default_team_role(),
            permissions: Vec::new(),
            users: Vec::new(),
            app_instances: Vec::new(),
        }
    }

    /// The attributes carried by the team record itself.
    pub fn shell_differs(&self, other: &Self) -> bool {
        self.name != other.name || self.role != other.role
    }

    pub fn role_name(&self) -> Option<&str> {
        Some(self.role.as_str()).filter(|r| !r.is_empty())
    }
}

/// A Player user's association with one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamUser {
    #[serde(rename = "id")]
    pub user_id: String,
    /// Per-team role override. `None` and `""` both mean "no override".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl TeamUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref().filter(|r| !r.is_empty())
    }
}

impl PartialEq for TeamUser {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.role() == other.role()
    }
}

/// A team-scoped binding of a view application, joined by application name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInstance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub display_order: f64,
}

impl AppInstance {
    pub fn new(name: impl Into<String>, display_order: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            display_order,
        }
    }
}
