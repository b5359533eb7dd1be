// ── Name-to-id resolution ──
//
// Declarations refer to roles, permissions, and applications by name;
// Player only accepts ids. All lookups go through a `Resolver`, which
// memoizes hits for the lifetime of one apply pass and reports misses as
// `UnresolvedReference`.

use std::collections::HashMap;

use crucible_api::ApiClient;
use tracing::debug;

use crate::error::{CoreError, ReferenceKind};

pub struct Resolver<'a> {
    client: &'a ApiClient,
    team_roles: Option<HashMap<String, String>>,
    roles: HashMap<String, String>,
    permissions: HashMap<String, String>,
    applications: HashMap<String, HashMap<String, String>>,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            team_roles: None,
            roles: HashMap::new(),
            permissions: HashMap::new(),
            applications: HashMap::new(),
        }
    }

    /// Resolve a team role through the `team-roles` listing.
    pub async fn team_role_id(&mut self, name: &str) -> Result<String, CoreError> {
        if self.team_roles.is_none() {
            let roles = self.client.list_team_roles().await?;
            debug!(count = roles.len(), "loaded team roles");
            self.team_roles = Some(roles.into_iter().map(|r| (r.name, r.id)).collect());
        }
        self.team_roles
            .as_ref()
            .and_then(|roles| roles.get(name))
            .cloned()
            .ok_or_else(|| CoreError::UnresolvedReference {
                kind: ReferenceKind::TeamRole,
                name: name.to_owned(),
                scope: None,
            })
    }

    /// Resolve a Player role by name.
    pub async fn role_id(&mut self, name: &str) -> Result<String, CoreError> {
        if let Some(id) = self.roles.get(name) {
            return Ok(id.clone());
        }
        let role = self.client.find_role_by_name(name).await?.ok_or_else(|| {
            CoreError::UnresolvedReference {
                kind: ReferenceKind::Role,
                name: name.to_owned(),
                scope: None,
            }
        })?;
        self.roles.insert(name.to_owned(), role.id.clone());
        Ok(role.id)
    }

    /// Resolve a permission by name.
    pub async fn permission_id(&mut self, name: &str) -> Result<String, CoreError> {
        if let Some(id) = self.permissions.get(name) {
            return Ok(id.clone());
        }
        let permission = self
            .client
            .find_permission_by_name(name)
            .await?
            .ok_or_else(|| CoreError::UnresolvedReference {
                kind: ReferenceKind::Permission,
                name: name.to_owned(),
                scope: None,
            })?;
        self.permissions
            .insert(name.to_owned(), permission.id.clone());
        Ok(permission.id)
    }

    /// Resolve an application by name within one view.
    ///
    /// The view's applications are listed once per pass, so callers must
    /// finish changing applications before resolving instances.
    pub async fn application_id(&mut self, view_id: &str, name: &str) -> Result<String, CoreError> {
        if !self.applications.contains_key(view_id) {
            let apps = self.client.list_view_applications(view_id).await?;
            let index = apps
                .into_iter()
                .filter_map(|a| Some((a.name?, a.id?)))
                .collect();
            self.applications.insert(view_id.to_owned(), index);
        }
        self.applications
            .get(view_id)
            .and_then(|index| index.get(name))
            .cloned()
            .ok_or_else(|| CoreError::UnresolvedReference {
                kind: ReferenceKind::Application,
                name: name.to_owned(),
                scope: Some(format!("view {view_id}")),
            })
    }

    /// Find the membership record joining a user to a team within a view.
    pub async fn membership_id(
        &self,
        view_id: &str,
        team_id: &str,
        user_id: &str,
    ) -> Result<String, CoreError> {
        self.client
            .list_user_memberships(user_id, view_id)
            .await?
            .into_iter()
            .find(|m| m.team_id == team_id)
            .map(|m| m.id)
            .ok_or_else(|| CoreError::UnresolvedReference {
                kind: ReferenceKind::TeamMembership,
                name: format!("user {user_id}"),
                scope: Some(format!("team {team_id}")),
            })
    }
}
