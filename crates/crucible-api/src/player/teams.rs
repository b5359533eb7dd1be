// Player team endpoints
//
// Teams, their user associations, permission grants, and the
// team-membership records that carry per-user role overrides.

use tracing::debug;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::player::models::{
    CreateTeamRequest, Created, MembershipRoleRequest, TeamMembershipRecord,
    TeamPermissionRequest, TeamRecord, UpdateTeamRequest, UserRecord,
};

impl ApiClient {
    // ── Teams ────────────────────────────────────────────────────────

    /// `GET views/{view_id}/teams`
    pub async fn list_view_teams(&self, view_id: &str) -> Result<Vec<TeamRecord>, Error> {
        let url = self.url(Service::Player, &format!("views/{view_id}/teams"))?;
        self.get(url).await
    }

    /// `POST views/{view_id}/teams`
    pub async fn create_team(
        &self,
        view_id: &str,
        request: &CreateTeamRequest,
    ) -> Result<String, Error> {
        let url = self.url(Service::Player, &format!("views/{view_id}/teams"))?;
        debug!(view_id, name = %request.name, "creating team");
        let created: Created = self.post(url, request).await?;
        Ok(created.id)
    }

    /// `PUT teams/{id}`
    pub async fn update_team(&self, request: &UpdateTeamRequest) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("teams/{}", request.id))?;
        debug!(team_id = %request.id, name = %request.name, "updating team");
        self.put(url, request).await
    }

    /// `DELETE teams/{id}`
    pub async fn delete_team(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("teams/{id}"))?;
        debug!(team_id = id, "deleting team");
        self.delete(url).await
    }

    // ── Team users ───────────────────────────────────────────────────

    /// `GET teams/{team_id}/users`
    pub async fn list_team_users(&self, team_id: &str) -> Result<Vec<UserRecord>, Error> {
        let url = self.url(Service::Player, &format!("teams/{team_id}/users"))?;
        self.get(url).await
    }

    /// `POST teams/{team_id}/users/{user_id}`
    pub async fn add_team_user(&self, team_id: &str, user_id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("teams/{team_id}/users/{user_id}"))?;
        debug!(team_id, user_id, "adding user to team");
        self.post_empty(url).await
    }

    /// `DELETE teams/{team_id}/users/{user_id}`
    pub async fn remove_team_user(&self, team_id: &str, user_id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("teams/{team_id}/users/{user_id}"))?;
        debug!(team_id, user_id, "removing user from team");
        self.delete(url).await
    }

    // ── Team permissions ─────────────────────────────────────────────

    /// `POST team-permissions` with `{teamId, permissionId}`
    pub async fn add_team_permission(
        &self,
        team_id: &str,
        permission_id: &str,
    ) -> Result<(), Error> {
        let url = self.url(Service::Player, "team-permissions")?;
        debug!(team_id, permission_id, "granting team permission");
        self.post_no_response(
            url,
            &TeamPermissionRequest {
                team_id: team_id.to_owned(),
                permission_id: permission_id.to_owned(),
            },
        )
        .await
    }

    /// `DELETE teams/{team_id}/permissions/{permission_id}`
    pub async fn remove_team_permission(
        &self,
        team_id: &str,
        permission_id: &str,
    ) -> Result<(), Error> {
        let url = self.url(
            Service::Player,
            &format!("teams/{team_id}/permissions/{permission_id}"),
        )?;
        debug!(team_id, permission_id, "revoking team permission");
        self.delete(url).await
    }

    // ── Team memberships ─────────────────────────────────────────────

    /// `GET users/{user_id}/views/{view_id}/team-memberships`
    pub async fn list_user_memberships(
        &self,
        user_id: &str,
        view_id: &str,
    ) -> Result<Vec<TeamMembershipRecord>, Error> {
        let url = self.url(
            Service::Player,
            &format!("users/{user_id}/views/{view_id}/team-memberships"),
        )?;
        self.get(url).await
    }

    /// `GET team-memberships/{id}`
    pub async fn get_membership(&self, id: &str) -> Result<TeamMembershipRecord, Error> {
        let url = self.url(Service::Player, &format!("team-memberships/{id}"))?;
        self.get(url).await
    }

    /// `PUT team-memberships/{id}` with `{roleId}`; `None` clears the override.
    pub async fn set_membership_role(
        &self,
        membership_id: &str,
        role_id: Option<&str>,
    ) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("team-memberships/{membership_id}"))?;
        debug!(membership_id, role_id = ?role_id, "setting membership role");
        self.put(
            url,
            &MembershipRoleRequest {
                role_id: role_id.map(str::to_owned),
            },
        )
        .await
    }
}
