// Player role and permission lookups
//
// The Player API accepts only ids; declarations carry names. These are the
// raw lookups. Resolution with "not found" reporting lives in crucible-core.

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::player::models::{PermissionRecord, RoleRecord};

impl ApiClient {
    /// `GET team-roles`
    pub async fn list_team_roles(&self) -> Result<Vec<RoleRecord>, Error> {
        let url = self.url(Service::Player, "team-roles")?;
        self.get(url).await
    }

    /// `GET roles/name/{name}`
    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<RoleRecord>, Error> {
        let url = self.url_with_segment(Service::Player, "roles/name/", name)?;
        self.get_optional(url).await
    }

    /// `GET roles/{id}`
    pub async fn get_role(&self, id: &str) -> Result<Option<RoleRecord>, Error> {
        let url = self.url(Service::Player, &format!("roles/{id}"))?;
        self.get_optional(url).await
    }

    /// `GET permissions/name/{name}`
    pub async fn find_permission_by_name(
        &self,
        name: &str,
    ) -> Result<Option<PermissionRecord>, Error> {
        let url = self.url_with_segment(Service::Player, "permissions/name/", name)?;
        self.get_optional(url).await
    }

    /// `GET permissions/{id}`
    pub async fn get_permission(&self, id: &str) -> Result<Option<PermissionRecord>, Error> {
        let url = self.url(Service::Player, &format!("permissions/{id}"))?;
        self.get_optional(url).await
    }
}
