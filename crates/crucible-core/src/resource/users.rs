// Player users
//
// Roles are declared by name; Player stores a role id.

use crucible_api::ApiClient;
use crucible_api::player::models::UserRecord;
use tracing::info;

use crate::error::{CoreError, ResultExt};
use crate::model::PlayerUser;
use crate::resolve::Resolver;
use crate::resource::ManagedResource;

#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn record(&self, user: &PlayerUser) -> Result<UserRecord, CoreError> {
        let role_id = match user.role.as_deref().filter(|r| !r.is_empty()) {
            Some(role) => Some(Resolver::new(&self.client).role_id(role).await?),
            None => None,
        };
        Ok(UserRecord {
            id: user.id.clone(),
            name: Some(user.name.clone()),
            role_id,
        })
    }
}

impl ManagedResource for UserService {
    type State = PlayerUser;
    const KIND: &'static str = "user";

    fn id(state: &PlayerUser) -> Option<&str> {
        Some(state.id.as_str())
    }

    fn settle(_remembered: &PlayerUser, desired: &PlayerUser) -> PlayerUser {
        PlayerUser {
            role: desired.role.clone().filter(|r| !r.is_empty()),
            ..desired.clone()
        }
    }

    async fn create(&self, desired: &PlayerUser) -> Result<PlayerUser, CoreError> {
        let record = self.record(desired).await?;
        self.client
            .create_user(&record)
            .await
            .context(|| format!("creating user {}", desired.id))?;
        info!(user_id = %desired.id, "created user");
        Ok(Self::settle(desired, desired))
    }

    async fn read(&self, remembered: &PlayerUser) -> Result<Option<PlayerUser>, CoreError> {
        let Some(record) = self.client.get_user(&remembered.id).await? else {
            return Ok(None);
        };
        let role = match record.role_id.as_deref().filter(|r| !r.is_empty()) {
            Some(role_id) => Some(
                self.client
                    .get_role(role_id)
                    .await?
                    .map(|r| r.name)
                    .ok_or_else(|| CoreError::NotFound {
                        entity_type: "role",
                        identifier: role_id.to_owned(),
                    })?,
            ),
            None => None,
        };
        Ok(Some(PlayerUser {
            id: record.id,
            name: record.name.unwrap_or_default(),
            role,
        }))
    }

    async fn update(&self, _remembered: &PlayerUser, desired: &PlayerUser) -> Result<PlayerUser, CoreError> {
        let record = self.record(desired).await?;
        self.client
            .update_user(&record)
            .await
            .context(|| format!("updating user {}", desired.id))?;
        info!(user_id = %desired.id, "updated user");
        Ok(Self::settle(desired, desired))
    }

    async fn delete(&self, remembered: &PlayerUser) -> Result<(), CoreError> {
        self.client
            .delete_user(&remembered.id)
            .await
            .context(|| format!("deleting user {}", remembered.id))?;
        info!(user_id = %remembered.id, "deleted user");
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.client.user_exists(id).await?)
    }
}
