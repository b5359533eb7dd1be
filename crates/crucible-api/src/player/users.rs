// Player user endpoints (top-level users, not team associations)

use tracing::debug;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::player::models::UserRecord;

impl ApiClient {
    /// `POST users`. The caller supplies the id.
    pub async fn create_user(&self, user: &UserRecord) -> Result<(), Error> {
        let url = self.url(Service::Player, "users")?;
        debug!(user_id = %user.id, "creating user");
        self.post_no_response(url, user).await
    }

    /// `GET users/{id}`, `None` when the user is gone.
    pub async fn get_user(&self, id: &str) -> Result<Option<UserRecord>, Error> {
        let url = self.url(Service::Player, &format!("users/{id}"))?;
        self.get_optional(url).await
    }

    /// `PUT users/{id}`
    pub async fn update_user(&self, user: &UserRecord) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("users/{}", user.id))?;
        debug!(user_id = %user.id, "updating user");
        self.put(url, user).await
    }

    /// `DELETE users/{id}`
    pub async fn delete_user(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("users/{id}"))?;
        debug!(user_id = id, "deleting user");
        self.delete(url).await
    }

    pub async fn user_exists(&self, id: &str) -> Result<bool, Error> {
        let url = self.url(Service::Player, &format!("users/{id}"))?;
        self.exists(url).await
    }
}
