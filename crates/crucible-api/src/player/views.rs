// Player view endpoints

use tracing::debug;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::player::models::{Created, CreateViewRequest, UpdateViewRequest, ViewRecord};

impl ApiClient {
    /// Create a view and return its server-assigned id.
    ///
    /// `POST views`
    pub async fn create_view(&self, request: &CreateViewRequest) -> Result<String, Error> {
        let url = self.url(Service::Player, "views")?;
        debug!(name = %request.name, "creating view");
        let created: Created = self.post(url, request).await?;
        Ok(created.id)
    }

    /// `GET views/{id}`, `None` when the view is gone.
    pub async fn get_view(&self, id: &str) -> Result<Option<ViewRecord>, Error> {
        let url = self.url(Service::Player, &format!("views/{id}"))?;
        self.get_optional(url).await
    }

    /// `PUT views/{id}`
    pub async fn update_view(&self, request: &UpdateViewRequest) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("views/{}", request.id))?;
        debug!(view_id = %request.id, "updating view");
        self.put(url, request).await
    }

    /// Delete a view. Player cascades to its teams and applications.
    ///
    /// `DELETE views/{id}`
    pub async fn delete_view(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("views/{id}"))?;
        debug!(view_id = id, "deleting view");
        self.delete(url).await
    }

    pub async fn view_exists(&self, id: &str) -> Result<bool, Error> {
        let url = self.url(Service::Player, &format!("views/{id}"))?;
        self.exists(url).await
    }
}
