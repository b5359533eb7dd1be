// Player application and application-instance endpoints
//
// Applications are view-scoped; instances bind an application into one
// team's UI and are team-scoped.

use tracing::debug;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::player::models::{
    ApplicationInstanceRecord, ApplicationRecord, CreateInstanceRequest, Created,
    UpdateInstanceRequest,
};

impl ApiClient {
    // ── Applications ─────────────────────────────────────────────────

    /// `GET views/{view_id}/applications`
    pub async fn list_view_applications(
        &self,
        view_id: &str,
    ) -> Result<Vec<ApplicationRecord>, Error> {
        let url = self.url(Service::Player, &format!("views/{view_id}/applications"))?;
        self.get(url).await
    }

    /// `POST views/{view_id}/applications`
    pub async fn create_application(
        &self,
        view_id: &str,
        app: &ApplicationRecord,
    ) -> Result<String, Error> {
        let url = self.url(Service::Player, &format!("views/{view_id}/applications"))?;
        debug!(view_id, name = ?app.name, "creating application");
        let body = ApplicationRecord {
            view_id: Some(view_id.to_owned()),
            ..app.clone()
        };
        let created: Created = self.post(url, &body).await?;
        Ok(created.id)
    }

    /// `PUT applications/{id}`
    pub async fn update_application(&self, id: &str, app: &ApplicationRecord) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("applications/{id}"))?;
        debug!(application_id = id, "updating application");
        self.put(url, app).await
    }

    /// `DELETE applications/{id}`
    pub async fn delete_application(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("applications/{id}"))?;
        debug!(application_id = id, "deleting application");
        self.delete(url).await
    }

    // ── Application instances ────────────────────────────────────────

    /// `GET teams/{team_id}/application-instances`
    pub async fn list_team_instances(
        &self,
        team_id: &str,
    ) -> Result<Vec<ApplicationInstanceRecord>, Error> {
        let url = self.url(
            Service::Player,
            &format!("teams/{team_id}/application-instances"),
        )?;
        self.get(url).await
    }

    /// `POST teams/{team_id}/application-instances`
    pub async fn create_instance(&self, request: &CreateInstanceRequest) -> Result<String, Error> {
        let url = self.url(
            Service::Player,
            &format!("teams/{}/application-instances", request.team_id),
        )?;
        debug!(team_id = %request.team_id, application_id = %request.application_id, "creating application instance");
        let created: Created = self.post(url, request).await?;
        Ok(created.id)
    }

    /// `PUT application-instances/{id}`
    pub async fn update_instance(&self, request: &UpdateInstanceRequest) -> Result<(), Error> {
        let url = self.url(
            Service::Player,
            &format!("application-instances/{}", request.id),
        )?;
        debug!(instance_id = %request.id, "updating application instance");
        self.put(url, request).await
    }

    /// `DELETE application-instances/{id}`
    pub async fn delete_instance(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("application-instances/{id}"))?;
        debug!(instance_id = id, "deleting application instance");
        self.delete(url).await
    }
}
