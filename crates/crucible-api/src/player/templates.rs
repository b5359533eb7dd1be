// Player application-template endpoints

use tracing::debug;

use crate::client::{ApiClient, Service};
use crate::error::Error;
use crate::player::models::{ApplicationTemplateRecord, Created};

impl ApiClient {
    /// `POST application-templates`
    pub async fn create_template(
        &self,
        template: &ApplicationTemplateRecord,
    ) -> Result<String, Error> {
        let url = self.url(Service::Player, "application-templates")?;
        debug!(name = %template.name, "creating application template");
        let created: Created = self.post(url, template).await?;
        Ok(created.id)
    }

    /// `GET application-templates/{id}`
    pub async fn get_template(&self, id: &str) -> Result<Option<ApplicationTemplateRecord>, Error> {
        let url = self.url(Service::Player, &format!("application-templates/{id}"))?;
        self.get_optional(url).await
    }

    /// `PUT application-templates/{id}`
    pub async fn update_template(
        &self,
        id: &str,
        template: &ApplicationTemplateRecord,
    ) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("application-templates/{id}"))?;
        debug!(template_id = id, "updating application template");
        self.put(url, template).await
    }

    /// `DELETE application-templates/{id}`
    pub async fn delete_template(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Player, &format!("application-templates/{id}"))?;
        debug!(template_id = id, "deleting application template");
        self.delete(url).await
    }

    pub async fn template_exists(&self, id: &str) -> Result<bool, Error> {
        let url = self.url(Service::Player, &format!("application-templates/{id}"))?;
        self.exists(url).await
    }
}
