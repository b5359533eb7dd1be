// Application templates

use crucible_api::ApiClient;
use crucible_api::player::models::ApplicationTemplateRecord;
use tracing::info;

use crate::error::{CoreError, ResultExt};
use crate::model::AppTemplate;
use crate::resource::{ManagedResource, missing_id};

#[derive(Clone)]
pub struct TemplateService {
    client: ApiClient,
}

impl TemplateService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl ManagedResource for TemplateService {
    type State = AppTemplate;
    const KIND: &'static str = "application template";

    fn id(state: &AppTemplate) -> Option<&str> {
        state.id.as_deref()
    }

    fn settle(remembered: &AppTemplate, desired: &AppTemplate) -> AppTemplate {
        AppTemplate {
            id: desired.id.clone().or_else(|| remembered.id.clone()),
            url: desired.url.clone().filter(|s| !s.is_empty()),
            icon: desired.icon.clone().filter(|s| !s.is_empty()),
            ..desired.clone()
        }
    }

    async fn create(&self, desired: &AppTemplate) -> Result<AppTemplate, CoreError> {
        let record = ApplicationTemplateRecord {
            id: None,
            ..ApplicationTemplateRecord::from(desired)
        };
        let id = self
            .client
            .create_template(&record)
            .await
            .context(|| format!("creating application template '{}'", desired.name))?;
        info!(template_id = %id, name = %desired.name, "created application template");
        let mut created = Self::settle(desired, desired);
        created.id = Some(id);
        Ok(created)
    }

    async fn read(&self, remembered: &AppTemplate) -> Result<Option<AppTemplate>, CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        Ok(self.client.get_template(id).await?.map(AppTemplate::from))
    }

    async fn update(
        &self,
        remembered: &AppTemplate,
        desired: &AppTemplate,
    ) -> Result<AppTemplate, CoreError> {
        let settled = Self::settle(remembered, desired);
        let id = settled.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        self.client
            .update_template(id, &ApplicationTemplateRecord::from(&settled))
            .await
            .context(|| format!("updating application template '{}'", settled.name))?;
        info!(template_id = id, "updated application template");
        Ok(settled)
    }

    async fn delete(&self, remembered: &AppTemplate) -> Result<(), CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        self.client
            .delete_template(id)
            .await
            .context(|| format!("deleting application template '{}'", remembered.name))?;
        info!(template_id = id, "deleted application template");
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.client.template_exists(id).await?)
    }
}
