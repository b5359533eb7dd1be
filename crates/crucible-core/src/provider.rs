// ── Provider facade ──
//
// Owns the authenticated client built from a `ProviderConfig` and hands out
// per-resource services that share it.

use crucible_api::ApiClient;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::CoreError;
use crate::reconcile::ViewService;
use crate::resource::{TemplateService, UserService, VlanService, VmService};

#[derive(Clone)]
pub struct Provider {
    client: ApiClient,
}

impl Provider {
    /// Build the HTTP client. No network traffic happens here.
    pub fn new(config: &ProviderConfig) -> Result<Self, CoreError> {
        let endpoints = config.endpoints()?;
        let client = ApiClient::new(config.credentials(), endpoints, &config.transport())?;
        debug!(
            token_url = %config.token_url,
            username = %config.username,
            "provider configured"
        );
        Ok(Self { client })
    }

    /// Wrap an existing client (tests, custom transports).
    pub fn from_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetch one token so bad credentials fail before any resource work.
    pub async fn verify_credentials(&self) -> Result<(), CoreError> {
        self.client.tokens().get_token().await?;
        info!(token_url = %self.client.tokens().credentials().token_url, "credentials verified");
        Ok(())
    }

    pub fn views(&self) -> ViewService {
        ViewService::new(self.client.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.client.clone())
    }

    pub fn templates(&self) -> TemplateService {
        TemplateService::new(self.client.clone())
    }

    pub fn vms(&self) -> VmService {
        VmService::new(self.client.clone())
    }

    pub fn vlans(&self) -> VlanService {
        VlanService::new(self.client.clone())
    }
}
