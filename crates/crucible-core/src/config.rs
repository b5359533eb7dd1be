// ── Runtime provider configuration ──
//
// Built once at startup by the config loader and shared by reference.
// Carries credential data and connection tuning but never touches disk.

use std::path::PathBuf;
use std::time::Duration;

use crucible_api::{ApiEndpoints, Credentials, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab deployments).
    DangerAcceptInvalid,
}

/// Immutable provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub username: String,
    pub password: SecretString,
    /// Authorization endpoint. The password grant never visits it.
    pub auth_url: Option<Url>,
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub scopes: Vec<String>,
    pub player_api_url: Option<String>,
    pub vm_api_url: Option<String>,
    pub caster_api_url: Option<String>,
    pub tls: TlsVerification,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub(crate) fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            token_url: self.token_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes: self.scopes.clone(),
        }
    }

    /// Normalize the configured base URLs.
    pub(crate) fn endpoints(&self) -> Result<ApiEndpoints, CoreError> {
        ApiEndpoints::from_raw(
            self.player_api_url.as_deref(),
            self.vm_api_url.as_deref(),
            self.caster_api_url.as_deref(),
        )
        .map_err(CoreError::from)
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
