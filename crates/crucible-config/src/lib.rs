//! Configuration for the Crucible provider.
//!
//! Settings come from built-in defaults, then an optional TOML file, then
//! `SEI_CRUCIBLE_*` environment variables, later sources winning. The
//! merged [`Config`] is validated into an immutable
//! [`ProviderConfig`](crucible_core::ProviderConfig).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use crucible_core::{ProviderConfig, TlsVerification};

/// Prefix shared by every environment variable the loader reads.
pub const ENV_PREFIX: &str = "SEI_CRUCIBLE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing {field}: set '{field}' in the config file or {env}")]
    Missing { field: &'static str, env: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn env_name(field: &str) -> String {
    format!("{ENV_PREFIX}{}", field.to_ascii_uppercase())
}

// ── Config ──────────────────────────────────────────────────────────

/// Raw merged settings. Every field is optional until validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    /// Legacy name for `token_url`; ignored when `token_url` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tok_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caster_api_url: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// A list, a JSON array string, or a single scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_scopes: Option<Scopes>,

    /// Skip TLS verification (self-signed lab deployments).
    #[serde(default)]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            auth_url: None,
            token_url: None,
            tok_url: None,
            player_api_url: None,
            vm_api_url: None,
            caster_api_url: None,
            client_id: None,
            client_secret: None,
            client_scopes: None,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scopes {
    List(Vec<String>),
    One(String),
}

impl Scopes {
    /// Flatten into scope names. `[""]` and `""` mean no scopes.
    pub fn to_vec(&self) -> Vec<String> {
        let scopes = match self {
            Self::List(list) => list.clone(),
            Self::One(raw) => {
                let raw = raw.trim();
                if raw.starts_with('[') {
                    serde_json::from_str::<Vec<String>>(raw)
                        .unwrap_or_else(|_| vec![raw.to_owned()])
                } else {
                    vec![raw.to_owned()]
                }
            }
        };
        scopes
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Accept numbers and booleans where a string is expected, as in a TOML
/// file holding `password = 1234`.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|v| match v {
        Scalar::Text(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Config {
    /// Token endpoint, preferring the current name over the legacy one.
    /// The environment's legacy name is already folded into `token_url`.
    pub fn effective_token_url(&self) -> Option<&str> {
        present(self.token_url.as_ref()).or_else(|| present(self.tok_url.as_ref()))
    }

    pub fn scopes(&self) -> Vec<String> {
        self.client_scopes.as_ref().map(Scopes::to_vec).unwrap_or_default()
    }

    /// Validate and build the runtime configuration.
    pub fn to_provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        let username = required(self.username.as_ref(), "username")?;
        let password = required(self.password.as_ref(), "password")?;
        let token_url = self
            .effective_token_url()
            .ok_or_else(|| ConfigError::Missing {
                field: "token_url",
                env: env_name("token_url"),
            })
            .and_then(|raw| parse_url(raw, "token_url"))?;
        let auth_url = present(self.auth_url.as_ref())
            .map(|raw| parse_url(raw, "auth_url"))
            .transpose()?;

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref path) = self.ca_cert {
            TlsVerification::CustomCa(path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout",
                reason: "must be at least one second".into(),
            });
        }

        Ok(ProviderConfig {
            username: username.to_owned(),
            password: SecretString::from(password.to_owned()),
            auth_url,
            token_url,
            client_id: present(self.client_id.as_ref()).unwrap_or_default().to_owned(),
            client_secret: present(self.client_secret.as_ref())
                .map(|s| SecretString::from(s.to_owned())),
            scopes: self.scopes(),
            player_api_url: present(self.player_api_url.as_ref()).map(str::to_owned),
            vm_api_url: present(self.vm_api_url.as_ref()).map(str::to_owned),
            caster_api_url: present(self.caster_api_url.as_ref()).map(str::to_owned),
            tls,
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

fn required<'a>(value: Option<&'a String>, field: &'static str) -> Result<&'a str, ConfigError> {
    present(value).ok_or_else(|| ConfigError::Missing {
        field,
        env: env_name(field),
    })
}

fn parse_url(raw: &str, field: &'static str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field,
        reason: format!("'{raw}' is not a valid URL: {e}"),
    })
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config location, e.g. `~/.config/crucible/crucible.toml`.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "cmu-sei", "crucible").map_or_else(
        || PathBuf::from(".").join("crucible.toml"),
        |dirs| dirs.config_dir().join("crucible.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Keys read from the environment verbatim. Figment's `Env` provider parses
/// values, so `0123` would otherwise arrive as the integer 123.
const VERBATIM_KEYS: &[&str] = &[
    "username",
    "password",
    "auth_url",
    "token_url",
    "tok_url",
    "player_api_url",
    "vm_api_url",
    "caster_api_url",
    "client_id",
    "client_secret",
];

/// Defaults, then the TOML file at `path` (if present), then environment.
///
/// Empty environment variables are treated as unset so they never shadow
/// a value from the file. `SEI_CRUCIBLE_TOK_URL` fills `token_url` when
/// `SEI_CRUCIBLE_TOKEN_URL` is unset, so either name overrides the file.
pub fn figment(path: &Path) -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).filter(|key| {
            let key = key.as_str();
            !is_verbatim(key) && env_value(key).is_some()
        }));

    for key in VERBATIM_KEYS {
        if let Some(value) = env_value(key) {
            figment = figment.merge(Serialized::default(key, value));
        }
    }
    if let (None, Some(legacy)) = (env_value("token_url"), env_value("tok_url")) {
        figment = figment.merge(Serialized::default("token_url", legacy));
    }
    figment
}

fn is_verbatim(key: &str) -> bool {
    VERBATIM_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(env_name(key))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Load from an explicit path, or the platform default.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    Ok(figment(&path).extract()?)
}

/// Load and validate in one step.
pub fn load_provider_config(path: Option<&Path>) -> Result<ProviderConfig, ConfigError> {
    load_config(path)?.to_provider_config()
}

/// Write a config file, creating parent directories. Secrets are written
/// as given; prefer the environment for passwords.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}
