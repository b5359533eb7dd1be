// OAuth2 password-grant credential cache
//
// A single access token is shared by every request the provider issues.
// Readers take the shared lock; a refresh takes the exclusive lock and
// re-checks validity first, so concurrent cold callers share one fetch.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::Error;

/// Tokens this close to expiry are treated as already expired.
const EXPIRY_DELTA: Duration = Duration::from_secs(10);

/// Resource-owner credentials exchanged for a bearer token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub scopes: Vec<String>,
}

/// A cached access token and the instant it stops being usable.
#[derive(Debug, Clone)]
pub struct AccessToken {
    secret: SecretString,
    expires_at: Option<Instant>,
}

impl AccessToken {
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// `None` means the token endpoint did not report a lifetime.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    fn is_valid_at(&self, now: Instant) -> bool {
        if self.secret.expose_secret().is_empty() {
            return false;
        }
        self.expires_at
            .is_none_or(|at| at.checked_sub(EXPIRY_DELTA).is_some_and(|at| at > now))
    }
}

// ── Token endpoint wire shapes ──────────────────────────────────────

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

// ── Cache ───────────────────────────────────────────────────────────

/// Concurrency-safe cache around the password-grant token exchange.
pub struct TokenCache {
    http: reqwest::Client,
    credentials: Credentials,
    token: RwLock<Option<AccessToken>>,
}

impl TokenCache {
    pub fn new(http: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            http,
            credentials,
            token: RwLock::new(None),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Return a valid bearer token, fetching one if the cache is cold or stale.
    pub async fn get_token(&self) -> Result<SecretString, Error> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(Instant::now())) {
                return Ok(token.secret.clone());
            }
        }

        let mut cached = self.token.write().await;
        // Another caller may have refreshed while we waited for the write lock.
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid_at(Instant::now())) {
            return Ok(token.secret.clone());
        }

        let fresh = self.fetch().await?;
        let secret = fresh.secret.clone();
        *cached = Some(fresh);
        Ok(secret)
    }

    /// Drop the cached token so the next caller fetches a new one.
    pub async fn invalidate(&self) {
        debug!("invalidating cached access token");
        *self.token.write().await = None;
    }

    async fn fetch(&self) -> Result<AccessToken, Error> {
        let creds = &self.credentials;
        debug!(token_url = %creds.token_url, username = %creds.username, "requesting access token");

        let scope = creds.scopes.join(" ");
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "password"),
            ("username", creds.username.as_str()),
            ("password", creds.password.expose_secret()),
            ("client_id", creds.client_id.as_str()),
        ];
        if let Some(ref secret) = creds.client_secret {
            form.push(("client_secret", secret.expose_secret()));
        }
        if !scope.is_empty() {
            form.push(("scope", scope.as_str()));
        }

        let resp = self
            .http
            .post(creds.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Authentication {
                message: format!("token endpoint {} unreachable: {e}", creds.token_url),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Authentication {
            message: format!("failed to read token response: {e}"),
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body.trim().to_owned()
                    }
                });
            return Err(Error::Authentication {
                message: format!("token endpoint returned {status}: {detail}"),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Authentication {
                message: format!("malformed token response: {e}"),
            })?;
        if parsed.access_token.is_empty() {
            return Err(Error::Authentication {
                message: "token endpoint returned an empty access token".into(),
            });
        }

        let expires_at = parsed
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        Ok(AccessToken {
            secret: SecretString::from(parsed.access_token),
            expires_at,
        })
    }
}
