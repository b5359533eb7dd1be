// Authenticated HTTP executor shared by every Crucible service.
//
// Base URLs: one per service, each normalized to end in `/api/`.
// Auth: OAuth2 bearer token from the `TokenCache`, refreshed once on 401.

use std::fmt;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{Credentials, TokenCache};
use crate::{Error, TransportConfig};

// ── Services ────────────────────────────────────────────────────────

/// The three remote services a provider talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Player,
    Vm,
    Caster,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Player => "Player",
            Self::Vm => "VM",
            Self::Caster => "Caster",
        })
    }
}

/// Normalized base URLs. A service left unset fails at first use.
#[derive(Debug, Clone, Default)]
pub struct ApiEndpoints {
    pub player: Option<Url>,
    pub vm: Option<Url>,
    pub caster: Option<Url>,
}

impl ApiEndpoints {
    /// Normalize each raw base URL that is present.
    pub fn from_raw(
        player: Option<&str>,
        vm: Option<&str>,
        caster: Option<&str>,
    ) -> Result<Self, Error> {
        Ok(Self {
            player: player.map(normalize_api_url).transpose()?,
            vm: vm.map(normalize_api_url).transpose()?,
            caster: caster.map(normalize_api_url).transpose()?,
        })
    }

    fn base(&self, service: Service) -> Option<&Url> {
        match service {
            Service::Player => self.player.as_ref(),
            Service::Vm => self.vm.as_ref(),
            Service::Caster => self.caster.as_ref(),
        }
    }
}

/// Strip one trailing `/` and one trailing `/api`, then append `/api/`.
///
/// `https://player.example.com`, `https://player.example.com/` and
/// `https://player.example.com/api/` all become `https://player.example.com/api/`.
pub fn normalize_api_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    Ok(Url::parse(&format!("{trimmed}/api/"))?)
}

// ── Error body extraction ───────────────────────────────────────────

/// Pick a human message out of an error body.
///
/// JSON bodies yield `message`, then `error`, then `title`. Plain bodies
/// are used verbatim. Anything else falls back to the status line.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        return ["message", "error", "title"]
            .iter()
            .find_map(|key| {
                value
                    .get(key)
                    .and_then(serde_json::Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .map_or_else(|| status.to_string(), str::to_owned);
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_owned()
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the Crucible APIs.
///
/// Cheap to clone; clones share the HTTP connection pool and the token cache.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    tokens: Arc<TokenCache>,
    endpoints: ApiEndpoints,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client whose token fetches and API calls share one transport.
    pub fn new(
        credentials: Credentials,
        endpoints: ApiEndpoints,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, credentials, endpoints))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        credentials: Credentials,
        endpoints: ApiEndpoints,
    ) -> Self {
        let tokens = Arc::new(TokenCache::new(http.clone(), credentials));
        Self {
            http,
            tokens,
            endpoints,
        }
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"views/{id}"`) onto a service base URL.
    pub fn url(&self, service: Service, path: &str) -> Result<Url, Error> {
        let base = self.endpoints.base(service).ok_or_else(|| Error::MissingEndpoint {
            service: service.to_string(),
        })?;
        Ok(base.join(path)?)
    }

    /// Like [`url`](Self::url) but percent-encodes a trailing name segment.
    pub fn url_with_segment(
        &self,
        service: Service,
        prefix: &str,
        segment: &str,
    ) -> Result<Url, Error> {
        let mut url = self.url(service, prefix)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    // ── Executor ─────────────────────────────────────────────────────

    /// Issue one logical request, retrying exactly once on 401.
    ///
    /// The response is returned whatever its status; the verb helpers
    /// apply the per-verb status policy.
    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<Response, Error> {
        let resp = self.send_once(&method, &url, body.as_deref()).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        warn!(%method, %url, "request unauthorized, refreshing token and retrying once");
        self.tokens.invalidate().await;
        self.send_once(&method, &url, body.as_deref()).await
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<Response, Error> {
        let token = self.tokens.get_token().await?;
        debug!("{method} {url}");

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(token.expose_secret());
        if let Some(bytes) = body {
            req = req
                .header(CONTENT_TYPE, "application/json")
                .body(bytes.to_vec());
        }
        Ok(req.send().await?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let resp = self.execute(Method::GET, url, None).await?;
        let resp = check_status(resp, &[StatusCode::OK]).await?;
        decode(resp).await
    }

    /// GET that maps 404 to `None`.
    pub async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        let resp = self.execute(Method::GET, url, None).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp, &[StatusCode::OK]).await?;
        decode(resp).await.map(Some)
    }

    /// `true` on 200, `false` on 404, error otherwise.
    pub async fn exists(&self, url: Url) -> Result<bool, Error> {
        let resp = self.execute(Method::GET, url, None).await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(parse_error(resp).await),
        }
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        let bytes = serde_json::to_vec(body)?;
        let resp = self.execute(Method::POST, url, Some(bytes)).await?;
        let resp = check_status(resp, &[StatusCode::OK, StatusCode::CREATED]).await?;
        decode(resp).await
    }

    pub async fn post_no_response<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        let bytes = serde_json::to_vec(body)?;
        let resp = self.execute(Method::POST, url, Some(bytes)).await?;
        check_status(resp, &[StatusCode::OK, StatusCode::CREATED]).await?;
        Ok(())
    }

    /// POST without a body (action and association endpoints).
    pub async fn post_empty(&self, url: Url) -> Result<(), Error> {
        let resp = self.execute(Method::POST, url, None).await?;
        check_status(resp, &[StatusCode::OK, StatusCode::CREATED]).await?;
        Ok(())
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), Error> {
        let bytes = serde_json::to_vec(body)?;
        let resp = self.execute(Method::PUT, url, Some(bytes)).await?;
        check_status(resp, &[StatusCode::OK, StatusCode::NO_CONTENT]).await?;
        Ok(())
    }

    /// DELETE treats 404 as success.
    pub async fn delete(&self, url: Url) -> Result<(), Error> {
        let resp = self.execute(Method::DELETE, url, None).await?;
        check_status(
            resp,
            &[StatusCode::OK, StatusCode::NO_CONTENT, StatusCode::NOT_FOUND],
        )
        .await?;
        Ok(())
    }
}

// ── Response handling ───────────────────────────────────────────────

async fn check_status(resp: Response, allowed: &[StatusCode]) -> Result<Response, Error> {
    if allowed.contains(&resp.status()) {
        Ok(resp)
    } else {
        Err(parse_error(resp).await)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

async fn parse_error(resp: Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Error::Api {
        status: status.as_u16(),
        message: extract_error_message(status, &body),
        body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalize_appends_api_segment() {
        let cases = [
            ("https://player.example.com", "https://player.example.com/api/"),
            ("https://player.example.com/", "https://player.example.com/api/"),
            ("https://player.example.com/api", "https://player.example.com/api/"),
            ("https://player.example.com/api/", "https://player.example.com/api/"),
            ("https://host/player", "https://host/player/api/"),
        ];
        for (raw, expected) in cases {
            assert_eq!(normalize_api_url(raw).unwrap().as_str(), expected, "{raw}");
        }
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(matches!(
            normalize_api_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn extract_prefers_message_then_error_then_title() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            extract_error_message(status, r#"{"message":"m","error":"e","title":"t"}"#),
            "m"
        );
        assert_eq!(extract_error_message(status, r#"{"error":"e","title":"t"}"#), "e");
        assert_eq!(extract_error_message(status, r#"{"title":"t"}"#), "t");
    }

    #[test]
    fn extract_falls_back_to_body_or_status() {
        assert_eq!(
            extract_error_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error\n"),
            "Internal Server Error"
        );
        assert_eq!(
            extract_error_message(StatusCode::NOT_FOUND, ""),
            "404 Not Found"
        );
        assert_eq!(
            extract_error_message(StatusCode::CONFLICT, r#"{"detail":"x"}"#),
            "409 Conflict"
        );
    }
}
