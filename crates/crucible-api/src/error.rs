use thiserror::Error;

/// Top-level error type for the `crucible-api` crate.
///
/// Covers token acquisition, transport, and remote API failures across
/// the Player, VM, and Caster services. `crucible-core` maps these into
/// domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token exchange failed (bad credentials, unreachable token endpoint).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A request targeted a service whose base URL was never configured.
    #[error("No base URL configured for the {service} API")]
    MissingEndpoint { service: String },

    // ── Remote API ──────────────────────────────────────────────────
    /// A response whose status is not allowed for the verb.
    #[error("API returned status {status}: {message}{}", body_suffix(.message, .body))]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// Request body could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn body_suffix(message: &str, body: &str) -> String {
    if body.is_empty() || body == message {
        String::new()
    } else {
        format!(" (body: {body})")
    }
}

impl Error {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the remote rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` if this is a transient transport error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_omits_body_equal_to_message() {
        let err = Error::Api {
            status: 500,
            message: "boom".into(),
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "API returned status 500: boom");
    }

    #[test]
    fn api_error_appends_distinct_body() {
        let err = Error::Api {
            status: 400,
            message: "Invalid input".into(),
            body: r#"{"message":"Invalid input"}"#.into(),
        };
        assert_eq!(
            err.to_string(),
            r#"API returned status 400: Invalid input (body: {"message":"Invalid input"})"#
        );
    }

    #[test]
    fn api_error_omits_empty_body() {
        let err = Error::Api {
            status: 404,
            message: "404 Not Found".into(),
            body: String::new(),
        };
        assert_eq!(err.to_string(), "API returned status 404: 404 Not Found");
        assert!(err.is_not_found());
    }
}
