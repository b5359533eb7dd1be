// ── Core error types ──
//
// User-facing errors from crucible-core. Transport failures arrive as
// `crucible_api::Error` and are translated by the `From` impl below;
// reconciliation adds reference-resolution and partial-apply context.

use strum::Display;
use thiserror::Error;

/// What a failed batch was doing when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    Deleted,
    Added,
    Removed,
}

/// A name-based reference that had to be turned into an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReferenceKind {
    #[strum(serialize = "role")]
    Role,
    #[strum(serialize = "team role")]
    TeamRole,
    #[strum(serialize = "permission")]
    Permission,
    #[strum(serialize = "application")]
    Application,
    #[strum(serialize = "team membership")]
    TeamMembership,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Authentication failed: {message}. Verify your credentials and token URL are correct.")]
    AuthenticationFailed { message: String },

    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    // ── Remote API errors ────────────────────────────────────────────
    #[error("API returned status {status}: {message}{}", body_suffix(.message, .body))]
    Api {
        status: u16,
        message: String,
        body: String,
    },

    // ── Reconciliation errors ────────────────────────────────────────
    #[error("{kind} '{name}' not found{}", scope_suffix(.scope.as_deref()))]
    UnresolvedReference {
        kind: ReferenceKind,
        name: String,
        scope: Option<String>,
    },

    /// A batch stopped part-way; `completed` siblings were already applied.
    #[error("{completed} {resource} {action} before error: {source}")]
    PartialApply {
        resource: &'static str,
        action: Action,
        completed: usize,
        source: Box<CoreError>,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<CoreError>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("{resource} '{identifier}' cannot be updated in place; changed: {fields}")]
    RequiresReplacement {
        resource: &'static str,
        identifier: String,
        fields: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

fn body_suffix(message: &str, body: &str) -> String {
    if body.is_empty() || body == message {
        String::new()
    } else {
        format!(" (body: {body})")
    }
}

fn scope_suffix(scope: Option<&str>) -> String {
    scope.map(|s| format!(" in {s}")).unwrap_or_default()
}

impl CoreError {
    /// Wrap a failure from the `completed + 1`-th item of a batch.
    pub fn partial(resource: &'static str, action: Action, completed: usize, source: Self) -> Self {
        Self::PartialApply {
            resource,
            action,
            completed,
            source: Box::new(source),
        }
    }

    /// The innermost error, past any context and partial-apply wrappers.
    pub fn root(&self) -> &Self {
        match self {
            Self::PartialApply { source, .. } | Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// HTTP status of the innermost remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.root(), Self::AuthenticationFailed { .. })
            || self.status() == Some(401)
    }
}

/// Attach an operation description to an error.
pub trait ResultExt<T> {
    fn context<F: FnOnce() -> String>(self, f: F) -> Result<T, CoreError>;
}

impl<T, E: Into<CoreError>> ResultExt<T> for Result<T, E> {
    fn context<F: FnOnce() -> String>(self, f: F) -> Result<T, CoreError> {
        self.map_err(|e| CoreError::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<crucible_api::Error> for CoreError {
    fn from(err: crucible_api::Error) -> Self {
        match err {
            crucible_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            crucible_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Internal(format!("HTTP transport error: {e}"))
                }
            }
            crucible_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            crucible_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            crucible_api::Error::MissingEndpoint { service } => CoreError::Config {
                message: format!("No base URL configured for the {service} API"),
            },
            crucible_api::Error::Api {
                status,
                message,
                body,
            } => CoreError::Api {
                status,
                message,
                body,
            },
            crucible_api::Error::Serialization(e) => {
                CoreError::Internal(format!("Serialization error: {e}"))
            }
            crucible_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
