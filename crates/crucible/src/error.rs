//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a distinct exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use crucible_config::ConfigError;
use crucible_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(crucible::connection_failed),
        help(
            "Check that the API is reachable: {reason}\n\
             Base URLs come from SEI_CRUCIBLE_PLAYER_API_URL, SEI_CRUCIBLE_VM_API_URL,\n\
             and SEI_CRUCIBLE_CASTER_API_URL."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {url}")]
    #[diagnostic(
        code(crucible::timeout),
        help("Raise 'timeout' in the config file or check the API's responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(crucible::auth_failed),
        help(
            "Verify your credentials and token URL are correct.\n\
             Check SEI_CRUCIBLE_USERNAME, SEI_CRUCIBLE_PASSWORD, SEI_CRUCIBLE_TOKEN_URL,\n\
             and SEI_CRUCIBLE_CLIENT_ID."
        )
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(crucible::forbidden),
        help("The configured user lacks the Player or VM permission this operation needs.")
    )]
    Forbidden { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required setting '{field}'")]
    #[diagnostic(
        code(crucible::missing_setting),
        help("Set {env}, or add '{field}' to {path}")
    )]
    MissingSetting {
        field: &'static str,
        env: String,
        path: String,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(crucible::config))]
    Config { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(crucible::not_found),
        help("Run: crucible refresh to drop state for resources deleted out of band")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(crucible::unresolved_reference),
        help("Names are resolved against the live Player API; create the referenced object first.")
    )]
    UnresolvedReference { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(crucible::requires_replacement),
        help("Run: crucible destroy, then apply the document again")
    )]
    RequiresReplacement { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(crucible::partial_apply),
        help(
            "Remote state was left partially applied and the state file was not updated.\n\
             Run: crucible refresh before applying again"
        )
    )]
    PartialApply { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(crucible::api_error))]
    Api { status: u16, message: String },

    #[error("{0}")]
    #[diagnostic(code(crucible::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid declaration: {message}")]
    #[diagnostic(code(crucible::validation))]
    Validation { message: String },

    // ── Documents and state ──────────────────────────────────────────
    #[error("Could not parse {path}: {reason}")]
    #[diagnostic(
        code(crucible::document),
        help("Documents are YAML or JSON; state files are JSON written by apply.")
    )]
    Document { path: String, reason: String },

    #[error("{path} holds {found} state, not {expected}")]
    #[diagnostic(code(crucible::state_kind))]
    StateKind {
        path: String,
        expected: String,
        found: String,
    },

    #[error("No state file at {path}")]
    #[diagnostic(
        code(crucible::no_state),
        help("Run: crucible apply to create the resource and record its state")
    )]
    NoState { path: String },

    // ── Signals ──────────────────────────────────────────────────────
    #[error("Interrupted")]
    #[diagnostic(
        code(crucible::cancelled),
        help("Remote state may be partially applied. Run: crucible refresh")
    )]
    Cancelled,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not encode state: {0}")]
    #[diagnostic(code(crucible::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::UnresolvedReference { .. } | Self::NoState { .. } => {
                exit_code::NOT_FOUND
            }
            Self::RequiresReplacement { .. } => exit_code::CONFLICT,
            Self::Api { status, .. } if *status == 409 => exit_code::CONFLICT,
            Self::MissingSetting { .. }
            | Self::Config { .. }
            | Self::Validation { .. }
            | Self::Document { .. }
            | Self::StateKind { .. } => exit_code::USAGE,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        // Wrapped errors keep their full message; the class comes from the root.
        let message = err.to_string();
        let wrapped = matches!(
            err,
            CoreError::PartialApply { .. } | CoreError::Context { .. }
        );
        match err.root() {
            CoreError::AuthenticationFailed { .. } | CoreError::Api { status: 401, .. } => {
                CliError::AuthFailed { message }
            }
            CoreError::Api { status: 403, .. } => CliError::Forbidden { message },
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url: url.clone(),
                reason: reason.clone(),
            },
            CoreError::Timeout { url } => CliError::Timeout { url: url.clone() },
            _ if matches!(err, CoreError::PartialApply { .. }) => {
                CliError::PartialApply { message }
            }
            CoreError::UnresolvedReference { .. } => CliError::UnresolvedReference { message },
            CoreError::RequiresReplacement { .. } => CliError::RequiresReplacement { message },
            CoreError::ValidationFailed { message: reason } if !wrapped => {
                CliError::Validation {
                    message: reason.clone(),
                }
            }
            CoreError::ValidationFailed { .. } => CliError::Validation { message },
            CoreError::NotFound {
                entity_type,
                identifier,
            } if !wrapped => CliError::NotFound {
                resource_type: (*entity_type).to_owned(),
                identifier: identifier.clone(),
            },
            CoreError::Api { status, .. } => CliError::Api {
                status: *status,
                message,
            },
            CoreError::Config { .. } => CliError::Config { message },
            _ => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field, env } => CliError::MissingSetting {
                field,
                env,
                path: crucible_config::config_path().display().to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crucible_core::{Action, ReferenceKind};

    use super::*;

    fn api(status: u16) -> CoreError {
        CoreError::Api {
            status,
            message: "boom".into(),
            body: String::new(),
        }
    }

    #[test]
    fn partial_apply_keeps_progress_and_cause() {
        let err = CliError::from(CoreError::partial("teams", Action::Created, 2, api(500)));
        assert!(matches!(err, CliError::PartialApply { .. }));
        assert_eq!(
            err.to_string(),
            "2 teams created before error: API returned status 500: boom"
        );
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn auth_failure_inside_partial_apply_is_still_auth() {
        let err = CliError::from(CoreError::partial("users", Action::Added, 0, api(401)));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn unresolved_reference_is_not_found() {
        let err = CliError::from(CoreError::UnresolvedReference {
            kind: ReferenceKind::Role,
            name: "Ghost".into(),
            scope: None,
        });
        assert_eq!(err.to_string(), "role 'Ghost' not found");
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
    }

    #[test]
    fn missing_setting_names_the_variable() {
        let err = CliError::from(ConfigError::Missing {
            field: "username",
            env: "SEI_CRUCIBLE_USERNAME".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.starts_with("Set SEI_CRUCIBLE_USERNAME"), "{help}");
    }
}
