// ── Documents and state files ──
//
// A document is the desired declaration (YAML or JSON). A state file is
// the JSON envelope apply writes after a successful create or update; it
// holds the remembered resource exactly as the core crate serializes it.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Kind;
use crate::error::CliError;

#[derive(Debug, Serialize, Deserialize)]
pub struct StateFile<T> {
    pub kind: Kind,
    pub applied_at: DateTime<Utc>,
    pub resource: T,
}

/// Parse a declaration. `.json` files are read as JSON, anything else as YAML.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::Document {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| CliError::Document {
        path: path.display().to_string(),
        reason,
    })
}

/// Read remembered state. `None` when no state file exists yet.
pub fn load_state<T: DeserializeOwned>(path: &Path, kind: Kind) -> Result<Option<T>, CliError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let state: StateFile<serde_json::Value> =
        serde_json::from_str(&text).map_err(|e| CliError::Document {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    if state.kind != kind {
        return Err(CliError::StateKind {
            path: path.display().to_string(),
            expected: kind.as_str().into(),
            found: state.kind.as_str().into(),
        });
    }
    let resource = serde_json::from_value(state.resource).map_err(|e| CliError::Document {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), applied_at = %state.applied_at, "loaded state");
    Ok(Some(resource))
}

/// Like [`load_state`], but a missing file is an error.
pub fn require_state<T: DeserializeOwned>(path: &Path, kind: Kind) -> Result<T, CliError> {
    load_state(path, kind)?.ok_or_else(|| CliError::NoState {
        path: path.display().to_string(),
    })
}

/// Write state through a sibling temp file so a crash never truncates it.
pub fn save_state<T: Serialize>(path: &Path, kind: Kind, resource: &T) -> Result<(), CliError> {
    let envelope = StateFile {
        kind,
        applied_at: Utc::now(),
        resource,
    };
    let mut json = serde_json::to_string_pretty(&envelope)?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "wrote state");
    Ok(())
}

pub fn remove_state(path: &Path) -> Result<(), CliError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
