// ── VM records ──
//
// A VM record points the Player UI at a console. Proxmox-backed VMs carry
// the Proxmox VM id and node; declarations may give the id either as a
// bare number or as the `node/qemu/100` path Proxmox itself reports.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vm {
    /// Generated when the declaration omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Computed by the VM API when no `url` is given.
    #[serde(default)]
    pub default_url: bool,
    #[serde(default)]
    pub team_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub embeddable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_connection: Option<ConsoleConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxmox: Option<ProxmoxInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConnection {
    pub hostname: String,
    pub port: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxmoxInfo {
    #[serde(deserialize_with = "deserialize_proxmox_id")]
    pub id: i64,
    pub node: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Parse `"100"` or `"pve1/qemu/100"` into `100`.
pub fn parse_proxmox_id(raw: &str) -> Result<i64, CoreError> {
    let last = raw.trim().rsplit('/').next().unwrap_or_default();
    last.parse().map_err(|_| CoreError::ValidationFailed {
        message: format!("invalid Proxmox VM id '{raw}': expected a number or node/type/number"),
    })
}

fn deserialize_proxmox_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => parse_proxmox_id(&s).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn proxmox_id_accepts_bare_and_path_forms() {
        assert_eq!(parse_proxmox_id("100").unwrap(), 100);
        assert_eq!(parse_proxmox_id("pve1/qemu/205").unwrap(), 205);
        assert!(parse_proxmox_id("pve1/qemu/").is_err());
    }

    #[test]
    fn proxmox_id_deserializes_from_string_or_number() {
        let a: ProxmoxInfo = serde_json::from_value(json!({ "id": "pve/qemu/7", "node": "pve" })).unwrap();
        let b: ProxmoxInfo = serde_json::from_value(json!({ "id": 7, "node": "pve" })).unwrap();
        assert_eq!(a, b);
    }
}
