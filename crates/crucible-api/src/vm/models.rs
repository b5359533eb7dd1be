// VM API request and response types

use serde::{Deserialize, Serialize};

/// A VM record as stored by the VM API.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VmRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Server-computed; only sent once the server has reported it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default_url: bool,
    pub name: String,
    #[serde(default)]
    pub team_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub embeddable: bool,
    #[serde(
        default,
        rename = "consoleConnectionInfo",
        skip_serializing_if = "Option::is_none"
    )]
    pub console_connection: Option<ConsoleConnectionRecord>,
    #[serde(default, rename = "proxmoxVmInfo", skip_serializing_if = "Option::is_none")]
    pub proxmox: Option<ProxmoxRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleConnectionRecord {
    pub hostname: String,
    pub port: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxmoxRecord {
    pub id: i64,
    pub node: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Fields of the create response the caller folds back into its record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmCreated {
    #[serde(default)]
    pub default_url: Option<bool>,
}
