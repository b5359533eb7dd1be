// Caster API request and response types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VlanRecord {
    pub id: String,
    #[serde(default)]
    pub pool_id: Option<String>,
    #[serde(default)]
    pub partition_id: Option<String>,
    #[serde(default)]
    pub vlan_id: i32,
    #[serde(default)]
    pub in_use: bool,
    #[serde(default)]
    pub reserved: bool,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Acquire command. Every absent field is left out of the payload.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VlanAcquireRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i32>,
}

impl VlanAcquireRequest {
    /// Build a command, treating empty strings as unset.
    pub fn new(
        project_id: Option<&str>,
        partition_id: Option<&str>,
        tag: Option<&str>,
        vlan_id: Option<i32>,
    ) -> Self {
        let present = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_owned);
        Self {
            project_id: present(project_id),
            partition_id: present(partition_id),
            tag: present(tag),
            vlan_id,
        }
    }
}
