use serde::{Deserialize, Serialize};

/// A VLAN allocation from a Caster pool.
///
/// Immutable once acquired. `project_id` and `partition_id` are mutually
/// exclusive selectors; `vlan_id` requests a specific tag, otherwise the
/// server assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    // ── Computed ──
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<String>,
    #[serde(default)]
    pub in_use: bool,
    #[serde(default)]
    pub reserved: bool,
}
