// VLAN allocations
//
// Acquired from a Caster pool and released back. A VLAN that is no longer
// in use has been released and counts as gone.

use crucible_api::ApiClient;
use crucible_api::caster::models::VlanAcquireRequest;
use tracing::info;

use crate::convert::vlan_from_record;
use crate::error::{CoreError, ResultExt};
use crate::model::Vlan;
use crate::resource::{ManagedResource, missing_id};

#[derive(Clone)]
pub struct VlanService {
    client: ApiClient,
}

impl VlanService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

/// Declared selectors that differ between two VLAN states.
fn changed_selectors(remembered: &Vlan, desired: &Vlan) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if desired.project_id != remembered.project_id {
        fields.push("project_id");
    }
    if desired.partition_id.is_some() && desired.partition_id != remembered.partition_id {
        fields.push("partition_id");
    }
    if desired.vlan_id.is_some() && desired.vlan_id != remembered.vlan_id {
        fields.push("vlan_id");
    }
    if desired.tag.is_some() && desired.tag != remembered.tag {
        fields.push("tag");
    }
    fields
}

impl ManagedResource for VlanService {
    type State = Vlan;
    const KIND: &'static str = "vlan";

    fn id(state: &Vlan) -> Option<&str> {
        state.id.as_deref()
    }

    fn settle(remembered: &Vlan, desired: &Vlan) -> Vlan {
        if changed_selectors(remembered, desired).is_empty() {
            remembered.clone()
        } else {
            desired.clone()
        }
    }

    async fn create(&self, desired: &Vlan) -> Result<Vlan, CoreError> {
        if desired.project_id.as_deref().is_some_and(|p| !p.is_empty())
            && desired.partition_id.as_deref().is_some_and(|p| !p.is_empty())
        {
            return Err(CoreError::ValidationFailed {
                message: "project_id and partition_id are mutually exclusive".into(),
            });
        }
        let request = VlanAcquireRequest::new(
            desired.project_id.as_deref(),
            desired.partition_id.as_deref(),
            desired.tag.as_deref(),
            desired.vlan_id,
        );
        let record = self
            .client
            .acquire_vlan(&request)
            .await
            .context(|| "acquiring vlan".to_owned())?;
        info!(vlan_id = %record.id, tag = record.vlan_id, "acquired vlan");
        Ok(vlan_from_record(desired, record))
    }

    async fn read(&self, remembered: &Vlan) -> Result<Option<Vlan>, CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        match self.client.get_vlan(id).await? {
            Some(record) if record.in_use => Ok(Some(vlan_from_record(remembered, record))),
            _ => Ok(None),
        }
    }

    async fn update(&self, remembered: &Vlan, desired: &Vlan) -> Result<Vlan, CoreError> {
        let fields = changed_selectors(remembered, desired);
        if fields.is_empty() {
            return Ok(remembered.clone());
        }
        Err(CoreError::RequiresReplacement {
            resource: Self::KIND,
            identifier: remembered.id.clone().unwrap_or_default(),
            fields: fields.join(", "),
        })
    }

    async fn delete(&self, remembered: &Vlan) -> Result<(), CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        self.client
            .release_vlan(id)
            .await
            .context(|| format!("releasing vlan {id}"))?;
        info!(vlan_id = id, "released vlan");
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self
            .client
            .get_vlan(id)
            .await?
            .is_some_and(|record| record.in_use))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acquired() -> Vlan {
        Vlan {
            id: Some("vl-1".into()),
            project_id: Some("proj".into()),
            partition_id: Some("part".into()),
            vlan_id: Some(101),
            tag: None,
            pool_id: Some("pool".into()),
            in_use: true,
            reserved: false,
        }
    }

    #[test]
    fn server_filled_selectors_are_not_changes() {
        let desired = Vlan {
            id: None,
            project_id: Some("proj".into()),
            partition_id: None,
            vlan_id: None,
            tag: None,
            pool_id: None,
            in_use: false,
            reserved: false,
        };
        assert!(changed_selectors(&acquired(), &desired).is_empty());
        assert_eq!(VlanService::settle(&acquired(), &desired), acquired());
    }

    #[test]
    fn new_vlan_tag_is_a_replacement() {
        let mut desired = acquired();
        desired.vlan_id = Some(102);
        assert_eq!(changed_selectors(&acquired(), &desired), vec!["vlan_id"]);
    }
}
