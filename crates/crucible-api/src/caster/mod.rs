// Caster API VLAN endpoints
//
// VLANs are acquired from a pool and released back; there is no update.

pub mod models;

use tracing::debug;

use crate::client::{ApiClient, Service};
use crate::error::Error;

use self::models::{VlanAcquireRequest, VlanRecord};

impl ApiClient {
    /// `POST vlans/actions/acquire/`
    pub async fn acquire_vlan(&self, request: &VlanAcquireRequest) -> Result<VlanRecord, Error> {
        let url = self.url(Service::Caster, "vlans/actions/acquire/")?;
        debug!(
            project_id = ?request.project_id,
            partition_id = ?request.partition_id,
            vlan_id = ?request.vlan_id,
            "acquiring vlan"
        );
        self.post(url, request).await
    }

    /// `GET vlans/{id}`, `None` when the VLAN is unknown.
    pub async fn get_vlan(&self, id: &str) -> Result<Option<VlanRecord>, Error> {
        let url = self.url(Service::Caster, &format!("vlans/{id}"))?;
        self.get_optional(url).await
    }

    /// `POST vlans/{id}/actions/release`
    pub async fn release_vlan(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Caster, &format!("vlans/{id}/actions/release"))?;
        debug!(vlan_id = id, "releasing vlan");
        self.post_empty(url).await
    }
}
