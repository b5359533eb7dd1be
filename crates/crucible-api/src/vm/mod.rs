// VM API endpoints
//
// VM records and their team associations. VM ids are client-generated.

pub mod models;

use tracing::debug;

use crate::client::{ApiClient, Service};
use crate::error::Error;

use self::models::{VmCreated, VmRecord};

impl ApiClient {
    /// Create a VM record. Returns the server-computed `defaultUrl` flag, if any.
    ///
    /// `POST vms`
    pub async fn create_vm(&self, vm: &VmRecord) -> Result<Option<bool>, Error> {
        let url = self.url(Service::Vm, "vms")?;
        debug!(vm_id = %vm.id, name = %vm.name, "creating vm");
        let created: VmCreated = self.post(url, vm).await?;
        Ok(created.default_url)
    }

    /// `GET vms/{id}`, `None` when the VM is gone.
    pub async fn get_vm(&self, id: &str) -> Result<Option<VmRecord>, Error> {
        let url = self.url(Service::Vm, &format!("vms/{id}"))?;
        self.get_optional(url).await
    }

    /// `PUT vms/{id}`
    pub async fn update_vm(&self, vm: &VmRecord) -> Result<(), Error> {
        let url = self.url(Service::Vm, &format!("vms/{}", vm.id))?;
        debug!(vm_id = %vm.id, "updating vm");
        self.put(url, vm).await
    }

    /// `DELETE vms/{id}`
    pub async fn delete_vm(&self, id: &str) -> Result<(), Error> {
        let url = self.url(Service::Vm, &format!("vms/{id}"))?;
        debug!(vm_id = id, "deleting vm");
        self.delete(url).await
    }

    pub async fn vm_exists(&self, id: &str) -> Result<bool, Error> {
        let url = self.url(Service::Vm, &format!("vms/{id}"))?;
        self.exists(url).await
    }

    /// `POST teams/{team_id}/vms/{vm_id}`
    pub async fn add_vm_to_team(&self, team_id: &str, vm_id: &str) -> Result<(), Error> {
        let url = self.url(Service::Vm, &format!("teams/{team_id}/vms/{vm_id}"))?;
        debug!(team_id, vm_id, "adding vm to team");
        self.post_empty(url).await
    }

    /// `DELETE teams/{team_id}/vms/{vm_id}`
    pub async fn remove_vm_from_team(&self, team_id: &str, vm_id: &str) -> Result<(), Error> {
        let url = self.url(Service::Vm, &format!("teams/{team_id}/vms/{vm_id}"))?;
        debug!(team_id, vm_id, "removing vm from team");
        self.delete(url).await
    }
}
