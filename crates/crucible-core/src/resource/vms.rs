// VM records
//
// VM ids are client-generated. Team membership is managed through its own
// endpoints, so an update first reconciles team links and then rewrites
// the record.

use std::collections::BTreeSet;

use crucible_api::ApiClient;
use tracing::info;
use uuid::Uuid;

use crate::convert::vm_record;
use crate::error::{Action, CoreError, ResultExt};
use crate::model::Vm;
use crate::resource::{ManagedResource, missing_id};

#[derive(Clone)]
pub struct VmService {
    client: ApiClient,
}

impl VmService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

fn sorted_teams(vm: &Vm) -> Vec<String> {
    vm.team_ids
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

impl ManagedResource for VmService {
    type State = Vm;
    const KIND: &'static str = "vm";

    fn id(state: &Vm) -> Option<&str> {
        state.id.as_deref()
    }

    fn settle(remembered: &Vm, desired: &Vm) -> Vm {
        Vm {
            id: desired.id.clone().or_else(|| remembered.id.clone()),
            default_url: remembered.default_url,
            team_ids: sorted_teams(desired),
            ..desired.clone()
        }
    }

    async fn create(&self, desired: &Vm) -> Result<Vm, CoreError> {
        let id = desired
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut created = Vm {
            id: Some(id.clone()),
            team_ids: sorted_teams(desired),
            ..desired.clone()
        };
        let default_url = self
            .client
            .create_vm(&vm_record(&created, &id))
            .await
            .context(|| format!("creating vm '{}'", desired.name))?;
        if let Some(flag) = default_url {
            created.default_url = flag;
        }
        info!(vm_id = %id, name = %created.name, default_url = created.default_url, "created vm");
        Ok(created)
    }

    async fn read(&self, remembered: &Vm) -> Result<Option<Vm>, CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        Ok(self.client.get_vm(id).await?.map(Vm::from))
    }

    async fn update(&self, remembered: &Vm, desired: &Vm) -> Result<Vm, CoreError> {
        let settled = Self::settle(remembered, desired);
        let id = settled.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;

        let old: BTreeSet<&str> = remembered.team_ids.iter().map(String::as_str).collect();
        let new: BTreeSet<&str> = settled.team_ids.iter().map(String::as_str).collect();

        for (done, team_id) in old.difference(&new).enumerate() {
            self.client
                .remove_vm_from_team(team_id, id)
                .await
                .context(|| format!("removing vm {id} from team {team_id}"))
                .map_err(|e| CoreError::partial("team links", Action::Removed, done, e))?;
        }
        for (done, team_id) in new.difference(&old).enumerate() {
            self.client
                .add_vm_to_team(team_id, id)
                .await
                .context(|| format!("adding vm {id} to team {team_id}"))
                .map_err(|e| CoreError::partial("team links", Action::Added, done, e))?;
        }

        self.client
            .update_vm(&vm_record(&settled, id))
            .await
            .context(|| format!("updating vm '{}'", settled.name))?;
        info!(vm_id = id, "updated vm");
        Ok(settled)
    }

    async fn delete(&self, remembered: &Vm) -> Result<(), CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        self.client
            .delete_vm(id)
            .await
            .context(|| format!("deleting vm '{}'", remembered.name))?;
        info!(vm_id = id, "deleted vm");
        Ok(())
    }

    async fn exists(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.client.vm_exists(id).await?)
    }
}
