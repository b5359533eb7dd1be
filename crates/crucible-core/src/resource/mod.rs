// ── Managed resources ──
//
// Every top-level resource kind exposes the same lifecycle so callers can
// drive plan/apply generically. Services hold a cheap `ApiClient` clone.

pub mod templates;
pub mod users;
pub mod vlans;
pub mod vms;

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::model::View;
use crate::reconcile::ViewService;

pub use templates::TemplateService;
pub use users::UserService;
pub use vlans::VlanService;
pub use vms::VmService;

/// Create/read/update/delete/exists over one resource kind.
#[allow(async_fn_in_trait)]
pub trait ManagedResource {
    type State: Serialize + DeserializeOwned + Clone + PartialEq + Debug;

    /// Kind name used in messages and state files.
    const KIND: &'static str;

    fn id(state: &Self::State) -> Option<&str>;

    /// Desired state with the identifier and computed fields of
    /// `remembered` filled in, ready to compare against it.
    fn settle(remembered: &Self::State, desired: &Self::State) -> Self::State;

    async fn create(&self, desired: &Self::State) -> Result<Self::State, CoreError>;

    /// `None` when the remote object is gone.
    async fn read(&self, remembered: &Self::State) -> Result<Option<Self::State>, CoreError>;

    async fn update(
        &self,
        remembered: &Self::State,
        desired: &Self::State,
    ) -> Result<Self::State, CoreError>;

    async fn delete(&self, remembered: &Self::State) -> Result<(), CoreError>;

    async fn exists(&self, id: &str) -> Result<bool, CoreError>;
}

fn missing_id(kind: &str) -> CoreError {
    CoreError::ValidationFailed {
        message: format!("remembered {kind} has no id"),
    }
}

// ── Views ────────────────────────────────────────────────────────────

impl ManagedResource for ViewService {
    type State = View;
    const KIND: &'static str = "view";

    fn id(state: &View) -> Option<&str> {
        state.id.as_deref()
    }

    fn settle(remembered: &View, desired: &View) -> View {
        match crate::reconcile::plan_view(remembered, desired) {
            Ok(plan) => plan.target,
            Err(_) => desired.clone(),
        }
    }

    async fn create(&self, desired: &View) -> Result<View, CoreError> {
        ViewService::create(self, desired).await
    }

    async fn read(&self, remembered: &View) -> Result<Option<View>, CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        ViewService::read(self, id, Some(remembered)).await
    }

    async fn update(&self, remembered: &View, desired: &View) -> Result<View, CoreError> {
        ViewService::update(self, remembered, desired).await
    }

    async fn delete(&self, remembered: &View) -> Result<(), CoreError> {
        let id = remembered.id.as_deref().ok_or_else(|| missing_id(Self::KIND))?;
        ViewService::delete(self, id).await
    }

    async fn exists(&self, id: &str) -> Result<bool, CoreError> {
        ViewService::exists(self, id).await
    }
}
