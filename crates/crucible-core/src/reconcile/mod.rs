// ── View reconciliation ──
//
// `ViewService` is the entry point for the nested view resource: create,
// read, plan, apply, and delete. Planning is pure; applying a plan issues
// exactly the remote calls the plan describes.

mod apply;
pub mod plan;
mod read;

use crucible_api::ApiClient;
use crucible_api::player::models::CreateViewRequest;
use tracing::info;

use crate::error::{CoreError, ResultExt};
use crate::model::View;

use self::apply::Applier;
pub use self::plan::{TeamPlan, ViewPlan, plan_view, validate_view};

#[derive(Clone)]
pub struct ViewService {
    client: ApiClient,
}

impl ViewService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create the view and everything it declares.
    ///
    /// A failure after `POST views` leaves the view in place; the error
    /// names its id so it can be imported or removed.
    pub async fn create(&self, desired: &View) -> Result<View, CoreError> {
        validate_view(desired)?;
        let id = self
            .client
            .create_view(&CreateViewRequest {
                name: desired.name.clone(),
                description: desired.description.clone(),
                status: desired.status.clone(),
                create_admin_team: desired.create_admin_team,
            })
            .await
            .context(|| format!("creating view '{}'", desired.name))?;
        info!(view_id = %id, name = %desired.name, "created view");

        let shell = View {
            id: Some(id.clone()),
            applications: Vec::new(),
            teams: Vec::new(),
            ..desired.clone()
        };
        let plan = plan_view(&shell, desired)?;
        Applier::new(&self.client, id.clone())
            .apply(plan)
            .await
            .context(|| format!("populating view {id}"))
    }

    /// Read the remote view. `None` when it no longer exists.
    ///
    /// `create_admin_team` is never reported by the server and is carried
    /// from `remembered`.
    pub async fn read(&self, id: &str, remembered: Option<&View>) -> Result<Option<View>, CoreError> {
        read::read_view(&self.client, id, remembered).await
    }

    pub fn plan(&self, remembered: &View, desired: &View) -> Result<ViewPlan, CoreError> {
        plan_view(remembered, desired)
    }

    pub async fn apply(&self, plan: ViewPlan) -> Result<View, CoreError> {
        if plan.is_empty() {
            return Ok(plan.target);
        }
        let view_id = plan.view_id.clone();
        Applier::new(&self.client, view_id).apply(plan).await
    }

    /// Plan and apply in one step.
    pub async fn update(&self, remembered: &View, desired: &View) -> Result<View, CoreError> {
        let plan = self.plan(remembered, desired)?;
        self.apply(plan).await
    }

    /// Player cascades the delete to teams and applications.
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.client
            .delete_view(id)
            .await
            .context(|| format!("deleting view {id}"))?;
        info!(view_id = id, "deleted view");
        Ok(())
    }

    pub async fn exists(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.client.view_exists(id).await?)
    }
}
