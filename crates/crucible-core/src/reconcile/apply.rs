// ── Plan execution ──
//
// Remote effects run top-down: view metadata, applications, then teams.
// Within each collection deletes go before updates before creates so a
// replacement can reuse a freed name. The first failure stops the pass and
// reports how many siblings of the failing batch had already been applied.

use crucible_api::ApiClient;
use crucible_api::player::models::{
    ApplicationRecord, CreateInstanceRequest, CreateTeamRequest, UpdateInstanceRequest,
    UpdateTeamRequest, UpdateViewRequest,
};
use tracing::info;

use crate::error::{Action, CoreError, ResultExt};
use crate::model::{AppInstance, Application, Team, TeamUser, View};
use crate::normalize::normalized;
use crate::reconcile::plan::{TeamPlan, ViewPlan};
use crate::resolve::Resolver;

pub(crate) struct Applier<'a> {
    client: &'a ApiClient,
    resolver: Resolver<'a>,
    view_id: String,
}

impl<'a> Applier<'a> {
    pub(crate) fn new(client: &'a ApiClient, view_id: String) -> Self {
        Self {
            client,
            resolver: Resolver::new(client),
            view_id,
        }
    }

    /// Execute `plan` and return the new remembered state.
    pub(crate) async fn apply(mut self, plan: ViewPlan) -> Result<View, CoreError> {
        let ViewPlan {
            metadata_changed,
            applications,
            teams_created,
            teams_updated,
            teams_deleted,
            mut target,
            ..
        } = plan;

        if metadata_changed {
            self.client
                .update_view(&UpdateViewRequest {
                    id: self.view_id.clone(),
                    name: target.name.clone(),
                    description: target.description.clone(),
                    status: target.status.clone(),
                })
                .await
                .context(|| format!("updating view '{}'", target.name))?;
            info!(view_id = %self.view_id, "updated view");
        }

        // ── Applications ─────────────────────────────────────────────
        for (done, app) in applications.delete.iter().enumerate() {
            self.delete_application(app)
                .await
                .map_err(|e| CoreError::partial("applications", Action::Deleted, done, e))?;
        }
        for (done, update) in applications.update.iter().enumerate() {
            self.update_application(&update.new)
                .await
                .map_err(|e| CoreError::partial("applications", Action::Updated, done, e))?;
        }
        for (done, app) in applications.create.iter().enumerate() {
            let id = self
                .create_application(app)
                .await
                .map_err(|e| CoreError::partial("applications", Action::Created, done, e))?;
            if let Some(slot) = target.applications.iter_mut().find(|a| a.name == app.name) {
                slot.id = Some(id);
            }
        }

        // ── Teams ────────────────────────────────────────────────────
        for (done, team) in teams_deleted.iter().enumerate() {
            self.delete_team(team)
                .await
                .map_err(|e| CoreError::partial("teams", Action::Deleted, done, e))?;
        }
        for (done, team) in teams_updated.iter().enumerate() {
            self.update_team(team, &mut target)
                .await
                .context(|| format!("updating team '{}'", team.new.name))
                .map_err(|e| CoreError::partial("teams", Action::Updated, done, e))?;
        }
        for (done, team) in teams_created.iter().enumerate() {
            self.create_team(team, &mut target)
                .await
                .context(|| format!("creating team '{}'", team.name))
                .map_err(|e| CoreError::partial("teams", Action::Created, done, e))?;
        }

        Ok(normalized(target))
    }

    // ── Applications ─────────────────────────────────────────────────

    async fn delete_application(&self, app: &Application) -> Result<(), CoreError> {
        let id = required_id(app.id.as_deref(), "application", &app.name)?;
        self.client
            .delete_application(id)
            .await
            .context(|| format!("deleting application '{}'", app.name))?;
        info!(view_id = %self.view_id, application = %app.name, "deleted application");
        Ok(())
    }

    async fn update_application(&self, app: &Application) -> Result<(), CoreError> {
        let id = required_id(app.id.as_deref(), "application", &app.name)?;
        let record = ApplicationRecord {
            view_id: Some(self.view_id.clone()),
            ..ApplicationRecord::from(app)
        };
        self.client
            .update_application(id, &record)
            .await
            .context(|| format!("updating application '{}'", app.name))?;
        info!(view_id = %self.view_id, application = %app.name, "updated application");
        Ok(())
    }

    async fn create_application(&self, app: &Application) -> Result<String, CoreError> {
        let record = ApplicationRecord {
            id: None,
            ..ApplicationRecord::from(app)
        };
        let id = self
            .client
            .create_application(&self.view_id, &record)
            .await
            .context(|| format!("creating application '{}'", app.name))?;
        info!(view_id = %self.view_id, application = %app.name, id = %id, "created application");
        Ok(id)
    }

    // ── Teams ────────────────────────────────────────────────────────

    async fn delete_team(&self, team: &Team) -> Result<(), CoreError> {
        let id = required_id(team.id.as_deref(), "team", &team.name)?;
        self.client
            .delete_team(id)
            .await
            .context(|| format!("deleting team '{}'", team.name))?;
        info!(view_id = %self.view_id, team = %team.name, "deleted team");
        Ok(())
    }

    async fn team_role_id(&mut self, team: &Team) -> Result<Option<String>, CoreError> {
        match team.role_name() {
            Some(role) => self.resolver.team_role_id(role).await.map(Some),
            None => Ok(None),
        }
    }

    /// Team shell, then users, then instances, then permissions.
    async fn create_team(&mut self, team: &Team, target: &mut View) -> Result<(), CoreError> {
        let role_id = self.team_role_id(team).await?;
        let team_id = self
            .client
            .create_team(
                &self.view_id,
                &CreateTeamRequest {
                    name: team.name.clone(),
                    role_id,
                },
            )
            .await?;
        info!(view_id = %self.view_id, team = %team.name, id = %team_id, "created team");
        let slot = target_team(target, &team.name)?;
        slot.id = Some(team_id.clone());

        for (done, user) in team.users.iter().enumerate() {
            self.add_user(&team_id, user)
                .await
                .map_err(|e| CoreError::partial("users", Action::Added, done, e))?;
        }

        for (done, instance) in team.app_instances.iter().enumerate() {
            let id = self
                .create_instance(&team_id, instance)
                .await
                .map_err(|e| CoreError::partial("application instances", Action::Created, done, e))?;
            set_instance_id(slot, &instance.name, id);
        }

        for (done, name) in team.permissions.iter().enumerate() {
            self.add_permission(&team_id, name)
                .await
                .map_err(|e| CoreError::partial("permissions", Action::Added, done, e))?;
        }
        Ok(())
    }

    async fn update_team(&mut self, plan: &TeamPlan, target: &mut View) -> Result<(), CoreError> {
        let team_id = required_id(plan.old.id.as_deref(), "team", &plan.old.name)?.to_owned();

        if plan.shell_changed {
            let role_id = self.team_role_id(&plan.new).await?;
            self.client
                .update_team(&UpdateTeamRequest {
                    id: team_id.clone(),
                    name: plan.new.name.clone(),
                    role_id,
                })
                .await?;
            info!(view_id = %self.view_id, team = %plan.new.name, "updated team");
        }

        // ── Permissions ──────────────────────────────────────────────
        for (done, name) in plan.permissions.removed.iter().enumerate() {
            self.remove_permission(&team_id, name)
                .await
                .map_err(|e| CoreError::partial("permissions", Action::Removed, done, e))?;
        }
        for (done, name) in plan.permissions.added.iter().enumerate() {
            self.add_permission(&team_id, name)
                .await
                .map_err(|e| CoreError::partial("permissions", Action::Added, done, e))?;
        }

        // ── Users ────────────────────────────────────────────────────
        for (done, user) in plan.users.delete.iter().enumerate() {
            self.client
                .remove_team_user(&team_id, &user.user_id)
                .await
                .context(|| format!("removing user {}", user.user_id))
                .map_err(|e| CoreError::partial("users", Action::Removed, done, e))?;
            info!(team = %plan.new.name, user_id = %user.user_id, "removed user from team");
        }
        for (done, update) in plan.users.update.iter().enumerate() {
            self.set_user_role(&team_id, &update.new)
                .await
                .map_err(|e| CoreError::partial("users", Action::Updated, done, e))?;
        }
        for (done, user) in plan.users.create.iter().enumerate() {
            self.add_user(&team_id, user)
                .await
                .map_err(|e| CoreError::partial("users", Action::Added, done, e))?;
        }

        // ── Application instances ────────────────────────────────────
        for (done, instance) in plan.instances.delete.iter().enumerate() {
            let Some(id) = instance.id.as_deref() else {
                continue;
            };
            self.client
                .delete_instance(id)
                .await
                .context(|| format!("deleting instance of '{}'", instance.name))
                .map_err(|e| {
                    CoreError::partial("application instances", Action::Deleted, done, e)
                })?;
            info!(team = %plan.new.name, application = %instance.name, "deleted application instance");
        }
        let slot = target_team(target, &plan.new.name)?;
        for (done, update) in plan.instances.update.iter().enumerate() {
            let result = match update.old.id.as_deref() {
                Some(id) => self.update_instance(&team_id, id, &update.new).await,
                None => self
                    .create_instance(&team_id, &update.new)
                    .await
                    .map(|id| set_instance_id(slot, &update.new.name, id)),
            };
            result.map_err(|e| {
                CoreError::partial("application instances", Action::Updated, done, e)
            })?;
        }
        for (done, instance) in plan.instances.create.iter().enumerate() {
            let id = self
                .create_instance(&team_id, instance)
                .await
                .map_err(|e| {
                    CoreError::partial("application instances", Action::Created, done, e)
                })?;
            set_instance_id(slot, &instance.name, id);
        }
        Ok(())
    }

    // ── Team members ─────────────────────────────────────────────────

    async fn add_user(&mut self, team_id: &str, user: &TeamUser) -> Result<(), CoreError> {
        self.client
            .add_team_user(team_id, &user.user_id)
            .await
            .context(|| format!("adding user {}", user.user_id))?;
        info!(team_id, user_id = %user.user_id, "added user to team");
        if user.role().is_some() {
            self.set_user_role(team_id, user).await?;
        }
        Ok(())
    }

    /// Point the user's membership at their override role, or clear it.
    async fn set_user_role(&mut self, team_id: &str, user: &TeamUser) -> Result<(), CoreError> {
        let role_id = match user.role() {
            Some(role) => Some(self.resolver.role_id(role).await?),
            None => None,
        };
        let membership_id = self
            .resolver
            .membership_id(&self.view_id, team_id, &user.user_id)
            .await?;
        self.client
            .set_membership_role(&membership_id, role_id.as_deref())
            .await
            .context(|| format!("setting role of user {}", user.user_id))?;
        info!(team_id, user_id = %user.user_id, role = ?user.role(), "set membership role");
        Ok(())
    }

    // ── Permissions ──────────────────────────────────────────────────

    async fn add_permission(&mut self, team_id: &str, name: &str) -> Result<(), CoreError> {
        let permission_id = self.resolver.permission_id(name).await?;
        self.client
            .add_team_permission(team_id, &permission_id)
            .await
            .context(|| format!("adding permission '{name}'"))?;
        info!(team_id, permission = name, "added team permission");
        Ok(())
    }

    async fn remove_permission(&mut self, team_id: &str, name: &str) -> Result<(), CoreError> {
        let permission_id = self.resolver.permission_id(name).await?;
        self.client
            .remove_team_permission(team_id, &permission_id)
            .await
            .context(|| format!("removing permission '{name}'"))?;
        info!(team_id, permission = name, "removed team permission");
        Ok(())
    }

    // ── Application instances ────────────────────────────────────────

    async fn create_instance(
        &mut self,
        team_id: &str,
        instance: &AppInstance,
    ) -> Result<String, CoreError> {
        let application_id = self
            .resolver
            .application_id(&self.view_id, &instance.name)
            .await?;
        let id = self
            .client
            .create_instance(&CreateInstanceRequest {
                team_id: team_id.to_owned(),
                application_id,
                display_order: instance.display_order,
            })
            .await
            .context(|| format!("creating instance of '{}'", instance.name))?;
        info!(team_id, application = %instance.name, id = %id, "created application instance");
        Ok(id)
    }

    async fn update_instance(
        &mut self,
        team_id: &str,
        id: &str,
        instance: &AppInstance,
    ) -> Result<(), CoreError> {
        let application_id = self
            .resolver
            .application_id(&self.view_id, &instance.name)
            .await?;
        self.client
            .update_instance(&UpdateInstanceRequest {
                id: id.to_owned(),
                team_id: team_id.to_owned(),
                application_id,
                display_order: instance.display_order,
            })
            .await
            .context(|| format!("updating instance of '{}'", instance.name))?;
        info!(team_id, application = %instance.name, "updated application instance");
        Ok(())
    }
}

fn required_id<'v>(id: Option<&'v str>, what: &str, name: &str) -> Result<&'v str, CoreError> {
    id.ok_or_else(|| CoreError::Internal(format!("{what} '{name}' has no remote id")))
}

fn target_team<'v>(target: &'v mut View, name: &str) -> Result<&'v mut Team, CoreError> {
    target
        .teams
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| CoreError::Internal(format!("team '{name}' missing from target state")))
}

fn set_instance_id(team: &mut Team, name: &str, id: String) {
    if let Some(instance) = team.app_instances.iter_mut().find(|i| i.name == name) {
        instance.id = Some(id);
    }
}
