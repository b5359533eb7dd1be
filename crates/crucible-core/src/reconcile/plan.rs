// ── View planning ──
//
// Turns a remembered view and a desired declaration into a `ViewPlan`
// without touching the network. Validation, identifier adoption, and
// normalization all happen here so that applying an empty plan is free.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::diff::{Changes, NameSetDiff, Update, diff, name_set_diff};
use crate::error::CoreError;
use crate::model::{ADMIN_TEAM_NAME, AppInstance, Application, Team, TeamUser, View};
use crate::normalize::normalized;

/// Sub-collection changes for a team present on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPlan {
    pub old: Team,
    pub new: Team,
    /// Name or role differ, so the team record itself is rewritten.
    pub shell_changed: bool,
    pub permissions: NameSetDiff,
    pub users: Changes<TeamUser>,
    pub instances: Changes<AppInstance>,
}

impl TeamPlan {
    fn new(Update { old, new }: Update<Team>) -> Self {
        Self {
            shell_changed: old.shell_differs(&new),
            permissions: name_set_diff(&old.permissions, &new.permissions),
            users: diff(&old.users, &new.users),
            instances: diff(&old.app_instances, &new.app_instances),
            old,
            new,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.shell_changed
            && self.permissions.is_empty()
            && self.users.is_empty()
            && self.instances.is_empty()
    }
}

/// Everything an apply pass will do to one view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewPlan {
    pub view_id: String,
    pub metadata_changed: bool,
    pub applications: Changes<Application>,
    pub teams_created: Vec<Team>,
    pub teams_updated: Vec<TeamPlan>,
    pub teams_deleted: Vec<Team>,
    /// Normalized desired state with remembered identifiers adopted.
    pub target: View,
}

impl ViewPlan {
    pub fn is_empty(&self) -> bool {
        !self.metadata_changed
            && self.applications.is_empty()
            && self.teams_created.is_empty()
            && self.teams_deleted.is_empty()
            && self.teams_updated.iter().all(TeamPlan::is_empty)
    }
}

/// Plan the changes that take `old` to `desired`.
pub fn plan_view(old: &View, desired: &View) -> Result<ViewPlan, CoreError> {
    validate_view(desired)?;
    let view_id = old.id.clone().ok_or_else(|| CoreError::ValidationFailed {
        message: format!("remembered view '{}' has no id", old.name),
    })?;

    let old = normalized(old.clone());
    let mut target = desired.clone();
    target.id = Some(view_id.clone());
    adopt_remembered(&old, &mut target);
    let target = normalized(target);

    let applications = diff(&old.applications, &target.applications);
    let teams = diff(&old.teams, &target.teams);
    let teams_updated: Vec<TeamPlan> = teams.update.into_iter().map(TeamPlan::new).collect();

    debug!(
        view_id = %view_id,
        applications = applications.len(),
        teams_created = teams.create.len(),
        teams_updated = teams_updated.len(),
        teams_deleted = teams.delete.len(),
        "planned view changes"
    );

    Ok(ViewPlan {
        view_id,
        metadata_changed: old.metadata_differs(&target),
        applications,
        teams_created: teams.create,
        teams_updated,
        teams_deleted: teams.delete,
        target,
    })
}

// ── Validation ───────────────────────────────────────────────────────

/// Check the declaration's internal references before any remote call.
pub fn validate_view(view: &View) -> Result<(), CoreError> {
    let app_names = unique_names(
        view.applications.iter().map(|a| a.name.as_str()),
        "application",
        &format!("view '{}'", view.name),
    )?;
    unique_names(
        view.teams.iter().map(|t| t.name.as_str()),
        "team",
        &format!("view '{}'", view.name),
    )?;

    for team in &view.teams {
        if view.create_admin_team && team.name == ADMIN_TEAM_NAME {
            return invalid(format!(
                "team '{ADMIN_TEAM_NAME}' is created by the server when create_admin_team is set"
            ));
        }
        let scope = format!("team '{}'", team.name);
        unique_names(team.users.iter().map(|u| u.user_id.as_str()), "user", &scope)?;
        unique_names(
            team.app_instances.iter().map(|i| i.name.as_str()),
            "application instance",
            &scope,
        )?;
        if let Some(missing) = team
            .app_instances
            .iter()
            .find(|i| !app_names.contains(i.name.as_str()))
        {
            return invalid(format!(
                "{scope} has an instance of '{}', which is not an application of this view",
                missing.name
            ));
        }
    }
    Ok(())
}

fn unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    what: &str,
    scope: &str,
) -> Result<HashSet<&'a str>, CoreError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return invalid(format!("{what} in {scope} has an empty name"));
        }
        if !seen.insert(name) {
            return invalid(format!("duplicate {what} '{name}' in {scope}"));
        }
    }
    Ok(seen)
}

fn invalid<T>(message: String) -> Result<T, CoreError> {
    Err(CoreError::ValidationFailed { message })
}

// ── Identifier adoption ──────────────────────────────────────────────

/// Fill identifiers the declaration left out from same-named remembered
/// entries, and carry computed application fields the declaration leaves
/// unset.
fn adopt_remembered(old: &View, desired: &mut View) {
    let old_apps: HashMap<&str, &Application> =
        old.applications.iter().map(|a| (a.name.as_str(), a)).collect();
    for app in &mut desired.applications {
        let Some(prev) = old_apps.get(app.name.as_str()) else {
            continue;
        };
        if app.id.is_none() {
            app.id.clone_from(&prev.id);
        }
        if app.id != prev.id {
            continue;
        }
        app.url = app.url.take().or_else(|| prev.url.clone());
        app.icon = app.icon.take().or_else(|| prev.icon.clone());
        app.embeddable = app.embeddable.or(prev.embeddable);
        app.load_in_background = app.load_in_background.or(prev.load_in_background);
        app.app_template_id = app.app_template_id.take().or_else(|| prev.app_template_id.clone());
    }

    let old_teams: HashMap<&str, &Team> = old.teams.iter().map(|t| (t.name.as_str(), t)).collect();
    let old_by_id: HashMap<&str, &Team> = old
        .teams
        .iter()
        .filter_map(|t| t.id.as_deref().map(|id| (id, t)))
        .collect();
    for team in &mut desired.teams {
        if team.id.is_none() {
            if let Some(prev) = old_teams.get(team.name.as_str()) {
                team.id.clone_from(&prev.id);
            }
        }
        let Some(prev) = team.id.as_deref().and_then(|id| old_by_id.get(id)) else {
            continue;
        };
        let old_instances: HashMap<&str, &AppInstance> =
            prev.app_instances.iter().map(|i| (i.name.as_str(), i)).collect();
        for instance in &mut team.app_instances {
            if instance.id.is_none() {
                if let Some(prev) = old_instances.get(instance.name.as_str()) {
                    instance.id.clone_from(&prev.id);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn remembered() -> View {
        let mut view = View::new("Exercise");
        view.id = Some("v1".into());
        let mut wiki = Application::new("Wiki");
        wiki.id = Some("a1".into());
        wiki.url = Some("https://wiki.example".into());
        wiki.embeddable = Some(true);
        view.applications.push(wiki);

        let mut blue = Team::new("Blue");
        blue.id = Some("t1".into());
        blue.permissions = vec!["ViewAdmin".into()];
        blue.users = vec![TeamUser::new("u1").with_role("Observer")];
        let mut instance = AppInstance::new("Wiki", 1.0);
        instance.id = Some("i1".into());
        blue.app_instances.push(instance);
        view.teams.push(blue);
        view
    }

    fn declared() -> View {
        let mut view = View::new("Exercise");
        view.applications.push(Application::new("Wiki"));
        let mut blue = Team::new("Blue");
        blue.permissions = vec!["ViewAdmin".into()];
        blue.users = vec![TeamUser::new("u1").with_role("Observer")];
        blue.app_instances.push(AppInstance::new("Wiki", 1.0));
        view.teams.push(blue);
        view
    }

    #[test]
    fn declaration_without_ids_matches_remembered_state() {
        let plan = plan_view(&remembered(), &declared()).unwrap();
        assert!(plan.is_empty(), "unexpected plan: {plan:#?}");
        assert_eq!(plan.target, normalized(remembered()));
    }

    #[test]
    fn reordered_declaration_is_a_no_op() {
        let mut old = remembered();
        old.teams[0].users.push(TeamUser::new("u0"));
        let mut second = Team::new("Amber");
        second.id = Some("t0".into());
        old.teams.push(second);

        let mut desired = old.clone();
        desired.teams.reverse();
        desired.teams[1].users.reverse();
        old.teams[0].permissions.push("ViewAdmin".into());

        let plan = plan_view(&old, &desired).unwrap();
        assert!(plan.is_empty(), "unexpected plan: {plan:#?}");
    }

    #[test]
    fn admin_team_is_ordinary_without_server_admin_team() {
        let mut desired = declared();
        desired.create_admin_team = false;
        desired.teams.push(Team::new("Admin"));
        let plan = plan_view(&remembered(), &desired).unwrap();
        assert_eq!(plan.teams_created.len(), 1);
        assert_eq!(plan.teams_created[0].name, "Admin");
    }

    #[test]
    fn team_sub_changes_are_split_out() {
        let mut desired = declared();
        let blue = &mut desired.teams[0];
        blue.role = "Observer".into();
        blue.permissions = vec!["EditView".into()];
        blue.users = vec![TeamUser::new("u1"), TeamUser::new("u2")];
        blue.app_instances[0].display_order = 3.0;

        let plan = plan_view(&remembered(), &desired).unwrap();
        assert_eq!(plan.teams_updated.len(), 1);
        let team = &plan.teams_updated[0];
        assert!(team.shell_changed);
        assert_eq!(team.permissions.added, vec!["EditView".to_string()]);
        assert_eq!(team.permissions.removed, vec!["ViewAdmin".to_string()]);
        assert_eq!(team.users.create, vec![TeamUser::new("u2")]);
        assert_eq!(team.users.update.len(), 1);
        assert_eq!(team.users.update[0].new.role(), None);
        assert_eq!(team.instances.update.len(), 1);
        assert_eq!(team.instances.update[0].new.id.as_deref(), Some("i1"));
    }

    #[test]
    fn removing_every_user_deletes_them_all() {
        let mut desired = declared();
        desired.teams[0].users.clear();
        let plan = plan_view(&remembered(), &desired).unwrap();
        assert_eq!(plan.teams_updated[0].users.delete.len(), 1);
    }

    #[test]
    fn computed_application_fields_are_carried() {
        let plan = plan_view(&remembered(), &declared()).unwrap();
        let wiki = &plan.target.applications[0];
        assert_eq!(wiki.url.as_deref(), Some("https://wiki.example"));
        assert_eq!(wiki.embeddable, Some(true));
    }

    #[test]
    fn instance_must_name_a_declared_application() {
        let mut desired = declared();
        desired.teams[0].app_instances.push(AppInstance::new("Chat", 2.0));
        let err = plan_view(&remembered(), &desired).unwrap_err();
        assert!(err.to_string().contains("'Chat'"), "{err}");
    }

    #[test]
    fn duplicate_team_names_are_rejected() {
        let mut desired = declared();
        desired.teams.push(Team::new("Blue"));
        assert!(matches!(
            validate_view(&desired),
            Err(CoreError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn declared_admin_team_conflicts_with_server_admin_team() {
        let mut desired = declared();
        desired.teams.push(Team::new("Admin"));
        assert!(validate_view(&desired).is_err());
        desired.create_admin_team = false;
        assert!(validate_view(&desired).is_ok());
    }

    #[test]
    fn remembered_view_needs_an_id() {
        let mut old = remembered();
        old.id = None;
        assert!(plan_view(&old, &declared()).is_err());
    }
}
