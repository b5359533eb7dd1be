// ── View read-back ──
//
// Assembles the remote view into the domain model: one call for the view,
// one for its applications, one for its teams, then per team the users
// (with their membership role) and the application instances.

use std::collections::HashMap;

use crucible_api::ApiClient;
use crucible_api::player::models::{PermissionRecord, TeamRecord};
use tracing::debug;

use crate::error::{CoreError, ResultExt};
use crate::model::{AppInstance, Application, Team, TeamUser, View};
use crate::normalize::normalized;

pub(crate) async fn read_view(
    client: &ApiClient,
    id: &str,
    remembered: Option<&View>,
) -> Result<Option<View>, CoreError> {
    let Some(record) = client.get_view(id).await.context(|| format!("reading view {id}"))? else {
        debug!(view_id = id, "view is gone");
        return Ok(None);
    };

    let applications: Vec<Application> = client
        .list_view_applications(id)
        .await
        .context(|| format!("listing applications of view {id}"))?
        .into_iter()
        .map(Application::from)
        .collect();
    let app_names: HashMap<&str, &str> = applications
        .iter()
        .filter_map(|a| a.id.as_deref().map(|app_id| (app_id, a.name.as_str())))
        .collect();

    let mut teams = Vec::new();
    for team in client
        .list_view_teams(id)
        .await
        .context(|| format!("listing teams of view {id}"))?
    {
        let name = team.name.clone();
        let team = read_team(client, id, team, &app_names)
            .await
            .context(|| format!("reading team '{name}'"))?;
        teams.push(team);
    }

    let view = View {
        id: Some(record.id),
        name: record.name,
        description: record.description.filter(|d| !d.is_empty()),
        status: record
            .status
            .unwrap_or_else(|| crate::model::DEFAULT_VIEW_STATUS.into()),
        create_admin_team: remembered.is_none_or(|v| v.create_admin_team),
        applications,
        teams,
    };
    Ok(Some(normalized(view)))
}

async fn read_team(
    client: &ApiClient,
    view_id: &str,
    record: TeamRecord,
    app_names: &HashMap<&str, &str>,
) -> Result<Team, CoreError> {
    let mut permissions = Vec::with_capacity(record.permissions.len());
    for permission in record.permissions {
        permissions.push(permission_name(client, permission).await?);
    }

    let mut users = Vec::new();
    for user in client.list_team_users(&record.id).await? {
        let membership = client
            .list_user_memberships(&user.id, view_id)
            .await?
            .into_iter()
            .find(|m| m.team_id == record.id);
        let role = match membership {
            Some(m) => client.get_membership(&m.id).await?.role_name,
            None => None,
        };
        users.push(TeamUser {
            user_id: user.id,
            role: role.filter(|r| !r.is_empty()),
        });
    }

    let app_instances = client
        .list_team_instances(&record.id)
        .await?
        .into_iter()
        .filter_map(|i| {
            let name = i.name.filter(|n| !n.is_empty()).or_else(|| {
                i.application_id
                    .as_deref()
                    .and_then(|app_id| app_names.get(app_id))
                    .map(|n| (*n).to_owned())
            })?;
            Some(AppInstance {
                id: Some(i.id),
                name,
                display_order: i.display_order,
            })
        })
        .collect();

    Ok(Team {
        id: Some(record.id),
        name: record.name,
        role: record.role_name.unwrap_or_default(),
        permissions,
        users,
        app_instances,
    })
}

/// Team listings may carry bare permission ids.
async fn permission_name(client: &ApiClient, permission: PermissionRecord) -> Result<String, CoreError> {
    if let Some(name) = permission.name.filter(|n| !n.is_empty()) {
        return Ok(name);
    }
    client
        .get_permission(&permission.id)
        .await?
        .and_then(|p| p.name)
        .ok_or(CoreError::NotFound {
            entity_type: "permission",
            identifier: permission.id,
        })
}
