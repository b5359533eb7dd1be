// ── Stable ordering ──
//
// Player returns collections in arbitrary order. Sorting everything the
// same way after every read and write keeps remembered state free of
// reorder-only differences.

use crate::model::{ADMIN_TEAM_NAME, Team, View};

/// Sort a view in place and drop the server-managed admin team.
///
/// Idempotent: normalizing twice equals normalizing once.
pub fn normalize_view(view: &mut View) {
    view.applications.sort_by(|a, b| a.name.cmp(&b.name));

    if view.create_admin_team {
        view.teams.retain(|t| t.name != ADMIN_TEAM_NAME);
    }
    view.teams.sort_by(|a, b| a.name.cmp(&b.name));
    view.teams.iter_mut().for_each(normalize_team);
}

pub fn normalize_team(team: &mut Team) {
    team.permissions.sort();
    team.permissions.dedup();
    team.users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    team.app_instances.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Owned variant of [`normalize_view`].
pub fn normalized(mut view: View) -> View {
    normalize_view(&mut view);
    view
}
