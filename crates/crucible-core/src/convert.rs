// ── API-to-domain type conversions ──
//
// Bridges `crucible_api` wire records and `crucible_core::model` types.
// Conversions that need a remote lookup (role ids, application names)
// live with the services that perform them.

use crucible_api::caster::models::VlanRecord;
use crucible_api::player::models::{ApplicationRecord, ApplicationTemplateRecord};
use crucible_api::vm::models::{ConsoleConnectionRecord, ProxmoxRecord, VmRecord};

use crate::model::{AppTemplate, Application, ConsoleConnection, ProxmoxInfo, Vlan, Vm};

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ── Applications ─────────────────────────────────────────────────────

impl From<ApplicationRecord> for Application {
    fn from(r: ApplicationRecord) -> Self {
        Self {
            id: r.id,
            name: r.name.unwrap_or_default(),
            url: non_empty(r.url),
            icon: non_empty(r.icon),
            embeddable: r.embeddable,
            load_in_background: r.load_in_background,
            app_template_id: non_empty(r.application_template_id),
        }
    }
}

impl From<&Application> for ApplicationRecord {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id.clone(),
            name: Some(app.name.clone()),
            url: app.url.clone(),
            icon: app.icon.clone(),
            embeddable: app.embeddable,
            load_in_background: app.load_in_background,
            view_id: None,
            application_template_id: app.app_template_id.clone(),
        }
    }
}

// ── Application templates ────────────────────────────────────────────

impl From<ApplicationTemplateRecord> for AppTemplate {
    fn from(r: ApplicationTemplateRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            url: non_empty(r.url),
            icon: non_empty(r.icon),
            embeddable: r.embeddable,
            load_in_background: r.load_in_background,
        }
    }
}

impl From<&AppTemplate> for ApplicationTemplateRecord {
    fn from(t: &AppTemplate) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            url: non_empty(t.url.clone()),
            icon: non_empty(t.icon.clone()),
            embeddable: t.embeddable,
            load_in_background: t.load_in_background,
        }
    }
}

// ── VMs ──────────────────────────────────────────────────────────────

impl From<VmRecord> for Vm {
    fn from(r: VmRecord) -> Self {
        let mut team_ids = r.team_ids;
        team_ids.sort();
        Self {
            id: Some(r.id),
            name: r.name,
            url: non_empty(r.url),
            default_url: r.default_url,
            team_ids,
            user_id: non_empty(r.user_id),
            embeddable: r.embeddable,
            console_connection: r.console_connection.map(|c| ConsoleConnection {
                hostname: c.hostname,
                port: c.port,
                protocol: c.protocol,
                username: non_empty(c.username),
                password: non_empty(c.password),
            }),
            proxmox: r.proxmox.map(|p| ProxmoxInfo {
                id: p.id,
                node: p.node,
                kind: non_empty(p.kind),
            }),
        }
    }
}

/// Wire record for a VM whose id has already been settled.
pub(crate) fn vm_record(vm: &Vm, id: &str) -> VmRecord {
    VmRecord {
        id: id.to_owned(),
        url: vm.url.clone(),
        default_url: vm.default_url,
        name: vm.name.clone(),
        team_ids: vm.team_ids.clone(),
        user_id: vm.user_id.clone(),
        embeddable: vm.embeddable,
        console_connection: vm.console_connection.as_ref().map(|c| ConsoleConnectionRecord {
            hostname: c.hostname.clone(),
            port: c.port.clone(),
            protocol: c.protocol.clone(),
            username: c.username.clone(),
            password: c.password.clone(),
        }),
        proxmox: vm.proxmox.as_ref().map(|p| ProxmoxRecord {
            id: p.id,
            node: p.node.clone(),
            kind: p.kind.clone(),
        }),
    }
}

// ── VLANs ────────────────────────────────────────────────────────────

/// Fold a Caster record into the declared selectors.
///
/// Caster does not echo `project_id`, so it is carried from the declaration.
pub(crate) fn vlan_from_record(declared: &Vlan, r: VlanRecord) -> Vlan {
    Vlan {
        id: Some(r.id),
        project_id: declared.project_id.clone(),
        partition_id: non_empty(r.partition_id).or_else(|| declared.partition_id.clone()),
        vlan_id: declared.vlan_id.or(Some(r.vlan_id)),
        tag: non_empty(r.tag).or_else(|| declared.tag.clone()),
        pool_id: non_empty(r.pool_id),
        in_use: r.in_use,
        reserved: r.reserved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_record_blanks_become_none() {
        let app: Application = ApplicationRecord {
            id: Some("a1".into()),
            name: Some("Wiki".into()),
            url: Some(String::new()),
            icon: None,
            embeddable: Some(true),
            load_in_background: Some(false),
            view_id: Some("v1".into()),
            application_template_id: Some(String::new()),
        }
        .into();
        assert_eq!(app.url, None);
        assert_eq!(app.app_template_id, None);
        assert_eq!(app.embeddable, Some(true));
    }

    #[test]
    fn vm_team_ids_are_sorted_on_read() {
        let vm: Vm = VmRecord {
            id: "vm1".into(),
            name: "kali".into(),
            team_ids: vec!["t2".into(), "t1".into()],
            ..VmRecord::default()
        }
        .into();
        assert_eq!(vm.team_ids, vec!["t1".to_owned(), "t2".to_owned()]);
    }
}
