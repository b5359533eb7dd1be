// ── Domain model ──
//
// Canonical types used both as declarations and as remembered state.

pub mod template;
pub mod user;
pub mod view;
pub mod vlan;
pub mod vm;

pub use template::AppTemplate;
pub use user::PlayerUser;
pub use view::{
    ADMIN_TEAM_NAME, AppInstance, Application, DEFAULT_TEAM_ROLE, DEFAULT_VIEW_STATUS, Team,
    TeamUser, View,
};
pub use vlan::Vlan;
pub use vm::{ConsoleConnection, ProxmoxInfo, Vm, parse_proxmox_id};
