//! Domain model, view reconciliation, and resource services for Crucible.
//!
//! - **[`Provider`]**: facade owning the authenticated
//!   [`ApiClient`](crucible_api::ApiClient) and vending one service per
//!   resource kind.
//! - **[`ViewService`]**: the nested view resource. [`plan_view`] diffs a
//!   remembered view against a declaration without network access;
//!   [`ViewService::apply`] issues exactly the calls the plan describes,
//!   deletes before updates before creates, and reports partial progress
//!   on failure.
//! - **[`diff`]** / **[`normalize`]**: the keyed three-way diff and the
//!   stable ordering that keeps remembered state free of reorder-only
//!   changes.
//! - **[`resource`]**: users, application templates, VMs, and VLANs behind
//!   the common [`ManagedResource`] lifecycle.

pub mod config;
pub mod convert;
pub mod diff;
pub mod error;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod reconcile;
pub mod resolve;
pub mod resource;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ProviderConfig, TlsVerification};
pub use diff::{Changes, Keyed, NameSetDiff, Update};
pub use error::{Action, CoreError, ReferenceKind, ResultExt};
pub use provider::Provider;
pub use reconcile::{TeamPlan, ViewPlan, ViewService, plan_view, validate_view};
pub use resource::{ManagedResource, TemplateService, UserService, VlanService, VmService};

pub use model::{
    AppInstance, AppTemplate, Application, ConsoleConnection, PlayerUser, ProxmoxInfo, Team,
    TeamUser, View, Vlan, Vm,
};
