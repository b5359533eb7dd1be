//! Command dispatch: bridges CLI args -> core services -> plan output.

pub mod check;
pub mod lifecycle;
pub mod plan;

use crucible_core::Provider;
use tracing::debug;

use crate::cli::{Command, GlobalOpts, Kind};
use crate::error::CliError;
use crate::output::Painter;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    let painter = Painter::new(global.color);
    match cmd {
        // Planning never needs credentials
        Command::Plan(args) => plan::handle(&args, painter),
        Command::Apply(args) => lifecycle::apply(global, &args, painter).await,
        Command::Refresh(args) => lifecycle::refresh(global, &args, painter).await,
        Command::Destroy(args) => lifecycle::destroy(global, &args).await,
        Command::Check => check::handle(global).await,
    }
}

/// Load configuration, build the client, and prove the credentials work.
pub async fn connect(global: &GlobalOpts) -> Result<Provider, CliError> {
    let config = crucible_config::load_provider_config(global.config.as_deref())?;
    let provider = Provider::new(&config)?;
    provider.verify_credentials().await?;
    debug!("provider ready");
    Ok(provider)
}

/// Human name for a kind in progress messages.
fn noun(kind: Kind) -> &'static str {
    match kind {
        Kind::View => "view",
        Kind::User => "user",
        Kind::AppTemplate => "application template",
        Kind::Vm => "VM",
        Kind::Vlan => "VLAN",
    }
}
