//! `apply`, `refresh`, and `destroy` over any managed resource kind.
//!
//! Local inputs are read before connecting, so a bad document or missing
//! state file fails without credentials. State is written only after the
//! remote side succeeded; a failed or interrupted apply leaves the previous
//! state file untouched.

use crucible_core::{ManagedResource, Provider};
use tracing::info;

use crate::cli::{DocumentArgs, GlobalOpts, Kind, StateArgs};
use crate::error::CliError;
use crate::output::{self, Painter};
use crate::state::{load_document, load_state, remove_state, require_state, save_state};

use super::{connect, noun};

// ── Apply ────────────────────────────────────────────────────────────

pub async fn apply(
    global: &GlobalOpts,
    args: &DocumentArgs,
    painter: Painter,
) -> Result<(), CliError> {
    match args.kind {
        Kind::View => apply_one(Provider::views, global, args, painter).await,
        Kind::User => apply_one(Provider::users, global, args, painter).await,
        Kind::AppTemplate => apply_one(Provider::templates, global, args, painter).await,
        Kind::Vm => apply_one(Provider::vms, global, args, painter).await,
        Kind::Vlan => apply_one(Provider::vlans, global, args, painter).await,
    }
}

async fn apply_one<R: ManagedResource>(
    service: fn(&Provider) -> R,
    global: &GlobalOpts,
    args: &DocumentArgs,
    painter: Painter,
) -> Result<(), CliError> {
    let desired: R::State = load_document(&args.file)?;
    let state_path = args.state_path();
    let remembered = load_state::<R::State>(&state_path, args.kind)?;

    let service = service(&connect(global).await?);

    // Re-read first; a resource deleted out of band is recreated.
    let current = match remembered {
        Some(remembered) => service.read(&remembered).await?,
        None => None,
    };

    let (applied, verb) = match current {
        None => (service.create(&desired).await?, "created"),
        Some(current) if R::settle(&current, &desired) == current => (current, "unchanged"),
        Some(current) => (service.update(&current, &desired).await?, "updated"),
    };

    save_state(&state_path, args.kind, &applied)?;
    let id = R::id(&applied).unwrap_or("-");
    info!(kind = R::KIND, id, verb, "applied");
    println!(
        "{} {} ({id}) {verb}; state written to {}",
        noun(args.kind),
        painter.bold(&display_name(&applied)),
        state_path.display()
    );
    Ok(())
}

// ── Refresh ──────────────────────────────────────────────────────────

pub async fn refresh(
    global: &GlobalOpts,
    args: &StateArgs,
    painter: Painter,
) -> Result<(), CliError> {
    match args.kind {
        Kind::View => refresh_one(Provider::views, global, args, painter).await,
        Kind::User => refresh_one(Provider::users, global, args, painter).await,
        Kind::AppTemplate => refresh_one(Provider::templates, global, args, painter).await,
        Kind::Vm => refresh_one(Provider::vms, global, args, painter).await,
        Kind::Vlan => refresh_one(Provider::vlans, global, args, painter).await,
    }
}

async fn refresh_one<R: ManagedResource>(
    service: fn(&Provider) -> R,
    global: &GlobalOpts,
    args: &StateArgs,
    painter: Painter,
) -> Result<(), CliError> {
    let remembered: R::State = require_state(&args.state, args.kind)?;
    let service = service(&connect(global).await?);

    let Some(current) = service.read(&remembered).await? else {
        remove_state(&args.state)?;
        println!(
            "{} {} no longer exists; removed {}",
            noun(args.kind),
            display_name(&remembered),
            args.state.display()
        );
        return Ok(());
    };

    let (drift, _) = output::render_update(
        painter,
        R::KIND,
        &serde_json::to_value(&remembered)?,
        &serde_json::to_value(&current)?,
    );
    save_state(&args.state, args.kind, &current)?;
    if drift.is_empty() {
        println!("{} {} is up to date", noun(args.kind), display_name(&current));
    } else {
        print!("{drift}");
    }
    Ok(())
}

// ── Destroy ──────────────────────────────────────────────────────────

pub async fn destroy(global: &GlobalOpts, args: &StateArgs) -> Result<(), CliError> {
    match args.kind {
        Kind::View => destroy_one(Provider::views, global, args).await,
        Kind::User => destroy_one(Provider::users, global, args).await,
        Kind::AppTemplate => destroy_one(Provider::templates, global, args).await,
        Kind::Vm => destroy_one(Provider::vms, global, args).await,
        Kind::Vlan => destroy_one(Provider::vlans, global, args).await,
    }
}

async fn destroy_one<R: ManagedResource>(
    service: fn(&Provider) -> R,
    global: &GlobalOpts,
    args: &StateArgs,
) -> Result<(), CliError> {
    let remembered: R::State = require_state(&args.state, args.kind)?;
    let service = service(&connect(global).await?);

    service.delete(&remembered).await?;
    remove_state(&args.state)?;
    info!(kind = R::KIND, id = R::id(&remembered).unwrap_or("-"), "destroyed");
    println!("{} {} destroyed", noun(args.kind), display_name(&remembered));
    Ok(())
}

fn display_name<T: serde::Serialize>(state: &T) -> String {
    serde_json::to_value(state)
        .map(|value| output::display_name(&value))
        .unwrap_or_else(|_| "(unnamed)".into())
}
