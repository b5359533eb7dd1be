//! `crucible plan`: diff a document against remembered state offline.
//!
//! Remote drift is not consulted; run `refresh` first to fold it into
//! the state file.

use crucible_core::{
    ManagedResource, TemplateService, UserService, View, VlanService, VmService, plan_view,
    validate_view,
};

use crate::cli::{DocumentArgs, Kind};
use crate::error::CliError;
use crate::output::{self, Painter, Tally};
use crate::state::{load_document, load_state};

pub fn handle(args: &DocumentArgs, painter: Painter) -> Result<(), CliError> {
    let (text, tally) = match args.kind {
        Kind::View => plan_view_document(args, painter)?,
        Kind::User => plan_flat::<UserService>(args, painter)?,
        Kind::AppTemplate => plan_flat::<TemplateService>(args, painter)?,
        Kind::Vm => plan_flat::<VmService>(args, painter)?,
        Kind::Vlan => plan_flat::<VlanService>(args, painter)?,
    };
    print!("{text}");
    if !text.is_empty() {
        println!();
    }
    println!("{}", output::summary(painter, tally));
    Ok(())
}

fn plan_view_document(args: &DocumentArgs, painter: Painter) -> Result<(String, Tally), CliError> {
    let desired: View = load_document(&args.file)?;
    match load_state::<View>(&args.state_path(), args.kind)? {
        Some(remembered) => {
            let plan = plan_view(&remembered, &desired)?;
            Ok(output::render_view_plan(painter, &plan))
        }
        None => {
            validate_view(&desired)?;
            let value = serde_json::to_value(&desired)?;
            Ok(output::render_create(painter, "view", &value))
        }
    }
}

fn plan_flat<R: ManagedResource>(
    args: &DocumentArgs,
    painter: Painter,
) -> Result<(String, Tally), CliError> {
    let desired: R::State = load_document(&args.file)?;
    match load_state::<R::State>(&args.state_path(), args.kind)? {
        Some(remembered) => {
            let settled = R::settle(&remembered, &desired);
            Ok(output::render_update(
                painter,
                R::KIND,
                &serde_json::to_value(&remembered)?,
                &serde_json::to_value(&settled)?,
            ))
        }
        None => Ok(output::render_create(
            painter,
            R::KIND,
            &serde_json::to_value(&desired)?,
        )),
    }
}
