//! Clap derive structures for the `crucible` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// crucible -- declarative provisioning for Crucible exercises
#[derive(Debug, Parser)]
#[command(
    name = "crucible",
    version,
    about = "Provision Crucible views, users, templates, VMs, and VLANs",
    long_about = "Reconciles declarative YAML or JSON documents against the Crucible\n\
        Player, VM, and Caster APIs.\n\n\
        Remembered state lives in a JSON state file next to each document.\n\
        Credentials come from crucible.toml or SEI_CRUCIBLE_* environment variables.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (defaults to the platform config directory)
    #[arg(long, env = "SEI_CRUCIBLE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of -v
    #[arg(long, global = true)]
    pub debug: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Resource kinds a document can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    View,
    User,
    AppTemplate,
    Vm,
    Vlan,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::User => "user",
            Self::AppTemplate => "app-template",
            Self::Vm => "vm",
            Self::Vlan => "vlan",
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show what apply would change, without contacting any API
    Plan(DocumentArgs),

    /// Create or update the declared resource and record its state
    Apply(DocumentArgs),

    /// Re-read the remembered resource and rewrite the state file
    Refresh(StateArgs),

    /// Delete the remembered resource and remove the state file
    Destroy(StateArgs),

    /// Verify credentials with a single token request
    Check,
}

#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Resource kind declared by the document
    #[arg(value_enum)]
    pub kind: Kind,

    /// Declarative document (YAML or JSON)
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    /// State file (defaults to the document path with a .state.json suffix)
    #[arg(long, short = 's')]
    pub state: Option<PathBuf>,
}

impl DocumentArgs {
    pub fn state_path(&self) -> PathBuf {
        self.state
            .clone()
            .unwrap_or_else(|| default_state_path(&self.file))
    }
}

#[derive(Debug, Args)]
pub struct StateArgs {
    /// Resource kind recorded in the state file
    #[arg(value_enum)]
    pub kind: Kind,

    /// State file written by a previous apply
    #[arg(long, short = 's')]
    pub state: PathBuf,
}

/// `exercise.yaml` -> `exercise.state.json`
pub fn default_state_path(document: &std::path::Path) -> PathBuf {
    let stem = document
        .file_stem()
        .map_or_else(|| "crucible".into(), |s| s.to_string_lossy().into_owned());
    document.with_file_name(format!("{stem}.state.json"))
}
