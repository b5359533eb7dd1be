//! Plan rendering.
//!
//! View plans are rendered per collection with `+`/`~`/`-` markers; other
//! kinds are flat records and render as a field-by-field comparison of
//! their JSON form.

use std::fmt::Write as _;
use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;
use serde_json::Value;

use crucible_core::{Changes, NameSetDiff, TeamPlan, ViewPlan};

use crate::cli::ColorMode;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            color: should_color(mode),
        }
    }

    fn add(self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_owned()
        }
    }

    fn change(self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_owned()
        }
    }

    fn remove(self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn bold(self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            text.to_owned()
        }
    }
}

/// Counts for the closing summary line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub add: usize,
    pub change: usize,
    pub destroy: usize,
}

impl Tally {
    pub fn is_empty(self) -> bool {
        self.add == 0 && self.change == 0 && self.destroy == 0
    }

    fn count<T>(&mut self, changes: &Changes<T>) {
        self.add += changes.create.len();
        self.change += changes.update.len();
        self.destroy += changes.delete.len();
    }

    fn count_names(&mut self, names: &NameSetDiff) {
        self.add += names.added.len();
        self.destroy += names.removed.len();
    }
}

pub fn summary(painter: Painter, tally: Tally) -> String {
    if tally.is_empty() {
        return painter.bold("No changes. Remote state matches the declaration.");
    }
    painter.bold(&format!(
        "Plan: {} to add, {} to change, {} to destroy.",
        tally.add, tally.change, tally.destroy
    ))
}

// ── View plans ───────────────────────────────────────────────────────

/// Render a reconciliation plan for an existing view.
pub fn render_view_plan(painter: Painter, plan: &ViewPlan) -> (String, Tally) {
    let mut out = String::new();
    let mut tally = Tally::default();
    if plan.is_empty() {
        return (out, tally);
    }
    let view = &plan.target;

    let _ = writeln!(
        out,
        "{} view {} ({})",
        painter.change("~"),
        painter.bold(&view.name),
        plan.view_id
    );
    if plan.metadata_changed {
        tally.change += 1;
        let _ = writeln!(out, "    {} name, description, or status", painter.change("~"));
    }

    tally.count(&plan.applications);
    for app in &plan.applications.delete {
        line(&mut out, 4, &painter.remove("-"), "application", &app.name);
    }
    for update in &plan.applications.update {
        line(&mut out, 4, &painter.change("~"), "application", &update.new.name);
    }
    for app in &plan.applications.create {
        line(&mut out, 4, &painter.add("+"), "application", &app.name);
    }

    for team in &plan.teams_deleted {
        tally.destroy += 1;
        line(&mut out, 4, &painter.remove("-"), "team", &team.name);
    }
    for team in plan.teams_updated.iter().filter(|t| !t.is_empty()) {
        render_team_plan(&mut out, painter, team, &mut tally);
    }
    for team in &plan.teams_created {
        tally.add += 1;
        line(&mut out, 4, &painter.add("+"), "team", &team.name);
        for user in &team.users {
            line(&mut out, 8, &painter.add("+"), "user", &user.user_id);
        }
        for instance in &team.app_instances {
            line(&mut out, 8, &painter.add("+"), "instance", &instance.name);
        }
        for permission in &team.permissions {
            line(&mut out, 8, &painter.add("+"), "permission", permission);
        }
    }

    (out, tally)
}

fn render_team_plan(out: &mut String, painter: Painter, team: &TeamPlan, tally: &mut Tally) {
    line(out, 4, &painter.change("~"), "team", &team.new.name);
    if team.shell_changed {
        tally.change += 1;
        let _ = writeln!(
            out,
            "        {} role: {:?} -> {:?}",
            painter.change("~"),
            team.old.role,
            team.new.role
        );
    }

    tally.count_names(&team.permissions);
    for name in &team.permissions.removed {
        line(out, 8, &painter.remove("-"), "permission", name);
    }
    for name in &team.permissions.added {
        line(out, 8, &painter.add("+"), "permission", name);
    }

    tally.count(&team.users);
    for user in &team.users.delete {
        line(out, 8, &painter.remove("-"), "user", &user.user_id);
    }
    for update in &team.users.update {
        let _ = writeln!(
            out,
            "        {} user {}: role {:?} -> {:?}",
            painter.change("~"),
            update.new.user_id,
            update.old.role().unwrap_or_default(),
            update.new.role().unwrap_or_default()
        );
    }
    for user in &team.users.create {
        line(out, 8, &painter.add("+"), "user", &user.user_id);
    }

    tally.count(&team.instances);
    for instance in &team.instances.delete {
        line(out, 8, &painter.remove("-"), "instance", &instance.name);
    }
    for update in &team.instances.update {
        line(out, 8, &painter.change("~"), "instance", &update.new.name);
    }
    for instance in &team.instances.create {
        line(out, 8, &painter.add("+"), "instance", &instance.name);
    }
}

fn line(out: &mut String, indent: usize, marker: &str, noun: &str, name: &str) {
    let _ = writeln!(out, "{:indent$}{marker} {noun} {name}", "");
}

// ── Flat resources ───────────────────────────────────────────────────

/// A resource with no remembered state: everything declared is created.
pub fn render_create(painter: Painter, kind: &str, desired: &Value) -> (String, Tally) {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {kind} {}",
        painter.add("+"),
        painter.bold(&display_name(desired))
    );
    if let Value::Object(fields) = desired {
        for (field, value) in fields {
            let _ = writeln!(out, "    {field}: {}", compact(value));
        }
    }
    let tally = Tally {
        add: 1,
        ..Tally::default()
    };
    (out, tally)
}

/// Field-level comparison of remembered and settled desired state.
pub fn render_update(
    painter: Painter,
    kind: &str,
    remembered: &Value,
    settled: &Value,
) -> (String, Tally) {
    let mut out = String::new();
    let (Value::Object(old), Value::Object(new)) = (remembered, settled) else {
        return (out, Tally::default());
    };

    let mut fields: Vec<&String> = old.keys().chain(new.keys()).collect();
    fields.sort();
    fields.dedup();

    let null = Value::Null;
    let changed: Vec<_> = fields
        .into_iter()
        .filter_map(|field| {
            let before = old.get(field).unwrap_or(&null);
            let after = new.get(field).unwrap_or(&null);
            (before != after).then_some((field, before, after))
        })
        .collect();
    if changed.is_empty() {
        return (out, Tally::default());
    }

    let _ = writeln!(
        out,
        "{} {kind} {}",
        painter.change("~"),
        painter.bold(&display_name(settled))
    );
    for (field, before, after) in changed {
        let _ = writeln!(
            out,
            "    {} {field}: {} -> {}",
            painter.change("~"),
            compact(before),
            compact(after)
        );
    }
    let tally = Tally {
        change: 1,
        ..Tally::default()
    };
    (out, tally)
}

/// The `name` field, else the `id` field, of a serialized resource.
pub fn display_name(value: &Value) -> String {
    value
        .get("name")
        .or_else(|| value.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("(unnamed)")
        .to_owned()
}

fn compact(value: &Value) -> String {
    match value {
        Value::Null => "(unset)".into(),
        other => other.to_string(),
    }
}
