use chrono::{DateTime, Utc};
use colored::Colorize;
use declarative::{
    AttributeChange, Diagnostics, ExecuteSummary, ExecutionPlan, InstancePlan, PlanAction, group_by_type,
};
use serde_json::{Map, Value};
use similar::{ChangeTag, TextDiff};
use std::collections::BTreeSet;
use std::fmt::Write;

const SENSITIVE: &str = "(sensitive value)";
const UNKNOWN: &str = "(known after apply)";
const RULE: &str = "─────────────────────────────────────────────────────";

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print warnings and errors with their location.
pub fn diagnostics(diags: &Diagnostics) {
    for diag in diags {
        let location = match (&diag.address, &diag.attribute) {
            (Some(address), Some(attribute)) => format!(" ({address}.{attribute})"),
            (Some(address), None) => format!(" ({address})"),
            (None, Some(attribute)) => format!(" ({attribute})"),
            (None, None) => String::new(),
        };
        let line = format!("{}{}", diag.summary.bold(), location.dimmed());
        if diag.is_error() {
            error(&line);
        } else {
            warn(&line);
        }
        for detail in diag.detail.lines() {
            if diag.is_error() {
                eprintln!("    {detail}");
            } else {
                dim(&format!("  {detail}"));
            }
        }
    }
}

fn symbol(action: PlanAction) -> String {
    match action {
        PlanAction::Create => "+".green().to_string(),
        PlanAction::Update => "~".yellow().to_string(),
        PlanAction::Replace => format!("{}/{}", "-".red(), "+".green()),
        PlanAction::Delete => "-".red().to_string(),
        PlanAction::NoOp => " ".to_string(),
    }
}

fn headline(action: PlanAction) -> &'static str {
    match action {
        PlanAction::Create => "will be created",
        PlanAction::Update => "will be updated in-place",
        PlanAction::Replace => "must be replaced",
        PlanAction::Delete => "will be destroyed",
        PlanAction::NoOp => "unchanged",
    }
}

fn show(value: Option<&Value>, sensitive: bool) -> String {
    match value {
        _ if sensitive => SENSITIVE.to_string(),
        None | Some(Value::Null) => "null".to_string(),
        Some(v) => v.to_string(),
    }
}

/// Line diff for multi-line string values.
fn text_diff(before: &str, after: &str) -> Vec<String> {
    TextDiff::from_lines(before, after)
        .iter_all_changes()
        .map(|change| {
            let line = change.value().trim_end_matches('\n');
            match change.tag() {
                ChangeTag::Delete => format!("{}{}", "- ".red(), line.red()),
                ChangeTag::Insert => format!("{}{}", "+ ".green(), line.green()),
                ChangeTag::Equal => format!("  {}", line.dimmed()),
            }
        })
        .collect()
}

fn format_change(out: &mut String, change: &AttributeChange) {
    let marker = match (&change.before, &change.after, change.after_unknown) {
        (None, _, _) => "+".green(),
        (Some(_), None, false) => "-".red(),
        _ => "~".yellow(),
    };
    let replace = if change.forces_replacement {
        format!(" {}", "# forces replacement".red())
    } else {
        String::new()
    };

    let multiline = match (&change.before, &change.after) {
        (Some(Value::String(a)), Some(Value::String(b))) if !change.sensitive && (a.contains('\n') || b.contains('\n')) => {
            Some((a, b))
        }
        _ => None,
    };
    if let Some((before, after)) = multiline {
        let _ = writeln!(out, "│       {marker} {}{replace}", change.path);
        for line in text_diff(before, after) {
            let _ = writeln!(out, "│           {line}");
        }
        return;
    }

    let after = if change.after_unknown {
        UNKNOWN.dimmed().to_string()
    } else {
        show(change.after.as_ref(), change.sensitive)
    };
    let value = match &change.before {
        Some(before) if change.after.is_some() || change.after_unknown => {
            format!("{} → {after}", show(Some(before), change.sensitive))
        }
        Some(before) => format!("{} → null", show(Some(before), change.sensitive)),
        None => after,
    };
    let _ = writeln!(out, "│       {marker} {:<24} {value}{replace}", change.path);
}

fn format_instance(out: &mut String, plan: &InstancePlan) {
    let _ = writeln!(
        out,
        "│   {} {:<30} {}",
        symbol(plan.action),
        plan.address.name.bold(),
        headline(plan.action).dimmed()
    );
    if plan.action != PlanAction::Delete {
        for change in &plan.changes {
            format_change(out, change);
        }
    }
}

/// Render the changes in a plan.
pub fn format_plan(plan: &ExecutionPlan) -> String {
    let mut out = String::new();
    let summary = plan.summary();
    if !summary.has_changes() {
        let _ = writeln!(out, "  {} No changes. Remote objects match the configuration.", "✓".green());
        return out;
    }

    let _ = writeln!(out, "┌─ {} {}┐", "Execution Plan".bold(), "─".repeat(36));
    let _ = writeln!(out, "│");
    for (resource_type, plans) in group_by_type(plan.changes()) {
        let _ = writeln!(out, "│ {}", resource_type.bold());
        for instance in plans {
            format_instance(&mut out, instance);
        }
        let _ = writeln!(out, "│");
    }
    let _ = writeln!(out, "├{RULE}┤");
    let _ = writeln!(
        out,
        "│ Plan: {} to add, {} to change, {} to replace, {} to destroy",
        summary.to_add.to_string().green(),
        summary.to_change.to_string().yellow(),
        summary.to_replace.to_string().yellow(),
        summary.to_destroy.to_string().red()
    );
    let _ = writeln!(out, "└{RULE}┘");
    out
}

pub fn print_plan(plan: &ExecutionPlan) {
    println!();
    print!("{}", format_plan(plan));
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary, verb: &str) {
    println!();
    if summary.is_success() {
        println!("  {} {verb} complete!", "✓".green().bold());
    } else {
        println!("  {} {verb} finished with errors", "⚠".yellow().bold());
    }

    let lines = [
        (summary.created, "created"),
        (summary.updated, "updated"),
        (summary.replaced, "replaced"),
        (summary.deleted, "destroyed"),
        (summary.skipped, "skipped"),
    ];
    for (count, what) in lines {
        if count > 0 {
            println!("    • {count} resources {what}");
        }
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

/// "3 hours ago" for an RFC 3339 timestamp.
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> Option<String> {
    let then = DateTime::parse_from_rfc3339(timestamp).ok()?.with_timezone(&Utc);
    let seconds = (now - then).num_seconds();
    let text = match seconds {
        s if s < 0 => "in the future".to_string(),
        0..=59 => "just now".to_string(),
        60..=3599 => plural(seconds / 60, "minute"),
        3600..=86_399 => plural(seconds / 3600, "hour"),
        _ => plural(seconds / 86_400, "day"),
    };
    Some(text)
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Replace secrets in nested maps by a placeholder.
fn mask_nested(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if crate::resource::is_sensitive_key(k) && !v.is_null() {
                        Value::String(SENSITIVE.to_string())
                    } else {
                        mask_nested(v)
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(mask_nested).collect()),
        other => other.clone(),
    }
}

/// Render recorded attributes for `state show`.
pub fn format_attributes(attributes: &Map<String, Value>, sensitive: &BTreeSet<String>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for (key, value) in attributes {
        let rendered = if sensitive.contains(key) && !value.is_null() {
            SENSITIVE.to_string()
        } else {
            let masked = mask_nested(value);
            match &masked {
                Value::Object(_) | Value::Array(_) => {
                    serde_json::to_string_pretty(&masked).unwrap_or_else(|_| masked.to_string())
                }
                other => other.to_string(),
            }
        };
        let age = value
            .as_str()
            .filter(|_| key.ends_with("_at") || key == "last_checked")
            .and_then(|ts| relative_time(ts, now))
            .map(|age| format!("  ({age})").dimmed().to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "  {key:<24} = {}{age}", rendered.replace('\n', "\n  "));
    }
    out
}
