//! Command implementations

pub mod apply;
pub mod destroy;
pub mod import;
pub mod inspect;
pub mod plan;
pub mod refresh;
pub mod state;
pub mod validate;

use crate::Context;
use crate::progress::{ApplyProgress, TerminalConfirm};
use crate::provider::Provider;
use crate::ui;
use crate::workspace::Workspace;
use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{
    AutoConfirm, Diagnostics, ExecuteOptions, ExecuteSummary, ExecutionPlan, PlanOptions, execute,
    read_data_sources, refresh,
};

/// Print diagnostics; in quiet mode only errors.
pub(crate) fn report(ctx: &Context, diags: &Diagnostics) {
    if ctx.quiet {
        let errors: Diagnostics = diags.errors().cloned().collect();
        ui::diagnostics(&errors);
    } else {
        ui::diagnostics(diags);
    }
}

/// Print a framework error as diagnostics and turn it into a plain failure.
pub(crate) fn fail(err: declarative::Error, what: &str) -> anyhow::Error {
    let diags = err.into_diagnostics();
    ui::diagnostics(&diags);
    anyhow::anyhow!("{what} failed with {} error(s)", diags.errors().count())
}

/// Bring state up to date before planning: re-read managed instances
/// (unless disabled) and read every declared data source.
pub(crate) fn prepare(
    ctx: &Context,
    workspace: &mut Workspace,
    provider: &Provider,
    refresh_state: bool,
    jobs: usize,
) -> Result<()> {
    let mut diags = Diagnostics::new();
    if refresh_state && !workspace.state.managed_addresses().is_empty() {
        if !ctx.quiet {
            println!("  {} Refreshing state...", "→".cyan());
        }
        diags.extend(refresh(provider, &mut workspace.state, jobs)?);
    }
    diags.extend(read_data_sources(
        &workspace.document.declarations,
        provider,
        &mut workspace.state,
    )?);

    report(ctx, &diags);
    if diags.has_errors() {
        bail!("Reading current state failed with {} error(s)", diags.errors().count());
    }
    Ok(())
}

/// Plan against the current state, printing planner warnings.
pub(crate) fn build_plan(
    ctx: &Context,
    workspace: &Workspace,
    provider: &Provider,
    options: &PlanOptions,
) -> Result<ExecutionPlan> {
    let plan = declarative::plan(
        &workspace.document.declarations,
        &workspace.state,
        provider,
        options,
    )
    .map_err(|err| fail(err, "Planning"))?;
    report(ctx, &plan.diagnostics);
    Ok(plan)
}

/// Confirm (unless auto-approved), execute and save state.
///
/// State is written even when instances failed, so created objects are
/// never lost.
pub(crate) fn execute_plan(
    ctx: &Context,
    workspace: &mut Workspace,
    provider: &Provider,
    plan: &ExecutionPlan,
    auto_approve: bool,
    jobs: usize,
    verb: &str,
) -> Result<ExecuteSummary> {
    let opts = ExecuteOptions {
        dry_run: false,
        jobs,
        verbose: ctx.verbose > 0,
    };
    let mut progress = ApplyProgress::new(opts.verbose)?;

    let result = if auto_approve {
        execute(plan, provider, &mut workspace.state, &opts, &mut progress, &mut AutoConfirm)
    } else {
        execute(plan, provider, &mut workspace.state, &opts, &mut progress, &mut TerminalConfirm)
    };
    progress.finish();
    workspace.save()?;
    let summary = result?;

    if summary.failed == 0 && summary.total_changes() == 0 && summary.skipped > 0 {
        println!();
        println!("  {} {verb} cancelled", "✗".red());
        return Ok(summary);
    }

    let diags: Diagnostics = summary.diagnostics.iter().cloned().collect();
    report(ctx, &diags);
    ui::print_summary(&summary, verb);

    if !summary.is_success() {
        bail!("{} resource(s) failed", summary.failed);
    }
    Ok(summary)
}
